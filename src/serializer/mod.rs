//! Output strategies for built trees.
//!
//! Serializers are read-only views: they only use the public query surface
//! of [Tree] and produce a [Value] that can be encoded directly, e.g. with
//! [serde_json::to_string].
//!
//! * [FlatSerializer] - depth-first list of property bags, which can be fed
//!   back into a new tree
//! * [HierarchicalSerializer] - nested property bags, children under a
//!   configurable key
//! * [outline] - indented textual rendering, used by `Display for Tree`
//!
//! # Custom serializers
//! Implement [TreeSerializer] and register it with
//! [TreeBuilder::with_serializer](crate::model::TreeBuilder::with_serializer)
//! or [Tree::set_serializer].

pub mod flat;
pub mod hierarchical;
pub mod outline;

pub use flat::FlatSerializer;
pub use hierarchical::{DEFAULT_CHILDREN_KEY, HierarchicalSerializer};

use crate::model::Tree;
use serde_json::Value;

// =#========================================================================#=
// TREE SERIALIZER (trait)
// =#========================================================================T=
/// Strategy turning a [Tree] into an encodable [Value].
pub trait TreeSerializer {
    /// Returns a representation of `tree` that can be encoded as JSON.
    fn serialize(&self, tree: &Tree) -> Value;
}

// =#========================================================================#=
// SERIALIZER KIND
// =#========================================================================#=
/// Built-in serializer choice, as selectable from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SerializerKind {
    /// [FlatSerializer]
    #[default]
    Flat,
    /// [HierarchicalSerializer] with the given children key
    Hierarchical {
        /// Key holding the serialized children of a node
        children_key: String,
    },
}

impl SerializerKind {
    /// Instantiates the serializer this kind stands for.
    pub fn to_serializer(&self) -> Box<dyn TreeSerializer> {
        match self {
            SerializerKind::Flat => Box::new(FlatSerializer),
            SerializerKind::Hierarchical { children_key } => {
                Box::new(HierarchicalSerializer::new(children_key.clone()))
            }
        }
    }
}
