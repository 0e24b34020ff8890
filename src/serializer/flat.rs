//! Flat, depth-first serialization.

use crate::model::Tree;
use crate::serializer::TreeSerializer;
use serde_json::Value;

/// Serializes a tree as the list of all property bags in depth-first
/// pre-order, i.e. the order of [Tree::nodes].
///
/// The output can be used as input for a new [Tree] with the same
/// configuration, yielding an equivalent tree.
///
/// # Example
/// ```
/// use flatree::model::Tree;
/// use flatree::serializer::{FlatSerializer, TreeSerializer};
/// use serde_json::json;
///
/// let tree = Tree::from_value(json!([
///     {"id": 2, "parent": 1},
///     {"id": 1, "parent": 0},
/// ])).unwrap();
///
/// assert_eq!(
///     FlatSerializer.serialize(&tree),
///     json!([{"id": 1, "parent": 0}, {"id": 2, "parent": 1}])
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatSerializer;

impl TreeSerializer for FlatSerializer {
    fn serialize(&self, tree: &Tree) -> Value {
        Value::Array(
            tree.nodes()
                .into_iter()
                .map(|node| Value::Object(node.to_map()))
                .collect(),
        )
    }
}
