//! Nested serialization.

use crate::model::{NodeIndex, NodeRef, Tree};
use crate::serializer::TreeSerializer;
use serde_json::Value;
use std::collections::HashMap;

/// Default key under which children are nested.
pub const DEFAULT_CHILDREN_KEY: &str = "children";

/// Serializes a tree as nested property bags.
///
/// Each node becomes its property bag, extended by the children key holding
/// the serialized children. Childless nodes get no children key at all.
///
/// Building the output needs no recursion, but the returned [Value] nests
/// as deep as the tree. Encoding it with `serde_json` and dropping it both
/// recurse once per level, so very deep chains are better written with
/// [FlatSerializer](crate::serializer::FlatSerializer).
///
/// # Example
/// ```
/// use flatree::model::Tree;
/// use flatree::serializer::{HierarchicalSerializer, TreeSerializer};
/// use serde_json::json;
///
/// let tree = Tree::from_value(json!([
///     {"id": 1, "parent": 0},
///     {"id": 2, "parent": 1},
///     {"id": 3, "parent": 0},
/// ])).unwrap();
///
/// assert_eq!(
///     HierarchicalSerializer::default().serialize(&tree),
///     json!([
///         {"id": 1, "parent": 0, "children": [{"id": 2, "parent": 1}]},
///         {"id": 3, "parent": 0},
///     ])
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchicalSerializer {
    children_key: String,
}

impl HierarchicalSerializer {
    /// Creates a serializer nesting children under `children_key`.
    pub fn new<S: Into<String>>(children_key: S) -> Self {
        HierarchicalSerializer {
            children_key: children_key.into(),
        }
    }

    /// Returns the key children are nested under.
    pub fn children_key(&self) -> &str {
        &self.children_key
    }

    /// Assembles one subtree per top-level node without recursion.
    ///
    /// Nodes are visited in reverse pre-order, so every child is finished
    /// before its parent collects it.
    fn serialize_forest(&self, tree: &Tree) -> Vec<Value> {
        let order: Vec<NodeRef<'_>> = tree.iter().collect();
        let mut finished: HashMap<NodeIndex, Value> = HashMap::with_capacity(order.len());

        for node in order.into_iter().rev() {
            let mut data = node.to_map();
            if node.has_children() {
                let children = node
                    .node()
                    .child_indices()
                    .iter()
                    .filter_map(|child| finished.remove(child))
                    .collect();
                data.insert(self.children_key.clone(), Value::Array(children));
            }
            finished.insert(node.index(), Value::Object(data));
        }

        tree.root_nodes()
            .iter()
            .filter_map(|node| finished.remove(&node.index()))
            .collect()
    }
}

impl Default for HierarchicalSerializer {
    fn default() -> Self {
        HierarchicalSerializer::new(DEFAULT_CHILDREN_KEY)
    }
}

impl TreeSerializer for HierarchicalSerializer {
    fn serialize(&self, tree: &Tree) -> Value {
        Value::Array(self.serialize_forest(tree))
    }
}
