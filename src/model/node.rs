//! Nodes of a tree and handles to navigate them.
//!
//! - [Node]: data of one entity (property bag plus parent/children links as
//!   arena indices), owned by the [Tree] arena.
//! - [NodeRef]: a cheap `Copy` handle pairing a tree with a node index,
//!   offering navigation (parent, children, siblings, ancestors,
//!   descendants) and property access.
//! - [Property]: result of the name-based property accessors, which can
//!   resolve to a stored value or to one of the virtual `parent`/`children`
//!   properties.

use crate::model::Record;
use crate::model::node_id::{display_id, loose_key};
use crate::model::tree::Tree;
use crate::model::tree_error::TreeError;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Index of a node in a tree (arena).
pub type NodeIndex = usize;

/// Arena index of the synthetic root every tree holds.
pub(crate) const ROOT_INDEX: NodeIndex = 0;

/// Index of a node created outside of any tree.
const DETACHED_INDEX: NodeIndex = usize::MAX;

/// Property name holding a node's ID.
pub const ID_KEY: &str = "id";

/// Property name holding a node's parent ID.
pub const PARENT_KEY: &str = "parent";

/// Virtual property name resolving to a node's children.
pub const CHILDREN_KEY: &str = "children";

// =#========================================================================#=
// NODE
// =#========================================================================#=
/// One entity of the hierarchy, stored in the arena of a [Tree].
///
/// # Invariants
/// - `properties` always contains `id` and `parent`, as the last two keys
///   in this order (unless a later build step rewrote `parent` in place)
/// - `key` is the loose key of `id`
/// - `parent` and `children` are arena indices; the parent link is set at
///   most once during a build, only detached again to break a parent cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Index of this node in the tree arena
    index: NodeIndex,
    /// Loose key of the ID, used for linking and lookup
    key: String,
    /// Property bag in insertion order
    properties: Record,
    /// Lower-cased property name -> first original name with that spelling
    lowercase_keys: HashMap<String, String>,
    /// Index of the parent node, unset for the root and unattached nodes
    parent: Option<NodeIndex>,
    /// Indices of the children, in the order they were attached
    children: Vec<NodeIndex>,
}

impl Node {
    /// Creates a stand-alone node, not part of any tree.
    ///
    /// The `id` and `parent` keys of `properties` (if present) are dropped
    /// and re-appended from the explicit arguments, so both are always
    /// present and the remaining keys keep their order in front of them.
    ///
    /// # Errors
    /// [TreeError::InvalidDatatype] if `id` is an array or object.
    ///
    /// # Example
    /// ```
    /// use flatree::model::Node;
    /// use serde_json::json;
    ///
    /// let props = json!({"foo": "bar", "id": 1, "gggg": 123});
    /// let node = Node::new(json!("xyz"), json!(456), props.as_object().unwrap().clone()).unwrap();
    ///
    /// let keys: Vec<&str> = node.properties().keys().map(String::as_str).collect();
    /// assert_eq!(keys, ["foo", "gggg", "id", "parent"]);
    /// assert_eq!(node.id(), &json!("xyz"));
    /// assert_eq!(node.to_string(), "xyz");
    /// ```
    pub fn new(id: Value, parent: Value, properties: Record) -> Result<Self, TreeError> {
        let key = loose_key(&id).ok_or_else(|| {
            TreeError::invalid_datatype(format!("Node ID must be scalar, got {id}"))
        })?;
        Ok(Node::with_index(DETACHED_INDEX, key, id, parent, properties))
    }

    /// Creates a node placed at `index` of a tree arena.
    pub(crate) fn with_index(
        index: NodeIndex,
        key: String,
        id: Value,
        parent: Value,
        mut properties: Record,
    ) -> Self {
        properties.shift_remove(ID_KEY);
        properties.shift_remove(PARENT_KEY);
        properties.insert(ID_KEY.to_string(), id);
        properties.insert(PARENT_KEY.to_string(), parent);

        let mut lowercase_keys = HashMap::with_capacity(properties.len());
        for name in properties.keys() {
            lowercase_keys
                .entry(name.to_lowercase())
                .or_insert_with(|| name.clone());
        }

        Node {
            index,
            key,
            properties,
            lowercase_keys,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Creates the synthetic root carrying the configured root ID.
    pub(crate) fn new_root(key: String, root_id: Value) -> Self {
        Node::with_index(ROOT_INDEX, key, root_id, Value::Null, Record::new())
    }

    /// Returns the index of this node in the arena.
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    /// Returns the ID as supplied (type preserved).
    pub fn id(&self) -> &Value {
        self.properties.get(ID_KEY).unwrap_or(&Value::Null)
    }

    /// Returns the loose key of the ID.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the stored parent ID, i.e. the ID of the node this one is
    /// attached to, or the parent ID from the input if unattached.
    pub fn parent_id(&self) -> &Value {
        self.properties.get(PARENT_KEY).unwrap_or(&Value::Null)
    }

    /// Returns the full property bag, in insertion order.
    pub fn properties(&self) -> &Record {
        &self.properties
    }

    /// Returns a copy of the property bag, in insertion order.
    pub fn to_map(&self) -> Record {
        self.properties.clone()
    }

    /// Returns the value stored under exactly `name`.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Returns the value stored under `name`, preferring an exact match and
    /// falling back to a case-insensitive one.
    pub fn value_ignore_case(&self, name: &str) -> Option<&Value> {
        self.properties.get(name).or_else(|| {
            self.lowercase_keys
                .get(&name.to_lowercase())
                .and_then(|original| self.properties.get(original))
        })
    }

    /// Returns whether a property named exactly `name` is stored,
    /// regardless of its value (`null` counts as present).
    pub fn has_value(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Returns the index of the parent, if linked.
    ///
    /// Note that top-level nodes are linked to the synthetic root.
    pub fn parent_index(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Returns the indices of the children, in order.
    pub fn child_indices(&self) -> &[NodeIndex] {
        &self.children
    }

    /// Returns `true` if this is the synthetic root of its tree.
    pub fn is_root(&self) -> bool {
        self.index == ROOT_INDEX
    }

    /// Appends `child` to the ordered children.
    pub(crate) fn push_child(&mut self, child: NodeIndex) {
        self.children.push(child);
    }

    pub(crate) fn remove_child(&mut self, child: NodeIndex) {
        self.children.retain(|&c| c != child);
    }

    pub(crate) fn set_parent(&mut self, parent: NodeIndex, parent_id: Value) {
        self.parent = Some(parent);
        self.properties.insert(PARENT_KEY.to_string(), parent_id);
    }

    pub(crate) fn clear_parent(&mut self) {
        self.parent = None;
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&display_id(self.id()))
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.properties.serialize(serializer)
    }
}

// =#========================================================================#=
// NODE REF
// =#========================================================================#=
/// Handle to a node of a [Tree], used for navigation and property access.
///
/// Handles borrow the tree, so they cannot outlive a
/// [rebuild](Tree::rebuild_with_data).
/// The synthetic root is never handed out through navigation: top-level
/// nodes report no parent, and ancestors stop below the root.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Tree,
    index: NodeIndex,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(tree: &'a Tree, index: NodeIndex) -> Self {
        NodeRef { tree, index }
    }

    /// Returns the arena index of this node.
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    /// Returns the underlying node data.
    pub fn node(&self) -> &'a Node {
        &self.tree[self.index]
    }

    /// Returns the tree this node belongs to.
    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    /// Returns the ID as supplied (type preserved).
    pub fn id(&self) -> &'a Value {
        self.node().id()
    }

    /// Returns the loose key of the ID.
    pub fn key(&self) -> &'a str {
        self.node().key()
    }

    /// Returns the full property bag, in insertion order, including `id` and `parent`.
    pub fn to_map(&self) -> Record {
        self.node().to_map()
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------
    /// Returns the parent, or `None` for top-level and unattached nodes.
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node()
            .parent_index()
            .filter(|&p| p != ROOT_INDEX)
            .map(|p| NodeRef::new(self.tree, p))
    }

    /// Returns the direct children in order (empty if childless).
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        self.node()
            .child_indices()
            .iter()
            .map(|&c| NodeRef::new(self.tree, c))
            .collect()
    }

    /// Returns whether this node has at least one child.
    pub fn has_children(&self) -> bool {
        !self.node().child_indices().is_empty()
    }

    /// Returns the number of direct children.
    pub fn count_children(&self) -> usize {
        self.node().child_indices().len()
    }

    /// Returns the other children of this node's parent, in order.
    ///
    /// Top-level nodes are siblings of each other. Unattached nodes have none.
    pub fn siblings(&self) -> Vec<NodeRef<'a>> {
        self.siblings_generic(false)
    }

    /// Returns all children of this node's parent, this node included.
    pub fn siblings_and_self(&self) -> Vec<NodeRef<'a>> {
        self.siblings_generic(true)
    }

    fn siblings_generic(&self, include_self: bool) -> Vec<NodeRef<'a>> {
        let Some(parent) = self.node().parent_index() else {
            return if include_self { vec![*self] } else { Vec::new() };
        };

        NodeRef::new(self.tree, parent)
            .children()
            .into_iter()
            .filter(|sibling| include_self || sibling.key() != self.key())
            .collect()
    }

    /// Returns the previous node on the same level, if any.
    pub fn preceding_sibling(&self) -> Option<NodeRef<'a>> {
        self.sibling(-1)
    }

    /// Returns the next node on the same level, if any.
    pub fn following_sibling(&self) -> Option<NodeRef<'a>> {
        self.sibling(1)
    }

    fn sibling(&self, offset: isize) -> Option<NodeRef<'a>> {
        let parent = self.node().parent_index()?;
        let siblings = self.tree[parent].child_indices();
        let position = siblings.iter().position(|&s| s == self.index)?;
        let target = position.checked_add_signed(offset)?;
        siblings.get(target).map(|&s| NodeRef::new(self.tree, s))
    }

    /// Returns the level of this node (1 = top level).
    ///
    /// Unattached nodes are at level 0, their descendants count from there.
    pub fn level(&self) -> usize {
        let mut level = 0;
        let mut current = self.node().parent_index();
        while let Some(parent) = current {
            level += 1;
            current = self.tree[parent].parent_index();
        }
        level
    }

    /// Returns all nodes below this one in depth-first pre-order:
    /// first child, its descendants, second child, its descendants, and so on.
    pub fn descendants(&self) -> Vec<NodeRef<'a>> {
        PreOrderIter::below(self.tree, self.index).collect()
    }

    /// Returns this node followed by [descendants](Self::descendants).
    pub fn descendants_and_self(&self) -> Vec<NodeRef<'a>> {
        self.pre_order_iter().collect()
    }

    /// Returns an iterator over this node and its descendants in pre-order.
    pub fn pre_order_iter(&self) -> PreOrderIter<'a> {
        PreOrderIter::starting_at(self.tree, self.index)
    }

    /// Returns the ancestors, nearest first (parent, grandparent, ...).
    pub fn ancestors(&self) -> Vec<NodeRef<'a>> {
        let mut ancestors = Vec::new();
        let mut current = self.parent();
        while let Some(node) = current {
            ancestors.push(node);
            current = node.parent();
        }
        ancestors
    }

    /// Returns this node followed by its [ancestors](Self::ancestors).
    pub fn ancestors_and_self(&self) -> Vec<NodeRef<'a>> {
        let mut nodes = vec![*self];
        nodes.extend(self.ancestors());
        nodes
    }

    // ------------------------------------------------------------------------
    // Property access
    // ------------------------------------------------------------------------
    /// Returns the property stored under exactly `name`.
    ///
    /// Stored properties take precedence; otherwise `children` (and
    /// `parent`) resolve to the live links.
    ///
    /// # Errors
    /// [TreeError::PropertyNotFound] if nothing matches.
    pub fn get(&self, name: &str) -> Result<Property<'a>, TreeError> {
        if let Some(value) = self.node().value(name) {
            return Ok(Property::Value(value));
        }

        match name {
            CHILDREN_KEY => Ok(Property::Children(self.children())),
            PARENT_KEY => Ok(Property::Parent(self.parent())),
            _ => Err(TreeError::PropertyNotFound {
                name: name.to_string(),
                id: self.to_string(),
            }),
        }
    }

    /// Resolves a getter-style name such as `getName`.
    ///
    /// Two stages:
    /// 1. Defined accessors: `getId`, `getParent`, `getChildren`, `getLevel`.
    /// 2. Strip the `get` prefix and look the rest up in the property bag,
    ///    exact spelling first, then case-insensitively.
    ///
    /// # Errors
    /// [TreeError::UndefinedMethod] if neither stage matches.
    pub fn call_getter(&self, method: &str) -> Result<Property<'a>, TreeError> {
        match method {
            "getId" => return Ok(Property::Value(self.id())),
            "getParent" => return Ok(Property::Parent(self.parent())),
            "getChildren" => return Ok(Property::Children(self.children())),
            "getLevel" => return Ok(Property::Level(self.level())),
            _ => {}
        }

        let has_prefix = method
            .get(..3)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("get"));
        let name = if has_prefix { &method[3..] } else { "" };

        if name.is_empty() {
            return Err(TreeError::UndefinedMethod(method.to_string()));
        }

        self.node()
            .value_ignore_case(name)
            .map(Property::Value)
            .ok_or_else(|| TreeError::UndefinedMethod(method.to_string()))
    }

    /// Direct, case-sensitive property access.
    ///
    /// `parent` and `children` always resolve to the live links; any other
    /// name must match a stored property exactly.
    ///
    /// # Errors
    /// [TreeError::UndefinedProperty] if nothing matches.
    pub fn property(&self, name: &str) -> Result<Property<'a>, TreeError> {
        match name {
            PARENT_KEY => Ok(Property::Parent(self.parent())),
            CHILDREN_KEY => Ok(Property::Children(self.children())),
            _ => self
                .node()
                .value(name)
                .map(Property::Value)
                .ok_or_else(|| TreeError::UndefinedProperty {
                    name: name.to_string(),
                    id: self.to_string(),
                }),
        }
    }

    /// Returns whether `name` is `parent`, `children` or a stored property.
    pub fn has_property(&self, name: &str) -> bool {
        name == PARENT_KEY || name == CHILDREN_KEY || self.node().has_value(name)
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("index", &self.index)
            .field("id", self.id())
            .finish()
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.node(), f)
    }
}

impl Serialize for NodeRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.node().serialize(serializer)
    }
}

// =#========================================================================#=
// PROPERTY
// =#========================================================================#=
/// Result of a name-based property lookup on a [NodeRef].
#[derive(Debug, Clone, PartialEq)]
pub enum Property<'a> {
    /// A stored property value
    Value(&'a Value),
    /// The live parent link (`None` for top-level nodes)
    Parent(Option<NodeRef<'a>>),
    /// The live list of children
    Children(Vec<NodeRef<'a>>),
    /// The node's level, from the `getLevel` accessor
    Level(usize),
}

impl<'a> Property<'a> {
    /// Returns the stored value, if this is one.
    pub fn as_value(&self) -> Option<&'a Value> {
        match self {
            Property::Value(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the parent link, if this is one.
    pub fn into_parent(self) -> Option<NodeRef<'a>> {
        match self {
            Property::Parent(parent) => parent,
            _ => None,
        }
    }

    /// Returns the children, if this is the children list.
    pub fn into_children(self) -> Option<Vec<NodeRef<'a>>> {
        match self {
            Property::Children(children) => Some(children),
            _ => None,
        }
    }
}

// =#========================================================================#=
// ITERATORS
// =#========================================================================#=
/// Iterator for pre-order traversal (parents before children).
///
/// Uses an explicit stack instead of recursion, so deep trees do not
/// exhaust the call stack.
pub struct PreOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<NodeIndex>,
}

impl<'a> PreOrderIter<'a> {
    /// Traversal yielding `start` and then its descendants.
    pub(crate) fn starting_at(tree: &'a Tree, start: NodeIndex) -> Self {
        PreOrderIter {
            tree,
            stack: vec![start],
        }
    }

    /// Traversal yielding only the descendants of `start`.
    pub(crate) fn below(tree: &'a Tree, start: NodeIndex) -> Self {
        let stack = tree[start].child_indices().iter().rev().copied().collect();
        PreOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;

        // Push children in reverse, so the first child is processed first
        self.stack
            .extend(self.tree[index].child_indices().iter().rev().copied());

        Some(NodeRef::new(self.tree, index))
    }
}
