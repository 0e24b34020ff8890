//! Tree module for hierarchies built from flat records.
//!
//! This module provides the central [Tree] structure:
//! - Construction from a flat sequence of records carrying an ID and a
//!   parent ID, in one pass creating nodes and one pass linking them.
//! - Lookup by ID and by a path of property values.
//! - Depth-first traversal and pluggable serialization.
//!
//! Nodes are stored in an arena ([Vec] of [Node]) and referenced by
//! [NodeIndex]. Index 0 holds a synthetic root carrying the configured
//! root ID; the top-level nodes are its children.

use crate::model::anomaly::{Anomaly, AnomalyHandler, AnomalyKind, AnomalyReport};
use crate::model::node::{Node, NodeIndex, NodeRef, PreOrderIter, ROOT_INDEX};
use crate::model::node_id::{display_id, loose_key, loosely_equal};
use crate::model::options::TreeOptions;
use crate::model::tree_builder::TreeBuilder;
use crate::model::tree_error::TreeError;
use crate::model::Record;
use crate::serializer::outline;
use crate::serializer::{FlatSerializer, TreeSerializer};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

// =#========================================================================#=
// TREE
// =#========================================================================#=
/// A hierarchy of [Node]s built from flat records, represented using the
/// arena pattern.
///
/// # Structure
/// - All nodes are stored in the arena, index 0 is a synthetic root that is
///   never returned by public traversal
/// - Every record becomes exactly one node, addressable by its ID under
///   loose ID equality (`1` and `"1"` are the same ID)
/// - Records whose parent ID equals the root ID (strictly, type and value)
///   are top-level; all others are linked below the node with their parent
///   ID
/// - Children keep the order in which their records were supplied
///
/// # Construction
/// Use [Tree::new] with default options, [Tree::from_value] /
/// [Tree::from_json_str] for JSON input, or [Tree::builder] for custom
/// options. Records that cannot be linked are reported to the configured
/// [AnomalyHandler]; by default every such anomaly aborts the build.
///
/// # Example
/// ```
/// use flatree::model::Tree;
/// use serde_json::json;
///
/// let tree = Tree::from_value(json!([
///     {"id": 1, "parent": 0, "name": "Europe"},
///     {"id": 2, "parent": 1, "name": "Germany"},
///     {"id": 3, "parent": 2, "name": "Hamburg"},
///     {"id": 4, "parent": 0, "name": "Asia"},
/// ])).unwrap();
///
/// let ids: Vec<String> = tree.nodes().iter().map(|n| n.to_string()).collect();
/// assert_eq!(ids, ["1", "2", "3", "4"]);
///
/// let hamburg = tree.node_by_value_path("name", &["Europe", "Germany", "Hamburg"]).unwrap();
/// assert_eq!(hamburg.level(), 3);
/// assert!(tree.is_valid());
/// ```
pub struct Tree {
    /// Configuration, preserved across rebuilds
    options: TreeOptions,

    /// Loose key of the root ID
    root_key: String,

    /// Nodes of this tree (arena pattern), synthetic root at index 0
    nodes: Vec<Node>,

    /// Loose ID key -> arena index, for all record nodes
    ids: HashMap<String, NodeIndex>,

    /// Anomalies absorbed by the handler during the last build
    anomalies: Vec<AnomalyReport>,

    /// Strategy used by [Tree::to_value]
    serializer: Box<dyn TreeSerializer>,

    /// Policy for records that cannot be linked
    anomaly_handler: Box<dyn AnomalyHandler>,
}

// ============================================================================
// New, Getters / Accessors, etc. (pub)
// ============================================================================
impl Tree {
    /// Returns a builder to configure and build a tree.
    pub fn builder() -> TreeBuilder {
        TreeBuilder::new()
    }

    /// Builds a tree from `records` using default options.
    ///
    /// # Errors
    /// See [TreeBuilder::build].
    pub fn new<I>(records: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = Record>,
    {
        TreeBuilder::new().build(records)
    }

    /// Builds a tree from a JSON array of objects using default options.
    ///
    /// # Errors
    /// See [TreeBuilder::build_from_value].
    pub fn from_value(data: Value) -> Result<Self, TreeError> {
        TreeBuilder::new().build_from_value(data)
    }

    /// Builds a tree from a JSON string holding an array of objects, using
    /// default options.
    ///
    /// # Errors
    /// See [TreeBuilder::build_from_json_str].
    pub fn from_json_str(json: &str) -> Result<Self, TreeError> {
        TreeBuilder::new().build_from_json_str(json)
    }

    /// Creates an empty tree holding only the synthetic root.
    ///
    /// `options` must be validated already.
    pub(crate) fn empty(
        options: TreeOptions,
        serializer: Box<dyn TreeSerializer>,
        anomaly_handler: Box<dyn AnomalyHandler>,
    ) -> Self {
        let root_key = loose_key(&options.root_id).unwrap_or_default();
        let root = Node::new_root(root_key.clone(), options.root_id.clone());
        Tree {
            options,
            root_key,
            nodes: vec![root],
            ids: HashMap::new(),
            anomalies: Vec::new(),
            serializer,
            anomaly_handler,
        }
    }

    /// Discards all nodes and builds the tree anew from `records`.
    ///
    /// Configuration, serializer and anomaly handler are kept. Handles
    /// obtained before cannot outlive this call.
    ///
    /// # Errors
    /// Same as the initial build. After an error the tree is in an
    /// unspecified, partially linked state and should be rebuilt before
    /// being queried again.
    pub fn rebuild_with_data<I>(&mut self, records: I) -> Result<(), TreeError>
    where
        I: IntoIterator<Item = Record>,
    {
        self.build(records)
    }

    /// Like [Tree::rebuild_with_data], for a JSON array of objects.
    ///
    /// # Errors
    /// [TreeError::InvalidDatatype] if `data` is no array of objects, or
    /// any build error.
    pub fn rebuild_with_value(&mut self, data: Value) -> Result<(), TreeError> {
        let records = records_from_value(data)?;
        self.build(records)
    }

    /// Returns all nodes in depth-first pre-order.
    ///
    /// Top-level nodes come in input order, each followed by its subtree.
    /// Nodes left unattached by an absorbed anomaly are not included.
    pub fn nodes(&self) -> Vec<NodeRef<'_>> {
        self.iter().collect()
    }

    /// Returns an iterator over all nodes in depth-first pre-order,
    /// same order as [Tree::nodes].
    pub fn iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::below(self, ROOT_INDEX)
    }

    /// Returns the top-level nodes in input order.
    pub fn root_nodes(&self) -> Vec<NodeRef<'_>> {
        NodeRef::new(self, ROOT_INDEX).children()
    }

    /// Returns the node with the given ID, compared loosely
    /// (`node_by_id(1)` and `node_by_id("1")` find the same node).
    ///
    /// # Errors
    /// [TreeError::UnknownId] if no node has this ID.
    pub fn node_by_id<V: Into<Value>>(&self, id: V) -> Result<NodeRef<'_>, TreeError> {
        let id = id.into();
        loose_key(&id)
            .and_then(|key| self.ids.get(&key))
            .map(|&index| NodeRef::new(self, index))
            .ok_or_else(|| TreeError::UnknownId(display_id(&id)))
    }

    /// Returns `true` if a node with the given ID (compared loosely)
    /// exists, attached or not.
    pub fn contains_id<V: Into<Value>>(&self, id: V) -> bool {
        loose_key(&id.into()).is_some_and(|key| self.ids.contains_key(&key))
    }

    /// Descends from the top level, matching one path element per level
    /// against the stored property `property`.
    ///
    /// At each level the first node (in order) whose property strictly
    /// equals the path element is taken, and the search continues among its
    /// children. Nodes without the property never match.
    ///
    /// # Returns
    /// The node matched by the last path element, or `None` if some
    /// element matches nothing or `path` is empty.
    pub fn node_by_value_path<V>(&self, property: &str, path: &[V]) -> Option<NodeRef<'_>>
    where
        V: Clone + Into<Value>,
    {
        let mut candidates = self.root_nodes();
        let mut found = None;

        for element in path {
            let element: Value = element.clone().into();
            let node = candidates
                .into_iter()
                .find(|node| node.node().value(property) == Some(&element))?;
            candidates = node.children();
            found = Some(node);
        }

        found
    }

    /// Returns the handle of the node at `index`, or `None` if out of
    /// bounds or the synthetic root.
    pub fn node(&self, index: NodeIndex) -> Option<NodeRef<'_>> {
        (index != ROOT_INDEX && index < self.nodes.len()).then(|| NodeRef::new(self, index))
    }

    /// Returns the number of nodes, including unattached ones.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if the tree holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the configured root ID.
    pub fn root_id(&self) -> &Value {
        &self.options.root_id
    }

    /// Returns the configuration of this tree.
    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    /// Returns the anomalies absorbed by the anomaly handler during the
    /// last build, in the order they were detected.
    pub fn anomalies(&self) -> &[AnomalyReport] {
        &self.anomalies
    }

    /// Checks whether this tree is structurally valid.
    ///
    /// # Validity Criteria
    /// - Index 0 holds the synthetic root, which has no parent
    /// - Each node's index matches its arena position
    /// - The ID map covers exactly the record nodes, under their keys
    /// - Children point back to their parent, and each parent lists each
    ///   of its children exactly once
    /// - Following parent links from any node terminates
    ///
    /// # Returns
    /// `true` if tree is valid, `false` otherwise
    pub fn is_valid(&self) -> bool {
        // Check synthetic root
        match self.nodes.first() {
            Some(root) if root.is_root() && root.parent_index().is_none() => {}
            _ => return false,
        }

        // Check ID map
        if self.ids.len() + 1 != self.nodes.len() {
            return false;
        }
        for (key, &index) in &self.ids {
            if index == ROOT_INDEX || index >= self.nodes.len() || self.nodes[index].key() != key {
                return false;
            }
        }

        for (index, node) in self.nodes.iter().enumerate() {
            // Check node index matches its arena position
            if node.index() != index {
                return false;
            }

            // Check children references
            for &child in node.child_indices() {
                if child >= self.nodes.len() || self.nodes[child].parent_index() != Some(index) {
                    return false;
                }
            }

            // Check parent references
            if let Some(parent) = node.parent_index() {
                if parent >= self.nodes.len() {
                    return false;
                }
                let listed = self.nodes[parent]
                    .child_indices()
                    .iter()
                    .filter(|&&c| c == index)
                    .count();
                if listed != 1 {
                    return false;
                }
            }

            // Check parent chain terminates
            let mut steps = 0;
            let mut current = node.parent_index();
            while let Some(parent) = current {
                steps += 1;
                if steps > self.nodes.len() {
                    return false;
                }
                current = self.nodes[parent].parent_index();
            }
        }

        true
    }
}

// ============================================================================
// Serialization (pub)
// ============================================================================
impl Tree {
    /// Returns the representation produced by the current serializer.
    pub fn to_value(&self) -> Value {
        self.serializer.serialize(self)
    }

    /// Returns the representation produced by the current serializer,
    /// encoded as compact JSON.
    pub fn to_json_string(&self) -> String {
        self.to_value().to_string()
    }

    /// Replaces the serializer used by [Tree::to_value].
    pub fn set_serializer<S: TreeSerializer + 'static>(&mut self, serializer: S) {
        self.serializer = Box::new(serializer);
    }

    /// Resets the serializer to the [FlatSerializer].
    pub fn reset_serializer(&mut self) {
        self.serializer = Box::new(FlatSerializer);
    }
}

// ============================================================================
// Construction (private)
// ============================================================================
impl Tree {
    /// Runs the full construction: create nodes, link them, break cycles.
    fn build<I>(&mut self, records: I) -> Result<(), TreeError>
    where
        I: IntoIterator<Item = Record>,
    {
        let records = records.into_iter();
        let (capacity, _) = records.size_hint();

        self.nodes = Vec::with_capacity(capacity + 1);
        self.nodes
            .push(Node::new_root(self.root_key.clone(), self.options.root_id.clone()));
        self.ids = HashMap::with_capacity(capacity);
        self.anomalies.clear();

        // Parent key -> (parent ID as supplied, child indices in input order)
        let mut buckets: IndexMap<String, (Value, Vec<NodeIndex>)> = IndexMap::new();

        for (position, record) in records.enumerate() {
            let (id, parent_id) = self.extract_ids(position, &record)?;
            let key = scalar_key(&id, "ID", position)?;
            let parent_key = scalar_key(&parent_id, "Parent ID", position)?;

            if self.ids.contains_key(&key) {
                return Err(TreeError::DuplicateId { id: display_id(&id) });
            }

            let index = self.nodes.len();
            let is_self_reference = loosely_equal(&id, &parent_id);
            let is_top_level = parent_id == self.options.root_id;
            let node = Node::with_index(index, key.clone(), id, parent_id.clone(), record);
            self.nodes.push(node);
            self.ids.insert(key, index);

            // Checked before the root so a top-level record cannot be its own parent
            if is_self_reference {
                self.report(AnomalyKind::SelfReference, index, &parent_id)?;
            } else if is_top_level {
                self.attach(ROOT_INDEX, index);
            } else {
                buckets
                    .entry(parent_key)
                    .or_insert_with(|| (parent_id, Vec::new()))
                    .1
                    .push(index);
            }
        }

        for (parent_key, (parent_id, children)) in &buckets {
            match self.ids.get(parent_key).copied() {
                Some(parent) => {
                    for &child in children {
                        self.attach(parent, child);
                    }
                }
                None => {
                    for &child in children {
                        self.report(AnomalyKind::MissingParent, child, parent_id)?;
                    }
                }
            }
        }

        self.break_parent_cycles()?;

        log::debug!(
            "Built tree with {} nodes ({} top-level, {} anomalies)",
            self.len(),
            self.nodes[ROOT_INDEX].child_indices().len(),
            self.anomalies.len()
        );
        Ok(())
    }

    /// Reads ID and parent ID of a record; a missing parent field means
    /// `null`.
    fn extract_ids(&self, position: usize, record: &Record) -> Result<(Value, Value), TreeError> {
        let id = record.get(&self.options.id_field).cloned().ok_or_else(|| {
            TreeError::invalid_datatype(format!(
                "Record {position} has no field \"{}\"",
                self.options.id_field
            ))
        })?;
        let parent_id = record
            .get(&self.options.parent_field)
            .cloned()
            .unwrap_or(Value::Null);
        Ok((id, parent_id))
    }

    /// Links `child` as last child of `parent`.
    fn attach(&mut self, parent: NodeIndex, child: NodeIndex) {
        let parent_id = self.nodes[parent].id().clone();
        self.nodes[parent].push_child(child);
        self.nodes[child].set_parent(parent, parent_id);
        log::trace!("Linked node {} below {}", self.nodes[child], self.nodes[parent]);
    }

    /// Hands an anomaly to the handler and records it if absorbed.
    fn report(
        &mut self,
        kind: AnomalyKind,
        node: NodeIndex,
        parent_id: &Value,
    ) -> Result<(), TreeError> {
        let anomaly = Anomaly::new(kind, &self.nodes[node], parent_id);
        self.anomaly_handler.handle(&anomaly)?;
        self.anomalies.push(anomaly.to_report());
        Ok(())
    }

    /// Finds loops of parent links not reachable from the top level and
    /// detaches the first node of each loop reached.
    ///
    /// Every node is visited once: nodes reachable from the synthetic root
    /// are done upfront, all others are resolved by walking up their parent
    /// links until reaching a done node, an unattached node or a node on
    /// the current walk (a loop).
    fn break_parent_cycles(&mut self) -> Result<(), TreeError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnPath,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        for node in PreOrderIter::starting_at(self, ROOT_INDEX) {
            marks[node.index()] = Mark::Done;
        }

        let mut path = Vec::new();
        for start in 1..self.nodes.len() {
            let mut current = Some(start);
            while let Some(index) = current {
                match marks[index] {
                    Mark::Unvisited => {
                        marks[index] = Mark::OnPath;
                        path.push(index);
                        current = self.nodes[index].parent_index();
                    }
                    Mark::OnPath => {
                        self.detach_from_cycle(index)?;
                        break;
                    }
                    Mark::Done => break,
                }
            }
            for index in path.drain(..) {
                marks[index] = Mark::Done;
            }
        }

        Ok(())
    }

    fn detach_from_cycle(&mut self, index: NodeIndex) -> Result<(), TreeError> {
        let parent_id = self.nodes[index].parent_id().clone();
        self.report(AnomalyKind::ParentCycle, index, &parent_id)?;

        if let Some(parent) = self.nodes[index].parent_index() {
            self.nodes[parent].remove_child(index);
        }
        self.nodes[index].clear_parent();
        Ok(())
    }
}

/// Converts a JSON array of objects into records.
///
/// # Errors
/// [TreeError::InvalidDatatype] if `data` is no array, or one of its
/// elements is no object.
pub fn records_from_value(data: Value) -> Result<Vec<Record>, TreeError> {
    let Value::Array(items) = data else {
        return Err(TreeError::invalid_datatype(format!(
            "Data must be an iterable of records, got {}",
            type_name(&data)
        )));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(position, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(TreeError::invalid_datatype(format!(
                "Record {position} must be an object, got {}",
                type_name(&other)
            ))),
        })
        .collect()
}

fn scalar_key(value: &Value, what: &str, position: usize) -> Result<String, TreeError> {
    loose_key(value).ok_or_else(|| {
        TreeError::invalid_datatype(format!(
            "{what} of record {position} must be scalar, got {}",
            type_name(value)
        ))
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl std::ops::Index<NodeIndex> for Tree {
    type Output = Node;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index]
    }
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Renders the indented outline, see [outline].
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        outline::write_outline(f, self)
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("options", &self.options)
            .field("len", &self.len())
            .field("top_level", &self.nodes[ROOT_INDEX].child_indices().len())
            .field("anomalies", &self.anomalies)
            .finish()
    }
}
