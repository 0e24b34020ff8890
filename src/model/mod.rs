//! Data model of flat-record trees.
//!
//! - [Tree]: arena of nodes built from flat records, with lookup by ID and
//!   by value path, traversal and serialization
//! - [TreeBuilder] / [TreeOptions]: configuration (root ID, field names,
//!   serializer, anomaly policy)
//! - [Node] / [NodeRef]: property bag of one record, and a handle to
//!   navigate from it
//! - [Anomaly] / [AnomalyHandler]: records whose parent link cannot be
//!   established, and the policy deciding what happens to them
//! - [TreeError]: all errors of this crate
//!
//! IDs are compared loosely, see [node_id].

pub mod anomaly;
pub mod node;
pub mod node_id;
pub mod options;
pub mod tree;
pub mod tree_builder;
pub mod tree_error;

pub use anomaly::{Anomaly, AnomalyHandler, AnomalyKind, AnomalyReport, FailFast, LogAndContinue};
pub use node::{Node, NodeIndex, NodeRef, PreOrderIter, Property};
pub use options::TreeOptions;
pub use tree::Tree;
pub use tree_builder::TreeBuilder;
pub use tree_error::TreeError;

/// A flat record, and the property bag of a node: field name -> value,
/// in insertion order.
pub type Record = serde_json::Map<String, serde_json::Value>;
