//! Flatree builds trees from flat records.
//!
//! Hierarchies like categories, org charts or menus are often stored as
//! flat rows, each carrying its own ID and the ID of its parent. This crate
//! turns such a sequence of records into an in-memory tree in linear time,
//! without recursive queries. Core functionality provided:
//! - Construction: one pass creating nodes, one pass linking them. Records
//!   whose parent ID equals the configured root ID are top-level.
//! - Loose IDs: `1`, `1.0` and `"1"` denote the same node.
//! - Navigation: parent, children, siblings, ancestors, descendants, level.
//! - Lookup: by ID, and by a path of property values from the top level.
//! - Anomalies: missing parents, self references and parent cycles are
//!   reported to a pluggable handler, fatal by default.
//! - Output: flat or hierarchical JSON via pluggable serializers, and an
//!   indented outline via `Display`.
//! - Both nodes and tree use the arena pattern, so no direct node
//!   references are stored, only node indices. See [crate::model].
//!
//! # Usage patterns
//! 1. The quick functions below build a tree with default settings
//!    (root ID `0`, fields `id` and `parent`).
//! 2. Configure a build using [Tree::builder](crate::model::Tree::builder)
//!    for full control over root ID, field names, serializer and anomaly
//!    policy.
//!
//! ## Example Default Configuration
//! ```
//! use flatree::tree_from_json_str;
//!
//! let tree = tree_from_json_str(r#"[
//!     {"id": 1, "parent": 0, "title": "A"},
//!     {"id": 2, "parent": 1, "title": "B"}
//! ]"#).unwrap();
//!
//! assert_eq!(tree.to_string(), "- 1\n  - 2");
//! assert_eq!(
//!     tree.to_json_string(),
//!     r#"[{"title":"A","id":1,"parent":0},{"title":"B","id":2,"parent":1}]"#
//! );
//! ```
//!
//! ## Example Builder Configuration
//! ```
//! use flatree::model::{LogAndContinue, Tree, TreeOptions};
//! use serde_json::json;
//!
//! let options = TreeOptions::from_json(&json!({
//!     "root_id": null,
//!     "serializer": "hierarchical",
//! }))?;
//!
//! let tree = Tree::builder()
//!     .with_options(options)
//!     .with_anomaly_handler(LogAndContinue)
//!     .build_from_value(json!([
//!         {"id": 1, "parent": null},
//!         {"id": 2, "parent": 1},
//!         {"id": 3, "parent": 42},
//!     ]))?;
//!
//! assert_eq!(tree.anomalies().len(), 1);
//! assert_eq!(
//!     tree.to_value(),
//!     json!([{"id": 1, "parent": null, "children": [{"id": 2, "parent": 1}]}])
//! );
//! # Ok::<(), flatree::model::TreeError>(())
//! ```

pub mod model;
pub mod serializer;

use crate::model::{Record, Tree, TreeError};
use serde_json::Value;

// ============================================================================
// Quick API
// ============================================================================
/// Builds a [Tree] from `records` using default settings.
///
/// See [Tree::new] for details.
pub fn build_tree<I>(records: I) -> Result<Tree, TreeError>
where
    I: IntoIterator<Item = Record>,
{
    Tree::new(records)
}

/// Builds a [Tree] from a JSON array of objects using default settings.
///
/// See [Tree::from_value] for details.
pub fn tree_from_value(data: Value) -> Result<Tree, TreeError> {
    Tree::from_value(data)
}

/// Builds a [Tree] from a JSON string holding an array of objects, using
/// default settings.
///
/// See [Tree::from_json_str] for details.
pub fn tree_from_json_str(json: &str) -> Result<Tree, TreeError> {
    Tree::from_json_str(json)
}
