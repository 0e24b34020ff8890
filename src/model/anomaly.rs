//! Structural anomalies detected while building a tree.
//!
//! During [Tree](crate::model::Tree) construction, every record whose parent
//! link cannot be established is reported to an [AnomalyHandler] as an
//! [Anomaly]. The handler decides the policy:
//! - return `Err(..)` to abort the build ([FailFast], the default)
//! - return `Ok(())` to leave the node unattached and continue
//!   ([LogAndContinue], or any closure)
//!
//! Unattached nodes stay reachable via
//! [node_by_id](crate::model::Tree::node_by_id) but are excluded from all
//! traversals starting at the top level.

use crate::model::node::Node;
use crate::model::node_id::display_id;
use crate::model::tree_error::TreeError;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

// =#========================================================================#=
// ANOMALY
// =#========================================================================#=
/// Kind of structural problem found in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AnomalyKind {
    /// Parent ID matches no record and is not the root ID
    MissingParent,
    /// Record references its own ID as parent ID
    SelfReference,
    /// Parent links of several records form a loop
    ParentCycle,
}

/// An anomaly as seen by an [AnomalyHandler], borrowing the offending node.
#[derive(Debug, Clone, Copy)]
pub struct Anomaly<'a> {
    kind: AnomalyKind,
    node: &'a Node,
    parent_id: &'a Value,
}

impl<'a> Anomaly<'a> {
    pub(crate) fn new(kind: AnomalyKind, node: &'a Node, parent_id: &'a Value) -> Self {
        Anomaly {
            kind,
            node,
            parent_id,
        }
    }

    /// Returns the kind of this anomaly.
    pub fn kind(&self) -> AnomalyKind {
        self.kind
    }

    /// Returns the offending node.
    pub fn node(&self) -> &'a Node {
        self.node
    }

    /// Returns the parent ID the node referenced.
    pub fn parent_id(&self) -> &'a Value {
        self.parent_id
    }

    /// Returns the error describing this anomaly, as raised by [FailFast].
    pub fn to_error(&self) -> TreeError {
        let id = self.node.to_string();
        match self.kind {
            AnomalyKind::MissingParent => TreeError::MissingParent {
                id,
                parent_id: display_id(self.parent_id),
            },
            AnomalyKind::SelfReference => TreeError::SelfReference { id },
            AnomalyKind::ParentCycle => TreeError::ParentCycle {
                id,
                parent_id: display_id(self.parent_id),
            },
        }
    }

    /// Returns an owned summary of this anomaly.
    pub fn to_report(&self) -> AnomalyReport {
        AnomalyReport {
            kind: self.kind,
            node_id: self.node.id().clone(),
            parent_id: self.parent_id.clone(),
            message: self.to_error().to_string(),
        }
    }
}

impl fmt::Display for Anomaly<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_error())
    }
}

/// Owned record of an anomaly a handler chose to absorb.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    /// Kind of the anomaly
    pub kind: AnomalyKind,
    /// ID of the offending node
    pub node_id: Value,
    /// Parent ID the node referenced
    pub parent_id: Value,
    /// Human-readable description
    pub message: String,
}

// =#========================================================================#=
// ANOMALY HANDLER (trait)
// =#========================================================================T=
/// Policy deciding whether a build continues past an [Anomaly].
///
/// Closures of type `FnMut(&Anomaly) -> Result<(), TreeError>` implement
/// this trait, so a one-off policy needs no extra type
/// (see [TreeBuilder::with_anomaly_callback](crate::model::TreeBuilder::with_anomaly_callback)):
///
/// ```
/// use flatree::model::Tree;
/// use serde_json::json;
///
/// let mut skipped = 0;
/// let tree = Tree::builder()
///     .with_anomaly_callback(move |anomaly| {
///         skipped += 1;
///         println!("skipping: {anomaly} ({skipped} so far)");
///         Ok(())
///     })
///     .build_from_value(json!([{"id": 1, "parent": 0}, {"id": 2, "parent": 99}]))
///     .unwrap();
///
/// // The orphan stays addressable by ID, but is not part of the hierarchy
/// assert_eq!(tree.len(), 2);
/// assert_eq!(tree.nodes().len(), 1);
/// assert_eq!(tree.anomalies().len(), 1);
/// ```
pub trait AnomalyHandler {
    /// Handles one anomaly.
    ///
    /// # Returns
    /// * `Ok(())` - leave the node unattached and continue building
    /// * `Err(..)` - abort the build with this error
    fn handle(&mut self, anomaly: &Anomaly<'_>) -> Result<(), TreeError>;
}

impl<F> AnomalyHandler for F
where
    F: FnMut(&Anomaly<'_>) -> Result<(), TreeError>,
{
    fn handle(&mut self, anomaly: &Anomaly<'_>) -> Result<(), TreeError> {
        self(anomaly)
    }
}

/// Default policy: every anomaly aborts the build.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailFast;

impl AnomalyHandler for FailFast {
    fn handle(&mut self, anomaly: &Anomaly<'_>) -> Result<(), TreeError> {
        Err(anomaly.to_error())
    }
}

/// Lenient policy: logs each anomaly as a warning and continues.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAndContinue;

impl AnomalyHandler for LogAndContinue {
    fn handle(&mut self, anomaly: &Anomaly<'_>) -> Result<(), TreeError> {
        log::warn!("{anomaly}; leaving node unattached");
        Ok(())
    }
}
