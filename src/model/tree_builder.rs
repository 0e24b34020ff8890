//! Builder for configuring and constructing a [Tree].
//!
//! The builder collects [TreeOptions] and the two pluggable strategies
//! (serializer, anomaly handler), validates the options and runs the
//! build:
//!
//! ```
//! use flatree::model::{LogAndContinue, Tree};
//! use flatree::serializer::HierarchicalSerializer;
//! use serde_json::json;
//!
//! let tree = Tree::builder()
//!     .with_root_id("")
//!     .with_id_field("slug")
//!     .with_parent_field("category")
//!     .with_serializer(HierarchicalSerializer::new("items"))
//!     .with_anomaly_handler(LogAndContinue)
//!     .build_from_value(json!([
//!         {"slug": "vehicle", "category": ""},
//!         {"slug": "car", "category": "vehicle"},
//!     ]))
//!     .unwrap();
//!
//! assert_eq!(tree.node_by_id("car").unwrap().level(), 2);
//! ```

use crate::model::anomaly::{Anomaly, AnomalyHandler, FailFast};
use crate::model::options::TreeOptions;
use crate::model::tree::{Tree, records_from_value};
use crate::model::tree_error::TreeError;
use crate::model::Record;
use crate::serializer::TreeSerializer;
use serde_json::Value;

// =#========================================================================#=
// TREE BUILDER
// =#========================================================================#=
/// Builder for a [Tree], see [module documentation](self).
///
/// Defaults: [TreeOptions::default], the serializer selected by the
/// options, and [FailFast].
pub struct TreeBuilder {
    options: TreeOptions,
    serializer: Option<Box<dyn TreeSerializer>>,
    anomaly_handler: Box<dyn AnomalyHandler>,
}

impl TreeBuilder {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        TreeBuilder {
            options: TreeOptions::default(),
            serializer: None,
            anomaly_handler: Box::new(FailFast),
        }
    }

    /// Replaces all plain options at once, e.g. as loaded with
    /// [TreeOptions::from_json].
    pub fn with_options(mut self, options: TreeOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the parent ID marking records as top-level (default `0`).
    ///
    /// Must be a scalar or `null`, checked on build.
    pub fn with_root_id<V: Into<Value>>(mut self, root_id: V) -> Self {
        self.options.root_id = root_id.into();
        self
    }

    /// Sets the name of the record field holding the ID (default `"id"`).
    pub fn with_id_field<S: Into<String>>(mut self, id_field: S) -> Self {
        self.options.id_field = id_field.into();
        self
    }

    /// Sets the name of the record field holding the parent ID
    /// (default `"parent"`).
    pub fn with_parent_field<S: Into<String>>(mut self, parent_field: S) -> Self {
        self.options.parent_field = parent_field.into();
        self
    }

    /// Sets a serializer, taking precedence over the one selected in the
    /// options.
    pub fn with_serializer<S: TreeSerializer + 'static>(mut self, serializer: S) -> Self {
        self.serializer = Some(Box::new(serializer));
        self
    }

    /// Sets the policy for records that cannot be linked (default
    /// [FailFast]).
    pub fn with_anomaly_handler<H: AnomalyHandler + 'static>(mut self, handler: H) -> Self {
        self.anomaly_handler = Box::new(handler);
        self
    }

    /// Sets a closure as anomaly handler.
    ///
    /// Same as [with_anomaly_handler](Self::with_anomaly_handler), but lets
    /// the compiler infer the closure's argument type.
    pub fn with_anomaly_callback<F>(self, callback: F) -> Self
    where
        F: FnMut(&Anomaly<'_>) -> Result<(), TreeError> + 'static,
    {
        self.with_anomaly_handler(callback)
    }

    /// Builds the tree from `records`.
    ///
    /// # Errors
    /// - [TreeError::InvalidOption] if the options are invalid
    /// - [TreeError::InvalidDatatype] if a record lacks the ID field or
    ///   carries a non-scalar ID or parent ID
    /// - [TreeError::DuplicateId] if two records share an ID
    /// - any error the anomaly handler returns
    pub fn build<I>(self, records: I) -> Result<Tree, TreeError>
    where
        I: IntoIterator<Item = Record>,
    {
        self.options.validate()?;

        let serializer = self
            .serializer
            .unwrap_or_else(|| self.options.serializer.to_serializer());
        let mut tree = Tree::empty(self.options, serializer, self.anomaly_handler);
        tree.rebuild_with_data(records)?;
        Ok(tree)
    }

    /// Builds the tree from a JSON array of objects.
    ///
    /// # Errors
    /// [TreeError::InvalidDatatype] if `data` is no array of objects, or
    /// any error of [build](Self::build).
    pub fn build_from_value(self, data: Value) -> Result<Tree, TreeError> {
        let records = records_from_value(data)?;
        self.build(records)
    }

    /// Builds the tree from a JSON string holding an array of objects.
    ///
    /// # Errors
    /// [TreeError::InvalidDatatype] if `json` is not valid JSON, or any
    /// error of [build_from_value](Self::build_from_value).
    pub fn build_from_json_str(self, json: &str) -> Result<Tree, TreeError> {
        let data: Value = serde_json::from_str(json)
            .map_err(|e| TreeError::invalid_datatype(format!("Data is not valid JSON: {e}")))?;
        self.build_from_value(data)
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        TreeBuilder::new()
    }
}
