//! Tree configuration.
//!
//! [TreeOptions] holds the plain-data part of a tree's configuration:
//! root ID, field names and the built-in serializer choice. It can be set up
//! in code or parsed from a JSON config object with
//! [TreeOptions::from_json]. Pluggable strategies (custom serializers,
//! anomaly handlers) are passed to the
//! [TreeBuilder](crate::model::TreeBuilder) directly.

use crate::model::node::{ID_KEY, PARENT_KEY};
use crate::model::node_id::is_scalar;
use crate::model::tree_error::TreeError;
use crate::serializer::{DEFAULT_CHILDREN_KEY, SerializerKind};
use serde_json::Value;

/// Config key for [TreeOptions::root_id]
const OPTION_ROOT_ID: &str = "root_id";
/// Config key for [TreeOptions::id_field]
const OPTION_ID_FIELD: &str = "id_field";
/// Config key for [TreeOptions::parent_field]
const OPTION_PARENT_FIELD: &str = "parent_field";
/// Config key for [TreeOptions::serializer]
const OPTION_SERIALIZER: &str = "serializer";
/// Config key for the children key of the hierarchical serializer
const OPTION_CHILDREN_KEY: &str = "children_key";

// =#========================================================================#=
// TREE OPTIONS
// =#========================================================================#=
/// Configuration of a [Tree](crate::model::Tree).
///
/// # Defaults
/// - `root_id`: `0`
/// - `id_field`: `"id"`
/// - `parent_field`: `"parent"`
/// - `serializer`: [SerializerKind::Flat]
#[derive(Debug, Clone, PartialEq)]
pub struct TreeOptions {
    /// Parent ID marking a record as top-level; any scalar or `null`
    pub root_id: Value,
    /// Name of the record field holding a record's ID
    pub id_field: String,
    /// Name of the record field holding the parent's ID
    pub parent_field: String,
    /// Built-in serializer used for structured output
    pub serializer: SerializerKind,
}

impl Default for TreeOptions {
    fn default() -> Self {
        TreeOptions {
            root_id: Value::from(0),
            id_field: ID_KEY.to_string(),
            parent_field: PARENT_KEY.to_string(),
            serializer: SerializerKind::Flat,
        }
    }
}

impl TreeOptions {
    /// Parses options from a JSON config object.
    ///
    /// Recognized keys: `root_id`, `id_field`, `parent_field`,
    /// `serializer` (`"flat"` or `"hierarchical"`) and `children_key`
    /// (for the hierarchical serializer). Absent keys keep their default.
    ///
    /// # Errors
    /// [TreeError::InvalidOption] naming the offending option if `config`
    /// is no object, contains an unknown key, or a value of the wrong shape.
    ///
    /// # Example
    /// ```
    /// use flatree::model::TreeOptions;
    /// use serde_json::json;
    ///
    /// let options = TreeOptions::from_json(&json!({"root_id": "", "id_field": "slug"})).unwrap();
    /// assert_eq!(options.root_id, json!(""));
    /// assert_eq!(options.id_field, "slug");
    ///
    /// let err = TreeOptions::from_json(&json!({"id_field": 123})).unwrap_err();
    /// assert_eq!(err.to_string(), "Option “id_field” must be a string");
    /// ```
    pub fn from_json(config: &Value) -> Result<Self, TreeError> {
        let Value::Object(entries) = config else {
            return Err(TreeError::invalid_option("options", "must be an object"));
        };

        let mut options = TreeOptions::default();
        let mut hierarchical = false;
        let mut children_key = DEFAULT_CHILDREN_KEY.to_string();

        for (name, value) in entries {
            match name.as_str() {
                OPTION_ROOT_ID => options.root_id = value.clone(),
                OPTION_ID_FIELD => options.id_field = string_option(OPTION_ID_FIELD, value)?,
                OPTION_PARENT_FIELD => {
                    options.parent_field = string_option(OPTION_PARENT_FIELD, value)?
                }
                OPTION_SERIALIZER => {
                    hierarchical = match value.as_str() {
                        Some("flat") => false,
                        Some("hierarchical") => true,
                        _ => {
                            return Err(TreeError::invalid_option(
                                OPTION_SERIALIZER,
                                "must be \"flat\" or \"hierarchical\"",
                            ));
                        }
                    }
                }
                OPTION_CHILDREN_KEY => children_key = string_option(OPTION_CHILDREN_KEY, value)?,
                unknown => {
                    return Err(TreeError::invalid_option(unknown, "is not a recognized option"));
                }
            }
        }

        if hierarchical {
            options.serializer = SerializerKind::Hierarchical { children_key };
        }

        options.validate()?;
        Ok(options)
    }

    /// Checks all options against their contract.
    ///
    /// # Errors
    /// [TreeError::InvalidOption] for a non-scalar root ID, or an empty
    /// field name or children key.
    pub fn validate(&self) -> Result<(), TreeError> {
        if !is_scalar(&self.root_id) {
            return Err(TreeError::invalid_option(OPTION_ROOT_ID, "must be scalar or null"));
        }
        if self.id_field.is_empty() {
            return Err(TreeError::invalid_option(OPTION_ID_FIELD, "must not be empty"));
        }
        if self.parent_field.is_empty() {
            return Err(TreeError::invalid_option(OPTION_PARENT_FIELD, "must not be empty"));
        }
        if let SerializerKind::Hierarchical { children_key } = &self.serializer {
            if children_key.is_empty() {
                return Err(TreeError::invalid_option(OPTION_CHILDREN_KEY, "must not be empty"));
            }
        }
        Ok(())
    }
}

fn string_option(option: &str, value: &Value) -> Result<String, TreeError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| TreeError::invalid_option(option, "must be a string"))
}
