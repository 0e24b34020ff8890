//! Error types for building and querying trees.
//!
//! This module provides [TreeError], the single error type returned by all
//! fallible operations of this crate. Variants are kept distinct per failure
//! so callers can match on them, in particular the three ways a property
//! lookup can fail.

use thiserror::Error;

// =#========================================================================#=
// TREE ERROR
// =#========================================================================#=
/// Errors that can occur while configuring, building or querying a tree.
#[derive(Error, PartialEq, Debug, Clone)]
pub enum TreeError {
    /// A configuration option failed its type/shape contract.
    #[error("Option “{option}” {reason}")]
    InvalidOption { option: String, reason: String },

    /// The input data (or one of its records) has an unusable shape.
    #[error("Invalid data - {0}")]
    InvalidDatatype(String),

    /// Two records share the same ID (under loose ID equality).
    #[error("Duplicate node ID {id}")]
    DuplicateId { id: String },

    /// A record references a parent ID no record carries.
    #[error("Node with ID {id} points to non-existent parent with {}", describe_parent(.parent_id))]
    MissingParent { id: String, parent_id: String },

    /// A record references its own ID as parent ID.
    #[error("Node with ID {id} references its own ID as parent ID")]
    SelfReference { id: String },

    /// Parent links of two or more records form a loop.
    #[error("Node with ID {id} closes a parent cycle through parent ID {parent_id}")]
    ParentCycle { id: String, parent_id: String },

    /// Lookup of an ID not present in the tree.
    #[error("Invalid node primary key {0}")]
    UnknownId(String),

    /// Exact-name `get` found no such property.
    #[error("Undefined property: {name} (Node ID: {id})")]
    PropertyNotFound { name: String, id: String },

    /// Getter-style access matched neither an accessor nor a property.
    #[error("Invalid method {0}() called")]
    UndefinedMethod(String),

    /// Direct property access found no such property.
    #[error("Undefined property {name} on node {id}")]
    UndefinedProperty { name: String, id: String },
}

fn describe_parent(parent_id: &str) -> String {
    if parent_id.is_empty() {
        "empty parent ID".to_string()
    } else {
        format!("ID {parent_id}")
    }
}

impl TreeError {
    /// Convenience constructor for InvalidOption
    pub fn invalid_option(option: &str, reason: &str) -> Self {
        TreeError::InvalidOption {
            option: option.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Convenience constructor for InvalidDatatype
    pub fn invalid_datatype<S: Into<String>>(msg: S) -> Self {
        TreeError::InvalidDatatype(msg.into())
    }

    /// Returns `true` for errors raised by a build anomaly
    /// (missing parent, self-reference or parent cycle).
    pub fn is_anomaly(&self) -> bool {
        matches!(
            self,
            TreeError::MissingParent { .. }
                | TreeError::SelfReference { .. }
                | TreeError::ParentCycle { .. }
        )
    }
}
