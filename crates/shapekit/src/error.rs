//! Error types for shapekit operations.

use thiserror::Error;

/// Errors that can occur while parsing, serializing, or building enum mappings.
///
/// Enum lookups, [`crate::object::is_plain`] and nullish pruning never fail; only
/// the JSON codec and enum construction from untrusted JSON produce errors.
#[derive(Error, Debug)]
pub enum ShapeError {
    /// The input text was not valid JSON. No partial result is produced.
    #[error("JSON syntax error: {0}")]
    Syntax(#[source] serde_json::Error),

    /// A value could not be represented as JSON (e.g. a map with non-string keys).
    #[error("JSON serialization error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A JSON document could not be read as an enum-like mapping.
    /// `key` is empty when the document root itself is not an object.
    #[error("invalid enum member {key:?}: expected a string or number, found {found}")]
    InvalidEnum { key: String, found: &'static str },
}

/// Convenience alias used throughout shapekit.
pub type Result<T> = std::result::Result<T, ShapeError>;
