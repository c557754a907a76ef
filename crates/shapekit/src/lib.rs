//! # shapekit
//!
//! Small, stateless helpers for three data shapes that show up in application code:
//! closed sets of named constants, JSON text from untrusted sources, and
//! JSON-shaped object trees.
//!
//! ## Quick start
//!
//! ```rust
//! use serde_json::json;
//! use shapekit::{enums, json, object};
//!
//! // Enum-like mappings: numeric reverse entries never leak into the keys.
//! let status = enums::EnumObject::numeric([("Active", 1), ("Disabled", 2)]);
//! assert_eq!(enums::get_keys(&status), vec!["Active", "Disabled"]);
//! assert_eq!(enums::get_key(&status, 2), Some("Disabled"));
//!
//! // JSON: pollution keys are dropped while parsing.
//! let parsed = json::parse(r#"{"a":1,"__proto__":{"admin":true}}"#).unwrap();
//! assert_eq!(parsed, json!({"a": 1}));
//!
//! // Objects: nulls are pruned in place.
//! let mut data = json!({"a": null, "b": [1, null, 2]});
//! object::remove_nullish_values(&mut data);
//! assert_eq!(data, json!({"b": [1, 2]}));
//! ```
//!
//! ## Modules
//!
//! - [`enums`] — introspection and membership checks over enum-like mappings
//! - [`json`] — JSON parse/stringify with forbidden-key stripping on input
//! - [`object`] — nullish-value pruning and the plain-object predicate
//! - [`error`] — Error types for parse/serialize/enum-construction failures

pub mod enums;
pub mod error;
pub mod json;
pub mod object;

pub use enums::{EnumObject, EnumValue};
pub use error::ShapeError;
pub use json::{Replacer, Space};
pub use object::{is_plain, remove_nullish_values, without_nullish_values, Kind, Shape};
