//! JSON parse/stringify hardened against prototype and constructor pollution.
//!
//! Parsing goes through a custom [`serde::de::Visitor`] that builds a
//! `serde_json::Value` while skipping every object member named `__proto__` or
//! `constructor`. The member's value is consumed as [`IgnoredAny`], so it is never
//! materialized and never reaches the reviver or the caller.
//!
//! # Key design decisions
//!
//! - **Drop before attach**: the filter runs inside `visit_map`, before the child is
//!   inserted into its parent map.
//! - **Bottom-up revival**: a child is fully built (and revived) before its parent's
//!   reviver call sees it, ending with the root under the key `""`.
//! - **Output is untouched**: `stringify*` only adds replacer and indentation
//!   handling on top of `serde_json`.

use std::fmt;
use std::io;

use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Number, Value};

use crate::error::{Result, ShapeError};

/// Object keys stripped from every parsed document.
pub const FORBIDDEN_KEYS: [&str; 2] = ["__proto__", "constructor"];

/// Maximum indentation width, in spaces or UTF-16 code units.
const MAX_INDENT: usize = 10;

/// Whether `key` is one of the [`FORBIDDEN_KEYS`].
pub fn is_forbidden_key(key: &str) -> bool {
    FORBIDDEN_KEYS.contains(&key)
}

type Reviver<'r> = dyn FnMut(&str, Value) -> Option<Value> + 'r;

/// Parse JSON text, dropping forbidden keys at every depth.
///
/// # Errors
///
/// Returns [`ShapeError::Syntax`] if `text` is not valid JSON. Numbers outside
/// the `f64` range, such as `1e400`, are rejected the same way: a [`Value`]
/// cannot hold an infinity.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shapekit::json;
///
/// let value = json::parse(r#"{"a":1,"constructor":{"x":1}}"#).unwrap();
/// assert_eq!(value, json!({"a": 1}));
/// ```
pub fn parse(text: &str) -> Result<Value> {
    parse_with_reviver(text, |_, value| Some(value))
}

/// Parse JSON text, dropping forbidden keys, then passing every other member
/// through `reviver`.
///
/// The reviver is called bottom-up with the member name (or the decimal index of
/// an array element) and the already-revived value; the root is visited last with
/// the key `""`. Returning `None` removes an object member, and turns an array
/// element or the root into `null`.
///
/// # Errors
///
/// Returns [`ShapeError::Syntax`] if `text` is not valid JSON. Numbers outside
/// the `f64` range, such as `1e400`, are rejected the same way: a [`Value`]
/// cannot hold an infinity.
///
/// # Examples
///
/// ```
/// use serde_json::{json, Value};
/// use shapekit::json;
///
/// let doubled = json::parse_with_reviver(r#"{"a":1,"b":[2,3]}"#, |_, v| match v {
///     Value::Number(n) => Some(json!(n.as_i64().unwrap() * 2)),
///     other => Some(other),
/// })
/// .unwrap();
/// assert_eq!(doubled, json!({"a": 2, "b": [4, 6]}));
/// ```
pub fn parse_with_reviver<F>(text: &str, mut reviver: F) -> Result<Value>
where
    F: FnMut(&str, Value) -> Option<Value>,
{
    let mut de = serde_json::Deserializer::from_str(text);
    let value = SanitizedValue {
        reviver: &mut reviver,
        depth: 0,
    }
    .deserialize(&mut de)
    .map_err(ShapeError::Syntax)?;
    de.end().map_err(ShapeError::Syntax)?;

    Ok(reviver("", value).unwrap_or(Value::Null))
}

/// Deserialization seed producing a `Value` with forbidden keys removed and the
/// reviver applied to every member below it.
struct SanitizedValue<'a, 'r> {
    reviver: &'a mut Reviver<'r>,
    depth: usize,
}

impl<'de> DeserializeSeed<'de> for SanitizedValue<'_, '_> {
    type Value = Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for SanitizedValue<'_, '_> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any valid JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Number::from_f64(v).map_or(Value::Null, Value::Number))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
        let reviver = self.reviver;
        let depth = self.depth + 1;
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));

        while let Some(item) = seq.next_element_seed(SanitizedValue {
            reviver: &mut *reviver,
            depth,
        })? {
            let index = items.len().to_string();
            items.push(reviver(&index, item).unwrap_or(Value::Null));
        }

        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Value, A::Error> {
        let reviver = self.reviver;
        let depth = self.depth + 1;
        let mut map = Map::new();

        while let Some(key) = access.next_key::<String>()? {
            if is_forbidden_key(&key) {
                access.next_value::<IgnoredAny>()?;
                tracing::debug!(key = %key, depth, "dropped forbidden key from parsed JSON");
                continue;
            }

            let child = access.next_value_seed(SanitizedValue {
                reviver: &mut *reviver,
                depth,
            })?;
            match reviver(&key, child) {
                Some(value) => {
                    map.insert(key, value);
                }
                None => {
                    tracing::trace!(key = %key, depth, "reviver removed member");
                    // A later duplicate key must not leave an earlier value behind.
                    map.shift_remove(&key);
                }
            }
        }

        Ok(Value::Object(map))
    }
}

/// Serialize any value as compact JSON.
///
/// # Errors
///
/// Returns [`ShapeError::Serialize`] if `value` cannot be represented as JSON.
pub fn stringify<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(ShapeError::Serialize)
}

/// Selects which members [`stringify_with`] emits.
pub enum Replacer<'a> {
    /// Called top-down with the key (`""` for the root, decimal index for array
    /// elements) and the current value. `None` omits an object member and renders
    /// `null` for an array element or the root.
    Function(Box<dyn FnMut(&str, &Value) -> Option<Value> + 'a>),
    /// Only these object keys are emitted, at every depth, in this order.
    AllowList(Vec<String>),
}

impl<'a> Replacer<'a> {
    pub fn function(f: impl FnMut(&str, &Value) -> Option<Value> + 'a) -> Self {
        Replacer::Function(Box::new(f))
    }

    /// Build an allow-list; numeric entries name array-like keys by their decimal form.
    pub fn allow<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: ToString,
    {
        let mut list: Vec<String> = Vec::new();
        for key in keys {
            let key = key.to_string();
            if !list.contains(&key) {
                list.push(key);
            }
        }
        Replacer::AllowList(list)
    }
}

/// Indentation for [`stringify_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Space {
    /// Indent with this many spaces, capped at 10. Zero means compact output.
    Count(usize),
    /// Indent with the first 10 UTF-16 code units of this string. A character
    /// that would straddle the cut is left out whole. Empty means compact.
    Text(String),
}

impl Space {
    fn indent(&self) -> String {
        match self {
            Space::Count(n) => " ".repeat((*n).min(MAX_INDENT)),
            Space::Text(s) => {
                let mut units = 0;
                s.chars()
                    .take_while(|c| {
                        units += c.len_utf16();
                        units <= MAX_INDENT
                    })
                    .collect()
            }
        }
    }
}

impl From<usize> for Space {
    fn from(n: usize) -> Self {
        Space::Count(n)
    }
}

impl From<&str> for Space {
    fn from(s: &str) -> Self {
        Space::Text(s.to_string())
    }
}

/// Serialize a value as JSON with an optional replacer and indentation.
///
/// # Errors
///
/// Returns [`ShapeError::Serialize`] if `value` cannot be represented as JSON.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shapekit::json::{self, Replacer, Space};
///
/// let value = json!({"b": 2, "a": 1, "c": 3});
/// let text = json::stringify_with(&value, Some(Replacer::allow(["a", "b"])), None).unwrap();
/// assert_eq!(text, r#"{"a":1,"b":2}"#);
///
/// let pretty = json::stringify_with(&json!([1]), None, Some(Space::Count(2))).unwrap();
/// assert_eq!(pretty, "[\n  1\n]");
/// ```
pub fn stringify_with<T: Serialize + ?Sized>(
    value: &T,
    replacer: Option<Replacer<'_>>,
    space: Option<Space>,
) -> Result<String> {
    let indent = space.map(|s| s.indent()).unwrap_or_default();
    let Some(replacer) = replacer else {
        return write_indented(value, &indent);
    };

    // `Value` has no room for integers beyond `u64`; reading them back from text
    // turns them into floats.
    let mut value = match serde_json::to_value(value) {
        Ok(value) => value,
        Err(_) => serde_json::from_str(&stringify(value)?).map_err(ShapeError::Serialize)?,
    };
    match replacer {
        Replacer::Function(mut f) => {
            value = replace(&mut *f, "", &value).unwrap_or(Value::Null);
        }
        Replacer::AllowList(keys) => {
            value = allow_only(value, &keys);
        }
    }
    write_indented(&value, &indent)
}

fn write_indented<T: Serialize + ?Sized>(value: &T, indent: &str) -> Result<String> {
    if indent.is_empty() {
        return stringify(value);
    }

    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser).map_err(ShapeError::Serialize)?;
    String::from_utf8(out).map_err(|e| {
        ShapeError::Serialize(serde_json::Error::io(io::Error::new(
            io::ErrorKind::InvalidData,
            e,
        )))
    })
}

/// Apply a replacer function top-down: the holder sees a value before its children.
fn replace(
    f: &mut dyn FnMut(&str, &Value) -> Option<Value>,
    key: &str,
    value: &Value,
) -> Option<Value> {
    let replaced = f(key, value)?;
    Some(match replaced {
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in &map {
                if let Some(v) = replace(f, k, v) {
                    out.insert(k.clone(), v);
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| replace(f, &i.to_string(), v).unwrap_or(Value::Null))
                .collect(),
        ),
        other => other,
    })
}

/// Keep only allow-listed object members, in allow-list order, at every depth.
fn allow_only(value: Value, keys: &[String]) -> Value {
    match value {
        Value::Object(mut map) => {
            let mut out = Map::new();
            for key in keys {
                if let Some(v) = map.shift_remove(key) {
                    out.insert(key.clone(), allow_only(v, keys));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| allow_only(v, keys)).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reviver_never_sees_forbidden_keys() {
        let mut seen = Vec::new();
        parse_with_reviver(
            r#"{"a":{"__proto__":{"x":1},"b":2},"constructor":3}"#,
            |key, value| {
                seen.push(key.to_string());
                Some(value)
            },
        )
        .unwrap();

        assert_eq!(seen, vec!["b", "a", ""]);
    }

    #[test]
    fn reviver_sees_array_indices() {
        let mut seen = Vec::new();
        parse_with_reviver("[10,[20]]", |key, value| {
            seen.push(key.to_string());
            Some(value)
        })
        .unwrap();

        assert_eq!(seen, vec!["0", "0", "1", ""]);
    }

    #[test]
    fn replacer_visits_root_first() {
        let mut seen = Vec::new();
        stringify_with(
            &json!({"a": [1]}),
            Some(Replacer::function(|key, value| {
                seen.push(key.to_string());
                Some(value.clone())
            })),
            None,
        )
        .unwrap();

        assert_eq!(seen, vec!["", "a", "0"]);
    }

    #[test]
    fn space_is_capped() {
        assert_eq!(Space::Count(25).indent().len(), MAX_INDENT);
        assert_eq!(Space::from("--------------").indent(), "----------");
        assert_eq!(Space::Count(0).indent(), "");
    }

    #[test]
    fn text_indent_is_cut_in_utf16_units() {
        // Each emoji is a surrogate pair.
        assert_eq!(Space::from("😀😀😀😀😀😀").indent(), "😀😀😀😀😀");
        assert_eq!(Space::from("a😀😀😀😀😀").indent(), "a😀😀😀😀");
        assert_eq!(Space::from("éééééééééééé").indent(), "éééééééééé");
    }
}
