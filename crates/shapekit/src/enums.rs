//! Introspection over enum-like mappings.
//!
//! An enum-like mapping is a fixed, insertion-ordered set of names bound to string
//! or number values. Numeric enumerations are commonly emitted with reverse-lookup
//! entries (`"1" → "One"` next to `"One" → 1`); every enumeration in this module
//! skips keys that convert to a number, so only the declared names are reported.
//!
//! Lookups never fail: absence is `None`, which cannot be confused with a falsy
//! member such as `0` or `""`.
//!
//! ```
//! use shapekit::enums::{self, EnumObject, EnumValue};
//!
//! let colors = EnumObject::from_iter([("Red", "red"), ("Green", "green")]);
//! assert_eq!(enums::get_keys(&colors), vec!["Red", "Green"]);
//! assert_eq!(enums::get_value(&colors, "Green"), Some(&EnumValue::from("green")));
//! assert!(enums::parse(&colors, "blue").is_none());
//! ```

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Result, ShapeError};

/// Integral numbers below this magnitude are written out digit by digit; at or
/// above it they switch to exponent form.
const MAX_PLAIN_INTEGER: f64 = 1e21;

/// A member value: either a number or a string.
///
/// There is no null variant: a stored member never reads as "not found".
#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    Number(f64),
    String(String),
}

impl EnumValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EnumValue::String(s) => Some(s),
            EnumValue::Number(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            EnumValue::Number(n) => Some(*n),
            EnumValue::String(_) => None,
        }
    }
}

/// Render a number the way it appears as an object key.
///
/// Shortest round-trip digits, laid out as in number-to-string conversion:
/// `1` (not `1.0`), `0.5`, `1e+21`, `1e-7`, `Infinity`, `NaN`. `-0` prints as `0`.
fn number_key(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    // `{:e}` yields the shortest digits that round-trip, e.g. `-1.2345e-7`.
    let sci = format!("{:e}", n.abs());
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);

    let k = digits.len() as i32;
    // Position of the decimal point relative to the start of `digits`.
    let point = exponent + 1;

    let body = if k <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{int}.{frac}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat((-point) as usize))
    } else {
        let sign = if point - 1 < 0 { '-' } else { '+' };
        let (lead, rest) = digits.split_at(1);
        let power = (point - 1).abs();
        if rest.is_empty() {
            format!("{lead}e{sign}{power}")
        } else {
            format!("{lead}.{rest}e{sign}{power}")
        }
    };

    if n < 0.0 {
        format!("-{body}")
    } else {
        body
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumValue::Number(n) => f.write_str(&number_key(*n)),
            EnumValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for EnumValue {
    fn from(value: &str) -> Self {
        EnumValue::String(value.to_string())
    }
}

impl From<String> for EnumValue {
    fn from(value: String) -> Self {
        EnumValue::String(value)
    }
}

impl From<&String> for EnumValue {
    fn from(value: &String) -> Self {
        EnumValue::String(value.clone())
    }
}

impl From<&EnumValue> for EnumValue {
    fn from(value: &EnumValue) -> Self {
        value.clone()
    }
}

macro_rules! number_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for EnumValue {
                fn from(value: $ty) -> Self {
                    EnumValue::Number(value as f64)
                }
            }
        )*
    };
}

number_from!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl Serialize for EnumValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            EnumValue::String(s) => serializer.serialize_str(s),
            // Integral members serialize as JSON integers, not `1.0` or `1e20`.
            EnumValue::Number(n) if n.fract() == 0.0 && n.abs() < MAX_PLAIN_INTEGER => {
                serializer.serialize_i128(*n as i128)
            }
            EnumValue::Number(n) => serializer.serialize_f64(*n),
        }
    }
}

impl<'de> Deserialize<'de> for EnumValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EnumValueVisitor;

        impl Visitor<'_> for EnumValueVisitor {
            type Value = EnumValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or a number")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<EnumValue, E> {
                Ok(EnumValue::from(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<EnumValue, E> {
                Ok(EnumValue::from(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<EnumValue, E> {
                Ok(EnumValue::Number(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<EnumValue, E> {
                Ok(EnumValue::from(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<EnumValue, E> {
                Ok(EnumValue::String(v))
            }
        }

        deserializer.deserialize_any(EnumValueVisitor)
    }
}

/// An insertion-ordered mapping from names to [`EnumValue`]s.
///
/// Keys are unique: inserting an existing key replaces its value without moving it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumObject {
    entries: Vec<(String, EnumValue)>,
}

impl EnumObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a numeric enumeration with reverse-lookup entries.
    ///
    /// Each `(name, n)` member yields `name → n` followed by `"n" → name`, the
    /// layout numeric enums are compiled to.
    ///
    /// ```
    /// use shapekit::enums::EnumObject;
    ///
    /// let e = EnumObject::numeric([("One", 1), ("Two", 2)]);
    /// assert_eq!(e.len(), 4);
    /// assert!(e.raw_keys().any(|k| k == "1"));
    /// ```
    pub fn numeric<K, N>(members: impl IntoIterator<Item = (K, N)>) -> Self
    where
        K: Into<String>,
        N: Into<f64>,
    {
        let mut object = Self::new();
        for (name, number) in members {
            let name = name.into();
            let number = number.into();
            let reverse = EnumValue::Number(number).to_string();
            object.insert(name.clone(), number);
            object.insert(reverse, name);
        }
        object
    }

    /// Insert or replace a member, returning the previous value for `key`.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<EnumValue>,
    ) -> Option<EnumValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter().position(|(k, _)| *k == key) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Number of stored entries, reverse-lookup entries included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every stored key in insertion order, reverse-lookup entries included.
    pub fn raw_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    fn lookup(&self, key: &str) -> Option<&EnumValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Declared members only: entries whose key is not numeric.
    fn members(&self) -> impl Iterator<Item = (&str, &EnumValue)> {
        self.entries
            .iter()
            .filter(|(k, _)| !is_numeric_key(k))
            .map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for EnumObject
where
    K: Into<String>,
    V: Into<EnumValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut object = Self::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

/// Short name of a JSON value's type, for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl TryFrom<Value> for EnumObject {
    type Error = ShapeError;

    /// Read a JSON object whose members are all strings or numbers.
    fn try_from(value: Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(ShapeError::InvalidEnum {
                    key: String::new(),
                    found: json_type_name(&other),
                })
            }
        };

        let mut object = Self::new();
        for (key, member) in map {
            let value = match member {
                Value::String(s) => EnumValue::String(s),
                Value::Number(n) => match n.as_f64() {
                    Some(n) => EnumValue::Number(n),
                    None => {
                        return Err(ShapeError::InvalidEnum {
                            key,
                            found: "number",
                        })
                    }
                },
                other => {
                    return Err(ShapeError::InvalidEnum {
                        key,
                        found: json_type_name(&other),
                    })
                }
            };
            object.insert(key, value);
        }
        Ok(object)
    }
}

impl<'de> Deserialize<'de> for EnumObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        EnumObject::try_from(value).map_err(de::Error::custom)
    }
}

impl Serialize for EnumObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, v)| (k, v)))
    }
}

/// Whitespace ignored around a key when converting it to a number.
fn is_number_whitespace(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}

/// Whether `key` converts to a number (i.e. is not `NaN` under string-to-number
/// conversion).
///
/// Accepted forms, after trimming whitespace:
/// - the empty string (converts to 0)
/// - `Infinity` with an optional sign
/// - unsigned `0x`, `0o`, `0b` literals
/// - decimal literals with optional sign, fraction and exponent (`1`, `-2.5`,
///   `.5`, `5.`, `1e3`)
pub fn is_numeric_key(key: &str) -> bool {
    let s = key.trim_matches(is_number_whitespace);
    if s.is_empty() {
        return true;
    }

    if let Some(numeric) = radix_literal(s) {
        return numeric;
    }

    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    unsigned == "Infinity" || is_decimal_literal(unsigned)
}

/// `Some(valid)` if `s` has a radix prefix, `None` otherwise.
fn radix_literal(s: &str) -> Option<bool> {
    let bytes = s.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return None;
    }
    let radix = match bytes[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };
    let digits = &s[2..];
    Some(!digits.is_empty() && digits.chars().all(|c| c.is_digit(radix)))
}

fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        mantissa_digits += i - frac_start;
    }

    if mantissa_digits == 0 {
        return false;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

/// The declared keys, in insertion order, excluding numeric keys.
pub fn get_keys(enum_obj: &EnumObject) -> Vec<&str> {
    enum_obj.members().map(|(k, _)| k).collect()
}

/// The first declared key whose value equals `value`.
pub fn get_key(enum_obj: &EnumObject, value: impl Into<EnumValue>) -> Option<&str> {
    let value = value.into();
    enum_obj
        .members()
        .find(|(_, v)| **v == value)
        .map(|(k, _)| k)
}

/// Whether `key` is one of the declared keys. Reverse-lookup keys are not.
pub fn has_key(enum_obj: &EnumObject, key: &str) -> bool {
    enum_obj.members().any(|(k, _)| k == key)
}

/// The declared values, in the same order as [`get_keys`].
pub fn get_values(enum_obj: &EnumObject) -> Vec<&EnumValue> {
    enum_obj.members().map(|(_, v)| v).collect()
}

/// The value stored under `key`.
///
/// This reads the mapping directly, so a reverse-lookup key (`"1"` in a numeric
/// enum) yields the member name it points back to.
pub fn get_value<'a>(enum_obj: &'a EnumObject, key: &str) -> Option<&'a EnumValue> {
    enum_obj.lookup(key)
}

/// Whether some declared key maps to `value`.
pub fn has_value(enum_obj: &EnumObject, value: impl Into<EnumValue>) -> bool {
    get_key(enum_obj, value).is_some()
}

/// Convert `value` into a member of the enumeration.
///
/// Returns the stored member equal to `value`, or `None` if `value` is not one of
/// [`get_values`].
pub fn parse(enum_obj: &EnumObject, value: impl Into<EnumValue>) -> Option<&EnumValue> {
    let value = value.into();
    enum_obj.members().map(|(_, v)| v).find(|v| **v == value)
}

/// The declared `(key, value)` pairs, in the same order as [`get_keys`].
pub fn get_entries(enum_obj: &EnumObject) -> Vec<(&str, &EnumValue)> {
    enum_obj.members().collect()
}
