//! Plain-object detection and nullish-value pruning for JSON-shaped trees.
//!
//! Rust values carry no prototype chain, so "is this a plain object" is answered
//! by an explicit runtime tag: every type that can be inspected implements
//! [`Shape`] and reports its [`Kind`]. Only string-keyed maps report
//! [`Kind::PlainObject`]. Nominal types (structs, enums, wrappers) are opaque
//! instances: implementing `Shape` with no body tags a type as [`Kind::Instance`].

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::{Map, Value};

/// Runtime classification of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Absent value (`null` / `None`).
    Nullish,
    /// Booleans, numbers, strings, characters and the unit value.
    Primitive,
    /// A string-keyed mapping with no type of its own.
    PlainObject,
    /// An ordered sequence.
    Array,
    /// A callable.
    Function,
    /// A value of a nominal type.
    Instance,
}

/// Reports the [`Kind`] of a value.
///
/// The default is [`Kind::Instance`], so domain types opt in with an empty impl:
///
/// ```
/// use shapekit::object::{is_plain, Kind, Shape};
///
/// struct Timestamp(u64);
/// impl Shape for Timestamp {}
///
/// assert_eq!(Timestamp(0).kind(), Kind::Instance);
/// assert!(!is_plain(&Timestamp(0)));
/// ```
pub trait Shape {
    fn kind(&self) -> Kind {
        Kind::Instance
    }
}

impl Shape for Value {
    fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Nullish,
            Value::Bool(_) | Value::Number(_) | Value::String(_) => Kind::Primitive,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::PlainObject,
        }
    }
}

impl Shape for Map<String, Value> {
    fn kind(&self) -> Kind {
        Kind::PlainObject
    }
}

impl<V, S: BuildHasher> Shape for HashMap<String, V, S> {
    fn kind(&self) -> Kind {
        Kind::PlainObject
    }
}

impl<V> Shape for BTreeMap<String, V> {
    fn kind(&self) -> Kind {
        Kind::PlainObject
    }
}

macro_rules! shape_of {
    ($kind:expr => $($ty:ty),* $(,)?) => {
        $(
            impl Shape for $ty {
                fn kind(&self) -> Kind {
                    $kind
                }
            }
        )*
    };
}

shape_of!(Kind::Primitive =>
    bool, char, str, String, (),
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64,
);

impl<T> Shape for Vec<T> {
    fn kind(&self) -> Kind {
        Kind::Array
    }
}

impl<T> Shape for VecDeque<T> {
    fn kind(&self) -> Kind {
        Kind::Array
    }
}

impl<T> Shape for [T] {
    fn kind(&self) -> Kind {
        Kind::Array
    }
}

impl<T, const N: usize> Shape for [T; N] {
    fn kind(&self) -> Kind {
        Kind::Array
    }
}

impl<R> Shape for fn() -> R {
    fn kind(&self) -> Kind {
        Kind::Function
    }
}

impl<A, R> Shape for fn(A) -> R {
    fn kind(&self) -> Kind {
        Kind::Function
    }
}

impl<A, B, R> Shape for fn(A, B) -> R {
    fn kind(&self) -> Kind {
        Kind::Function
    }
}

impl<T: Shape> Shape for Option<T> {
    fn kind(&self) -> Kind {
        self.as_ref().map_or(Kind::Nullish, Shape::kind)
    }
}

impl<T: Shape + ?Sized> Shape for &T {
    fn kind(&self) -> Kind {
        (**self).kind()
    }
}

impl<T: Shape + ?Sized> Shape for Box<T> {
    fn kind(&self) -> Kind {
        (**self).kind()
    }
}

impl<T: Shape + ?Sized> Shape for Rc<T> {
    fn kind(&self) -> Kind {
        (**self).kind()
    }
}

impl<T: Shape + ?Sized> Shape for Arc<T> {
    fn kind(&self) -> Kind {
        (**self).kind()
    }
}

/// Whether `data` is a plain object: a string-keyed mapping that is not an array,
/// function, primitive, nullish value, or instance of a nominal type.
///
/// ```
/// use serde_json::{json, Map};
/// use shapekit::is_plain;
///
/// assert!(is_plain(&json!({})));
/// assert!(is_plain(&Map::new()));
/// assert!(!is_plain(&json!([])));
/// assert!(!is_plain(&json!(null)));
/// ```
pub fn is_plain<T: Shape + ?Sized>(data: &T) -> bool {
    data.kind() == Kind::PlainObject
}

/// Remove `null` members and elements from `data`, recursively and in place.
///
/// Object members holding `null` are removed; arrays are filtered to their
/// non-null elements, keeping order, and each remaining element is pruned in
/// turn. Scalars and `null` at the top level are left as they are. Applying the
/// function twice changes nothing the second time.
///
/// Taking `&mut Value` means the caller must hold the only live reference to the
/// tree for the duration of the call.
///
/// ```
/// use serde_json::json;
/// use shapekit::remove_nullish_values;
///
/// let mut data = json!({"a": null, "b": 1, "c": [1, null, 2], "d": {"e": null, "f": 2}});
/// remove_nullish_values(&mut data);
/// assert_eq!(data, json!({"b": 1, "c": [1, 2], "d": {"f": 2}}));
/// ```
pub fn remove_nullish_values(data: &mut Value) -> &mut Value {
    match data {
        Value::Object(map) => prune_object(map),
        Value::Array(items) => prune_array(items),
        _ => {}
    }
    data
}

/// Owning form of [`remove_nullish_values`].
pub fn without_nullish_values(mut data: Value) -> Value {
    remove_nullish_values(&mut data);
    data
}

fn prune_object(map: &mut Map<String, Value>) {
    map.retain(|_, value| !value.is_null());
    for value in map.values_mut() {
        match value {
            Value::Object(child) => prune_object(child),
            Value::Array(items) => prune_array(items),
            _ => {}
        }
    }
}

fn prune_array(items: &mut Vec<Value>) {
    items.retain(|item| !item.is_null());
    for item in items.iter_mut() {
        remove_nullish_values(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn top_level_array_has_no_holes() {
        let mut data = json!([null, 1, null, {"a": null}]);
        remove_nullish_values(&mut data);
        assert_eq!(data, json!([1, {}]));
    }

    #[test]
    fn nested_arrays_are_filtered() {
        let mut data = json!({"grid": [[1, null], [null], null]});
        remove_nullish_values(&mut data);
        assert_eq!(data, json!({"grid": [[1], []]}));
    }

    #[test]
    fn falsy_values_survive() {
        let mut data = json!({"zero": 0, "empty": "", "no": false, "list": [], "obj": {}});
        let before = data.clone();
        remove_nullish_values(&mut data);
        assert_eq!(data, before);
    }

    #[test]
    fn scalars_are_returned_unchanged() {
        for value in [json!(null), json!(1), json!("text"), json!(true)] {
            assert_eq!(without_nullish_values(value.clone()), value);
        }
    }

    #[test]
    fn option_delegates_to_inner_kind() {
        let none: Option<Map<String, Value>> = None;
        assert_eq!(none.kind(), Kind::Nullish);
        assert_eq!(Some(Map::new()).kind(), Kind::PlainObject);
    }
}
