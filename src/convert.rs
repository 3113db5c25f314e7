//! Conversion of host values into arrays.
//!
//! Host values arrive as [`serde_json::Value`]. The rules:
//!
//! | value                 | enclosed (top level)      | nested (inside a list) |
//! |-----------------------|---------------------------|------------------------|
//! | list                  | rank-1 array              | rank-1 array           |
//! | number                | rank-0 numeric array      | bare number            |
//! | one-character string  | rank-0 character array    | bare character         |
//! | any other string      | character vector          | character vector       |
//! | boolean, null, object | `UnsupportedType`         | `UnsupportedType`      |
//!
//! Enclosing means the outermost value always reaches the wire as an array,
//! while scalars inside a list are stored as plain elements.

use serde_json::Value;

use crate::array::{Array, Element, TypeTag};
use crate::codec::json_type_name;
use crate::error::{ArrayError, Result};

/// Convert a top-level host value into an array.
///
/// Bare scalars are enclosed into rank-0 arrays.
///
/// # Errors
///
/// Returns [`ArrayError::UnsupportedType`] naming the JSON type of the first
/// value (at any depth) that has no array representation.
///
/// # Example
///
/// ```ignore
/// let array = from_value(&json!(5))?;
/// assert_eq!(array.shape(), &[] as &[usize]);
/// ```
pub fn from_value(value: &Value) -> Result<Array> {
    Ok(match classify(value)? {
        Converted::Array(array) => array,
        Converted::Scalar(element, tag) => Array::scalar(element, tag),
    })
}

/// Convert a host value, choosing whether bare scalars are enclosed.
///
/// With `enclose` set the result is always [`Element::Array`].
pub fn convert(value: &Value, enclose: bool) -> Result<Element> {
    Ok(match classify(value)? {
        Converted::Array(array) => Element::Array(array),
        Converted::Scalar(element, tag) if enclose => Element::Array(Array::scalar(element, tag)),
        Converted::Scalar(element, _) => element,
    })
}

enum Converted {
    Array(Array),
    Scalar(Element, TypeTag),
}

fn classify(value: &Value) -> Result<Converted> {
    match value {
        Value::Array(items) => {
            let data = items
                .iter()
                .map(|item| convert(item, false))
                .collect::<Result<Vec<_>>>()?;
            Ok(Converted::Array(Array::vector(data)))
        }
        Value::Number(n) => Ok(Converted::Scalar(Element::Number(n.clone()), TypeTag::Numeric)),
        Value::String(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Converted::Scalar(Element::Char(c), TypeTag::Character)),
                _ => Ok(Converted::Array(Array::text(s))),
            }
        }
        other => Err(ArrayError::UnsupportedType(json_type_name(other).to_string())),
    }
}
