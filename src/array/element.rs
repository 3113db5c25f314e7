//! Array elements.

use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

use super::Array;
use crate::error::{ArrayError, Result};

/// One cell of an array's flat storage.
///
/// Leaves are numbers or single characters; a cell may also own a nested
/// array, which makes arrays of arrays into trees. JSON data with no array
/// meaning (booleans, null, longer strings, lists, plain objects) is kept
/// verbatim in [`Element::Other`] so it survives a decode/encode round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Number(Number),
    Char(char),
    Array(Array),
    Other(OtherValue),
}

/// JSON data with no array meaning.
///
/// Only [`Element::from_json`] and the decoder build one, so an
/// `OtherValue` never holds a number, a one-character string or an
/// array-shaped object. Those decode to the other [`Element`] variants, and
/// holding them here would make an element change variant on a round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct OtherValue(pub(crate) Value);

impl OtherValue {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl Serialize for OtherValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl Element {
    /// Build an element from JSON the way the decoder reads a `d` entry.
    ///
    /// Numbers become [`Element::Number`], one-character strings
    /// [`Element::Char`] and array-shaped objects [`Element::Array`];
    /// anything else is wrapped in [`Element::Other`].
    ///
    /// # Errors
    ///
    /// Fails like [`decode`](crate::decode) for a malformed array object.
    pub fn from_json(value: Value) -> Result<Element> {
        crate::codec::decode_element(value)
    }

    pub fn as_other(&self) -> Option<&Value> {
        match self {
            Element::Other(value) => Some(value.as_value()),
            _ => None,
        }
    }


    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Element::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Element::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Element::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Element::Array(_))
    }

    /// JSON form of this element as it appears inside a `d` list.
    pub fn to_json(&self) -> Value {
        match self {
            Element::Number(n) => Value::Number(n.clone()),
            Element::Char(c) => Value::String(c.to_string()),
            Element::Array(array) => array.to_json(),
            Element::Other(value) => value.as_value().clone(),
        }
    }
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Element::Number(n) => n.serialize(serializer),
            Element::Char(c) => serializer.serialize_char(*c),
            Element::Array(array) => array.serialize(serializer),
            Element::Other(value) => value.serialize(serializer),
        }
    }
}

impl From<i64> for Element {
    fn from(n: i64) -> Self {
        Element::Number(n.into())
    }
}

impl From<u64> for Element {
    fn from(n: u64) -> Self {
        Element::Number(n.into())
    }
}

impl From<char> for Element {
    fn from(c: char) -> Self {
        Element::Char(c)
    }
}

impl From<Number> for Element {
    fn from(n: Number) -> Self {
        Element::Number(n)
    }
}

impl From<Array> for Element {
    fn from(array: Array) -> Self {
        Element::Array(array)
    }
}

impl TryFrom<f64> for Element {
    type Error = ArrayError;

    /// Fails for NaN and infinities, which JSON cannot carry.
    fn try_from(n: f64) -> std::result::Result<Self, Self::Error> {
        Number::from_f64(n)
            .map(Element::Number)
            .ok_or_else(|| ArrayError::UnsupportedType(format!("non-finite float {}", n)))
    }
}
