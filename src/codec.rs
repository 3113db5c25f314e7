//! JSON wire codec for arrays.
//!
//! # Wire Format
//!
//! ```text
//! {"r": [dim0, dim1, ...], "d": [element, ...], "t": 0 | 1}
//! ```
//!
//! - `r` is the shape; an empty list is a rank-0 array
//! - `d` is the flat row-major data; elements are JSON scalars or nested
//!   objects of the same form
//! - `t` is the type tag (`0` numeric, `1` character); optional on input
//!
//! # Schema check
//!
//! A JSON object carrying both an `r` and a `d` key is an array. Every other
//! value decodes to [`Payload::Scalar`] unchanged. Once an object has been
//! recognised as an array its fields must be well formed, otherwise decoding
//! fails instead of falling back to plain data.
//!
//! A `d` list whose length disagrees with the product of `r` is accepted and
//! padded or truncated exactly as [`Array::new`] does.

use serde::de::{Deserialize, Deserializer, Error as _};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::array::{shape, Array, Element, OtherValue, TypeTag};
use crate::error::{ArrayError, Result};

/// A decoded wire value: either an array or plain JSON data.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Array(Array),
    Scalar(Value),
}

impl Payload {
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Payload::Array(array) => Some(array),
            Payload::Scalar(_) => None,
        }
    }

    pub fn into_array(self) -> Option<Array> {
        match self {
            Payload::Array(array) => Some(array),
            Payload::Scalar(_) => None,
        }
    }

    /// Encode back to wire text.
    pub fn encode(&self) -> String {
        match self {
            Payload::Array(array) => encode(array),
            Payload::Scalar(value) => value.to_string(),
        }
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Payload::Array(array) => array.serialize(serializer),
            Payload::Scalar(value) => value.serialize(serializer),
        }
    }
}

/// Serialize an array to compact JSON text.
///
/// Nested arrays are written recursively in the same three-field form.
/// Non-ASCII characters are written as UTF-8, not escaped.
pub fn encode(array: &Array) -> String {
    array.to_json().to_string()
}

/// Decode wire text into a [`Payload`].
///
/// # Errors
///
/// - [`ArrayError::Decode`] if the text is not JSON, or an array-shaped
///   object has a malformed `r`, `d` or `t` field
/// - [`ArrayError::Shape`] if an array's shape has a negative dimension
/// - [`ArrayError::ShapeTooLarge`] if an array's shape describes more than
///   [`shape::MAX_ELEMENTS`] elements
///
/// # Example
///
/// ```ignore
/// let payload = decode(r#"{"r":[2],"d":[1,2]}"#)?;
/// assert_eq!(payload.as_array().unwrap().shape(), &[2]);
/// ```
pub fn decode(text: &str) -> Result<Payload> {
    let value: Value = serde_json::from_str(text)?;
    decode_value(value)
}

/// Decode wire text that must be an array.
///
/// # Errors
///
/// As [`decode`], plus [`ArrayError::Decode`] when the text is valid JSON
/// but not an array object.
pub fn decode_array(text: &str) -> Result<Array> {
    match decode(text)? {
        Payload::Array(array) => Ok(array),
        Payload::Scalar(value) => Err(ArrayError::Decode(format!(
            "expected an array object, got {}",
            json_type_name(&value)
        ))),
    }
}

/// Decode an already-parsed JSON value.
pub fn decode_value(value: Value) -> Result<Payload> {
    match value {
        Value::Object(map) if is_array_object(&map) => array_from_object(map).map(Payload::Array),
        other => Ok(Payload::Scalar(other)),
    }
}

/// Whether a JSON object is an array on the wire.
pub fn is_array_object(map: &Map<String, Value>) -> bool {
    map.contains_key("r") && map.contains_key("d")
}

fn array_from_object(mut map: Map<String, Value>) -> Result<Array> {
    let dims = parse_shape(map.get("r").unwrap_or(&Value::Null))?;
    let shape = shape::validate_dims(&dims)?;

    let data = match map.remove("d") {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(decode_element)
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(ArrayError::Decode(format!(
                "field \"d\" must be a list, got {}",
                json_type_name(&other)
            )))
        }
        None => Vec::new(),
    };

    let tag = match map.remove("t") {
        Some(value) => parse_tag(&value)?,
        None => TypeTag::Numeric,
    };

    Ok(Array::new(shape, data, Some(tag)))
}

fn parse_shape(value: &Value) -> Result<Vec<i64>> {
    let items = value.as_array().ok_or_else(|| {
        ArrayError::Decode(format!(
            "field \"r\" must be a list, got {}",
            json_type_name(value)
        ))
    })?;

    items
        .iter()
        .map(|item| {
            item.as_i64().ok_or_else(|| {
                ArrayError::Decode(format!("dimension {} is not an integer", item))
            })
        })
        .collect()
}

fn parse_tag(value: &Value) -> Result<TypeTag> {
    value
        .as_u64()
        .and_then(|code| u8::try_from(code).ok())
        .ok_or_else(|| ArrayError::Decode(format!("unknown type tag {}", value)))
        .and_then(TypeTag::try_from)
}

/// Decode one entry of a `d` list.
pub(crate) fn decode_element(value: Value) -> Result<Element> {
    let element = match value {
        Value::Number(n) => Element::Number(n),
        Value::String(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Element::Char(c),
                _ => Element::Other(OtherValue(Value::String(s))),
            }
        }
        Value::Object(map) if is_array_object(&map) => Element::Array(array_from_object(map)?),
        other => Element::Other(OtherValue(other)),
    };
    Ok(element)
}

/// Short JSON type name used in error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

impl<'de> Deserialize<'de> for Array {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match decode_value(value).map_err(D::Error::custom)? {
            Payload::Array(array) => Ok(array),
            Payload::Scalar(value) => Err(D::Error::custom(format!(
                "expected an array object, got {}",
                json_type_name(&value)
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_encode_fields() {
        let data = vec![1i64.into(), 2i64.into(), 3i64.into(), 4i64.into()];
        let array = Array::new(vec![2, 2], data, None);
        let value: Value = serde_json::from_str(&encode(&array)).unwrap();
        assert_eq!(value, json!({"r": [2, 2], "d": [1, 2, 3, 4], "t": 0}));
    }

    #[test]
    fn test_encode_does_not_escape_unicode() {
        let text = encode(&Array::text("⍴⍳"));
        assert!(text.contains("⍴"), "got {}", text);
    }

    #[test]
    fn test_encode_rank_zero() {
        let array = Array::scalar(Element::Char('x'), TypeTag::Character);
        let value: Value = serde_json::from_str(&encode(&array)).unwrap();
        assert_eq!(value, json!({"r": [], "d": ["x"], "t": 1}));
    }

    #[test]
    fn test_decode_array() {
        let payload = decode(r#"{"r":[2],"d":[1,2]}"#).unwrap();
        let array = payload.as_array().expect("should be an array");
        assert_eq!(array.shape(), &[2]);
        assert_eq!(array.tag(), TypeTag::Numeric);
        assert_eq!(array.data(), &[Element::from(1i64), Element::from(2i64)]);
    }

    #[test]
    fn test_decode_plain_object_passes_through() {
        let payload = decode(r#"{"x":1}"#).unwrap();
        assert_eq!(payload, Payload::Scalar(json!({"x": 1})));
    }

    #[test]
    fn test_decode_plain_scalars() {
        assert_eq!(decode("3").unwrap(), Payload::Scalar(json!(3)));
        assert_eq!(decode("\"ab\"").unwrap(), Payload::Scalar(json!("ab")));
        assert_eq!(decode("true").unwrap(), Payload::Scalar(json!(true)));
        assert_eq!(decode("null").unwrap(), Payload::Scalar(Value::Null));
        assert_eq!(decode("[1,2]").unwrap(), Payload::Scalar(json!([1, 2])));
    }

    #[test]
    fn test_decode_only_r_is_not_an_array() {
        let payload = decode(r#"{"r":[2]}"#).unwrap();
        assert!(payload.as_array().is_none());
    }

    #[test]
    fn test_decode_character_tag() {
        let array = decode_array(r#"{"r":[3],"d":["a","b","c"],"t":1}"#).unwrap();
        assert_eq!(array.tag(), TypeTag::Character);
        assert_eq!(array.data()[2], Element::Char('c'));
    }

    #[test]
    fn test_decode_missing_tag_defaults_numeric() {
        // Characters without a tag still decode as numeric: absent `t` is not
        // re-inferred from the data
        let array = decode_array(r#"{"r":[1],"d":["a"]}"#).unwrap();
        assert_eq!(array.tag(), TypeTag::Numeric);
    }

    #[test]
    fn test_decode_nested() {
        let text = r#"{"r":[2],"d":[{"r":[2],"d":["h","i"],"t":1},{"r":[],"d":[5]}],"t":1}"#;
        let array = decode_array(text).unwrap();

        let first = array.data()[0].as_array().expect("nested array");
        assert_eq!(first.shape(), &[2]);
        assert_eq!(first.tag(), TypeTag::Character);

        let second = array.data()[1].as_array().expect("nested array");
        assert_eq!(second.rank(), 0);
        assert_eq!(second.data(), &[Element::from(5i64)]);
    }

    #[test]
    fn test_decode_other_elements_kept() {
        let array = decode_array(r#"{"r":[4],"d":[true,null,"long",{"x":1}]}"#).unwrap();
        assert_eq!(array.data()[0].as_other(), Some(&json!(true)));
        assert_eq!(array.data()[1].as_other(), Some(&Value::Null));
        assert_eq!(array.data()[2].as_other(), Some(&json!("long")));
        assert_eq!(array.data()[3].as_other(), Some(&json!({"x": 1})));
    }

    #[test]
    fn test_decode_length_mismatch_is_lenient() {
        let padded = decode_array(r#"{"r":[2,2],"d":[1]}"#).unwrap();
        assert_eq!(padded.len(), 4);
        assert_eq!(padded.data()[3], Element::from(0i64));

        let truncated = decode_array(r#"{"r":[1],"d":[1,2,3]}"#).unwrap();
        assert_eq!(truncated.data(), &[Element::from(1i64)]);
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(decode("{not json"), Err(ArrayError::Decode(_))));
        assert!(matches!(decode(r#"{"r":5,"d":[]}"#), Err(ArrayError::Decode(_))));
        assert!(matches!(decode(r#"{"r":[1.5],"d":[1]}"#), Err(ArrayError::Decode(_))));
        assert!(matches!(decode(r#"{"r":[1],"d":7}"#), Err(ArrayError::Decode(_))));
        assert!(matches!(decode(r#"{"r":[1],"d":[1],"t":3}"#), Err(ArrayError::Decode(_))));
        assert!(matches!(decode(r#"{"r":[-1],"d":[]}"#), Err(ArrayError::Shape { .. })));
        assert!(matches!(decode_array("42"), Err(ArrayError::Decode(_))));
    }

    #[test]
    fn test_decode_oversized_shape_rejected() {
        let err = decode(r#"{"r":[4294967296,4294967296,2],"d":[1]}"#).unwrap_err();
        assert!(matches!(err, ArrayError::ShapeTooLarge { .. }));

        // product wraps to zero in unchecked usize arithmetic
        let err = decode(r#"{"r":[4294967296,4294967296,1],"d":[]}"#).unwrap_err();
        assert!(matches!(err, ArrayError::ShapeTooLarge { .. }));

        let err = decode_array(r#"{"r":[1000000000000],"d":[]}"#).unwrap_err();
        assert!(matches!(err, ArrayError::ShapeTooLarge { .. }));

        let nested = r#"{"r":[1],"d":[{"r":[1000000000000],"d":[]}]}"#;
        assert!(matches!(decode(nested), Err(ArrayError::ShapeTooLarge { .. })));

        // empty despite the huge axis
        let array = decode_array(r#"{"r":[0,1000000000000],"d":[]}"#).unwrap();
        assert!(array.is_empty());
    }

    #[test]
    fn test_nested_error_propagates() {
        let text = r#"{"r":[1],"d":[{"r":[-2],"d":[]}]}"#;
        assert!(matches!(decode(text), Err(ArrayError::Shape { .. })));
    }

    #[test]
    fn test_payload_encode() {
        let scalar = Payload::Scalar(json!({"x": 1}));
        assert_eq!(scalar.encode(), r#"{"x":1}"#);

        let array = Payload::Array(Array::text("ok"));
        assert_eq!(decode(&array.encode()).unwrap(), array);
    }

    #[test]
    fn test_array_serde_deserialize() {
        #[derive(serde::Deserialize)]
        struct Request {
            value: Array,
        }

        let request: Request =
            serde_json::from_str(r#"{"value":{"r":[2],"d":[1,2],"t":0}}"#).unwrap();
        assert_eq!(request.value.shape(), &[2]);

        let err = serde_json::from_str::<Request>(r#"{"value":7}"#);
        assert!(err.is_err());
    }
}
