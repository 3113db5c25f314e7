//! Element-kind classification for arrays.

use serde::{Deserialize, Serialize};

use super::Element;
use crate::error::ArrayError;

/// Whether an array holds numbers or characters.
///
/// On the wire the tag travels as an integer in the `t` field:
/// `0` for numeric and `1` for character data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TypeTag {
    #[default]
    Numeric,
    Character,
}

impl TypeTag {
    /// Wire code for this tag.
    pub fn code(self) -> u8 {
        match self {
            TypeTag::Numeric => 0,
            TypeTag::Character => 1,
        }
    }

    /// Fill element used when an array is built with too little data.
    ///
    /// Zero for numeric arrays, a blank for character arrays.
    pub fn prototype(self) -> Element {
        match self {
            TypeTag::Numeric => Element::Number(0.into()),
            TypeTag::Character => Element::Char(' '),
        }
    }
}

impl From<TypeTag> for u8 {
    fn from(tag: TypeTag) -> Self {
        tag.code()
    }
}

impl TryFrom<u8> for TypeTag {
    type Error = ArrayError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TypeTag::Numeric),
            1 => Ok(TypeTag::Character),
            other => Err(ArrayError::Decode(format!("unknown type tag {}", other))),
        }
    }
}

/// Infer a tag from the first element of `data`.
///
/// A nested array passes its own tag up, a character means
/// [`TypeTag::Character`], anything else is numeric. Empty data carries no
/// evidence and is assumed numeric.
pub fn infer_tag(data: &[Element]) -> TypeTag {
    match data.first() {
        Some(Element::Array(nested)) => nested.tag(),
        Some(Element::Char(_)) => TypeTag::Character,
        Some(_) | None => TypeTag::Numeric,
    }
}
