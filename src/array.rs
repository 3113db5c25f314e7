//! Dense multidimensional arrays with row-major storage.
//!
//! An [`Array`] is a shape vector, a flat element vector whose length is
//! always the product of the shape, and a [`TypeTag`] fixed at construction.
//!
//! # Construction
//!
//! ```ignore
//! use aplbridge::{Array, Element, IndexOrigin, TypeTag};
//!
//! let data = (1..=6).map(|n: i64| Element::from(n)).collect();
//! let mut matrix = Array::new(vec![2, 3], data, None);
//! assert_eq!(matrix.tag(), TypeTag::Numeric);
//!
//! matrix.set(&[1, 2], IndexOrigin::ZERO, Element::from(60i64))?;
//! ```
//!
//! # Length mismatches
//!
//! Construction never fails on a data/shape mismatch. Missing elements are
//! filled with the tag's prototype (`0` or `' '`, see
//! [`TypeTag::prototype`]) and excess elements are dropped. Both cases are
//! logged at debug level since they mean the sender produced a lossy array.

mod element;
pub mod shape;
mod tag;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

pub use element::{Element, OtherValue};
pub use shape::IndexOrigin;
pub use tag::{infer_tag, TypeTag};

use crate::error::Result;

/// A rectangular array of [`Element`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    shape: Vec<usize>,
    data: Vec<Element>,
    tag: TypeTag,
}

impl Array {
    /// Build an array from a shape and flat row-major data.
    ///
    /// When `tag` is `None` it is inferred from the supplied data (see
    /// [`infer_tag`]) before any padding happens.
    ///
    /// # Panics
    ///
    /// Panics if the shape's element count overflows `usize`, or if padding
    /// would grow the data past [`shape::MAX_ELEMENTS`]. Use
    /// [`Array::try_new`] for shapes from untrusted input.
    pub fn new(shape: Vec<usize>, mut data: Vec<Element>, tag: Option<TypeTag>) -> Self {
        let tag = tag.unwrap_or_else(|| infer_tag(&data));
        let required = match shape::element_count(&shape) {
            Some(count) if count <= shape::MAX_ELEMENTS || count <= data.len() => count,
            _ => panic!(
                "shape {:?} describes more than {} elements",
                shape,
                shape::MAX_ELEMENTS
            ),
        };

        if data.len() < required {
            tracing::debug!(
                "Padding array data from {} to {} elements (shape {:?})",
                data.len(),
                required,
                shape
            );
            data.resize(required, tag.prototype());
        } else if data.len() > required {
            tracing::debug!(
                "Truncating array data from {} to {} elements (shape {:?})",
                data.len(),
                required,
                shape
            );
            data.truncate(required);
        }

        Self { shape, data, tag }
    }

    /// Checked [`Array::new`].
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::ShapeTooLarge`](crate::ArrayError::ShapeTooLarge)
    /// if the shape describes more than [`shape::MAX_ELEMENTS`] elements.
    pub fn try_new(shape: Vec<usize>, data: Vec<Element>, tag: Option<TypeTag>) -> Result<Self> {
        shape::check_shape(&shape)?;
        Ok(Self::new(shape, data, tag))
    }

    /// Build an array from a signed dimension vector.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::Shape`](crate::ArrayError::Shape) if any
    /// dimension is negative, and
    /// [`ArrayError::ShapeTooLarge`](crate::ArrayError::ShapeTooLarge) as for
    /// [`Array::try_new`].
    pub fn from_dims(dims: &[i64], data: Vec<Element>, tag: Option<TypeTag>) -> Result<Self> {
        let shape = shape::validate_dims(dims)?;
        Ok(Self::new(shape, data, tag))
    }

    /// A rank-0 array holding a single element.
    pub fn scalar(element: Element, tag: TypeTag) -> Self {
        Self::new(Vec::new(), vec![element], Some(tag))
    }

    /// A rank-1 array with an inferred tag.
    pub fn vector(data: Vec<Element>) -> Self {
        Self::new(vec![data.len()], data, None)
    }

    /// A character vector, tagged [`TypeTag::Character`] even when empty.
    pub fn text(text: &str) -> Self {
        let data: Vec<Element> = text.chars().map(Element::Char).collect();
        Self::new(vec![data.len()], data, Some(TypeTag::Character))
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Number of stored elements (the product of the shape).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat row-major storage.
    pub fn data(&self) -> &[Element] {
        &self.data
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn into_parts(self) -> (Vec<usize>, Vec<Element>, TypeTag) {
        (self.shape, self.data, self.tag)
    }

    pub fn strides(&self) -> Vec<usize> {
        shape::strides(&self.shape)
    }

    /// See [`shape::check_valid_index`].
    pub fn check_valid_index(&self, index: &[i64], origin: IndexOrigin) -> Result<()> {
        shape::check_valid_index(&self.shape, index, origin)
    }

    /// See [`shape::flatten_index`].
    pub fn flatten_index(&self, index: &[i64], origin: IndexOrigin) -> Result<usize> {
        shape::flatten_index(&self.shape, index, origin)
    }

    pub fn unflatten_index(&self, offset: usize, origin: IndexOrigin) -> Option<Vec<i64>> {
        shape::unflatten_index(&self.shape, offset, origin)
    }

    /// Read the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns `RankMismatch` or `IndexOutOfRange` for an invalid index.
    pub fn get(&self, index: &[i64], origin: IndexOrigin) -> Result<&Element> {
        let offset = self.flatten_index(index, origin)?;
        Ok(&self.data[offset])
    }

    pub fn get_mut(&mut self, index: &[i64], origin: IndexOrigin) -> Result<&mut Element> {
        let offset = self.flatten_index(index, origin)?;
        Ok(&mut self.data[offset])
    }

    /// Replace the element at `index`, returning the previous one.
    ///
    /// The shape and tag are unchanged. On error storage is not touched.
    pub fn set(&mut self, index: &[i64], origin: IndexOrigin, value: Element) -> Result<Element> {
        let slot = self.get_mut(index, origin)?;
        Ok(std::mem::replace(slot, value))
    }

    /// Iterate elements in storage order together with their coordinates.
    pub fn indexed_iter(
        &self,
        origin: IndexOrigin,
    ) -> impl Iterator<Item = (Vec<i64>, &Element)> + '_ {
        self.data.iter().enumerate().filter_map(move |(offset, element)| {
            shape::unflatten_index(&self.shape, offset, origin).map(|index| (index, element))
        })
    }

    /// The wire object `{"r": shape, "d": data, "t": tag}`.
    pub fn to_json(&self) -> Value {
        let data: Vec<Value> = self.data.iter().map(Element::to_json).collect();
        json!({
            "r": self.shape,
            "d": data,
            "t": self.tag.code(),
        })
    }
}

impl Serialize for Array {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Array", 3)?;
        state.serialize_field("r", &self.shape)?;
        state.serialize_field("d", &self.data)?;
        state.serialize_field("t", &self.tag)?;
        state.end()
    }
}
