//! Shape arithmetic and row-major index flattening.
//!
//! All functions here work on a bare shape slice so that they can be shared
//! by [`Array`](crate::Array) and by the codec before an array exists.
//!
//! # Layout
//!
//! Storage is row-major: the last dimension varies fastest. For a shape
//! `[s0, s1, ..., sn]` the stride of dimension `d` is the product of
//! `s[d+1..]`, so the last dimension always has stride 1.
//!
//! ```text
//! shape [2, 3]      strides [3, 1]
//!
//!   (0,0) (0,1) (0,2)        0 1 2
//!   (1,0) (1,1) (1,2)   ->   3 4 5
//! ```

use crate::error::{ArrayError, Result};

/// The value denoting the first valid index along every dimension.
///
/// APL calls this the index origin (`⎕IO`). It is applied uniformly to all
/// dimensions and never changes the storage layout, only how coordinates
/// are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexOrigin(pub i64);

impl IndexOrigin {
    /// 0-based coordinates.
    pub const ZERO: IndexOrigin = IndexOrigin(0);
    /// 1-based coordinates.
    pub const ONE: IndexOrigin = IndexOrigin(1);
}

impl Default for IndexOrigin {
    fn default() -> Self {
        IndexOrigin::ZERO
    }
}

/// Most elements a shape taken from untrusted input may describe.
///
/// A wire line spends at least two bytes per element, so a line within
/// [`MAX_MESSAGE_SIZE`](crate::ipc::MAX_MESSAGE_SIZE) never carries more.
pub const MAX_ELEMENTS: usize = 32 * 1024 * 1024;

/// Number of elements an array of this shape stores, or `None` if the
/// product overflows `usize`.
///
/// The empty shape (rank 0) holds exactly one element.
pub fn element_count(shape: &[usize]) -> Option<usize> {
    if shape.contains(&0) {
        return Some(0);
    }
    shape
        .iter()
        .try_fold(1usize, |count, &dim| count.checked_mul(dim))
}

/// Check that a shape describes at most [`MAX_ELEMENTS`] elements.
///
/// # Errors
///
/// Returns [`ArrayError::ShapeTooLarge`] if the element count overflows or
/// exceeds the limit.
pub fn check_shape(shape: &[usize]) -> Result<usize> {
    match element_count(shape) {
        Some(count) if count <= MAX_ELEMENTS => Ok(count),
        _ => Err(ArrayError::ShapeTooLarge {
            shape: shape.to_vec(),
            limit: MAX_ELEMENTS,
        }),
    }
}

/// Validate a signed dimension vector.
///
/// # Errors
///
/// - [`ArrayError::Shape`] naming the first negative dimension
/// - [`ArrayError::ShapeTooLarge`] as for [`check_shape`]
pub fn validate_dims(dims: &[i64]) -> Result<Vec<usize>> {
    let shape = dims
        .iter()
        .enumerate()
        .map(|(axis, &dim)| {
            usize::try_from(dim).map_err(|_| ArrayError::Shape {
                shape: dims.to_vec(),
                axis,
            })
        })
        .collect::<Result<Vec<usize>>>()?;

    check_shape(&shape)?;
    Ok(shape)
}

/// Row-major strides for `shape`.
///
/// Strides saturate instead of overflowing. They are exact whenever the
/// element count is non-zero and fits in `usize`; a shape with a zero
/// dimension has no valid index to flatten.
pub fn strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for d in (0..shape.len().saturating_sub(1)).rev() {
        strides[d] = strides[d + 1].saturating_mul(shape[d + 1]);
    }
    strides
}

/// Check that `index` addresses an element of an array with this shape.
///
/// # Errors
///
/// - [`ArrayError::RankMismatch`] if `index.len()` differs from the rank
/// - [`ArrayError::IndexOutOfRange`] if any component, after subtracting
///   `origin`, lies outside `[0, shape[d])`
pub fn check_valid_index(shape: &[usize], index: &[i64], origin: IndexOrigin) -> Result<()> {
    if index.len() != shape.len() {
        return Err(ArrayError::RankMismatch {
            rank: shape.len(),
            got: index.len(),
        });
    }

    for (axis, (&ix, &size)) in index.iter().zip(shape).enumerate() {
        let in_range = ix
            .checked_sub(origin.0)
            .and_then(|adjusted| usize::try_from(adjusted).ok())
            .is_some_and(|adjusted| adjusted < size);

        if !in_range {
            return Err(ArrayError::IndexOutOfRange {
                index: index.to_vec(),
                shape: shape.to_vec(),
                axis,
                origin: origin.0,
            });
        }
    }

    Ok(())
}

/// Map an n-dimensional coordinate to its offset in flat storage.
///
/// The offset is `Σ (index[d] - origin) * stride[d]`. The index is validated
/// first, so the returned offset is always within storage.
///
/// # Errors
///
/// Same as [`check_valid_index`].
pub fn flatten_index(shape: &[usize], index: &[i64], origin: IndexOrigin) -> Result<usize> {
    check_valid_index(shape, index, origin)?;

    let offset = index
        .iter()
        .zip(strides(shape))
        .map(|(&ix, stride)| (ix - origin.0) as usize * stride)
        .sum();

    Ok(offset)
}

/// Inverse of [`flatten_index`]: the coordinate stored at `offset`.
///
/// Returns `None` when `offset` is past the end of storage.
pub fn unflatten_index(shape: &[usize], offset: usize, origin: IndexOrigin) -> Option<Vec<i64>> {
    if element_count(shape).map_or(true, |count| offset >= count) {
        return None;
    }

    let mut remainder = offset;
    let index = strides(shape)
        .into_iter()
        .map(|stride| {
            let component = remainder / stride;
            remainder %= stride;
            component as i64 + origin.0
        })
        .collect();

    Some(index)
}
