//! APL array bridge library
//!
//! This library provides the array model and wire codec used to exchange
//! arrays between an APL host and a companion process:
//!
//! - `array` - Dense row-major arrays, index flattening, type tags
//! - `convert` - Host values to arrays, with top-level enclosing
//! - `codec` - JSON encoding and schema-checked decoding
//! - `ipc` - Line framing and the localhost connection to the host
//!
//! # Codec
//!
//! ```ignore
//! use aplbridge::{codec, convert};
//! use serde_json::json;
//!
//! let array = convert::from_value(&json!([[1, 2], "ab"]))?;
//! let text = codec::encode(&array);
//! let back = codec::decode_array(&text)?;
//! assert_eq!(back, array);
//! ```

pub mod array;
pub mod codec;
pub mod convert;
pub mod error;
pub mod ipc;

pub use array::{infer_tag, Array, Element, IndexOrigin, OtherValue, TypeTag};
pub use codec::{decode, decode_array, encode, Payload};
pub use convert::from_value;
pub use error::{ArrayError, Result};
