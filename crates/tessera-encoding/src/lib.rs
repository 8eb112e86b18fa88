//! Canonical binary encoding for tessera objects.
//!
//! The layout is the contract between whoever writes objects into a store and
//! the want walker that later skips through them without decoding:
//!
//! | Kind | Wire layout |
//! |---|---|
//! | `bool`, `i8`, `u8` | 1 byte |
//! | `i16`, `u16` | 2 bytes |
//! | `i32`, `u32`, `f32` | 4 bytes |
//! | `i64`, `u64`, `f64` | 8 bytes |
//! | string | `u32` byte length + UTF-8 bytes |
//! | array `[T; N]` | N elements, no prefix |
//! | slice `Vec<T>` | `u32` element count + elements |
//! | struct | fields in declared order, no padding, no tags |
//! | [`Reference`](tessera_types::Reference) | 32 raw bytes |
//! | [`References`](tessera_types::References) | `u32` count + N × 32 bytes |
//! | [`Dynamic`](tessera_types::Dynamic) | 64 raw bytes |
//!
//! All integers are little-endian. Decoding never reads past the end of the
//! buffer: a length that overruns it is [`EncodingError::Truncated`].

pub mod codec;
pub mod error;
pub mod traits;

pub use codec::{Decoder, Encoder, LENGTH_PREFIX_SIZE};
pub use error::{EncodingError, EncodingResult};
pub use traits::{decode_from_slice, encode_to_vec, Decode, Encode};
