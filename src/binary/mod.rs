//! Fixed-width two's-complement words.
//!
//! This module provides the conversions used to render machine values:
//! - [`encode`] / [`decode`] - integer to bit string and back
//! - [`encode_wrapping`] - display encoding that keeps the low bits
//! - [`Word`] - a value paired with its width, printed as bits

mod codec;
mod word;

pub use codec::{decode, encode, encode_wrapping, CodecError, MAX_WIDTH};
pub use word::Word;

/// Default word width of the machine, in bits.
pub const DEFAULT_WIDTH: u32 = 30;
