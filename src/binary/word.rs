//! A machine value paired with the width it is displayed at.

use std::fmt;
use serde::{Serialize, Deserialize};
use crate::binary::codec::{self, CodecError, MAX_WIDTH};

/// A signed value together with its word width.
///
/// `Display` renders the two's-complement bit string, which is how every
/// register appears in the state dump.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWord")]
pub struct Word {
    value: i64,
    width: u32,
}

/// Serialized form of [`Word`], checked on the way in.
#[derive(Deserialize)]
struct RawWord {
    value: i64,
    width: u32,
}

impl TryFrom<RawWord> for Word {
    type Error = CodecError;

    fn try_from(raw: RawWord) -> Result<Self, Self::Error> {
        if raw.width == 0 || raw.width > MAX_WIDTH {
            return Err(CodecError::InvalidWidth(raw.width));
        }
        Ok(Self::wrapping(raw.value, raw.width))
    }
}

impl Word {
    /// Create a word, checking that `value` fits in `width` bits.
    pub fn new(value: i64, width: u32) -> Result<Self, CodecError> {
        if width == 0 || width > MAX_WIDTH {
            return Err(CodecError::InvalidWidth(width));
        }
        if !codec::fits(value, width) {
            return Err(CodecError::Overflow { value, width });
        }
        Ok(Self { value, width })
    }

    /// Create a word without a range check.
    ///
    /// The value is kept as-is; only its low `width` bits are shown when
    /// the word is displayed.
    pub fn wrapping(value: i64, width: u32) -> Self {
        Self { value, width: width.clamp(1, MAX_WIDTH) }
    }

    /// Create a zero word. Widths outside `1..=64` are clamped.
    pub const fn zero(width: u32) -> Self {
        let width = if width == 0 {
            1
        } else if width > MAX_WIDTH {
            MAX_WIDTH
        } else {
            width
        };
        Self { value: 0, width }
    }

    /// Parse from a bit string like "0101" or "0b0101".
    ///
    /// The width is the number of bits given.
    pub fn parse(s: &str) -> Result<Self, CodecError> {
        let s = s.trim();
        let s = s.strip_prefix("0b").unwrap_or(s);
        let value = codec::decode(s)?;
        Ok(Self { value, width: s.chars().count() as u32 })
    }

    /// The signed value.
    #[inline]
    pub const fn value(&self) -> i64 {
        self.value
    }

    /// The width in bits.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Check if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.value < 0
    }

    /// Check whether the value fits the width without wrapping.
    pub fn fits(&self) -> bool {
        codec::fits(self.value, self.width)
    }

    /// The bit string shown for this word.
    pub fn to_bits(&self) -> String {
        codec::encode_wrapping(self.value, self.width)
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word(0b{} = {})", self.to_bits(), self.value)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bits())
    }
}
