//! Conversion between signed integers and two's-complement bit strings.
//!
//! Bit strings are written most significant bit first, the way they are
//! printed in the machine state dump.

use crate::error::ErrorKind;
use thiserror::Error;

/// Widest word the codec accepts.
pub const MAX_WIDTH: u32 = 64;

/// Encode `value` as a two's-complement bit string of exactly `width` bits.
///
/// Non-negative values are plain binary, zero-padded on the left. Negative
/// values are encoded as `(1 << width) + value`.
///
/// Fails with [`CodecError::Overflow`] if `value` is outside
/// `[-2^(width-1), 2^(width-1))`.
pub fn encode(value: i64, width: u32) -> Result<String, CodecError> {
    check_width(width)?;
    if !fits(value, width) {
        return Err(CodecError::Overflow { value, width });
    }
    Ok(to_bits(value, width))
}

/// Encode `value` keeping only its low `width` bits.
///
/// Always returns exactly `width` characters. Widths outside `1..=64` are
/// clamped into that range.
pub fn encode_wrapping(value: i64, width: u32) -> String {
    to_bits(value, width.clamp(1, MAX_WIDTH))
}

/// Decode a two's-complement bit string.
///
/// A leading `1` marks a negative value: the result is the base-2 value of
/// the string minus `2^len`.
pub fn decode(bits: &str) -> Result<i64, CodecError> {
    if bits.is_empty() {
        return Err(CodecError::InvalidEncoding {
            bits: String::new(),
            reason: "empty bit string".into(),
        });
    }

    let mut raw: u64 = 0;
    let mut width: u32 = 0;
    for c in bits.chars() {
        let bit = match c {
            '0' => 0,
            '1' => 1,
            _ => {
                return Err(CodecError::InvalidEncoding {
                    bits: bits.to_string(),
                    reason: format!("invalid character {c:?}"),
                })
            }
        };
        width += 1;
        if width > MAX_WIDTH {
            return Err(CodecError::InvalidEncoding {
                bits: bits.to_string(),
                reason: format!("wider than {MAX_WIDTH} bits"),
            });
        }
        raw = (raw << 1) | bit;
    }

    if bits.starts_with('1') {
        Ok((i128::from(raw) - (1i128 << width)) as i64)
    } else {
        Ok(raw as i64)
    }
}

/// Whether `value` is representable in `width` bits of two's complement.
pub(crate) fn fits(value: i64, width: u32) -> bool {
    if width == 0 || width > MAX_WIDTH {
        return false;
    }
    let half = 1i128 << (width - 1);
    let value = i128::from(value);
    value >= -half && value < half
}

fn check_width(width: u32) -> Result<(), CodecError> {
    if width == 0 || width > MAX_WIDTH {
        return Err(CodecError::InvalidWidth(width));
    }
    Ok(())
}

fn to_bits(value: i64, width: u32) -> String {
    let mask = if width >= 64 { u64::MAX } else { (1u64 << width) - 1 };
    let raw = (value as u64) & mask;
    format!("{:0width$b}", raw, width = width as usize)
}

/// Errors produced by the word codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid word width {0} (expected 1..={max})", max = MAX_WIDTH)]
    InvalidWidth(u32),

    #[error("value {value} does not fit in {width} bits")]
    Overflow { value: i64, width: u32 },

    #[error("invalid bit string {bits:?}: {reason}")]
    InvalidEncoding { bits: String, reason: String },
}

impl CodecError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::InvalidWidth(_) => ErrorKind::InvalidWidth,
            CodecError::Overflow { .. } => ErrorKind::Overflow,
            CodecError::InvalidEncoding { .. } => ErrorKind::InvalidEncoding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_small_values() {
        assert_eq!(encode(5, 4).unwrap(), "0101");
        assert_eq!(encode(0, 4).unwrap(), "0000");
        assert_eq!(encode(7, 4).unwrap(), "0111");
        assert_eq!(encode(-1, 4).unwrap(), "1111");
        assert_eq!(encode(-8, 4).unwrap(), "1000");
        assert_eq!(encode(0, 30).unwrap(), "0".repeat(30));
    }

    #[test]
    fn test_encode_full_width() {
        assert_eq!(encode(i64::MIN, 64).unwrap(), format!("1{}", "0".repeat(63)));
        assert_eq!(encode(-1, 64).unwrap(), "1".repeat(64));
        assert_eq!(decode(&"1".repeat(64)).unwrap(), -1);
        assert_eq!(decode(&format!("0{}", "1".repeat(63))).unwrap(), i64::MAX);
    }

    #[test]
    fn test_encode_overflow() {
        assert_eq!(encode(8, 4), Err(CodecError::Overflow { value: 8, width: 4 }));
        assert_eq!(encode(-9, 4), Err(CodecError::Overflow { value: -9, width: 4 }));
        assert_eq!(encode(1, 0), Err(CodecError::InvalidWidth(0)));
        assert_eq!(encode(1, 65), Err(CodecError::InvalidWidth(65)));
    }

    #[test]
    fn test_encode_wrapping_keeps_low_bits() {
        assert_eq!(encode_wrapping(5, 4), "0101");
        assert_eq!(encode_wrapping(21, 4), "0101");
        assert_eq!(encode_wrapping(-1, 4), "1111");
        assert_eq!(encode_wrapping(-6, 4), "1010");
        assert_eq!(encode_wrapping(3, 0), "1");
    }

    #[test]
    fn test_fits_rejects_bad_widths() {
        assert!(!fits(0, 0));
        assert!(!fits(0, 65));
        assert!(fits(-1, 1));
        assert!(!fits(1, 1));
    }

    #[test]
    fn test_decode_values() {
        assert_eq!(decode("0101").unwrap(), 5);
        assert_eq!(decode("1111").unwrap(), -1);
        assert_eq!(decode("1000").unwrap(), -8);
        assert_eq!(decode("0").unwrap(), 0);
        assert_eq!(decode("1").unwrap(), -1);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let err = decode("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidEncoding);

        let err = decode("01x1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidEncoding);

        let err = decode(&"0".repeat(65)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidEncoding);
    }

    fn value_and_width() -> impl Strategy<Value = (i64, u32)> {
        (4u32..=32).prop_flat_map(|width| {
            let half = 1i64 << (width - 1);
            (-half..half, Just(width))
        })
    }

    proptest! {
        #[test]
        fn prop_roundtrip((value, width) in value_and_width()) {
            let bits = encode(value, width).unwrap();
            prop_assert_eq!(decode(&bits).unwrap(), value);
        }

        #[test]
        fn prop_width_invariant((value, width) in value_and_width()) {
            prop_assert_eq!(encode(value, width).unwrap().len(), width as usize);
        }

        #[test]
        fn prop_wrapping_matches_checked((value, width) in value_and_width()) {
            prop_assert_eq!(encode_wrapping(value, width), encode(value, width).unwrap());
        }
    }
}
