//! Bit field extraction from raw byte buffers.
//!
//! All functions treat a byte buffer as a big-endian ordered bit stream: bit 0 is the most
//! significant bit of byte 0, bit 7 is the least significant bit of byte 0, bit 8 is the most
//! significant bit of byte 1 and so on. Fields are read most significant bit first.
//!
//! The default API is bounds checked and returns a [BitFieldError] if the requested field does
//! not fit into the buffer. The `*_unchecked` variants skip all checks and are therefore
//! `unsafe`.
//!
//! ## Example
//!
//! ```rust
//! use chapter10::bits;
//!
//! let buf = [0b1010_0000, 0xFF];
//! assert!(bits::is_bit_set(&buf, 0).unwrap());
//! assert_eq!(bits::unsigned(&buf, 0, 4).unwrap(), 0b1010);
//! assert_eq!(bits::signed(&buf, 0, 4).unwrap(), -6);
//! assert_eq!(bits::unsigned(&buf, 4, 8).unwrap(), 0x0F);
//! ```
#[allow(unused_imports)]
#[cfg(not(feature = "std"))]
use num_traits::float::FloatCore;

/// Largest field which can be extracted into a 64 bit integer.
pub const MAX_BIT_COUNT: usize = 64;

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BitFieldError {
    /// The field exceeds the bits available in the buffer.
    #[error("bit field at offset {offset} with {count} bits exceeds buffer of {available} bits")]
    OutOfBounds {
        offset: usize,
        count: usize,
        available: usize,
    },
    /// Only 1 to 64 bits can be extracted at once.
    #[error("invalid bit count {0}, must be between 1 and 64")]
    InvalidBitCount(usize),
}

#[inline]
fn check_field(buf: &[u8], bit_offset: usize, bit_count: usize) -> Result<(), BitFieldError> {
    if bit_count == 0 || bit_count > MAX_BIT_COUNT {
        return Err(BitFieldError::InvalidBitCount(bit_count));
    }
    let available = buf.len() * 8;
    match bit_offset.checked_add(bit_count) {
        Some(end) if end <= available => Ok(()),
        _ => Err(BitFieldError::OutOfBounds {
            offset: bit_offset,
            count: bit_count,
            available,
        }),
    }
}

/// Check whether the bit at `bit_index` is set.
pub fn is_bit_set(buf: &[u8], bit_index: usize) -> Result<bool, BitFieldError> {
    check_field(buf, bit_index, 1)?;
    // SAFETY: The bit index was checked against the buffer length.
    Ok(unsafe { is_bit_set_unchecked(buf, bit_index) })
}

/// Unchecked version of [is_bit_set].
///
/// # Safety
///
/// `bit_index` must be smaller than `buf.len() * 8`.
#[inline]
pub unsafe fn is_bit_set_unchecked(buf: &[u8], bit_index: usize) -> bool {
    let byte = *buf.get_unchecked(bit_index / 8);
    (byte >> (7 - (bit_index % 8))) & 0b1 == 1
}

/// Extract an unsigned integer with `bit_count` bits starting at `bit_offset`.
pub fn unsigned(buf: &[u8], bit_offset: usize, bit_count: usize) -> Result<u64, BitFieldError> {
    check_field(buf, bit_offset, bit_count)?;
    // SAFETY: The field was checked against the buffer length.
    Ok(unsafe { unsigned_unchecked(buf, bit_offset, bit_count) })
}

/// Unchecked version of [unsigned].
///
/// # Safety
///
/// `bit_offset + bit_count` must not exceed `buf.len() * 8` and `bit_count` must not exceed 64.
pub unsafe fn unsigned_unchecked(buf: &[u8], bit_offset: usize, bit_count: usize) -> u64 {
    let mut value = 0u64;
    for bit in bit_offset..bit_offset + bit_count {
        value = (value << 1) | is_bit_set_unchecked(buf, bit) as u64;
    }
    value
}

/// Extract a two's complement signed integer with `bit_count` bits starting at `bit_offset`.
///
/// The first bit of the field is the sign bit, the following `bit_count - 1` bits are read as
/// the remaining value bits. A set sign bit sign-extends the value to 64 bits.
pub fn signed(buf: &[u8], bit_offset: usize, bit_count: usize) -> Result<i64, BitFieldError> {
    check_field(buf, bit_offset, bit_count)?;
    // SAFETY: The field was checked against the buffer length.
    Ok(unsafe { signed_unchecked(buf, bit_offset, bit_count) })
}

/// Unchecked version of [signed].
///
/// # Safety
///
/// `bit_count` must be between 1 and 64 and `bit_offset + bit_count` must not exceed
/// `buf.len() * 8`.
pub unsafe fn signed_unchecked(buf: &[u8], bit_offset: usize, bit_count: usize) -> i64 {
    let mut raw = if bit_count > 1 {
        unsigned_unchecked(buf, bit_offset + 1, bit_count - 1)
    } else {
        0
    };
    if is_bit_set_unchecked(buf, bit_offset) {
        raw |= u64::MAX << (bit_count - 1);
    }
    raw as i64
}

/// Write the lowest `bit_count` bits of `value` into the buffer, starting at `bit_offset`.
///
/// This is the packing counterpart of [unsigned]. Bits outside of the field are not touched.
pub fn write_unsigned(
    buf: &mut [u8],
    bit_offset: usize,
    bit_count: usize,
    value: u64,
) -> Result<(), BitFieldError> {
    check_field(buf, bit_offset, bit_count)?;
    for idx in 0..bit_count {
        let bit_index = bit_offset + idx;
        let mask = 1u8 << (7 - (bit_index % 8));
        if (value >> (bit_count - 1 - idx)) & 0b1 == 1 {
            buf[bit_index / 8] |= mask;
        } else {
            buf[bit_index / 8] &= !mask;
        }
    }
    Ok(())
}

/// Write a signed value as a `bit_count` wide two's complement field.
pub fn write_signed(
    buf: &mut [u8],
    bit_offset: usize,
    bit_count: usize,
    value: i64,
) -> Result<(), BitFieldError> {
    write_unsigned(buf, bit_offset, bit_count, value as u64)
}

/// Reconstruct an IEEE-754 value from its raw representation with the given exponent and
/// mantissa widths.
fn ieee754_from_raw(raw: u64, exponent_bits: u32, mantissa_bits: u32) -> f64 {
    let negative = (raw >> (exponent_bits + mantissa_bits)) & 0b1 == 1;
    let exponent = ((raw >> mantissa_bits) & ((1 << exponent_bits) - 1)) as i32;
    let mantissa = raw & ((1 << mantissa_bits) - 1);
    let bias = (1i32 << (exponent_bits - 1)) - 1;
    let max_exponent = (1i32 << exponent_bits) - 1;
    let fraction = mantissa as f64 / (1u64 << mantissa_bits) as f64;

    let magnitude = if exponent == 0 {
        // Zero and subnormal numbers.
        fraction * 2.0f64.powi(1 - bias)
    } else if exponent == max_exponent {
        if mantissa != 0 {
            return f64::NAN;
        }
        f64::INFINITY
    } else {
        (1.0 + fraction) * 2.0f64.powi(exponent - bias)
    };
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Extract an IEEE-754 half precision value (1 sign, 5 exponent, 10 mantissa bits).
pub fn float16(buf: &[u8], bit_offset: usize) -> Result<f32, BitFieldError> {
    let raw = unsigned(buf, bit_offset, 16)?;
    Ok(ieee754_from_raw(raw, 5, 10) as f32)
}

/// Extract an IEEE-754 single precision value (1 sign, 8 exponent, 23 mantissa bits).
pub fn float32(buf: &[u8], bit_offset: usize) -> Result<f32, BitFieldError> {
    let raw = unsigned(buf, bit_offset, 32)?;
    Ok(ieee754_from_raw(raw, 8, 23) as f32)
}

/// Extract an IEEE-754 double precision value (1 sign, 11 exponent, 52 mantissa bits).
pub fn float64(buf: &[u8], bit_offset: usize) -> Result<f64, BitFieldError> {
    let raw = unsigned(buf, bit_offset, 64)?;
    Ok(ieee754_from_raw(raw, 11, 52))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_bit_order() {
        let buf = [0b1000_0001, 0b0100_0000];
        assert!(is_bit_set(&buf, 0).unwrap());
        assert!(!is_bit_set(&buf, 1).unwrap());
        assert!(is_bit_set(&buf, 7).unwrap());
        assert!(!is_bit_set(&buf, 8).unwrap());
        assert!(is_bit_set(&buf, 9).unwrap());
        assert_eq!(
            is_bit_set(&buf, 16),
            Err(BitFieldError::OutOfBounds {
                offset: 16,
                count: 1,
                available: 16
            })
        );
    }

    #[test]
    fn test_unsigned_across_byte_boundary() {
        let buf = [0x12, 0x34, 0x56, 0x78];
        assert_eq!(unsigned(&buf, 0, 8).unwrap(), 0x12);
        assert_eq!(unsigned(&buf, 4, 8).unwrap(), 0x23);
        assert_eq!(unsigned(&buf, 4, 16).unwrap(), 0x2345);
        assert_eq!(unsigned(&buf, 0, 32).unwrap(), 0x1234_5678);
        assert_eq!(unsigned(&buf, 31, 1).unwrap(), 0);
        assert_eq!(unsigned(&buf, 29, 3).unwrap(), 0);
        assert_eq!(unsigned(&buf, 28, 4).unwrap(), 0x8);
    }

    #[test]
    fn test_full_width_fields() {
        let buf = [0xFF; 9];
        assert_eq!(unsigned(&buf, 3, 64).unwrap(), u64::MAX);
        assert_eq!(signed(&buf, 5, 64).unwrap(), -1);
    }

    #[test]
    fn test_invalid_bit_count() {
        let buf = [0; 16];
        assert_eq!(unsigned(&buf, 0, 0), Err(BitFieldError::InvalidBitCount(0)));
        assert_eq!(signed(&buf, 0, 65), Err(BitFieldError::InvalidBitCount(65)));
    }

    #[test]
    fn test_out_of_bounds() {
        let buf = [0; 2];
        assert!(unsigned(&buf, 9, 8).is_err());
        assert!(unsigned(&buf, 8, 8).is_ok());
        assert!(unsigned(&buf, usize::MAX, 8).is_err());
        assert!(float32(&buf, 0).is_err());
    }

    #[test]
    fn test_signed_values() {
        let buf = [0b1110_0000];
        assert_eq!(signed(&buf, 0, 3).unwrap(), -1);
        assert_eq!(signed(&buf, 1, 3).unwrap(), -2);
        assert_eq!(signed(&buf, 2, 3).unwrap(), -4);
        assert_eq!(signed(&buf, 3, 3).unwrap(), 0);
        let buf = [0b0111_0000];
        assert_eq!(signed(&buf, 0, 4).unwrap(), 7);
    }

    #[test]
    fn test_sign_extension_minimum_values() {
        for count in 2..=64usize {
            let mut buf = [0u8; 10];
            // Sign bit only, placed off a byte boundary.
            write_unsigned(&mut buf, 3, 1, 1).unwrap();
            let expected = if count == 64 {
                i64::MIN
            } else {
                -(1i64 << (count - 1))
            };
            assert_eq!(signed(&buf, 3, count).unwrap(), expected, "count {count}");
        }
    }

    #[test_case(0xDEAD_BEEF_CAFE_F00D ; "mixed pattern")]
    #[test_case(u64::MAX ; "all ones")]
    #[test_case(0x8000_0000_0000_0001 ; "outer bits")]
    fn test_written_fields_read_back(pattern: u64) {
        for bit_count in 1..=MAX_BIT_COUNT {
            let shift = (MAX_BIT_COUNT - bit_count) as u32;
            let value = pattern & (u64::MAX >> shift);
            let expected_signed = ((value << shift) as i64) >> shift;
            for offset in [0usize, 1, 5, 8, 11, 15] {
                let mut buf = [0xA5u8; 10];
                write_unsigned(&mut buf, offset, bit_count, value).unwrap();
                assert_eq!(
                    unsigned(&buf, offset, bit_count).unwrap(),
                    value,
                    "count {bit_count} offset {offset}"
                );
                assert_eq!(
                    signed(&buf, offset, bit_count).unwrap(),
                    expected_signed,
                    "count {bit_count} offset {offset}"
                );
            }
        }
    }

    #[test]
    fn test_write_preserves_neighbours() {
        let mut buf = [0xFF, 0xFF];
        write_unsigned(&mut buf, 4, 8, 0).unwrap();
        assert_eq!(buf, [0xF0, 0x0F]);
    }

    #[test]
    fn test_signed_written_fields_read_back() {
        let mut buf = [0u8; 4];
        write_signed(&mut buf, 3, 12, -1234).unwrap();
        assert_eq!(signed(&buf, 3, 12).unwrap(), -1234);
        write_signed(&mut buf, 17, 9, 200).unwrap();
        assert_eq!(signed(&buf, 17, 9).unwrap(), 200);
    }

    #[test]
    fn test_float16() {
        assert_eq!(float16(&[0x3C, 0x00], 0).unwrap(), 1.0);
        assert_eq!(float16(&[0xC0, 0x00], 0).unwrap(), -2.0);
        assert_eq!(float16(&[0x7B, 0xFF], 0).unwrap(), 65504.0);
        assert_eq!(float16(&[0x35, 0x55], 0).unwrap(), 0.333_251_95);
        assert_eq!(float16(&[0x00, 0x01], 0).unwrap(), f32::from_bits(0x3380_0000));
        assert_eq!(float16(&[0x80, 0x00], 0).unwrap(), 0.0);
        assert_eq!(float16(&[0x7C, 0x00], 0).unwrap(), f32::INFINITY);
        assert_eq!(float16(&[0xFC, 0x00], 0).unwrap(), f32::NEG_INFINITY);
        assert!(float16(&[0x7E, 0x00], 0).unwrap().is_nan());
    }

    #[test]
    fn test_float32_matches_native_decoding() {
        for value in [
            0.0f32,
            1.0,
            -1.5,
            core::f32::consts::PI,
            f32::MAX,
            f32::MIN_POSITIVE,
            1.0e-40,
            -7.25e12,
        ] {
            let raw = value.to_bits().to_be_bytes();
            assert_eq!(float32(&raw, 0).unwrap(), value);
        }
        assert_eq!(float32(&[0x7F, 0x80, 0, 0], 0).unwrap(), f32::INFINITY);
        assert!(float32(&[0x7F, 0xC0, 0, 0], 0).unwrap().is_nan());
    }

    #[test]
    fn test_float32_at_bit_offset() {
        let mut buf = [0u8; 6];
        write_unsigned(&mut buf, 5, 32, (-42.5f32).to_bits() as u64).unwrap();
        assert_eq!(float32(&buf, 5).unwrap(), -42.5);
    }

    #[test]
    fn test_float64_matches_native_decoding() {
        for value in [
            0.0f64,
            -0.1,
            core::f64::consts::E,
            f64::MAX,
            f64::MIN_POSITIVE,
            5.0e-324,
            123_456_789.987_654_32,
        ] {
            let raw = value.to_bits().to_be_bytes();
            assert_eq!(float64(&raw, 0).unwrap(), value);
        }
        let mut buf = [0u8; 10];
        write_unsigned(&mut buf, 7, 64, f64::NEG_INFINITY.to_bits()).unwrap();
        assert_eq!(float64(&buf, 7).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_unchecked_matches_checked() {
        let buf = [0xC3, 0x5A, 0x0F];
        // SAFETY: All fields are inside the 24 bit buffer.
        unsafe {
            assert!(is_bit_set_unchecked(&buf, 0));
            assert_eq!(unsigned_unchecked(&buf, 2, 12), unsigned(&buf, 2, 12).unwrap());
            assert_eq!(signed_unchecked(&buf, 8, 16), signed(&buf, 8, 16).unwrap());
        }
    }
}
