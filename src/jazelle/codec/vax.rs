//! VAX floating point to IEEE-754 conversion.
//!
//! Jazelle files were written on VAX hardware. Single precision values use the
//! F_floating layout and double precision values the D_floating layout; both
//! store 16-bit words little-endian but with the most significant word first,
//! and both use an exponent bias of 128 with the hidden bit worth 0.5.
//!
//! ```text
//! F_floating after word swap:
//!  31 | 30 ........ 23 | 22 ................ 0
//! sign| exponent (128) | fraction (hidden 0.1)
//! ```
//!
//! A VAX value is `0.1f × 2^(e-128)`, i.e. `1.f × 2^(e-129)`, so the IEEE
//! exponent field is the VAX one minus 2 for singles and plus 894 for doubles.

use byteorder::{ByteOrder, LittleEndian};

use crate::jazelle::types::error::{JazelleError, Result};
use crate::jazelle::types::options::FloatPolicy;

const F_SIGN: u32 = 0x8000_0000;
const F_FRACTION: u32 = 0x007F_FFFF;
const F_HIDDEN: u32 = 0x0080_0000;
/// Two steps of the F_floating exponent field.
const F_REBIAS: u32 = 0x0100_0000;

const D_SIGN: u64 = 0x8000_0000_0000_0000;
const D_FRACTION: u64 = (1 << 55) - 1;
const D_REBIAS: u64 = 1023 - 129;

/// Reassembles the four bytes of an F_floating value into sign/exponent/fraction order.
pub fn f_bits(bytes: [u8; 4]) -> u32 {
    let high = LittleEndian::read_u16(&bytes[0..2]) as u32;
    let low = LittleEndian::read_u16(&bytes[2..4]) as u32;
    (high << 16) | low
}

/// Reassembles the eight bytes of a D_floating value into sign/exponent/fraction order.
pub fn d_bits(bytes: [u8; 8]) -> u64 {
    bytes
        .chunks_exact(2)
        .fold(0u64, |acc, word| (acc << 16) | LittleEndian::read_u16(word) as u64)
}

/// Converts a VAX F_floating value to an IEEE single.
///
/// Exponent zero with a clear sign bit is zero whatever the fraction holds.
/// Exponent zero with the sign bit set is the VAX reserved operand and fails
/// with [`JazelleError::NumericDecode`].
pub fn decode_f32(bytes: [u8; 4]) -> Result<f32> {
    let bits = f_bits(bytes);
    let exponent = (bits >> 23) & 0xFF;

    if exponent == 0 {
        if bits & F_SIGN != 0 {
            return Err(JazelleError::NumericDecode { width: 32, bits: bits as u64 });
        }
        return Ok(0.0);
    }

    if exponent > 2 {
        return Ok(f32::from_bits(bits - F_REBIAS));
    }

    // Lands in the IEEE subnormal range; the product is exact in f64.
    let mantissa = (bits & F_FRACTION) | F_HIDDEN;
    let magnitude = (mantissa as f64 * 2f64.powi(exponent as i32 - 152)) as f32;
    Ok(if bits & F_SIGN != 0 { -magnitude } else { magnitude })
}

/// Converts a VAX D_floating value to an IEEE double.
///
/// D_floating carries 55 fraction bits; the three lowest are truncated. Its
/// exponent range sits well inside the IEEE one, so no value over- or underflows.
pub fn decode_f64(bytes: [u8; 8]) -> Result<f64> {
    let bits = d_bits(bytes);
    let exponent = (bits >> 55) & 0xFF;

    if exponent == 0 {
        if bits & D_SIGN != 0 {
            return Err(JazelleError::NumericDecode { width: 64, bits });
        }
        return Ok(0.0);
    }

    let fraction = (bits & D_FRACTION) >> 3;
    let ieee = (bits & D_SIGN) | ((exponent + D_REBIAS) << 52) | fraction;
    Ok(f64::from_bits(ieee))
}

/// [`decode_f32`] with reserved operands handled according to `policy`.
pub fn decode_f32_with(bytes: [u8; 4], policy: FloatPolicy) -> Result<f32> {
    match (decode_f32(bytes), policy) {
        (Err(JazelleError::NumericDecode { .. }), FloatPolicy::Nan) => Ok(f32::NAN),
        (result, _) => result,
    }
}

/// [`decode_f64`] with reserved operands handled according to `policy`.
pub fn decode_f64_with(bytes: [u8; 8], policy: FloatPolicy) -> Result<f64> {
    match (decode_f64(bytes), policy) {
        (Err(JazelleError::NumericDecode { .. }), FloatPolicy::Nan) => Ok(f64::NAN),
        (result, _) => result,
    }
}
