//! The sum type stored for every decoded tag.

use self::Value::{Ascii, Double, Float, List, Long, Rational, SRational, Signed, Undefined};

/// A single decoded tag value.
///
/// All integral TIFF formats up to 32 bits widen into `Signed`; `Long`
/// exists for the one place a full unsigned 32-bit value must survive
/// (the Kodak exposure-time field). Arrays of any element are a `List`.
/// Rational pairs are stored exactly as read: never reduced, and a zero
/// denominator is preserved rather than rejected.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// Any integral value up to 32 bits, sign-widened
    Signed(i32),
    /// A value that does not fit the signed 32-bit slot
    Long(i64),
    /// 32-bit IEEE floating point
    Float(f32),
    /// 64-bit IEEE floating point
    Double(f64),
    /// Unsigned fraction as (numerator, denominator)
    Rational(u32, u32),
    /// Signed fraction as (numerator, denominator)
    SRational(i32, i32),
    /// NUL-terminated or fixed-length string data
    Ascii(String),
    /// Raw bytes whose meaning depends on the tag
    Undefined(Vec<u8>),
    /// An array of values of a single format
    List(Vec<Value>),
}

impl Value {
    /// The value as a signed 32-bit integer, if it is one.
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Signed(val) => Some(val),
            Long(val) => i32::try_from(val).ok(),
            _ => None,
        }
    }

    /// The value as a 64-bit integer, if it is integral.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Signed(val) => Some(i64::from(val)),
            Long(val) => Some(val),
            _ => None,
        }
    }

    /// The value as string data, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Ascii(ref val) => Some(val),
            _ => None,
        }
    }

    /// The value as raw bytes, if it is an `Undefined` blob.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match *self {
            Undefined(ref val) => Some(val),
            _ => None,
        }
    }

    /// The elements of an array value, if it is one.
    pub fn as_list(&self) -> Option<&[Value]> {
        match *self {
            List(ref val) => Some(val),
            _ => None,
        }
    }

    /// The value as an `f64`, converting rationals and narrower floats.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Signed(val) => Some(f64::from(val)),
            Long(val) => Some(val as f64),
            Float(val) => Some(f64::from(val)),
            Double(val) => Some(val),
            Rational(num, den) => Some(f64::from(num) / f64::from(den)),
            SRational(num, den) => Some(f64::from(num) / f64::from(den)),
            _ => None,
        }
    }
}
