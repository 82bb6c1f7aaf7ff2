use core::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use dec::{Context, Decimal};
use ethnum::{I256, U256};

use crate::wire::WireInt;
use crate::{Error, Result};

/// The number of internal decimal units in an [`ExactDecimal`].
pub const DECIMAL_UNITS: usize = 26;

/// Maximum number of significant digits an [`ExactDecimal`] can hold.
///
/// This is the conversion headroom: at least the digit budget of every width
/// class, and enough for any 256-bit coefficient (77 digits).
pub const DECIMAL_MAX_DIGITS: u32 = DECIMAL_UNITS as u32 * 3;

/// Exact decimal value on the application side of the codec.
pub type ExactDecimal = Decimal<DECIMAL_UNITS>;

static CX_CONVERT: LazyLock<Context<ExactDecimal>> =
    LazyLock::new(Context::<ExactDecimal>::default);

static POW_2_128: LazyLock<ExactDecimal> = LazyLock::new(|| {
    let mut cx = conversion_context();
    // 1 << 128
    cx.parse("340282366920938463463374607431768211456").unwrap()
});

// 2^255, the magnitude of I256::MIN.
const I256_MIN_ABS: U256 = U256::from_words(1u128 << 127, 0);

/// Returns a context with the full [`DECIMAL_MAX_DIGITS`] working precision.
///
/// Integer intake and outtake run under this context so they stay exact
/// regardless of the column's narrower working precision.
pub fn conversion_context() -> Context<ExactDecimal> {
    CX_CONVERT.clone()
}

/// Converts a 256-bit raw value into an exact decimal by combining its two
/// `u128` words. Exact for every `I256`: the largest magnitude has 77 digits.
pub fn i256_to_exact(v: I256) -> ExactDecimal {
    let mut cx = conversion_context();
    let neg = v < I256::ZERO;
    let (hi, lo) = v.unsigned_abs().into_words();
    let mut d = cx.from_u128(hi);
    cx.mul(&mut d, &POW_2_128);
    let lo = cx.from_u128(lo);
    cx.add(&mut d, &lo);
    if neg {
        cx.neg(&mut d);
    }
    debug_assert!(!cx.status().any());
    d
}

/// Converts an integral decimal into a 256-bit raw value, splitting the
/// magnitude on 2^128. Fails when the magnitude does not fit an `I256`.
pub fn exact_to_i256(d: &ExactDecimal) -> Result<I256> {
    let mut cx = conversion_context();
    let mut mag = *d;
    let neg = mag.is_negative();
    if neg {
        cx.neg(&mut mag);
    }
    let mut hi = mag;
    cx.div_integer(&mut hi, &POW_2_128);
    cx.rem(&mut mag, &POW_2_128);
    let hi = cx.try_into_u128(hi).map_err(|_| i256_range_err(d))?;
    let lo = cx.try_into_u128(mag).map_err(|_| i256_range_err(d))?;
    let words = U256::from_words(hi, lo);
    if neg {
        if words > I256_MIN_ABS {
            return Err(i256_range_err(d));
        }
        if words == I256_MIN_ABS {
            return Ok(I256::MIN);
        }
        Ok(-I256::from_le_bytes(words.to_le_bytes()))
    } else {
        if words >= I256_MIN_ABS {
            return Err(i256_range_err(d));
        }
        Ok(I256::from_le_bytes(words.to_le_bytes()))
    }
}

fn i256_range_err(d: &ExactDecimal) -> Error {
    Error::ConversionFailure(format!("value {d} does not fit a 256-bit raw integer"))
}

/// Rewrites an integral decimal so its exponent is 0, the form the narrowing
/// conversions require. A scaled coefficient like `3E+2` becomes `300`.
///
/// Fails when the plain-digit form would not fit the working type; such a
/// magnitude is out of range for every wire width.
fn with_zero_exponent(d: &ExactDecimal) -> Option<ExactDecimal> {
    if d.exponent() == 0 {
        return Some(*d);
    }
    let mut cx = conversion_context();
    let mut q = *d;
    cx.quantize(&mut q, &ExactDecimal::from(1_i32));
    if cx.status().invalid_operation() || cx.status().inexact() {
        return None;
    }
    Some(q)
}

/// A raw wire integer that converts exactly to and from [`ExactDecimal`].
pub trait RawDecimal: WireInt + fmt::Display {
    fn into_exact(self) -> ExactDecimal;

    /// Narrows an integral decimal to this width. Fails when the magnitude
    /// exceeds the width's signed range.
    fn from_exact(d: &ExactDecimal) -> Result<Self>;
}

impl RawDecimal for i32 {
    fn into_exact(self) -> ExactDecimal {
        ExactDecimal::from(self)
    }

    fn from_exact(d: &ExactDecimal) -> Result<Self> {
        let q = with_zero_exponent(d).ok_or_else(|| narrow_err(d, 32))?;
        conversion_context()
            .try_into_i32(q)
            .map_err(|_| narrow_err(d, 32))
    }
}

impl RawDecimal for i64 {
    fn into_exact(self) -> ExactDecimal {
        ExactDecimal::from(self)
    }

    fn from_exact(d: &ExactDecimal) -> Result<Self> {
        let q = with_zero_exponent(d).ok_or_else(|| narrow_err(d, 64))?;
        conversion_context()
            .try_into_i64(q)
            .map_err(|_| narrow_err(d, 64))
    }
}

impl RawDecimal for i128 {
    fn into_exact(self) -> ExactDecimal {
        conversion_context().from_i128(self)
    }

    fn from_exact(d: &ExactDecimal) -> Result<Self> {
        let q = with_zero_exponent(d).ok_or_else(|| narrow_err(d, 128))?;
        conversion_context()
            .try_into_i128(q)
            .map_err(|_| narrow_err(d, 128))
    }
}

impl RawDecimal for I256 {
    fn into_exact(self) -> ExactDecimal {
        i256_to_exact(self)
    }

    fn from_exact(d: &ExactDecimal) -> Result<Self> {
        exact_to_i256(d)
    }
}

fn narrow_err(d: &ExactDecimal, bits: u32) -> Error {
    Error::ConversionFailure(format!("value {d} does not fit a {bits}-bit raw integer"))
}

/// A write-side input value.
///
/// Mirrors the application types accepted for decimal columns: exact
/// decimals, binary floats, and native integers. Floats are taken through
/// their shortest decimal string form, so no binary representation error
/// leaks into the encoded value.
#[derive(Debug, Clone, Copy)]
pub enum Value {
    /// Logically absent row; only meaningful on the nullable write path.
    Null,
    Exact(ExactDecimal),
    F64(f64),
    I64(i64),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts the value to an exact decimal at full conversion precision.
    pub(crate) fn to_exact(&self) -> Result<ExactDecimal> {
        match self {
            Value::Null => Err(Error::ConversionFailure(
                "null value in a non-nullable column".to_string(),
            )),
            Value::Exact(d) => {
                if d.is_special() {
                    return Err(Error::ConversionFailure(format!(
                        "{d} is not a finite decimal"
                    )));
                }
                Ok(*d)
            }
            Value::F64(f) => {
                if !f.is_finite() {
                    return Err(Error::ConversionFailure(format!(
                        "{f} is not a finite number"
                    )));
                }
                let mut cx = conversion_context();
                cx.parse(f.to_string())
                    .map_err(|_| Error::ConversionFailure(format!("cannot convert {f}")))
            }
            Value::I64(i) => Ok(ExactDecimal::from(*i)),
        }
    }
}

impl From<ExactDecimal> for Value {
    fn from(d: ExactDecimal) -> Value {
        Value::Exact(d)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Value {
        Value::F64(f)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Value {
        Value::I64(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Value {
        Value::I64(i64::from(i))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Value {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl FromStr for Value {
    type Err = Error;

    /// Parses a numeric string into an exact decimal value. Malformed or
    /// non-finite strings fail with [`Error::ConversionFailure`].
    fn from_str(s: &str) -> Result<Value> {
        let mut cx = conversion_context();
        let d = cx
            .parse(s)
            .map_err(|_| Error::ConversionFailure(format!("malformed numeric string {s:?}")))?;
        if d.is_special() {
            return Err(Error::ConversionFailure(format!(
                "malformed numeric string {s:?}"
            )));
        }
        Ok(Value::Exact(d))
    }
}
