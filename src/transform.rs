//! Scale/descale arithmetic between raw wire integers and exact decimals.

use dec::{Context, Rounding};

use crate::numeric::{ExactDecimal, RawDecimal, conversion_context};
use crate::spec::ColumnSpec;
use crate::{Error, Result};

/// Converts between raw scaled integers and exact decimal values under the
/// column's working precision.
///
/// The arithmetic context is owned by the transform and cloned for every
/// call: its precision is configured once to the width's digit budget, and
/// no ambient process- or thread-wide setting is ever touched, so concurrent
/// batches of different width classes cannot corrupt each other's precision
/// and there is nothing to restore on any exit path.
#[derive(Debug, Clone)]
pub struct DecimalTransform {
    cx: Context<ExactDecimal>,
    scaler: Option<ExactDecimal>,
}

impl DecimalTransform {
    pub fn new(spec: &ColumnSpec) -> Self {
        let mut cx = conversion_context();
        // A width-sized coefficient divided by a power of ten must retain
        // every significant digit; a narrower context would round them away.
        cx.set_precision(spec.width.max_precision() as usize)
            .expect("width precision fits the working type");
        cx.set_rounding(Rounding::Down);
        let scaler = if spec.scale >= 1 {
            let mut full = conversion_context();
            Some(
                full.parse(format!("1E+{}", spec.scale))
                    .expect("power of ten parses"),
            )
        } else {
            None
        };
        Self { cx, scaler }
    }

    /// Working precision of the owned context, in decimal digits.
    pub fn working_precision(&self) -> usize {
        self.cx.precision()
    }

    /// Read direction: raw scaled integer to exact decimal.
    ///
    /// Null rows never reach this; the column re-inserts them from the
    /// bitmap without touching the raw bytes.
    pub fn descale<T: RawDecimal>(&self, raw: T) -> Result<ExactDecimal> {
        let mut d = raw.into_exact();
        let Some(scaler) = &self.scaler else {
            // scale == 0: the decimal is the raw integer, no division.
            return Ok(d);
        };
        let mut cx = self.cx.clone();
        cx.div(&mut d, scaler);
        if cx.status().inexact() {
            return Err(Error::ConversionFailure(format!(
                "raw value {raw} exceeds the column's {} significant digits",
                self.cx.precision()
            )));
        }
        Ok(d)
    }

    /// Write direction: exact decimal to raw scaled integer, truncating
    /// toward zero. Fractional digits below the scale are dropped, never
    /// rounded away from zero.
    pub fn scale_to_raw<T: RawDecimal>(&self, value: ExactDecimal) -> Result<T> {
        let mut d = value;
        match &self.scaler {
            None => {
                // scale == 0: truncate at full conversion precision, the
                // mirror of the read-side fast path.
                let mut cx = conversion_context();
                cx.set_rounding(Rounding::Down);
                cx.round(&mut d);
            }
            Some(scaler) => {
                let mut cx = self.cx.clone();
                cx.mul(&mut d, scaler);
                cx.round(&mut d);
            }
        }
        T::from_exact(&d)
    }
}
