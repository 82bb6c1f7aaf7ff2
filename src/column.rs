//! Decimal column orchestration: validate, substitute nulls, scale, pack.

use std::cmp::Ordering;

use ethnum::I256;

use crate::bitmap::NullBitmap;
use crate::numeric::{ExactDecimal, RawDecimal, Value, conversion_context};
use crate::spec::{ColumnSpec, WidthClass};
use crate::transform::DecimalTransform;
use crate::{Error, Result};

/// Recognized column construction options.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColumnOptions {
    types_check: bool,
}

impl ColumnOptions {
    /// Enables range validation of input values before scaling.
    pub fn set_types_check(&mut self, enabled: bool) -> &mut Self {
        self.types_check = enabled;
        self
    }
}

/// Pre-scale magnitude check against the width's signed bound.
///
/// The bound is applied to the value before multiplication by 10^scale,
/// which is looser than the true post-scale representable range: a value
/// accepted here can still overflow after scaling. That looseness is the
/// wire format's documented validation behavior and is intentionally not
/// tightened.
#[derive(Debug, Clone)]
struct RangeValidator {
    bits: u32,
    bound: ExactDecimal,
}

impl RangeValidator {
    fn new(width: WidthClass) -> Self {
        Self {
            bits: width.bits(),
            bound: width.signed_bound(),
        }
    }

    fn check(&self, d: &ExactDecimal) -> Result<()> {
        let mut cx = conversion_context();
        let mut mag = *d;
        cx.abs(&mut mag);
        if cx.partial_cmp(&mag, &self.bound) == Some(Ordering::Greater) {
            return Err(Error::TypeMismatch(format!(
                "value {d} exceeds the {}-bit signed range",
                self.bits
            )));
        }
        Ok(())
    }
}

/// One decimal column of a columnar block, fixed to a `Decimal(P,S)` spec at
/// construction.
///
/// Every read or write is a single synchronous pass over one batch:
/// Validate -> NullSubstitute -> Scale/Descale -> Pack/Unpack -> Reassemble.
/// The column holds no mutable state, so independent batches may run on it
/// from parallel threads.
#[derive(Debug, Clone)]
pub struct DecimalColumn {
    spec: ColumnSpec,
    transform: DecimalTransform,
    validator: Option<RangeValidator>,
}

impl DecimalColumn {
    pub fn new(precision: u32, scale: u32, options: ColumnOptions) -> Result<Self> {
        Self::from_spec(ColumnSpec::new(precision, scale)?, options)
    }

    /// Builds a column from the server's `Decimal(P,S)` type declaration.
    pub fn from_type_decl(decl: &str, options: ColumnOptions) -> Result<Self> {
        Self::from_spec(ColumnSpec::parse_type_decl(decl)?, options)
    }

    fn from_spec(spec: ColumnSpec, options: ColumnOptions) -> Result<Self> {
        let transform = DecimalTransform::new(&spec);
        let validator = options
            .types_check
            .then(|| RangeValidator::new(spec.width));
        Ok(Self {
            spec,
            transform,
            validator,
        })
    }

    pub fn spec(&self) -> &ColumnSpec {
        &self.spec
    }

    /// Working precision of the column's arithmetic context, in digits.
    pub fn working_precision(&self) -> usize {
        self.transform.working_precision()
    }

    /// Encodes one batch of non-null values and appends the bytes to `out`.
    ///
    /// The whole batch is converted before anything is appended; a failing
    /// write emits nothing. A `Value::Null` here is a conversion failure —
    /// use [`DecimalColumn::write_nullable`] for nullable columns.
    pub fn write(&self, values: &[Value], out: &mut Vec<u8>) -> Result<()> {
        match self.spec.width {
            WidthClass::W32 => self.write_as::<i32>(values, None, out),
            WidthClass::W64 => self.write_as::<i64>(values, None, out),
            WidthClass::W128 => self.write_as::<i128>(values, None, out),
            WidthClass::W256 => self.write_as::<I256>(values, None, out),
        }
    }

    /// Nullable encode: `Value::Null` rows are marked in the returned bitmap
    /// and written as the sentinel raw value, bypassing all arithmetic. The
    /// bitmap is handed back for the framing layer to emit out-of-band.
    pub fn write_nullable(&self, values: &[Value], out: &mut Vec<u8>) -> Result<NullBitmap> {
        let mut nulls = NullBitmap::new_all_present(values.len())?;
        match self.spec.width {
            WidthClass::W32 => self.write_as::<i32>(values, Some(&mut nulls), out)?,
            WidthClass::W64 => self.write_as::<i64>(values, Some(&mut nulls), out)?,
            WidthClass::W128 => self.write_as::<i128>(values, Some(&mut nulls), out)?,
            WidthClass::W256 => self.write_as::<I256>(values, Some(&mut nulls), out)?,
        }
        Ok(nulls)
    }

    fn write_as<T: RawDecimal>(
        &self,
        values: &[Value],
        mut nulls: Option<&mut NullBitmap>,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        let mut raw: Vec<T> = Vec::with_capacity(values.len());
        for (row, value) in values.iter().enumerate() {
            if value.is_null() {
                let Some(map) = nulls.as_deref_mut() else {
                    return Err(Error::ConversionFailure(format!(
                        "null value at row {row} in a non-nullable column"
                    )));
                };
                map.set(row, true)?;
                raw.push(T::NULL_SENTINEL);
                continue;
            }
            let exact = value.to_exact()?;
            if let Some(validator) = &self.validator {
                validator.check(&exact)?;
            }
            raw.push(self.transform.scale_to_raw(exact)?);
        }
        T::pack(&raw, out);
        Ok(())
    }

    /// Decodes `count` rows off the front of `input`, advancing the cursor.
    pub fn read(&self, count: usize, input: &mut &[u8]) -> Result<Vec<ExactDecimal>> {
        match self.spec.width {
            WidthClass::W32 => self.read_as::<i32>(count, input),
            WidthClass::W64 => self.read_as::<i64>(count, input),
            WidthClass::W128 => self.read_as::<i128>(count, input),
            WidthClass::W256 => self.read_as::<I256>(count, input),
        }
    }

    /// Nullable decode: rows flagged in `nulls` yield `None` regardless of
    /// the raw bytes occupying their slot.
    pub fn read_nullable(
        &self,
        count: usize,
        input: &mut &[u8],
        nulls: &NullBitmap,
    ) -> Result<Vec<Option<ExactDecimal>>> {
        if nulls.len() != count {
            return Err(Error::Corrupt(format!(
                "null bitmap covers {} rows, column has {count}",
                nulls.len()
            )));
        }
        match self.spec.width {
            WidthClass::W32 => self.read_nullable_as::<i32>(count, input, nulls),
            WidthClass::W64 => self.read_nullable_as::<i64>(count, input, nulls),
            WidthClass::W128 => self.read_nullable_as::<i128>(count, input, nulls),
            WidthClass::W256 => self.read_nullable_as::<I256>(count, input, nulls),
        }
    }

    fn read_as<T: RawDecimal>(
        &self,
        count: usize,
        input: &mut &[u8],
    ) -> Result<Vec<ExactDecimal>> {
        let raw = T::unpack(input, count)?;
        let mut rows = Vec::with_capacity(count);
        for r in raw {
            rows.push(self.transform.descale(r)?);
        }
        Ok(rows)
    }

    fn read_nullable_as<T: RawDecimal>(
        &self,
        count: usize,
        input: &mut &[u8],
        nulls: &NullBitmap,
    ) -> Result<Vec<Option<ExactDecimal>>> {
        let raw = T::unpack(input, count)?;
        let mut rows = Vec::with_capacity(count);
        for (row, r) in raw.into_iter().enumerate() {
            if nulls.is_null(row)? {
                rows.push(None);
            } else {
                rows.push(Some(self.transform.descale(r)?));
            }
        }
        Ok(rows)
    }
}
