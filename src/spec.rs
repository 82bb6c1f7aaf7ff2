use crate::numeric::{ExactDecimal, conversion_context};
use crate::{Error, Result};

/// Bit width of the signed integer that carries a scaled decimal value on
/// the wire.
///
/// Each class transports a fixed number of decimal digits: the largest count
/// whose every value stays inside the class's signed two's-complement bound.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_types", derive(serde::Serialize, serde::Deserialize))]
pub enum WidthClass {
    W32,
    W64,
    W128,
    W256,
}

impl WidthClass {
    /// Smallest class whose digit budget covers `precision`.
    pub fn for_precision(precision: u32) -> Result<Self> {
        match precision {
            1..=9 => Ok(WidthClass::W32),
            10..=18 => Ok(WidthClass::W64),
            19..=38 => Ok(WidthClass::W128),
            39..=76 => Ok(WidthClass::W256),
            _ => Err(Error::InvalidSpec(format!(
                "precision must be in 1..=76, got {precision}"
            ))),
        }
    }

    /// Maximum number of decimal digits representable in this class.
    pub fn max_precision(self) -> u32 {
        match self {
            WidthClass::W32 => 9,
            WidthClass::W64 => 18,
            WidthClass::W128 => 38,
            WidthClass::W256 => 76,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            WidthClass::W32 => 32,
            WidthClass::W64 => 64,
            WidthClass::W128 => 128,
            WidthClass::W256 => 256,
        }
    }

    /// Bytes per raw value on the wire.
    pub fn byte_width(self) -> usize {
        (self.bits() / 8) as usize
    }

    /// The class's signed bound `2^(bits-1) - 1` as an exact decimal.
    pub fn signed_bound(self) -> ExactDecimal {
        let digits = match self {
            // 2^31 - 1
            WidthClass::W32 => "2147483647",
            // 2^63 - 1
            WidthClass::W64 => "9223372036854775807",
            // 2^127 - 1
            WidthClass::W128 => "170141183460469231731687303715884105727",
            // 2^255 - 1
            WidthClass::W256 => {
                "57896044618658097711785492504343953926634992332820282019728792003956564819967"
            }
        };
        let mut cx = conversion_context();
        cx.parse(digits).expect("signed bound literal parses")
    }
}

/// Immutable description of one decimal column, built once from a parsed
/// type declaration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_types", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnSpec {
    pub precision: u32,
    pub scale: u32,
    pub width: WidthClass,
}

impl ColumnSpec {
    pub fn new(precision: u32, scale: u32) -> Result<Self> {
        let width = WidthClass::for_precision(precision)?;
        if scale > precision {
            return Err(Error::InvalidSpec(format!(
                "scale {scale} exceeds precision {precision}"
            )));
        }
        Ok(Self {
            precision,
            scale,
            width,
        })
    }

    /// Parses the server's `Decimal(P,S)` type declaration.
    ///
    /// Only the parenthesized two-argument form is accepted; P and S are
    /// unsigned digit substrings (surrounding whitespace tolerated, the
    /// server emits `Decimal(9, 2)`).
    pub fn parse_type_decl(decl: &str) -> Result<Self> {
        let inner = decl
            .strip_prefix("Decimal(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| Error::InvalidSpec(format!("expected Decimal(P,S), got {decl:?}")))?;
        let (p, s) = inner
            .split_once(',')
            .ok_or_else(|| Error::InvalidSpec(format!("expected Decimal(P,S), got {decl:?}")))?;
        let precision: u32 = p.trim().parse().map_err(|_| {
            Error::InvalidSpec(format!("precision is not an unsigned integer in {decl:?}"))
        })?;
        let scale: u32 = s.trim().parse().map_err(|_| {
            Error::InvalidSpec(format!("scale is not an unsigned integer in {decl:?}"))
        })?;
        Self::new(precision, scale)
    }
}
