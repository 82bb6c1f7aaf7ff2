use core::fmt;

pub type Result<T> = core::result::Result<T, Error>;

/// Failures surfaced by the decimal column codec.
///
/// Every failure is local to one batch call: the codec performs no retries
/// and has no partial-success mode. A failing write appends nothing to its
/// sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed or out-of-range `Decimal(P,S)` type declaration. Raised at
    /// column construction and fatal for that column.
    InvalidSpec(String),
    /// A value's magnitude exceeds the pre-scale bound for the column's wire
    /// width. Raised during write when value checking is enabled.
    TypeMismatch(String),
    /// An input value could not be converted to an exact decimal, or the
    /// converted value does not fit the column's wire width.
    ConversionFailure(String),
    /// Truncated input buffer, or a null bitmap that does not line up with
    /// the row count.
    Corrupt(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSpec(msg) => write!(f, "invalid decimal spec: {msg}"),
            Error::TypeMismatch(msg) => write!(f, "type mismatch: {msg}"),
            Error::ConversionFailure(msg) => write!(f, "conversion failure: {msg}"),
            Error::Corrupt(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}
