use thiserror::Error;

use crate::crypto::CryptoError;

/// Errors raised while decoding a structured binary record.
///
/// A record that fails to decode is discarded: decoding the same bytes again
/// can never succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReaderError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("expected a value, found a list")]
    ExpectedValue,

    #[error("expected a list, found a value")]
    ExpectedList,

    #[error("integer value has leading zero bytes")]
    LeadingZeros,

    #[error("item length is not canonically encoded")]
    NonCanonicalSize,

    #[error("integer does not fit in {0} bytes")]
    IntegerOverflow(usize),

    #[error("invalid value")]
    InvalidValue,

    #[error("invalid address: {0} bytes is neither an IPv4 nor an IPv6 address")]
    InvalidAddress(usize),

    #[error("invalid key: {0}")]
    InvalidKey(#[from] CryptoError),

    #[error("trailing data: {0} bytes left after the record")]
    TrailingData(usize),
}
