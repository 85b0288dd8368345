use thiserror::Error;

/// Errors returned by Art-Net decoding and encoding.
///
/// # Examples
/// ```
/// use artnode_core::ArtNetError;
///
/// let err = ArtNetError::TooShort { needed: 14, actual: 10 };
/// assert!(err.to_string().contains("payload too short"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtNetError {
    #[error("not an Art-Net packet: signature mismatch")]
    NotArtNet,
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("payload overrun: length field declares {declared} bytes, {available} available")]
    PayloadOverrun { declared: usize, available: usize },
    #[error("invalid ArtDMX length: {length}")]
    InvalidLength { length: u16 },
    #[error("too many entries for one packet: {count} (max {max})")]
    TooManyEntries { count: usize, max: usize },
}
