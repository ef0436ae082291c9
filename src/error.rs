use std::fmt::{Display, Error, Formatter};

// Error
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum QRError {
    /// Empty data or empty output path
    InvalidInput,
    /// Data exceeds version 40 capacity at the requested EC level
    DataTooLarge,
    /// Unrecognized output format string
    UnsupportedFormat,
    /// Image serialization or filesystem write failure
    EncodingError,
    /// Logo asset could not be read or decoded
    LogoDecodeError,
}

impl Display for QRError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let msg = match *self {
            Self::InvalidInput => "empty or invalid input",
            Self::DataTooLarge => "data exceeds version 40 capacity",
            Self::UnsupportedFormat => "unsupported output format",
            Self::EncodingError => "failed to encode or write image",
            Self::LogoDecodeError => "failed to read logo image",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for QRError {}

pub type QRResult<T> = Result<T, QRError>;
