//! Error handling for PacketCrypt wire records
//!
//! Structural errors describe why a buffer was refused by a decoder or by the
//! validator. They are fatal to the single record being processed and carry
//! enough detail to be logged next to the offending peer.

use std::fmt;
use thiserror::Error;

/// Result type alias for wire operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    /// Buffer length does not equal a fixed record's size
    #[error("Size mismatch for {record}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        record: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Variable-length bundle is shorter than its declared total
    #[error("Truncated input: declared {expected} bytes, got {actual}")]
    Truncated { expected: u64, actual: usize },

    /// Variable-length bundle is longer than its declared total
    #[error("Trailing bytes: declared {expected} bytes, got {actual}")]
    TrailingBytes { expected: u64, actual: usize },

    /// Coinbase commitment magic tag mismatch
    #[error("Bad magic: expected {expected:#010x}, found {found:#010x}")]
    BadMagic { expected: u32, found: u32 },

    /// Primitive read or write past the end of the buffer
    #[error("Buffer too small: {width} bytes at offset {offset} exceeds length {len}")]
    BufferTooSmall {
        offset: usize,
        width: usize,
        len: usize,
    },

    /// A field value that cannot be represented on the wire
    #[error("Invalid field {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Evaluator errors
    #[error("Evaluation error: {message}")]
    Evaluation { message: String },

    /// Hex decoding errors
    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML configuration parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Discriminant of [`Error`] without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SizeMismatch,
    Truncated,
    TrailingBytes,
    BadMagic,
    BufferTooSmall,
    InvalidField,
    Config,
    Evaluation,
    Hex,
    Io,
    Json,
    Yaml,
    Toml,
}

impl ErrorKind {
    /// Structural kinds, in the order they are reported by validator statistics
    pub const STRUCTURAL: [ErrorKind; 5] = [
        ErrorKind::SizeMismatch,
        ErrorKind::Truncated,
        ErrorKind::TrailingBytes,
        ErrorKind::BadMagic,
        ErrorKind::BufferTooSmall,
    ];

    /// Stable snake_case name used as a log field
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::SizeMismatch => "size_mismatch",
            ErrorKind::Truncated => "truncated",
            ErrorKind::TrailingBytes => "trailing_bytes",
            ErrorKind::BadMagic => "bad_magic",
            ErrorKind::BufferTooSmall => "buffer_too_small",
            ErrorKind::InvalidField => "invalid_field",
            ErrorKind::Config => "config",
            ErrorKind::Evaluation => "evaluation",
            ErrorKind::Hex => "hex",
            ErrorKind::Io => "io",
            ErrorKind::Json => "json",
            ErrorKind::Yaml => "yaml",
            ErrorKind::Toml => "toml",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Create a size mismatch error
    pub fn size_mismatch(record: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            record,
            expected,
            actual,
        }
    }

    /// Create a truncation error
    pub fn truncated(expected: u64, actual: usize) -> Self {
        Self::Truncated { expected, actual }
    }

    /// Create a trailing bytes error
    pub fn trailing_bytes(expected: u64, actual: usize) -> Self {
        Self::TrailingBytes { expected, actual }
    }

    /// Create a bad magic error
    pub fn bad_magic(expected: u32, found: u32) -> Self {
        Self::BadMagic { expected, found }
    }

    /// Create a buffer too small error
    pub fn buffer_too_small(offset: usize, width: usize, len: usize) -> Self {
        Self::BufferTooSmall { offset, width, len }
    }

    /// Create an invalid field error
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an evaluation error
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }

    /// Payload-free discriminant
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SizeMismatch { .. } => ErrorKind::SizeMismatch,
            Error::Truncated { .. } => ErrorKind::Truncated,
            Error::TrailingBytes { .. } => ErrorKind::TrailingBytes,
            Error::BadMagic { .. } => ErrorKind::BadMagic,
            Error::BufferTooSmall { .. } => ErrorKind::BufferTooSmall,
            Error::InvalidField { .. } => ErrorKind::InvalidField,
            Error::Config { .. } => ErrorKind::Config,
            Error::Evaluation { .. } => ErrorKind::Evaluation,
            Error::Hex(_) => ErrorKind::Hex,
            Error::Io(_) => ErrorKind::Io,
            Error::Json(_) => ErrorKind::Json,
            Error::Yaml(_) => ErrorKind::Yaml,
            Error::Toml(_) => ErrorKind::Toml,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        self.kind().as_str()
    }

    /// True for rejections caused by the shape of external input
    pub fn is_structural(&self) -> bool {
        ErrorKind::STRUCTURAL.contains(&self.kind())
    }
}
