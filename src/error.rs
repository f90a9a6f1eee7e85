//! Crate-level error type.
//!
//! Each layer keeps its own error enum; this one ties them together for
//! callers that load, configure and decode in one go.

use std::path::PathBuf;
use thiserror::Error;

use crate::formats::e32::DecodeError;
use crate::io::error::IoError;

/// Main error type for e32image operations.
#[derive(Debug, Error)]
pub enum E32Error {
    /// Header decoding failed
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Loading the image file failed
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Decoding a file failed; carries the path for batch reports
    #[error("{path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: Box<E32Error>,
    },

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl E32Error {
    pub(crate) fn in_file(self, path: impl Into<PathBuf>) -> Self {
        E32Error::File {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// The decode error at the root of this error, if any
    pub fn decode_error(&self) -> Option<&DecodeError> {
        match self {
            E32Error::Decode(e) => Some(e),
            E32Error::File { source, .. } => source.decode_error(),
            _ => None,
        }
    }
}

/// Result type alias for e32image operations
pub type Result<T> = std::result::Result<T, E32Error>;
