//! Error types for metafile conversion
//!
//! Every failure carries the kind, the absolute byte offset where it was
//! detected and a human readable message. `InvalidHeader` and
//! `TruncatedInput` abort a conversion; the remaining kinds are collected
//! as warnings while playback continues.

use std::fmt;
use thiserror::Error;

/// Classification of conversion failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidHeader,
    TruncatedInput,
    RecordError,
    InvalidHandle,
    UnknownOpcode,
}

impl ErrorKind {
    /// Fatal kinds end the conversion without producing a document.
    pub fn is_fatal(self) -> bool {
        matches!(self, ErrorKind::InvalidHeader | ErrorKind::TruncatedInput)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidHeader => "invalid header",
            ErrorKind::TruncatedInput => "truncated input",
            ErrorKind::RecordError => "record error",
            ErrorKind::InvalidHandle => "invalid handle",
            ErrorKind::UnknownOpcode => "unknown opcode",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured conversion error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at offset {offset}: {message}")]
pub struct ConversionError {
    pub kind: ErrorKind,
    pub offset: usize,
    pub message: String,
}

impl ConversionError {
    pub fn new(kind: ErrorKind, offset: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            message: message.into(),
        }
    }

    pub fn invalid_header(offset: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidHeader, offset, message)
    }

    pub fn truncated(offset: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TruncatedInput, offset, message)
    }

    pub fn record(offset: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RecordError, offset, message)
    }

    pub fn invalid_handle(offset: usize, handle: u16) -> Self {
        Self::new(
            ErrorKind::InvalidHandle,
            offset,
            format!("no live object with handle {}", handle),
        )
    }

    pub fn unknown_opcode(offset: usize, function: u16) -> Self {
        Self::new(
            ErrorKind::UnknownOpcode,
            offset,
            format!("unknown record function 0x{:04X}", function),
        )
    }

    /// Short reads inside a record payload do not truncate the stream.
    pub(crate) fn into_record_error(self) -> Self {
        if self.kind == ErrorKind::TruncatedInput {
            Self {
                kind: ErrorKind::RecordError,
                ..self
            }
        } else {
            self
        }
    }
}

/// Errors raised by configuration calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown log level: '{0}' (expected error, warn, info, debug or trace)")]
    UnknownLogLevel(String),
}

/// Result type alias for conversion operations
pub type ConversionResult<T> = Result<T, ConversionError>;
