//! Error types for HTTP message parsing.
//!
//! All framing and syntactic faults are reported through [`ParseError`]. The
//! request and response variants carry the 1-based line number at which the
//! fault was detected, counted from the start-line. I/O failures from the
//! source stream are wrapped without translation.

use std::io;
use thiserror::Error;

/// Errors produced while parsing an HTTP message.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The bytes do not form a valid HTTP request.
    #[error("invalid http request: {message} (line {line})")]
    InvalidRequest { message: String, line: usize },

    /// The bytes do not form a valid HTTP response.
    #[error("invalid http response: {message} (line {line})")]
    InvalidResponse { message: String, line: usize },

    /// A Transfer-Encoding other than `chunked` was declared.
    #[error("transfer encoding is not supported: {encoding}")]
    UnsupportedEncoding { encoding: String },

    /// I/O error while reading the source stream.
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    /// Creates a new InvalidRequest error.
    pub fn invalid_request<S: ToString>(message: S, line: usize) -> Self {
        Self::InvalidRequest { message: message.to_string(), line }
    }

    /// Creates a new InvalidResponse error.
    pub fn invalid_response<S: ToString>(message: S, line: usize) -> Self {
        Self::InvalidResponse { message: message.to_string(), line }
    }

    /// Creates a new UnsupportedEncoding error.
    pub fn unsupported_encoding<S: ToString>(encoding: S) -> Self {
        Self::UnsupportedEncoding { encoding: encoding.to_string() }
    }

    /// The line number the fault was detected at, if this is a framing or
    /// syntax error. Line numbers are 1-based; line 0 means the fault applies
    /// to the message as a whole.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::InvalidRequest { line, .. } | Self::InvalidResponse { line, .. } => Some(*line),
            _ => None,
        }
    }
}
