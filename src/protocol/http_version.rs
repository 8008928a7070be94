use std::fmt;

use thiserror::Error;

/// The HTTP version of a message. Only HTTP/1.0 and HTTP/1.1 are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVersion {
    Http1_0,
    Http1_1,
}

/// Error returned when a version string is not `HTTP/1.0` or `HTTP/1.1`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid http version: {0}")]
pub struct InvalidHttpVersion(pub String);

impl HttpVersion {
    pub fn major(&self) -> u8 {
        1
    }

    pub fn minor(&self) -> u8 {
        match self {
            Self::Http1_0 => 0,
            Self::Http1_1 => 1,
        }
    }
}

impl TryFrom<&str> for HttpVersion {
    type Error = InvalidHttpVersion;

    fn try_from(str: &str) -> Result<Self, Self::Error> {
        match str {
            "HTTP/1.0" => Ok(Self::Http1_0),
            "HTTP/1.1" => Ok(Self::Http1_1),
            _ => Err(InvalidHttpVersion(str.to_string())),
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http1_0 => f.write_str("HTTP/1.0"),
            Self::Http1_1 => f.write_str("HTTP/1.1"),
        }
    }
}
