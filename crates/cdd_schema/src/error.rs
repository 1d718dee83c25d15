//! Loader error taxonomy (§7): structural and semantic failures map to
//! `EINVAL`, allocation failures to `ENOMEM`, range violations to `ERANGE`,
//! write failures to `EIO`. The loader aborts at the first error.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Invalid,
    NoMem,
    Range,
    Io,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::Invalid => "EINVAL",
            ErrorCode::NoMem => "ENOMEM",
            ErrorCode::Range => "ERANGE",
            ErrorCode::Io => "EIO",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub code: ErrorCode,
    pub message: String,
}

impl LoadError {
    pub fn invalid(message: impl Into<String>) -> Self {
        LoadError { code: ErrorCode::Invalid, message: message.into() }
    }

    pub fn range(message: impl Into<String>) -> Self {
        LoadError { code: ErrorCode::Range, message: message.into() }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for LoadError {}

pub type LoadResult<T> = std::result::Result<T, LoadError>;
