//! Error types for OSP Common
//!
//! This module defines the error type returned by the registry lookups, the
//! command-line scanner and the module loader, plus the engine status codes
//! (`ErrorCode`) that travel through the error channel.

use std::fmt;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Result type for OSP Common operations
pub type Result<T> = std::result::Result<T, Error>;

/// OSP Common errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Data type tag is the unknown sentinel or outside the enumeration
    UnknownDataType(i32),

    /// Texture format tag is the invalid sentinel or outside the enumeration
    UnknownTextureFormat(i32),

    /// Byte buffer does not match item count times element size
    InvalidBufferSize { expected: usize, actual: usize },

    /// A flag expecting a value was the last argument
    MissingArgument(String),

    /// A flag value could not be interpreted
    InvalidArgument(String),

    /// No shared library could be opened for a module
    LibraryNotFound(String),

    /// Module library has no initializer symbol
    SymbolNotFound(String),

    /// A process-wide slot is already occupied
    AlreadyInitialized(String),

    /// A process-wide lock was poisoned by a panicking thread
    LockPoisoned(String),
}

impl Error {
    /// Engine status code reported for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::UnknownDataType(_)
            | Error::UnknownTextureFormat(_)
            | Error::InvalidBufferSize { .. }
            | Error::MissingArgument(_)
            | Error::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Error::AlreadyInitialized(_) => ErrorCode::InvalidOperation,
            Error::LibraryNotFound(_)
            | Error::SymbolNotFound(_)
            | Error::LockPoisoned(_) => ErrorCode::UnknownError,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownDataType(raw) => write!(f, "Unknown data type: {}", raw),
            Error::UnknownTextureFormat(raw) => write!(f, "Unknown texture format: {}", raw),
            Error::InvalidBufferSize { expected, actual } => write!(
                f,
                "Invalid buffer size: expected {} bytes, got {}",
                expected, actual
            ),
            Error::MissingArgument(flag) => write!(f, "Missing value for {}", flag),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::LibraryNotFound(name) => write!(f, "Library not found: {}", name),
            Error::SymbolNotFound(name) => write!(f, "Could not find module initializer {}", name),
            Error::AlreadyInitialized(what) => write!(f, "Already initialized: {}", what),
            Error::LockPoisoned(what) => write!(f, "Lock poisoned: {}", what),
        }
    }
}

impl std::error::Error for Error {}

/// Engine status codes
///
/// Ordinals are part of the engine ABI and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum ErrorCode {
    /// No error has been recorded
    NoError = 0,
    /// An unknown error has occurred
    UnknownError = 1,
    /// An invalid argument was specified
    InvalidArgument = 2,
    /// The operation is not allowed in the current state
    InvalidOperation = 3,
    /// Not enough memory to execute the command
    OutOfMemory = 4,
    /// The CPU lacks a required instruction set
    UnsupportedCpu = 5,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorCode::NoError => "no error",
            ErrorCode::UnknownError => "unknown error",
            ErrorCode::InvalidArgument => "invalid argument",
            ErrorCode::InvalidOperation => "invalid operation",
            ErrorCode::OutOfMemory => "out of memory",
            ErrorCode::UnsupportedCpu => "unsupported CPU",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
