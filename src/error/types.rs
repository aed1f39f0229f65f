//! Error types
//!
//! Defines the error kinds surfaced by the user-directory filesystem adapter.

use std::fmt;
use std::io;

/// Storage module errors
///
/// The domain kinds are kept coarse on purpose: an unsafe path and a missing
/// path both surface as `NotFound`.
#[derive(Debug)]
pub enum StorageError {
    /// Path failed validation or does not resolve under the configured root.
    NotFound(String),
    /// Path resolved but the permission gate rejected the operation.
    PermissionDenied(String),
    /// Remove or rename targeting a protected root directory.
    InvalidOperation(String),
    /// Underlying filesystem error, passed through unchanged.
    IoError(io::Error),
}

impl StorageError {
    /// Returns true for the `NotFound` kind, including pass-through I/O errors of that kind.
    pub fn is_not_found(&self) -> bool {
        match self {
            StorageError::NotFound(_) => true,
            StorageError::IoError(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound(p) => write!(f, "Not found: {}", p),
            StorageError::PermissionDenied(p) => write!(f, "Permission denied: {}", p),
            StorageError::InvalidOperation(p) => write!(f, "Invalid operation: {}", p),
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

impl From<StorageError> for io::Error {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound(p) => io::Error::new(io::ErrorKind::NotFound, p),
            StorageError::PermissionDenied(p) => io::Error::new(io::ErrorKind::PermissionDenied, p),
            StorageError::InvalidOperation(p) => io::Error::new(io::ErrorKind::InvalidInput, p),
            StorageError::IoError(e) => e,
        }
    }
}
