//! Error handlers
//!
//! Maps adapter errors onto the status codes a WebDAV protocol layer answers with.

use crate::error::types::StorageError;
use log::{debug, error};
use std::io;

/// Log an adapter error that is about to be reported to a client
pub fn handle_error(err: &StorageError) {
    match err {
        StorageError::IoError(_) => error!("WebDAV storage error: {}", err),
        _ => debug!("WebDAV request rejected: {}", err),
    }
}

/// Convert error to HTTP response code
pub fn error_to_http_status(err: &StorageError) -> u16 {
    match err {
        StorageError::NotFound(_) => 404,
        StorageError::PermissionDenied(_) => 403,
        StorageError::InvalidOperation(_) => 405,
        StorageError::IoError(e) => io_error_to_http_status(e),
    }
}

fn io_error_to_http_status(err: &io::Error) -> u16 {
    match err.kind() {
        io::ErrorKind::NotFound => 404,
        io::ErrorKind::PermissionDenied => 403,
        // MKCOL on an existing resource answers 405 (RFC 4918 9.3.1)
        io::ErrorKind::AlreadyExists => 405,
        io::ErrorKind::InvalidInput => 400,
        _ => 500,
    }
}
