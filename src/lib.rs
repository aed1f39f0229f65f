//! RAX WebDAV filesystem
//!
//! Per-user, permission-gated filesystem adapter for WebDAV servers. Virtual
//! paths are resolved below a configured root (optionally inside a per-user
//! subdirectory) and checked against per-user read/write/delete/list
//! permissions before any filesystem call is made.

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod storage;
pub mod utils;

pub use auth::AuthInfo;
pub use config::{LoggingConfig, ServerConfig, UserPolicy};
pub use error::StorageError;
pub use storage::{AsyncUserDir, FileSystemProvider, OpenFlags, Permission, UserDir};
