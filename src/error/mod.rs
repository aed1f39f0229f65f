//! Error handling
//!
//! Defines error types and status mapping for the WebDAV filesystem adapter.

pub mod handlers;
pub mod types;

pub use types::*;
