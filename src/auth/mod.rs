//! Authentication context
//!
//! Request identity as seen by the filesystem adapter.

pub mod context;

pub use context::AuthInfo;
