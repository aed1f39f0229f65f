//! Adapter middleware
//!
//! Provides audit logging for filesystem operations.

pub mod logging;

pub use logging::{AUDIT_TARGET, AuditEvent, AuditSink, LogAuditSink};
