//! Audit logging
//!
//! Records successful filesystem mutations and reads. Records go to an
//! [`AuditSink`]; the default sink forwards them to the `log` facade under the
//! `audit` target with structured key-value fields.

use log::info;
use std::fmt;
use std::path::PathBuf;

/// Target used for audit records emitted through `log`.
pub const AUDIT_TARGET: &str = "audit";

/// A single audited operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEvent {
    Created { path: PathBuf, user: String },
    Read { path: PathBuf, user: String },
    Deleted { path: PathBuf, user: String },
    Renamed { from: PathBuf, to: PathBuf, user: String },
}

impl AuditEvent {
    /// Short operation name used as the `op` field.
    pub fn operation(&self) -> &'static str {
        match self {
            AuditEvent::Created { .. } => "create",
            AuditEvent::Read { .. } => "read",
            AuditEvent::Deleted { .. } => "delete",
            AuditEvent::Renamed { .. } => "rename",
        }
    }

    pub fn user(&self) -> &str {
        match self {
            AuditEvent::Created { user, .. }
            | AuditEvent::Read { user, .. }
            | AuditEvent::Deleted { user, .. }
            | AuditEvent::Renamed { user, .. } => user,
        }
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEvent::Created { path, user } => {
                write!(f, "{} created directory {}", user, path.display())
            }
            AuditEvent::Read { path, user } => write!(f, "{} opened {}", user, path.display()),
            AuditEvent::Deleted { path, user } => write!(f, "{} deleted {}", user, path.display()),
            AuditEvent::Renamed { from, to, user } => {
                write!(f, "{} renamed {} to {}", user, from.display(), to.display())
            }
        }
    }
}

/// Destination for audit records.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent);
}

/// Forwards audit records to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn record(&self, event: &AuditEvent) {
        let op = event.operation();
        let user = event.user();

        match event {
            AuditEvent::Created { path, .. } => {
                info!(target: AUDIT_TARGET, op = op, path:% = path.display(), user = user; "Created directory")
            }
            AuditEvent::Read { path, .. } => {
                info!(target: AUDIT_TARGET, op = op, path:% = path.display(), user = user; "Opened file")
            }
            AuditEvent::Deleted { path, .. } => {
                info!(target: AUDIT_TARGET, op = op, path:% = path.display(), user = user; "Deleted file")
            }
            AuditEvent::Renamed { from, to, .. } => {
                info!(
                    target: AUDIT_TARGET,
                    op = op,
                    oldpath:% = from.display(),
                    newpath:% = to.display(),
                    user = user;
                    "Renamed file"
                )
            }
        }
    }
}
