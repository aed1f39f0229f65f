//! Permission gate
//!
//! Decides whether a request may perform an operation, based on the
//! authentication context and the configured per-user policies.
//!
//! The policy is default-allow:
//!
//! * a flag that is not configured (`Inherit`) allows the operation,
//! * an authenticated user without any policy entry is treated like a user
//!   whose entry sets no flags, and therefore gets full access,
//! * anonymous requests are allowed only while no user is configured at all.
//!
//! Configuring a single user thus switches the server from open access to
//! authentication required, but does not restrict other authenticated users.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

use crate::auth::AuthInfo;
use crate::config::UserPolicy;

/// Kinds of access checked by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Write,
    Delete,
    List,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Delete => "delete",
            Operation::List => "list",
        };
        f.write_str(name)
    }
}

/// A single configured permission flag.
///
/// Deserialized from an optional boolean: a missing value is `Inherit`,
/// `true` is `Allow` and `false` is `Deny`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "Option<bool>")]
pub enum Permission {
    Allow,
    Deny,
    /// Not configured; falls back to allowed.
    #[default]
    Inherit,
}

impl Permission {
    /// Only an explicit `Deny` rejects.
    pub fn is_allowed(self) -> bool {
        !matches!(self, Permission::Deny)
    }
}

impl From<Option<bool>> for Permission {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => Permission::Allow,
            Some(false) => Permission::Deny,
            None => Permission::Inherit,
        }
    }
}

impl From<bool> for Permission {
    fn from(flag: bool) -> Self {
        Permission::from(Some(flag))
    }
}

/// Checks whether `auth` may perform `operation` under `policies`.
pub fn has_permission(
    auth: &AuthInfo,
    policies: &HashMap<String, UserPolicy>,
    operation: Operation,
) -> bool {
    match auth.username() {
        Some(username) => policies
            .get(username)
            .map(|policy| policy.permission(operation))
            .unwrap_or_default()
            .is_allowed(),
        None => policies.is_empty(),
    }
}
