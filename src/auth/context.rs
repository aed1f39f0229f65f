//! Request authentication context
//!
//! Carries the outcome of credential verification into the filesystem adapter.
//! Verification itself happens in the protocol layer; this module only holds
//! its result.

/// Authentication state of a single request.
///
/// Created once per request by the authentication layer and passed explicitly
/// to every resolver, permission and adapter call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthInfo {
    authenticated: bool,
    username: String,
}

impl AuthInfo {
    /// Context for a request that carried no (valid) credentials.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context for a request whose credentials were verified for `username`.
    pub fn user(username: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            username: username.into(),
        }
    }

    /// Returns whether the request passed authentication.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Returns the username of an authenticated request.
    pub fn username(&self) -> Option<&str> {
        if self.authenticated {
            Some(&self.username)
        } else {
            None
        }
    }

    /// Name used in audit records and log lines.
    pub fn display_name(&self) -> &str {
        self.username().unwrap_or("anonymous")
    }
}

/// An absent context is treated as anonymous.
impl From<Option<AuthInfo>> for AuthInfo {
    fn from(info: Option<AuthInfo>) -> Self {
        info.unwrap_or_default()
    }
}
