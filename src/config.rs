//! Configuration management for the RAX WebDAV filesystem
//!
//! The configuration is loaded once at startup and shared read-only with the
//! filesystem adapter for the lifetime of the process.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::storage::permissions::{Operation, Permission};
use crate::utils::validation::{is_valid_subdirectory, is_valid_username};

/// Prefix of environment variables overriding file values, e.g.
/// `RAX_DAV__ROOT_DIRECTORY=/srv/dav`.
pub const ENV_PREFIX: &str = "RAX_DAV";

/// Complete adapter configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Physical directory all content is served from
    pub root_directory: PathBuf,

    /// Per-user policies, keyed by username
    #[serde(default)]
    pub users: HashMap<String, UserPolicy>,

    /// Audit logging toggles
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Per-user overrides
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct UserPolicy {
    /// Directory below the root that becomes this user's virtual `/`
    pub subdirectory: Option<String>,
    pub read: Permission,
    pub write: Permission,
    pub delete: Permission,
    pub list: Permission,
}

/// Which operation kinds emit audit records
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory creation
    pub on_create: bool,
    /// Opening files for reading
    pub on_read: bool,
    /// Removal
    pub on_delete: bool,
    /// Renames
    pub on_update: bool,
}

impl ServerConfig {
    /// Creates an open-access configuration serving `root_directory`.
    pub fn new(root_directory: impl Into<PathBuf>) -> Self {
        Self {
            root_directory: root_directory.into(),
            users: HashMap::new(),
            logging: LoggingConfig::default(),
        }
    }

    /// Adds or replaces the policy for `username`.
    pub fn with_user(mut self, username: impl Into<String>, policy: UserPolicy) -> Self {
        self.users.insert(username.into(), policy);
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Load configuration from `path` with environment overrides
    ///
    /// The file format is picked from the extension; a path without extension
    /// is searched for with each supported extension (`config` finds
    /// `config.toml`).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root_directory.as_os_str().is_empty() {
            return Err(ConfigError::Message(
                "root_directory cannot be empty".into(),
            ));
        }

        for (username, policy) in &self.users {
            if !is_valid_username(username) {
                return Err(ConfigError::Message(format!(
                    "Invalid username in users table: {username:?}"
                )));
            }

            if let Some(subdirectory) = &policy.subdirectory {
                if !is_valid_subdirectory(subdirectory) {
                    return Err(ConfigError::Message(format!(
                        "Invalid subdirectory {subdirectory:?} for user {username}: \
                         must be a relative path below root_directory"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Returns whether anonymous requests are served (no users configured).
    pub fn is_open_access(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserPolicy {
    /// Returns the configured flag for `operation`.
    pub fn permission(&self, operation: Operation) -> Permission {
        match operation {
            Operation::Read => self.read,
            Operation::Write => self.write,
            Operation::Delete => self.delete,
            Operation::List => self.list,
        }
    }

    pub fn with_subdirectory(mut self, subdirectory: impl Into<String>) -> Self {
        self.subdirectory = Some(subdirectory.into());
        self
    }

    pub fn with_read(mut self, permission: Permission) -> Self {
        self.read = permission;
        self
    }

    pub fn with_write(mut self, permission: Permission) -> Self {
        self.write = permission;
        self
    }

    pub fn with_delete(mut self, permission: Permission) -> Self {
        self.delete = permission;
        self
    }

    pub fn with_list(mut self, permission: Permission) -> Self {
        self.list = permission;
        self
    }
}

impl LoggingConfig {
    /// Every audit toggle enabled.
    pub fn all() -> Self {
        Self {
            on_create: true,
            on_read: true,
            on_delete: true,
            on_update: true,
        }
    }
}
