//! User directory filesystem
//!
//! The adapter WebDAV protocol handlers call into. Every operation resolves
//! the virtual path, checks the permission gate and only then touches the
//! filesystem. Successful operations optionally emit an audit record.

use log::{debug, info, warn};
use std::fs::{self, DirBuilder, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::auth::AuthInfo;
use crate::config::ServerConfig;
use crate::error::StorageError;
use crate::middleware::{AuditEvent, AuditSink, LogAuditSink};
use crate::storage::flags::OpenFlags;
use crate::storage::permissions::{self, Operation};
use crate::storage::results::FileStat;
use crate::storage::validation::{self, clean_segments};

/// Operations a virtual filesystem provider offers to a WebDAV handler.
///
/// Every call takes the request's authentication context explicitly and a
/// `/`-separated virtual path.
pub trait FileSystemProvider: Send + Sync {
    /// Creates a single directory.
    fn make_directory(&self, auth: &AuthInfo, name: &str, mode: u32) -> Result<(), StorageError>;

    /// Opens a file or directory according to a POSIX flag word.
    fn open(
        &self,
        auth: &AuthInfo,
        name: &str,
        flags: OpenFlags,
        mode: u32,
    ) -> Result<File, StorageError>;

    /// Removes a file or a directory tree. A missing target is not an error.
    fn remove_all(&self, auth: &AuthInfo, name: &str) -> Result<(), StorageError>;

    fn rename(&self, auth: &AuthInfo, old_name: &str, new_name: &str)
    -> Result<(), StorageError>;

    fn stat(&self, auth: &AuthInfo, name: &str) -> Result<FileStat, StorageError>;
}

/// Filesystem rooted at the configured directory, with optional per-user
/// subdirectories and per-user permissions.
#[derive(Clone)]
pub struct UserDir {
    config: Arc<ServerConfig>,
    audit: Arc<dyn AuditSink>,
}

impl UserDir {
    /// Creates an adapter that sends audit records to the `log` facade.
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self::with_audit_sink(config, Arc::new(LogAuditSink))
    }

    pub fn with_audit_sink(config: Arc<ServerConfig>, audit: Arc<dyn AuditSink>) -> Self {
        Self { config, audit }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Resolves `name` to its physical path for `auth`.
    pub fn resolve(&self, auth: &AuthInfo, name: &str) -> Result<PathBuf, StorageError> {
        validation::resolve(&self.config, auth, name)
    }

    pub fn has_permission(&self, auth: &AuthInfo, operation: Operation) -> bool {
        permissions::has_permission(auth, &self.config.users, operation)
    }

    /// Creates the root directory and every configured user subdirectory.
    ///
    /// Existing directories are left untouched.
    pub fn prepare(&self) -> io::Result<()> {
        let root = validation::physical_root(&self.config);
        fs::create_dir_all(&root)?;
        info!("Serving root directory {}", root.display());

        for username in self.config.users.keys() {
            let home = validation::user_root(&self.config, &AuthInfo::user(username.as_str()));
            if home != root {
                fs::create_dir_all(&home)?;
                info!("Prepared home for {}: {}", username, home.display());
            }
        }

        Ok(())
    }

    fn authorize(
        &self,
        auth: &AuthInfo,
        operation: Operation,
        name: &str,
    ) -> Result<(), StorageError> {
        if self.has_permission(auth, operation) {
            return Ok(());
        }

        warn!(
            "Denied {} on {} for {}",
            operation,
            name,
            auth.display_name()
        );
        Err(StorageError::PermissionDenied(name.to_string()))
    }

    fn reject_protected_root(
        &self,
        auth: &AuthInfo,
        path: &Path,
        name: &str,
    ) -> Result<(), StorageError> {
        if validation::is_protected_root(&self.config, path) {
            warn!(
                "Refused to remove or rename root {} for {}",
                name,
                auth.display_name()
            );
            return Err(StorageError::InvalidOperation(name.to_string()));
        }
        Ok(())
    }

    fn audit(&self, enabled: bool, event: impl FnOnce() -> AuditEvent) {
        if enabled {
            self.audit.record(&event());
        }
    }
}

impl FileSystemProvider for UserDir {
    fn make_directory(&self, auth: &AuthInfo, name: &str, mode: u32) -> Result<(), StorageError> {
        let path = self.resolve(auth, name)?;
        self.authorize(auth, Operation::Write, name)?;

        let mut builder = DirBuilder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;
        builder.create(&path)?;

        debug!("Created directory {} (real: {})", name, path.display());
        self.audit(self.config.logging.on_create, || AuditEvent::Created {
            path,
            user: auth.display_name().to_string(),
        });
        Ok(())
    }

    fn open(
        &self,
        auth: &AuthInfo,
        name: &str,
        flags: OpenFlags,
        mode: u32,
    ) -> Result<File, StorageError> {
        let path = self.resolve(auth, name)?;
        let access = flags.access_mode();

        if access.writes() {
            self.authorize(auth, Operation::Write, name)?;
        }

        if access.reads() {
            // Reading a directory is a listing
            let operation = match fs::metadata(&path) {
                Ok(metadata) if metadata.is_dir() => Operation::List,
                _ => Operation::Read,
            };
            self.authorize(auth, operation, name)?;
        }

        let file = flags.to_open_options(mode).open(&path)?;

        debug!("Opened {} (real: {}) with {:?}", name, path.display(), access);
        self.audit(self.config.logging.on_read && access.reads(), || {
            AuditEvent::Read {
                path,
                user: auth.display_name().to_string(),
            }
        });
        Ok(file)
    }

    fn remove_all(&self, auth: &AuthInfo, name: &str) -> Result<(), StorageError> {
        let path = self.resolve(auth, name)?;
        self.reject_protected_root(auth, &path, name)?;
        self.authorize(auth, Operation::Delete, name)?;

        match fs::symlink_metadata(&path) {
            Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(&path)?,
            Ok(_) => fs::remove_file(&path)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Nothing to remove at {} (real: {})", name, path.display());
            }
            Err(e) => return Err(e.into()),
        }

        debug!("Removed {} (real: {})", name, path.display());
        self.audit(self.config.logging.on_delete, || AuditEvent::Deleted {
            path,
            user: auth.display_name().to_string(),
        });
        Ok(())
    }

    fn rename(
        &self,
        auth: &AuthInfo,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), StorageError> {
        let old_path = self.resolve(auth, old_name)?;
        let new_path = self.resolve(auth, new_name)?;
        self.authorize(auth, Operation::Write, old_name)?;
        self.reject_protected_root(auth, &old_path, old_name)?;
        self.reject_protected_root(auth, &new_path, new_name)?;

        fs::rename(&old_path, &new_path)?;

        debug!(
            "Renamed {} to {} (real: {} -> {})",
            old_name,
            new_name,
            old_path.display(),
            new_path.display()
        );
        self.audit(self.config.logging.on_update, || AuditEvent::Renamed {
            from: old_path,
            to: new_path,
            user: auth.display_name().to_string(),
        });
        Ok(())
    }

    fn stat(&self, auth: &AuthInfo, name: &str) -> Result<FileStat, StorageError> {
        let path = self.resolve(auth, name)?;
        self.authorize(auth, Operation::List, name)?;

        let metadata = fs::metadata(&path)?;
        let entry_name = clean_segments(name).last().copied().unwrap_or("/");
        Ok(FileStat::from_metadata(entry_name, &metadata))
    }
}
