//! Path validation
//!
//! Maps virtual WebDAV paths onto physical paths below the configured root.
//! Everything here is lexical; the filesystem is never touched.

use log::debug;
use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};

use crate::auth::AuthInfo;
use crate::config::ServerConfig;
use crate::error::StorageError;

/// Splits `virtual_path` into its canonical segments.
///
/// The path is treated as rooted at `/` whether or not it starts with a
/// slash. Empty and `.` segments are dropped and `..` removes the previous
/// segment, never climbing above the virtual root.
pub fn clean_segments(virtual_path: &str) -> Vec<&str> {
    let mut segments = Vec::new();

    for segment in virtual_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    segments
}

/// Canonical absolute form of `virtual_path`, e.g. `a/./b/../c/` becomes `/a/c`.
pub fn clean_virtual_path(virtual_path: &str) -> String {
    format!("/{}", clean_segments(virtual_path).join("/"))
}

/// Lexically cleans a physical path.
///
/// Trailing separators, `.` components and resolvable `..` components are
/// removed. An empty result becomes `.`.
pub fn clean_physical_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => cleaned.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    cleaned.pop();
                    depth -= 1;
                } else if !cleaned.has_root() {
                    cleaned.push("..");
                }
            }
            Component::Normal(name) => {
                cleaned.push(name);
                depth += 1;
            }
        }
    }

    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }

    cleaned
}

/// The configured root directory in cleaned form.
pub fn physical_root(config: &ServerConfig) -> PathBuf {
    clean_physical_path(&config.root_directory)
}

/// Directory a request's virtual `/` maps to.
///
/// This is `root/subdir` for an authenticated user whose policy declares a
/// subdirectory, and the root itself otherwise.
pub fn user_root(config: &ServerConfig, auth: &AuthInfo) -> PathBuf {
    let mut base = physical_root(config);

    let subdirectory = auth
        .username()
        .and_then(|username| config.users.get(username))
        .and_then(|policy| policy.subdirectory.as_deref());

    if let Some(subdirectory) = subdirectory {
        for segment in clean_segments(subdirectory) {
            if is_single_component(segment) {
                base.push(segment);
            }
        }
    }

    base
}

/// Resolves `virtual_path` for `auth` to a physical path.
///
/// Rejected paths are reported as `NotFound` so that escape attempts look
/// like ordinary missing files.
pub fn resolve(
    config: &ServerConfig,
    auth: &AuthInfo,
    virtual_path: &str,
) -> Result<PathBuf, StorageError> {
    if virtual_path.contains('\0') {
        debug!("Rejected virtual path containing a null byte");
        return Err(StorageError::NotFound(virtual_path.escape_default().to_string()));
    }

    // A native separator would let `..\..` slip past the `/`-based cleaning
    if MAIN_SEPARATOR != '/' && virtual_path.contains(MAIN_SEPARATOR) {
        debug!("Rejected virtual path containing {:?}: {}", MAIN_SEPARATOR, virtual_path);
        return Err(StorageError::NotFound(virtual_path.to_string()));
    }

    let mut resolved = user_root(config, auth);

    for segment in clean_segments(virtual_path) {
        if !is_single_component(segment) {
            debug!("Rejected unjoinable segment {:?} in {}", segment, virtual_path);
            return Err(StorageError::NotFound(virtual_path.to_string()));
        }
        resolved.push(segment);
    }

    debug!(
        "Resolved {} for {} to {}",
        virtual_path,
        auth.display_name(),
        resolved.display()
    );

    Ok(resolved)
}

/// Returns whether `path` is the configured root, which must never be
/// removed or renamed. User subdirectories are ordinary directories.
pub fn is_protected_root(config: &ServerConfig, path: &Path) -> bool {
    path == physical_root(config)
}

/// A segment is joinable only if it is exactly one normal path component,
/// which rules out drive prefixes and anything the platform treats as a
/// separator.
fn is_single_component(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
