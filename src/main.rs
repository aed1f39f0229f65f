//! RAX WebDAV filesystem - configuration check
//!
//! Loads the configuration, prepares the served directories and reports the
//! effective home and permissions of every configured user by running a
//! stat of `/` through the adapter on their behalf.

use log::{error, info, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use rax_davfs::auth::AuthInfo;
use rax_davfs::config::ServerConfig;
use rax_davfs::error::handlers::{error_to_http_status, handle_error};
use rax_davfs::storage::{AsyncUserDir, Operation, UserDir};
use rax_davfs::utils::logging::setup_logging;

const DEFAULT_CONFIG_PATH: &str = "config";

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    info!("Loading configuration from {}", config_path.display());

    let config = match ServerConfig::load(&config_path) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let dir = UserDir::new(Arc::clone(&config));
    if let Err(e) = dir.prepare() {
        error!(
            "Failed to prepare {}: {}",
            config.root_directory.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let mut contexts = Vec::new();
    if config.is_open_access() {
        warn!("No users configured: all requests are served without authentication");
        contexts.push(AuthInfo::anonymous());
    } else {
        let mut usernames: Vec<&String> = config.users.keys().collect();
        usernames.sort();
        contexts.extend(usernames.into_iter().map(|name| AuthInfo::user(name.as_str())));
    }

    let dir = AsyncUserDir::new(dir);
    let mut healthy = true;
    for auth in &contexts {
        healthy &= report(&dir, auth).await;
    }

    if healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Logs the effective home and permissions of `auth`; false if its home is unusable.
async fn report(dir: &AsyncUserDir, auth: &AuthInfo) -> bool {
    let permissions: Vec<String> = [
        Operation::Read,
        Operation::Write,
        Operation::Delete,
        Operation::List,
    ]
    .into_iter()
    .map(|op| {
        let verdict = if dir.inner().has_permission(auth, op) {
            "allow"
        } else {
            "deny"
        };
        format!("{op}={verdict}")
    })
    .collect();

    let home = dir
        .inner()
        .resolve(auth, "/")
        .map(|path| path.display().to_string())
        .unwrap_or_default();

    match dir.stat(auth, "/").await {
        Ok(stat) if stat.is_dir => {
            info!(
                "{}: home {} [{}]",
                auth.display_name(),
                home,
                permissions.join(", ")
            );
            true
        }
        Ok(_) => {
            error!("{}: home {} is not a directory", auth.display_name(), home);
            false
        }
        Err(e) => {
            handle_error(&e);
            // A denied listing is a policy decision, not a broken home
            let status = error_to_http_status(&e);
            warn!(
                "{}: home {} [{}] answers {} to PROPFIND /",
                auth.display_name(),
                home,
                permissions.join(", "),
                status
            );
            status == 403
        }
    }
}
