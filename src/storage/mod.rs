//! File system storage management
//!
//! Path resolution, permission checks and the user-directory adapter.

pub mod async_dir;
pub mod filesystem;
pub mod flags;
pub mod permissions;
pub mod results;
pub mod validation;

// Re-export commonly used types
pub use async_dir::AsyncUserDir;
pub use filesystem::{FileSystemProvider, UserDir};
pub use flags::{AccessMode, OpenFlags};
pub use permissions::{Operation, Permission, has_permission};
pub use results::FileStat;
pub use validation::{clean_virtual_path, resolve};
