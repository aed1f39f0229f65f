//! Input validation utilities
//!
//! Checks applied to configured usernames and user subdirectories.

use std::path::{Component, Path};

/// Longest username accepted in the configuration.
pub const MAX_USERNAME_LENGTH: usize = 256;

/// Validate that a username is not empty and doesn't contain control characters
pub fn is_valid_username(input: &str) -> bool {
    !input.trim().is_empty()
        && input.len() <= MAX_USERNAME_LENGTH
        && !input.chars().any(char::is_control)
}

/// Validate that a subdirectory stays below the directory it is joined onto
///
/// Accepts one or more plain, `/`-separated path segments. Absolute paths,
/// `.`/`..` segments and null bytes are rejected.
pub fn is_valid_subdirectory(input: &str) -> bool {
    if input.is_empty() || input.contains('\0') {
        return false;
    }

    input.split('/').all(|segment| {
        let mut components = Path::new(segment).components();
        matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        )
    })
}
