//! Validation functions for pointer strings and paths.

use thiserror::Error;

/// Maximum allowed pointer string length.
const MAX_POINTER_LENGTH: usize = 4096;

/// Maximum allowed path depth.
pub const MAX_PATH_LENGTH: usize = 256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("pointer must be empty or start with '/': {0:?}")]
    PointerInvalid(String),
    #[error("pointer exceeds {MAX_POINTER_LENGTH} characters")]
    PointerTooLong,
    #[error("path exceeds {MAX_PATH_LENGTH} keys")]
    PathTooLong,
    #[error("path has no parent")]
    NoParent,
}

/// Validate a pointer string.
///
/// # Errors
///
/// Returns an error if:
/// - The pointer is non-empty but doesn't start with `/`
/// - The pointer exceeds the maximum length
///
/// # Example
///
/// ```
/// use wsf_proxy_path::validate_pointer;
///
/// validate_pointer("").unwrap();
/// validate_pointer("/platform/P1").unwrap();
/// validate_pointer("platform").unwrap_err();
/// ```
pub fn validate_pointer(pointer: &str) -> Result<(), PathError> {
    if pointer.is_empty() {
        return Ok(());
    }
    if !pointer.starts_with('/') {
        return Err(PathError::PointerInvalid(pointer.to_string()));
    }
    if pointer.len() > MAX_POINTER_LENGTH {
        return Err(PathError::PointerTooLong);
    }
    Ok(())
}

/// Validate a path depth.
pub fn validate_depth(depth: usize) -> Result<(), PathError> {
    if depth > MAX_PATH_LENGTH {
        return Err(PathError::PathTooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_empty_pointer() {
        assert!(validate_pointer("").is_ok());
    }

    #[test]
    fn test_validate_absolute_pointer() {
        assert!(validate_pointer("/").is_ok());
        assert!(validate_pointer("/zone").is_ok());
        assert!(validate_pointer("/platform/P1/mover").is_ok());
    }

    #[test]
    fn test_validate_relative_pointer() {
        assert_eq!(
            validate_pointer("zone/Z1"),
            Err(PathError::PointerInvalid("zone/Z1".into()))
        );
    }

    #[test]
    fn test_validate_long_pointer() {
        let long_pointer = "/".to_string() + &"a".repeat(5000);
        assert_eq!(validate_pointer(&long_pointer), Err(PathError::PointerTooLong));
    }

    #[test]
    fn test_validate_depth() {
        assert!(validate_depth(MAX_PATH_LENGTH).is_ok());
        assert_eq!(validate_depth(MAX_PATH_LENGTH + 1), Err(PathError::PathTooLong));
    }
}
