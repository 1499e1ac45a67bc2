//! Error types for notewell.

use thiserror::Error;

/// Result type alias using notewell's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for notewell operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication/authorization failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("note abc".to_string());
        assert_eq!(err.to_string(), "Not found: note abc");
    }

    #[test]
    fn test_error_display_unauthorized() {
        let err = Error::Unauthorized("invalid token".to_string());
        assert_eq!(err.to_string(), "Unauthorized: invalid token");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("title required".to_string());
        assert_eq!(err.to_string(), "Invalid input: title required");
    }

    #[test]
    fn test_error_display_internal() {
        let err = Error::Internal("hash failure".to_string());
        assert_eq!(err.to_string(), "Internal error: hash failure");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(get_result().unwrap(), 42);
    }
}
