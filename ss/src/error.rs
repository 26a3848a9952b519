//! Store error types

use thiserror::Error;

/// Errors raised by a store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid key '{0}': keys use only ASCII letters, digits, '_', '-' and '.'")]
    InvalidKey(String),

    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation not supported by this store: {0}")]
    Unsupported(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::InvalidKey("a/b".to_string());
        assert!(err.to_string().contains("'a/b'"));

        let err = StoreError::Unsupported("snapshot");
        assert_eq!(err.to_string(), "Operation not supported by this store: snapshot");
    }

    #[test]
    fn test_io_from() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: StoreError = io.into();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
