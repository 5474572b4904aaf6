//! Storage error types.

/// Errors that can occur when reading or writing the local store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem operation failed
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be (de)serialized
    #[error("invalid JSON for key {key}: {message}")]
    Json { key: String, message: String },

    /// Key cannot be mapped to a storage location
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StorageError::Json {
            key: "user-preferences".into(),
            message: "expected value".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid JSON for key user-preferences: expected value"
        );

        let err = StorageError::InvalidKey("../etc".into());
        assert_eq!(err.to_string(), "invalid storage key: \"../etc\"");
    }
}
