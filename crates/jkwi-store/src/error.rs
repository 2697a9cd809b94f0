//! Storage errors.

use thiserror::Error;

/// A store operation failed.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend reported an I/O failure for `key`.
    #[error("I/O error on key \"{key}\": {source}")]
    Io {
        /// Key being accessed.
        key: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The key is empty, absolute, or contains `..` or empty segments.
    #[error("invalid store key: \"{0}\"")]
    InvalidKey(String),
}

impl StoreError {
    pub(crate) fn io(key: &str, source: std::io::Error) -> Self {
        Self::Io {
            key: key.to_string(),
            source,
        }
    }
}
