//! Error types for backing-store implementations.

use consentd_core::{ConsentError, Slug};

/// Errors that can occur when working with a backing store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The email is already registered.
    #[error("duplicate email: {0}")]
    DuplicateEmail(String),

    /// A consent type cannot be removed while events reference it.
    #[error("consent type in use: {0}")]
    TypeInUse(Slug),

    /// The store is unreachable or returned an error.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Description of what went wrong.
        message: String,
        /// Underlying error, if any.
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    /// Creates an Unavailable error without a cause.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates an Unavailable error with a cause.
    pub fn unavailable_with_cause<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Unavailable {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }
}

impl From<StoreError> for ConsentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(email) => ConsentError::EmailTaken(email),
            StoreError::TypeInUse(_) | StoreError::Unavailable { .. } => {
                let message = err.to_string();
                ConsentError::Storage {
                    message,
                    cause: Some(Box::new(err)),
                }
            },
        }
    }
}
