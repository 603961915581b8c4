//! Error taxonomy for Consentd.
//!
//! Three families of failure are kept distinct so callers can tell "your
//! input is wrong" from "try again later":
//!
//! - `UserNotFound` — the referenced user does not exist; no side effects.
//! - `UnknownConsentTypes` / `EmailTaken` — unprocessable input, reported
//!   with the complete offending context in one response.
//! - `Storage` — the backing store or cache is unreachable; never retried
//!   here (retry policy belongs to the transport layer).
//!
//! # Example
//!
//! ```
//! use consentd_core::{ConsentError, Slug};
//!
//! let error = ConsentError::unknown_consent_types(vec![Slug::new("push_notifications")]);
//! assert!(error.is_unprocessable());
//! assert!(error.to_string().contains("push_notifications"));
//! ```

use thiserror::Error;

use crate::types::{Slug, UserId};

/// Main error type for consent log operations.
#[derive(Debug, Error)]
pub enum ConsentError {
    /// The referenced user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// One or more requested consent slugs do not resolve to a known type.
    ///
    /// Carries every unresolved slug, never just the first, so the caller
    /// can correct the whole request in one round trip.
    #[error("unknown consent types: {}", format_slugs(.slugs))]
    UnknownConsentTypes {
        /// The complete list of offending slugs, in request order.
        slugs: Vec<Slug>,
    },

    /// The email is already registered to another user.
    #[error("email already registered: {0}")]
    EmailTaken(String),

    /// The backing store or cache is unreachable or returned an error.
    #[error("storage error: {message}")]
    Storage {
        /// Description of what went wrong.
        message: String,
        /// Underlying error, if any.
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generic internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

fn format_slugs(slugs: &[Slug]) -> String {
    slugs
        .iter()
        .map(Slug::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ConsentError {
    /// Creates an UnknownConsentTypes error.
    pub fn unknown_consent_types(slugs: Vec<Slug>) -> Self {
        Self::UnknownConsentTypes { slugs }
    }

    /// Creates a Storage error without a cause.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a Storage error with a cause.
    pub fn storage_with_cause<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error indicates a missing user.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_))
    }

    /// Returns true if this is a validation failure the caller must fix.
    pub fn is_unprocessable(&self) -> bool {
        matches!(self, Self::UnknownConsentTypes { .. } | Self::EmailTaken(_))
    }

    /// Returns true if this is a storage/backend failure.
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

/// Type alias for Results with ConsentError.
pub type Result<T> = std::result::Result<T, ConsentError>;
