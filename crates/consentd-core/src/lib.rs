//! Consentd Core - Domain types for the consent event log.
//!
//! This crate provides the foundational types shared by the Consentd
//! storage contracts and server: identifiers, domain records, the error
//! taxonomy, and pagination metadata. It performs no I/O.

pub mod error;
pub mod model;
pub mod pagination;
pub mod types;

pub use error::{ConsentError, Result};
pub use model::{
    BatchResult, ConsentChange, ConsentEventRecord, ConsentState, ConsentTypeRecord, NewEventRow,
    UserRecord,
};
pub use pagination::{PageMeta, PageRequest};
pub use types::{Slug, TypeId, UserId};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
