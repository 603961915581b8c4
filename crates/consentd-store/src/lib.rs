//! Consentd Store - backing-store and cache contracts.
//!
//! This crate defines the traits the consent pipeline is written against
//! (`UserStore`, `TypeStore`, `EventStore`, `ConsentCache`) and ships the
//! in-memory reference backend used by tests and the default server wiring.
//! A relational or Redis-backed implementation plugs in behind the same
//! traits without touching the pipeline.

pub mod cache;
pub mod error;
pub mod memory;
pub mod seed;
pub mod store;

pub use cache::{CacheError, ConsentCache};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use seed::{DEFAULT_CONSENT_TYPES, ensure_default_consent_types};
pub use store::{EventFilter, EventStore, TypeStore, UserStore};
