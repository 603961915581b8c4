//! Cache module for the Consentd server.
//!
//! Provides the moka-backed implementation of the `ConsentCache` contract,
//! with per-entry TTL expiration, capacity bounds, and metrics, plus the
//! key-building conventions shared by the pipeline.

pub mod keys;
pub mod store;

pub use keys::{consent_type_key, user_state_key};
pub use store::{CacheSettings, MokaCache};
