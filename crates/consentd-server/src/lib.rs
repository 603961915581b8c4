//! Consentd Server - HTTP surface over the consent event pipeline.
//!
//! The pipeline itself lives in `service/`: the Type Resolver, Event
//! Writer, and State Reader operate against the `consentd-store` contracts
//! and the TTL cache in `cache/`. Everything HTTP-shaped (handlers, error
//! mapping, middleware) sits on top and stays thin.

pub mod cache;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod service;
pub mod state;

pub use server::{create_router, create_router_with_state, run_server_with_state};
pub use state::{AppState, StateSettings};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_defined() {
        assert!(!version().is_empty());
    }
}
