//! Application state.

use std::sync::Arc;
use std::time::Duration;

use consentd_store::{ConsentCache, EventStore, TypeStore, UserStore};

use crate::cache::{CacheSettings, MokaCache};
use crate::service::{EventWriter, StateReader, TypeResolver, UserService};

/// Cache TTLs and sizing for the service layer.
#[derive(Debug, Clone, Copy)]
pub struct StateSettings {
    /// How long a resolved consent type stays cached.
    pub consent_type_ttl: Duration,
    /// How long a user's derived state stays cached.
    pub user_state_ttl: Duration,
    /// Maximum number of cached entries across both key families.
    pub cache_capacity: u64,
}

impl Default for StateSettings {
    fn default() -> Self {
        Self {
            consent_type_ttl: Duration::from_secs(3600),
            user_state_ttl: Duration::from_secs(300),
            cache_capacity: 10_000,
        }
    }
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    writer: Arc<EventWriter>,
    reader: Arc<StateReader>,
    users: Arc<UserService>,
}

impl AppState {
    /// Wires the service layer on top of the given stores, with a fresh
    /// in-process cache.
    pub fn new(
        users: Arc<dyn UserStore>,
        types: Arc<dyn TypeStore>,
        events: Arc<dyn EventStore>,
        settings: StateSettings,
    ) -> Self {
        let cache: Arc<dyn ConsentCache> = Arc::new(MokaCache::new(CacheSettings {
            max_capacity: settings.cache_capacity,
        }));
        Self::with_cache(users, types, events, cache, settings)
    }

    /// Same as [`AppState::new`] but with a caller-provided cache.
    pub fn with_cache(
        users: Arc<dyn UserStore>,
        types: Arc<dyn TypeStore>,
        events: Arc<dyn EventStore>,
        cache: Arc<dyn ConsentCache>,
        settings: StateSettings,
    ) -> Self {
        let resolver = Arc::new(TypeResolver::new(
            types,
            cache.clone(),
            settings.consent_type_ttl,
        ));
        let writer = Arc::new(EventWriter::new(
            users.clone(),
            events.clone(),
            resolver,
            cache.clone(),
        ));
        let reader = Arc::new(StateReader::new(
            users.clone(),
            events,
            cache.clone(),
            settings.user_state_ttl,
        ));
        let user_service = Arc::new(UserService::new(users, reader.clone(), cache));

        Self {
            writer,
            reader,
            users: user_service,
        }
    }

    pub fn writer(&self) -> &EventWriter {
        &self.writer
    }

    pub fn reader(&self) -> &StateReader {
        &self.reader
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }
}
