//! Derived state reads and the raw audit listing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use consentd_core::{
    ConsentError, ConsentEventRecord, ConsentState, PageMeta, PageRequest, Result, Slug, UserId,
};
use consentd_store::{ConsentCache, EventFilter, EventStore, UserStore};

use crate::cache::user_state_key;

/// Reconstructs a user's current consent state from the event log, and
/// serves the paginated raw event listing.
///
/// Current state is a fold: per consent type, the event with the maximum
/// creation timestamp wins, with the insertion sequence breaking equal
/// timestamps. The fold result is cached per user; the `EventWriter`
/// invalidates that entry on every write.
pub struct StateReader {
    users: Arc<dyn UserStore>,
    events: Arc<dyn EventStore>,
    cache: Arc<dyn ConsentCache>,
    ttl: Duration,
}

impl StateReader {
    /// Creates a reader that caches derived state for `ttl`.
    pub fn new(
        users: Arc<dyn UserStore>,
        events: Arc<dyn EventStore>,
        cache: Arc<dyn ConsentCache>,
        ttl: Duration,
    ) -> Self {
        Self {
            users,
            events,
            cache,
            ttl,
        }
    }

    /// Returns one entry per consent type the user has ever set, ordered by
    /// slug ascending.
    ///
    /// # Errors
    ///
    /// `UserNotFound` if the user does not exist.
    pub async fn current_state(&self, user_id: UserId) -> Result<Vec<ConsentState>> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(ConsentError::from)?
            .ok_or(ConsentError::UserNotFound(user_id))?;

        let key = user_state_key(user_id);
        if let Some(value) = self.cache.get(&key).await? {
            match serde_json::from_value::<Vec<ConsentState>>(value) {
                Ok(state) => return Ok(state),
                Err(err) => {
                    debug!(user_id = %user_id, error = %err, "discarding corrupt state entry");
                },
            }
        }

        let events = self.events.find_for_user(user_id).await.map_err(ConsentError::from)?;
        let state = fold_current_state(&events);

        let value = serde_json::to_value(&state)
            .map_err(|e| ConsentError::internal(e.to_string()))?;
        self.cache.set(&key, value, self.ttl).await?;

        Ok(state)
    }

    /// Returns one page of raw, non-deduplicated events, newest first.
    ///
    /// This is an audit view; it is never served from the state cache.
    pub async fn list_events(
        &self,
        filter: &EventFilter,
        page: PageRequest,
    ) -> Result<(Vec<ConsentEventRecord>, PageMeta)> {
        let (rows, total) = self
            .events
            .find_page(filter, page.offset(), u64::from(page.limit()))
            .await
            .map_err(ConsentError::from)?;

        Ok((rows, PageMeta::build(total, page.page(), page.limit())))
    }
}

/// Per consent type, keep the most recent event: maximum creation
/// timestamp, ties broken by the highest insertion sequence. Output sorted
/// by slug ascending.
fn fold_current_state(events: &[ConsentEventRecord]) -> Vec<ConsentState> {
    let mut latest: HashMap<&Slug, &ConsentEventRecord> = HashMap::new();
    for event in events {
        match latest.get(&event.slug) {
            Some(current)
                if (current.created_at, current.seq) >= (event.created_at, event.seq) => {},
            _ => {
                latest.insert(&event.slug, event);
            },
        }
    }

    let mut state: Vec<ConsentState> = latest
        .into_values()
        .map(|e| ConsentState {
            slug: e.slug.clone(),
            enabled: e.enabled,
        })
        .collect();
    state.sort_by(|a, b| a.slug.cmp(&b.slug));
    state
}
