//! Consent batch ingestion.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use tracing::{info, warn};

use consentd_core::{
    BatchResult, ConsentChange, ConsentError, ConsentState, NewEventRow, Result, Slug, UserId,
};
use consentd_store::{ConsentCache, EventStore, UserStore};

use crate::cache::user_state_key;
use crate::service::resolver::TypeResolver;

/// Validates, deduplicates, and atomically persists a batch of consent
/// changes, then invalidates the owner's cached state.
pub struct EventWriter {
    users: Arc<dyn UserStore>,
    events: Arc<dyn EventStore>,
    resolver: Arc<TypeResolver>,
    cache: Arc<dyn ConsentCache>,
}

impl EventWriter {
    pub fn new(
        users: Arc<dyn UserStore>,
        events: Arc<dyn EventStore>,
        resolver: Arc<TypeResolver>,
        cache: Arc<dyn ConsentCache>,
    ) -> Self {
        Self {
            users,
            events,
            resolver,
            cache,
        }
    }

    /// Records a batch of consent changes for a user.
    ///
    /// The caller's array order is authoritative: when a slug appears more
    /// than once, the value of its last occurrence wins and the earlier
    /// ones are discarded before persistence. All surviving rows commit in
    /// one atomic insert.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user does not exist; nothing is written.
    /// - `UnknownConsentTypes` listing every unresolved slug; nothing is
    ///   written.
    /// - `Storage` if the store or cache fails before the commit.
    pub async fn create(&self, user_id: UserId, changes: &[ConsentChange]) -> Result<BatchResult> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(ConsentError::from)?
            .ok_or(ConsentError::UserNotFound(user_id))?;

        let requested: Vec<Slug> = changes.iter().map(|c| c.slug.clone()).collect();
        let resolved = self.resolver.resolve(&requested).await?;

        let mut missing: Vec<Slug> = Vec::new();
        for slug in &requested {
            if !resolved.contains_key(slug) && !missing.contains(slug) {
                missing.push(slug.clone());
            }
        }
        if !missing.is_empty() {
            return Err(ConsentError::unknown_consent_types(missing));
        }

        // Batch-local last-write-wins: keep first-occurrence order, let the
        // last value for a slug overwrite earlier ones.
        let mut order: Vec<Slug> = Vec::new();
        let mut winning: HashMap<Slug, bool> = HashMap::new();
        for change in changes {
            if !winning.contains_key(&change.slug) {
                order.push(change.slug.clone());
            }
            winning.insert(change.slug.clone(), change.enabled);
        }

        if order.is_empty() {
            // Valid no-op batch: nothing to persist, nothing to invalidate.
            return Ok(BatchResult {
                user_id: user.id,
                consents: Vec::new(),
                created_at: Utc::now().trunc_subsecs(0),
            });
        }

        let rows: Vec<NewEventRow> = order
            .iter()
            .map(|slug| {
                let record = &resolved[slug];
                NewEventRow {
                    user_id: user.id,
                    type_id: record.id,
                    slug: slug.clone(),
                    enabled: winning[slug],
                }
            })
            .collect();

        let saved = self
            .events
            .insert_batch(rows)
            .await
            .map_err(ConsentError::from)?;

        let created_at = saved
            .first()
            .map(|r| r.created_at)
            .unwrap_or_else(|| Utc::now().trunc_subsecs(0));

        // Invalidation runs after the commit so a racing reader cannot
        // repopulate the cache with pre-write state and swallow it. If it
        // fails the committed write stands; the entry ages out by TTL.
        if let Err(err) = self.cache.invalidate(&user_state_key(user.id)).await {
            warn!(
                user_id = %user.id,
                error = %err,
                "state cache invalidation failed after commit"
            );
        }

        info!(user_id = %user.id, rows = saved.len(), "consent batch committed");

        Ok(BatchResult {
            user_id: user.id,
            consents: saved
                .into_iter()
                .map(|r| ConsentState {
                    slug: r.slug,
                    enabled: r.enabled,
                })
                .collect(),
            created_at,
        })
    }
}
