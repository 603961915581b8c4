//! User management.
//!
//! Users are created and removed here; their consent log is owned by the
//! writer/reader pair. Removing a user cascades through the store and
//! drops their cached state.

use std::sync::Arc;

use tracing::{info, warn};

use consentd_core::{ConsentError, ConsentState, Result, UserId};
use consentd_store::{ConsentCache, UserStore};

use crate::cache::user_state_key;
use crate::service::reader::StateReader;

/// A user together with their derived consent state.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub consents: Vec<ConsentState>,
}

pub struct UserService {
    users: Arc<dyn UserStore>,
    reader: Arc<StateReader>,
    cache: Arc<dyn ConsentCache>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserStore>,
        reader: Arc<StateReader>,
        cache: Arc<dyn ConsentCache>,
    ) -> Self {
        Self {
            users,
            reader,
            cache,
        }
    }

    /// Registers a user. Emails are normalized to lowercase before the
    /// uniqueness check.
    ///
    /// # Errors
    ///
    /// `EmailTaken` if the normalized email is already registered.
    pub async fn create(&self, email: &str) -> Result<UserProfile> {
        let normalized = email.trim().to_lowercase();

        if self
            .users
            .find_by_email(&normalized)
            .await
            .map_err(ConsentError::from)?
            .is_some()
        {
            return Err(ConsentError::EmailTaken(normalized));
        }

        let user = self
            .users
            .insert(&normalized)
            .await
            .map_err(ConsentError::from)?;
        info!(user_id = %user.id, "user created");

        Ok(UserProfile {
            id: user.id,
            email: user.email,
            consents: Vec::new(),
        })
    }

    /// Returns a user with their current consent state.
    pub async fn get(&self, id: UserId) -> Result<UserProfile> {
        let user = self
            .users
            .find_by_id(id)
            .await
            .map_err(ConsentError::from)?
            .ok_or(ConsentError::UserNotFound(id))?;
        let consents = self.reader.current_state(id).await?;

        Ok(UserProfile {
            id: user.id,
            email: user.email,
            consents,
        })
    }

    /// Lists all users with their current consent state, oldest first.
    pub async fn list(&self) -> Result<Vec<UserProfile>> {
        let users = self.users.list().await.map_err(ConsentError::from)?;

        let mut profiles = Vec::with_capacity(users.len());
        for user in users {
            let consents = self.reader.current_state(user.id).await?;
            profiles.push(UserProfile {
                id: user.id,
                email: user.email,
                consents,
            });
        }
        Ok(profiles)
    }

    /// Removes a user. Their events go with them (store cascade) and the
    /// cached state entry is dropped best-effort.
    pub async fn remove(&self, id: UserId) -> Result<()> {
        let deleted = self.users.delete(id).await.map_err(ConsentError::from)?;
        if !deleted {
            return Err(ConsentError::UserNotFound(id));
        }

        if let Err(err) = self.cache.invalidate(&user_state_key(id)).await {
            warn!(user_id = %id, error = %err, "state cache invalidation failed after delete");
        }
        info!(user_id = %id, "user removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use consentd_core::Slug;
    use consentd_store::{EventStore, MemoryStore, TypeStore};

    use crate::cache::{CacheSettings, MokaCache};
    use crate::service::{EventWriter, TypeResolver};

    struct Fixture {
        store: Arc<MemoryStore>,
        writer: EventWriter,
        service: UserService,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        store.upsert(Slug::new("email_notifications"), None).await.unwrap();

        let cache: Arc<dyn ConsentCache> = Arc::new(MokaCache::new(CacheSettings::default()));
        let resolver = Arc::new(TypeResolver::new(
            store.clone(),
            cache.clone(),
            Duration::from_secs(3600),
        ));
        let writer = EventWriter::new(store.clone(), store.clone(), resolver, cache.clone());
        let reader = Arc::new(StateReader::new(
            store.clone(),
            store.clone(),
            cache.clone(),
            Duration::from_secs(300),
        ));
        let service = UserService::new(store.clone(), reader, cache);

        Fixture {
            store,
            writer,
            service,
        }
    }

    #[tokio::test]
    async fn create_normalizes_email() {
        let fx = fixture().await;

        let profile = fx.service.create("  Ada@Example.COM ").await.unwrap();
        assert_eq!(profile.email, "ada@example.com");
        assert!(profile.consents.is_empty());
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email_case_insensitively() {
        let fx = fixture().await;

        fx.service.create("ada@example.com").await.unwrap();
        let err = fx.service.create("ADA@example.com").await.unwrap_err();

        assert!(matches!(err, ConsentError::EmailTaken(_)));
    }

    #[tokio::test]
    async fn get_includes_current_consents() {
        let fx = fixture().await;

        let profile = fx.service.create("ada@example.com").await.unwrap();
        fx.writer
            .create(
                profile.id,
                &[consentd_core::ConsentChange {
                    slug: Slug::new("email_notifications"),
                    enabled: true,
                }],
            )
            .await
            .unwrap();

        let fetched = fx.service.get(profile.id).await.unwrap();
        assert_eq!(fetched.consents.len(), 1);
        assert!(fetched.consents[0].enabled);
    }

    #[tokio::test]
    async fn remove_unknown_user_is_not_found() {
        let fx = fixture().await;
        let err = fx.service.remove(UserId::generate()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn remove_cascades_events() {
        let fx = fixture().await;

        let profile = fx.service.create("ada@example.com").await.unwrap();
        fx.writer
            .create(
                profile.id,
                &[consentd_core::ConsentChange {
                    slug: Slug::new("email_notifications"),
                    enabled: true,
                }],
            )
            .await
            .unwrap();

        fx.service.remove(profile.id).await.unwrap();

        assert_eq!(fx.store.event_count().await, 0);
        let (_, total) = fx
            .store
            .find_page(&consentd_store::EventFilter::any(), 0, 10)
            .await
            .unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn list_returns_profiles_for_every_user() {
        let fx = fixture().await;

        fx.service.create("a@example.com").await.unwrap();
        fx.service.create("b@example.com").await.unwrap();

        let profiles = fx.service.list().await.unwrap();
        assert_eq!(profiles.len(), 2);
    }
}
