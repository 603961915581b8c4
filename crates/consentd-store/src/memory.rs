//! In-memory reference backend.
//!
//! Implements all three store contracts over `tokio::sync::RwLock` tables.
//! Each write acquires the lock once, so a batch insert is atomic with
//! respect to every reader. Creation timestamps are truncated to whole
//! seconds, matching the granularity of the target relational schema; the
//! monotonic `seq` counter is what actually orders rows within a second.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use consentd_core::{
    ConsentEventRecord, ConsentTypeRecord, NewEventRow, Slug, TypeId, UserId, UserRecord,
};

use crate::error::StoreError;
use crate::store::{EventFilter, EventStore, TypeStore, UserStore};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, UserRecord>,
    types: Vec<ConsentTypeRecord>,
    events: Vec<ConsentEventRecord>,
    next_seq: u64,
}

/// In-memory implementation of `UserStore`, `TypeStore`, and `EventStore`.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

fn second_precision(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(0)
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Returns the total number of persisted events, for test assertions.
    pub async fn event_count(&self) -> usize {
        self.tables.read().await.events.len()
    }

    /// Returns the total number of consent type rows, for test assertions.
    pub async fn type_count(&self) -> usize {
        self.tables.read().await.types.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, email: &str) -> Result<UserRecord, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail(email.to_string()));
        }

        let now = second_precision(Utc::now());
        let user = UserRecord {
            id: UserId::generate(),
            email: email.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        // Cascade: a removed user takes their event log with them.
        tables.events.retain(|e| e.user_id != id);
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let tables = self.tables.read().await;
        let mut users: Vec<UserRecord> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.email.cmp(&b.email)));
        Ok(users)
    }
}

#[async_trait]
impl TypeStore for MemoryStore {
    async fn find_by_slugs(&self, slugs: &[Slug]) -> Result<Vec<ConsentTypeRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .types
            .iter()
            .filter(|t| slugs.contains(&t.slug))
            .cloned()
            .collect())
    }

    async fn upsert(
        &self,
        slug: Slug,
        name: Option<&str>,
    ) -> Result<ConsentTypeRecord, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.types.iter().find(|t| t.slug == slug) {
            return Ok(existing.clone());
        }

        let record = ConsentTypeRecord {
            id: TypeId::generate(),
            slug,
            name: name.map(String::from),
            created_at: second_precision(Utc::now()),
        };
        tables.types.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_batch(
        &self,
        rows: Vec<NewEventRow>,
    ) -> Result<Vec<ConsentEventRecord>, StoreError> {
        let mut tables = self.tables.write().await;

        // Referential integrity, checked before anything is appended so the
        // batch stays all-or-nothing.
        for row in &rows {
            if !tables.users.contains_key(&row.user_id) {
                return Err(StoreError::unavailable(format!(
                    "insert references missing user {}",
                    row.user_id
                )));
            }
            if !tables.types.iter().any(|t| t.id == row.type_id) {
                return Err(StoreError::unavailable(format!(
                    "insert references missing consent type {}",
                    row.type_id
                )));
            }
        }

        let created_at = second_precision(Utc::now());
        let mut saved = Vec::with_capacity(rows.len());
        for row in rows {
            let seq = tables.next_seq;
            tables.next_seq += 1;
            let record = ConsentEventRecord {
                id: Uuid::new_v4(),
                user_id: row.user_id,
                type_id: row.type_id,
                slug: row.slug,
                enabled: row.enabled,
                created_at,
                seq,
            };
            tables.events.push(record.clone());
            saved.push(record);
        }
        Ok(saved)
    }

    async fn find_for_user(&self, user_id: UserId) -> Result<Vec<ConsentEventRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_page(
        &self,
        filter: &EventFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<ConsentEventRecord>, u64), StoreError> {
        let tables = self.tables.read().await;
        let mut matching: Vec<ConsentEventRecord> = tables
            .events
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();

        // Newest first, insertion sequence breaking equal-second ties.
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        let total = matching.len() as u64;
        let rows = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((rows, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_user(store: &MemoryStore, email: &str) -> UserRecord {
        store.insert(email).await.expect("insert user")
    }

    async fn seeded_type(store: &MemoryStore, slug: &str) -> ConsentTypeRecord {
        store.upsert(Slug::new(slug), None).await.expect("upsert type")
    }

    fn row(user: &UserRecord, ty: &ConsentTypeRecord, enabled: bool) -> NewEventRow {
        NewEventRow {
            user_id: user.id,
            type_id: ty.id,
            slug: ty.slug.clone(),
            enabled,
        }
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_email() {
        let store = MemoryStore::new();
        seeded_user(&store, "a@example.com").await;

        let err = store.insert("a@example.com").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn upsert_returns_existing_record_for_known_slug() {
        let store = MemoryStore::new();
        let first = seeded_type(&store, "email_notifications").await;
        let second = seeded_type(&store, "email_notifications").await;

        assert_eq!(first.id, second.id);
        assert_eq!(store.type_count().await, 1);
    }

    #[tokio::test]
    async fn batch_insert_shares_timestamp_and_orders_seq() {
        let store = MemoryStore::new();
        let user = seeded_user(&store, "a@example.com").await;
        let email = seeded_type(&store, "email_notifications").await;
        let sms = seeded_type(&store, "sms_notifications").await;

        let saved = store
            .insert_batch(vec![row(&user, &email, true), row(&user, &sms, false)])
            .await
            .unwrap();

        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].created_at, saved[1].created_at);
        assert!(saved[1].seq > saved[0].seq);
    }

    #[tokio::test]
    async fn batch_insert_is_all_or_nothing() {
        let store = MemoryStore::new();
        let user = seeded_user(&store, "a@example.com").await;
        let email = seeded_type(&store, "email_notifications").await;

        let bad_row = NewEventRow {
            user_id: user.id,
            type_id: TypeId::generate(),
            slug: Slug::new("ghost"),
            enabled: true,
        };

        let result = store
            .insert_batch(vec![row(&user, &email, true), bad_row])
            .await;

        assert!(result.is_err());
        assert_eq!(store.event_count().await, 0);
    }

    #[tokio::test]
    async fn delete_user_cascades_events() {
        let store = MemoryStore::new();
        let user = seeded_user(&store, "a@example.com").await;
        let email = seeded_type(&store, "email_notifications").await;
        store
            .insert_batch(vec![row(&user, &email, true)])
            .await
            .unwrap();

        assert!(store.delete(user.id).await.unwrap());
        assert_eq!(store.event_count().await, 0);

        // Deleting again reports absence.
        assert!(!store.delete(user.id).await.unwrap());
    }

    #[tokio::test]
    async fn find_page_orders_newest_first_with_seq_tiebreak() {
        let store = MemoryStore::new();
        let user = seeded_user(&store, "a@example.com").await;
        let email = seeded_type(&store, "email_notifications").await;

        // Two batches inside the same second: equal timestamps, rising seq.
        store.insert_batch(vec![row(&user, &email, true)]).await.unwrap();
        store.insert_batch(vec![row(&user, &email, false)]).await.unwrap();

        let (rows, total) = store
            .find_page(&EventFilter::any().for_user(user.id), 0, 10)
            .await
            .unwrap();

        assert_eq!(total, 2);
        assert!(rows[0].seq > rows[1].seq);
        assert!(!rows[0].enabled, "latest write should come first");
    }

    #[tokio::test]
    async fn find_page_filters_by_slug_and_paginates() {
        let store = MemoryStore::new();
        let user = seeded_user(&store, "a@example.com").await;
        let email = seeded_type(&store, "email_notifications").await;
        let sms = seeded_type(&store, "sms_notifications").await;

        for _ in 0..3 {
            store.insert_batch(vec![row(&user, &email, true)]).await.unwrap();
        }
        store.insert_batch(vec![row(&user, &sms, false)]).await.unwrap();

        let filter = EventFilter::any().for_type(Slug::new("email_notifications"));
        let (rows, total) = store.find_page(&filter, 1, 1).await.unwrap();

        assert_eq!(total, 3);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].slug, Slug::new("email_notifications"));
    }

    #[tokio::test]
    async fn list_orders_users_by_creation() {
        let store = MemoryStore::new();
        seeded_user(&store, "a@example.com").await;
        seeded_user(&store, "b@example.com").await;

        let users = store.list().await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(users[0].created_at <= users[1].created_at);
    }
}
