//! Backing-store trait definitions.
//!
//! These traits abstract over the persistent store holding users, consent
//! types, and the append-only event log. The server is handed trait objects
//! by construction; nothing in the pipeline knows which backend is wired in.
//!
//! # Implementors
//!
//! - `MemoryStore` - the in-process reference backend (tests, local runs)
//! - (Future) a relational backend speaking the same contracts

use async_trait::async_trait;

use consentd_core::{
    ConsentEventRecord, ConsentTypeRecord, NewEventRow, Slug, TypeId, UserId, UserRecord,
};

use crate::error::StoreError;

/// Store of registered users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Looks up a user by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError>;

    /// Looks up a user by (already normalized) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Inserts a new user.
    ///
    /// # Errors
    ///
    /// `StoreError::DuplicateEmail` if the email is already registered.
    async fn insert(&self, email: &str) -> Result<UserRecord, StoreError>;

    /// Deletes a user and, by cascade, every consent event they own.
    ///
    /// Returns `false` if no user with that id existed.
    async fn delete(&self, id: UserId) -> Result<bool, StoreError>;

    /// Lists all users ordered by creation time ascending.
    async fn list(&self) -> Result<Vec<UserRecord>, StoreError>;
}

/// Store of consent type records.
#[async_trait]
pub trait TypeStore: Send + Sync {
    /// Fetches every type whose slug is in the given set, in one query.
    ///
    /// Slugs with no matching record are simply absent from the result.
    async fn find_by_slugs(&self, slugs: &[Slug]) -> Result<Vec<ConsentTypeRecord>, StoreError>;

    /// Inserts a type by slug, or returns the existing record if the slug
    /// is already present. Seeding relies on this being idempotent.
    async fn upsert(&self, slug: Slug, name: Option<&str>)
    -> Result<ConsentTypeRecord, StoreError>;
}

/// Store of the append-only consent event log.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persists a batch of rows atomically; either all rows commit or none
    /// do. Assigns ids, a shared creation timestamp, and per-row insertion
    /// sequence numbers.
    async fn insert_batch(
        &self,
        rows: Vec<NewEventRow>,
    ) -> Result<Vec<ConsentEventRecord>, StoreError>;

    /// Fetches every event belonging to a user, unordered.
    async fn find_for_user(&self, user_id: UserId) -> Result<Vec<ConsentEventRecord>, StoreError>;

    /// Fetches one page of events matching the filter, newest first
    /// (creation time descending, insertion sequence descending), together
    /// with the total matching count.
    async fn find_page(
        &self,
        filter: &EventFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<ConsentEventRecord>, u64), StoreError>;
}

/// Filter for the raw event listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    /// Restrict to events owned by this user.
    pub user_id: Option<UserId>,
    /// Restrict to events of the type with this slug.
    pub type_slug: Option<Slug>,
}

impl EventFilter {
    /// Returns a filter matching every event.
    pub fn any() -> Self {
        Self::default()
    }

    /// Restricts the filter to one user.
    pub fn for_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Restricts the filter to one consent type by slug.
    pub fn for_type(mut self, slug: Slug) -> Self {
        self.type_slug = Some(slug);
        self
    }

    /// Returns true if the given event matches this filter.
    pub fn matches(&self, event: &ConsentEventRecord) -> bool {
        if let Some(user_id) = self.user_id
            && event.user_id != user_id
        {
            return false;
        }
        if let Some(slug) = &self.type_slug
            && &event.slug != slug
        {
            return false;
        }
        true
    }
}
