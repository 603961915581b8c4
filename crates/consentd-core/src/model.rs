//! Domain records for the consent event log.
//!
//! `ConsentEventRecord` rows are append-only: a row is one immutable fact
//! "at this instant, user X set consent Y to enabled/disabled". The current
//! state of a (user, type) pair is derived by folding the log, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Slug, TypeId, UserId};

/// A consent type: a named, cacheable category of consent.
///
/// Immutable once seeded except for administrative correction; never
/// deleted by normal operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentTypeRecord {
    pub id: TypeId,
    /// Unique business key, e.g. `"email_notifications"`.
    pub slug: Slug,
    /// Optional display name.
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A registered user. Referenced, never mutated, by the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    /// Unique, stored lowercased.
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One persisted consent event.
///
/// `created_at` has second-level granularity, so two events written in the
/// same second carry equal timestamps; `seq` is the store-assigned insertion
/// sequence that breaks such ties (highest wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentEventRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub type_id: TypeId,
    /// Slug of the referenced consent type, denormalized by the store.
    pub slug: Slug,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    /// Monotonic insertion sequence assigned by the store.
    pub seq: u64,
}

/// A row to be inserted, before the store assigns id/timestamp/sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEventRow {
    pub user_id: UserId,
    pub type_id: TypeId,
    pub slug: Slug,
    pub enabled: bool,
}

/// One requested consent change in a write batch (caller input order matters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentChange {
    pub slug: Slug,
    pub enabled: bool,
}

/// One entry of a user's derived current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentState {
    pub slug: Slug,
    pub enabled: bool,
}

/// Outcome of a committed write batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub user_id: UserId,
    /// The (slug, enabled) pairs actually written, in first-occurrence order.
    pub consents: Vec<ConsentState>,
    /// Creation timestamp shared by every row in the batch.
    pub created_at: DateTime<Utc>,
}
