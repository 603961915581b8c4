//! Default consent type seeding.
//!
//! Runs at process start; upsert-by-slug keeps it idempotent, so two
//! replicas racing through startup never duplicate a type.

use tracing::info;

use consentd_core::Slug;

use crate::error::StoreError;
use crate::store::TypeStore;

/// Consent types every deployment starts with, as (slug, display name).
pub const DEFAULT_CONSENT_TYPES: &[(&str, &str)] = &[
    ("email_notifications", "Email notifications"),
    ("sms_notifications", "SMS notifications"),
];

/// Ensures the default consent types exist. Invoking this twice never
/// produces duplicate rows for the same slug.
pub async fn ensure_default_consent_types(types: &dyn TypeStore) -> Result<(), StoreError> {
    let slugs: Vec<Slug> = DEFAULT_CONSENT_TYPES
        .iter()
        .map(|(slug, _)| Slug::new(*slug))
        .collect();
    let existing = types.find_by_slugs(&slugs).await?;

    let mut created = 0usize;
    for (slug, name) in DEFAULT_CONSENT_TYPES {
        if existing.iter().any(|t| t.slug.as_str() == *slug) {
            continue;
        }
        types.upsert(Slug::new(*slug), Some(name)).await?;
        created += 1;
    }

    if created > 0 {
        info!(created, "seeded default consent types");
    }
    Ok(())
}
