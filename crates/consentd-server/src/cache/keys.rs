//! Cache key conventions.
//!
//! Two key families exist: per-slug consent type records and per-user
//! derived state. Slugs enter the key verbatim; they are case-sensitive
//! identifiers and must not be normalized here.

use consentd_core::{Slug, UserId};

/// Key under which a resolved consent type record is cached.
///
/// # Examples
///
/// ```
/// use consentd_core::Slug;
/// use consentd_server::cache::consent_type_key;
///
/// let key = consent_type_key(&Slug::new("email_notifications"));
/// assert_eq!(key, "consentType:slug:email_notifications");
/// ```
pub fn consent_type_key(slug: &Slug) -> String {
    format!("consentType:slug:{}", slug)
}

/// Key under which a user's derived consent state is cached.
pub fn user_state_key(user_id: UserId) -> String {
    format!("user:state:{}", user_id)
}
