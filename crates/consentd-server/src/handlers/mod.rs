//! HTTP endpoint handlers.

pub mod events;
pub mod health;
pub mod metrics;
pub mod users;

use serde::Serialize;

use consentd_core::ConsentState;

/// One consent entry as exposed over the API. `id` carries the consent
/// type slug.
#[derive(Debug, Clone, Serialize)]
pub struct ConsentEntry {
    pub id: String,
    pub enabled: bool,
}

impl From<ConsentState> for ConsentEntry {
    fn from(state: ConsentState) -> Self {
        Self {
            id: state.slug.to_string(),
            enabled: state.enabled,
        }
    }
}
