//! Consent event endpoint handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use consentd_core::{ConsentChange, PageMeta, PageRequest, Slug};
use consentd_store::EventFilter;

use crate::error::{AppError, ValidationIssue};
use crate::handlers::ConsentEntry;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserRef {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct UserRefResponse {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ConsentChangeBody {
    /// Consent type slug.
    pub id: String,
    pub enabled: bool,
}

/// Request body for POST /events.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub user: UserRef,
    pub consents: Vec<ConsentChangeBody>,
}

/// Response body for POST /events.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventResponse {
    pub user: UserRefResponse,
    pub consents: Vec<ConsentEntry>,
    pub created_at: DateTime<Utc>,
}

/// Query parameters for GET /events.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    pub user_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub type_slug: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// One row of the audit listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRow {
    pub id: Uuid,
    pub user: UserRefResponse,
    /// Consent type slug.
    #[serde(rename = "type")]
    pub type_slug: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct EventsPage {
    pub data: Vec<EventRow>,
    pub meta: PageMeta,
}

/// POST /events
///
/// Records a batch of consent changes for a user.
#[instrument(skip_all, fields(user_id = %body.user.id, changes = body.consents.len()))]
pub async fn create_event(
    State(state): State<AppState>,
    Json(body): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<CreateEventResponse>), AppError> {
    let changes = parse_changes(&body.consents)?;

    let result = state.writer().create(body.user.id.into(), &changes).await?;

    let response = CreateEventResponse {
        user: UserRefResponse {
            id: result.user_id.as_uuid(),
        },
        consents: result.consents.into_iter().map(ConsentEntry::from).collect(),
        created_at: result.created_at,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /events
///
/// Lists raw events newest first, optionally filtered by user and type.
#[instrument(skip_all)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsPage>, AppError> {
    let filter = EventFilter {
        user_id: query.user_id.map(Into::into),
        type_slug: query.type_slug.map(Slug::new),
    };
    let page = PageRequest::new(query.page, query.limit);

    let (rows, meta) = state.reader().list_events(&filter, page).await?;

    let data = rows
        .into_iter()
        .map(|row| EventRow {
            id: row.id,
            user: UserRefResponse {
                id: row.user_id.as_uuid(),
            },
            type_slug: row.slug.to_string(),
            enabled: row.enabled,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(EventsPage { data, meta }))
}

fn parse_changes(consents: &[ConsentChangeBody]) -> Result<Vec<ConsentChange>, AppError> {
    let blank: Vec<ValidationIssue> = consents
        .iter()
        .filter(|change| change.id.trim().is_empty())
        .map(|_| {
            ValidationIssue::new(
                "consents.id",
                "isNotEmpty",
                "consent id must not be empty".to_string(),
            )
        })
        .collect();
    if !blank.is_empty() {
        return Err(AppError::Unprocessable(blank));
    }

    Ok(consents
        .iter()
        .map(|change| ConsentChange {
            slug: Slug::new(&change.id),
            enabled: change.enabled,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_slug_is_rejected_before_resolution() {
        let body = vec![ConsentChangeBody {
            id: "  ".to_string(),
            enabled: true,
        }];
        let err = parse_changes(&body).unwrap_err();
        assert!(matches!(err, AppError::Unprocessable(_)));
    }

    #[test]
    fn changes_preserve_order_and_flags() {
        let body = vec![
            ConsentChangeBody {
                id: "email_notifications".to_string(),
                enabled: true,
            },
            ConsentChangeBody {
                id: "sms_notifications".to_string(),
                enabled: false,
            },
        ];
        let changes = parse_changes(&body).unwrap();
        assert_eq!(changes[0].slug.as_str(), "email_notifications");
        assert!(changes[0].enabled);
        assert!(!changes[1].enabled);
    }
}
