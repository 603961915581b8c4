//! User endpoint handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use consentd_core::{PageMeta, PageRequest};

use crate::error::{AppError, ValidationIssue};
use crate::handlers::ConsentEntry;
use crate::service::UserProfile;
use crate::state::AppState;

/// Request body for POST /users.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    /// Latest state per consent type, slug ascending.
    pub consents: Vec<ConsentEntry>,
}

impl From<UserProfile> for UserResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id.as_uuid(),
            email: profile.email,
            consents: profile.consents.into_iter().map(ConsentEntry::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct UsersPage {
    pub data: Vec<UserResponse>,
    pub meta: PageMeta,
}

/// Response body for GET /users/{id}/state.
#[derive(Debug, Serialize)]
pub struct UserStateResponse {
    pub user: UserIdRef,
    pub consents: Vec<ConsentEntry>,
}

#[derive(Debug, Serialize)]
pub struct UserIdRef {
    pub id: Uuid,
}

/// POST /users
#[instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    validate_email(&body.email)?;

    let profile = state.users().create(&body.email).await?;
    Ok((StatusCode::CREATED, Json(profile.into())))
}

/// GET /users
///
/// Lists users with their current consents, paginated.
#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UsersQuery>,
) -> Result<Json<UsersPage>, AppError> {
    let page = PageRequest::new(query.page, query.limit);

    let profiles = state.users().list().await?;
    let total = profiles.len() as u64;

    let data = profiles
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .map(UserResponse::from)
        .collect();

    Ok(Json(UsersPage {
        data,
        meta: PageMeta::build(total, page.page(), page.limit()),
    }))
}

/// GET /users/{id}
#[instrument(skip_all, fields(user_id = %id))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let profile = state.users().get(id.into()).await?;
    Ok(Json(profile.into()))
}

/// GET /users/{id}/state
///
/// Returns the derived current consent state only.
#[instrument(skip_all, fields(user_id = %id))]
pub async fn get_user_state(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserStateResponse>, AppError> {
    let consents = state.reader().current_state(id.into()).await?;
    Ok(Json(UserStateResponse {
        user: UserIdRef { id },
        consents: consents.into_iter().map(ConsentEntry::from).collect(),
    }))
}

/// DELETE /users/{id}
#[instrument(skip_all, fields(user_id = %id))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.users().remove(id.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let trimmed = email.trim();
    let well_formed = trimmed.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    });
    if !well_formed {
        return Err(AppError::Unprocessable(vec![ValidationIssue::new(
            "email",
            "isEmail",
            "email must be a valid email address".to_string(),
        )]));
    }
    Ok(())
}
