use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::error;

use consentd_core::ConsentError;

#[derive(Debug)]
pub enum AppError {
    /// The referenced resource does not exist.
    NotFound(String),

    /// The request body is well-formed but semantically invalid.
    Unprocessable(Vec<ValidationIssue>),

    /// Malformed query or path parameters.
    BadRequest(String),

    /// Anything the caller cannot fix.
    Internal(String),
}

/// One invalid property of the request body, keyed by constraint name.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub property: String,
    pub constraints: Map<String, Value>,
}

impl ValidationIssue {
    pub fn new(property: &str, constraint: &str, message: String) -> Self {
        let mut constraints = Map::new();
        constraints.insert(constraint.to_string(), Value::String(message));
        Self {
            property: property.to_string(),
            constraints,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl From<ConsentError> for AppError {
    fn from(err: ConsentError) -> Self {
        match err {
            ConsentError::UserNotFound(id) => AppError::NotFound(format!("user {id} not found")),
            ConsentError::UnknownConsentTypes { slugs } => AppError::Unprocessable(
                slugs
                    .iter()
                    .map(|slug| {
                        ValidationIssue::new(
                            "consents.id",
                            "exists",
                            format!("unknown consent id: {slug}"),
                        )
                    })
                    .collect(),
            ),
            ConsentError::EmailTaken(_) => AppError::Unprocessable(vec![ValidationIssue::new(
                "email",
                "unique",
                "email must be unique".to_string(),
            )]),
            ConsentError::Storage { .. } | ConsentError::Internal(_) => {
                error!(error = %err, "request failed");
                AppError::Internal("storage unavailable".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(message) => {
                let body = Json(ErrorResponse {
                    error: "Not Found".to_string(),
                    message,
                });
                (StatusCode::NOT_FOUND, body).into_response()
            }
            AppError::Unprocessable(issues) => {
                let body = Json(json!({ "errors": issues }));
                (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
            }
            AppError::BadRequest(message) => {
                let body = Json(ErrorResponse {
                    error: "Bad Request".to_string(),
                    message,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            AppError::Internal(message) => {
                let body = Json(ErrorResponse {
                    error: "Internal Server Error".to_string(),
                    message,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}
