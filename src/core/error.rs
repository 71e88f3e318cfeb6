// Centralized error handling for the API

use crate::stores::user_store::UserStoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Client-visible error body. `field` names the offending input field for
/// validation failures.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

/// Request-scoped error taxonomy. Every variant is a per-call value
/// mapped to a structured response at the request boundary; nothing here
/// is fatal to the process.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("A user with this email already exists")]
    DuplicateEmail,

    #[error("A user with this username already exists")]
    DuplicateUsername,

    #[error("Username 'me' is reserved")]
    ReservedUsername,

    #[error("Invalid value for field '{0}'")]
    InvalidFormat(&'static str),

    #[error("A genre or category with this slug already exists")]
    DuplicateSlug,

    #[error("User not found")]
    UserNotFound,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid confirmation code")]
    InvalidCredentials,

    #[error("Authentication credentials were not provided or are invalid")]
    Unauthenticated,

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("You have already reviewed this title")]
    DuplicateReview,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::DuplicateEmail
            | ApiError::DuplicateUsername
            | ApiError::ReservedUsername
            | ApiError::InvalidFormat(_)
            | ApiError::DuplicateSlug
            | ApiError::InvalidCredentials => StatusCode::BAD_REQUEST,
            ApiError::UserNotFound | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::DuplicateReview => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn field(&self) -> Option<&'static str> {
        match self {
            ApiError::DuplicateEmail => Some("email"),
            ApiError::DuplicateUsername | ApiError::ReservedUsername => Some("username"),
            ApiError::InvalidFormat(field) => Some(field),
            ApiError::DuplicateSlug => Some("slug"),
            ApiError::InvalidCredentials => Some("confirmation_code"),
            _ => None,
        }
    }
}

impl From<UserStoreError> for ApiError {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::DuplicateEmail => ApiError::DuplicateEmail,
            UserStoreError::DuplicateUsername => ApiError::DuplicateUsername,
            UserStoreError::UnknownUser => ApiError::UserNotFound,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Never leak internal error details to clients.
        let message = match &self {
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
                field: self.field(),
            }),
        )
            .into_response()
    }
}
