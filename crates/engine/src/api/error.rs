//! HTTP error mapping.
//!
//! Every error leaves as `{code, message, timestamp}`. Internal failures are logged here and the
//! response carries a generic message only.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::use_cases::{
    AuthoringError, NarrationError, NarrativeQueryError, ProfileError, ProgressError,
    StoryQueryError,
};

const INTERNAL_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    UnsupportedMediaType(String),
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ApiError {
    fn internal(err: impl std::fmt::Display) -> Self {
        tracing::error!(error = %err, "Request failed");
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, None, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, None, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, None, msg),
            ApiError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                None,
                format!("Unsupported media type: {}", msg),
            ),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Some("INTERNAL_ERROR"),
                INTERNAL_MESSAGE.to_string(),
            ),
        };

        let body = ErrorResponse {
            code: code.map_or_else(|| status.as_u16().to_string(), str::to_string),
            message,
            timestamp: Utc::now(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(e) => Self::UnsupportedMediaType(e.body_text()),
            other => Self::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<AuthoringError> for ApiError {
    fn from(err: AuthoringError) -> Self {
        match err {
            AuthoringError::Validation(e) => Self::BadRequest(e.to_string()),
            AuthoringError::ProfileNotFound(_) => Self::NotFound(err.to_string()),
            AuthoringError::Generation(_) | AuthoringError::Repo(_) => Self::internal(err),
        }
    }
}

impl From<NarrationError> for ApiError {
    fn from(err: NarrationError) -> Self {
        match err {
            NarrationError::Validation(e) => Self::BadRequest(e.to_string()),
            NarrationError::StoryNotFound(_)
            | NarrationError::QuestionNotFound { .. }
            | NarrationError::ProfileNotFound(_) => Self::NotFound(err.to_string()),
            NarrationError::Service { .. } => Self::internal(err),
        }
    }
}

impl From<StoryQueryError> for ApiError {
    fn from(err: StoryQueryError) -> Self {
        match err {
            StoryQueryError::StoryNotFound(_) | StoryQueryError::QuestionNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            StoryQueryError::Service { .. } => Self::internal(err),
        }
    }
}

impl From<NarrativeQueryError> for ApiError {
    fn from(err: NarrativeQueryError) -> Self {
        match err {
            NarrativeQueryError::StoryNotFound(_) | NarrativeQueryError::NarrativeNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            NarrativeQueryError::InUse(_) => Self::Conflict(err.to_string()),
            NarrativeQueryError::Service { .. } => Self::internal(err),
        }
    }
}

impl From<ProgressError> for ApiError {
    fn from(err: ProgressError) -> Self {
        match err {
            ProgressError::Validation(e) => Self::BadRequest(e.to_string()),
            ProgressError::StoryNotFound(_)
            | ProgressError::ProfileNotFound(_)
            | ProgressError::NarrativeNotFound(_)
            | ProgressError::ProgressNotFound { .. } => Self::NotFound(err.to_string()),
            ProgressError::Service { .. } => Self::internal(err),
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::Validation(e) => Self::BadRequest(e.to_string()),
            ProfileError::NotFound(_) => Self::NotFound(err.to_string()),
            ProfileError::Service { .. } => Self::internal(err),
        }
    }
}
