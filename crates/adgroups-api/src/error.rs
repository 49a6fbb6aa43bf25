//! Error types for the group management API.

use adgroups_directory::DirectoryError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error type for the group management API.
#[derive(Debug, thiserror::Error)]
pub enum ApiGroupsError {
    /// Group, user, or entry not found.
    #[error("{0}")]
    NotFound(String),

    /// Entry already exists.
    #[error("{0}")]
    Conflict(String),

    /// Request validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The directory server could not be reached or rejected the bind.
    #[error("Directory unavailable: {0}")]
    DirectoryUnavailable(String),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<DirectoryError> for ApiGroupsError {
    fn from(err: DirectoryError) -> Self {
        match &err {
            DirectoryError::GroupNotFound { .. }
            | DirectoryError::UserNotFound { .. }
            | DirectoryError::NoSuchEntry { .. } => Self::NotFound(err.to_string()),
            DirectoryError::AlreadyExists { .. } => Self::Conflict(err.to_string()),
            DirectoryError::ConnectionFailed { .. } | DirectoryError::AuthenticationFailed => {
                Self::DirectoryUnavailable(err.to_string())
            }
            _ => Self::Internal(err.to_string()),
        }
    }
}

/// RFC 7807 Problem Details response format.
#[derive(Debug, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IntoResponse for ApiGroupsError {
    fn into_response(self) -> Response {
        let (status, problem) = match &self {
            ApiGroupsError::NotFound(detail) => (
                StatusCode::NOT_FOUND,
                ProblemDetails {
                    problem_type: "https://adgroups.dev/problems/not-found".to_string(),
                    title: "Not Found".to_string(),
                    status: 404,
                    detail: Some(detail.clone()),
                },
            ),
            ApiGroupsError::Conflict(detail) => (
                StatusCode::CONFLICT,
                ProblemDetails {
                    problem_type: "https://adgroups.dev/problems/conflict".to_string(),
                    title: "Conflict".to_string(),
                    status: 409,
                    detail: Some(detail.clone()),
                },
            ),
            ApiGroupsError::Validation(detail) => (
                StatusCode::BAD_REQUEST,
                ProblemDetails {
                    problem_type: "https://adgroups.dev/problems/validation-error".to_string(),
                    title: "Validation Error".to_string(),
                    status: 400,
                    detail: Some(detail.clone()),
                },
            ),
            ApiGroupsError::DirectoryUnavailable(detail) => {
                tracing::error!("Directory unavailable: {}", detail);
                (
                    StatusCode::BAD_GATEWAY,
                    ProblemDetails {
                        problem_type: "https://adgroups.dev/problems/directory-unavailable"
                            .to_string(),
                        title: "Directory Unavailable".to_string(),
                        status: 502,
                        detail: Some("The directory server could not be reached".to_string()),
                    },
                )
            }
            ApiGroupsError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ProblemDetails {
                        problem_type: "https://adgroups.dev/problems/internal-error".to_string(),
                        title: "Internal Server Error".to_string(),
                        status: 500,
                        detail: Some("An internal error occurred".to_string()),
                    },
                )
            }
        };

        (status, Json(problem)).into_response()
    }
}
