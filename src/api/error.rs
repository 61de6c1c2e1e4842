use crate::error::ProfileError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

/// Error returned from HTTP handlers, rendered as `{"detail": "..."}`
#[derive(Debug)]
pub enum ApiError {
    Profile(ProfileError),
    /// Malformed request: body, query string or path parameter
    Rejected { status: StatusCode, detail: String },
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Profile(ProfileError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Profile(ProfileError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Profile(ProfileError::InvalidStatusToken(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Profile(ProfileError::Storage(_)) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Rejected { status, .. } => *status,
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Profile(ProfileError::NotFound(_)) => "Profile not found".to_string(),
            ApiError::Profile(ProfileError::Storage(_)) | ApiError::Internal(_) => {
                "Internal server error".to_string()
            }
            ApiError::Rejected { detail, .. } => detail.clone(),
            ApiError::Profile(err) => err.to_string(),
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        ApiError::Profile(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            match &self {
                ApiError::Profile(err) => error!(error = %err, "Request failed"),
                ApiError::Internal(msg) | ApiError::Rejected { detail: msg, .. } => {
                    error!(error = %msg, "Request failed")
                }
            }
        }

        (status, Json(serde_json::json!({ "detail": self.detail() }))).into_response()
    }
}
