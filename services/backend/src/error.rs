use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Backend domain error variants.
///
/// `TokenExpired` and `TokenInvalid` are separate variants so callers and
/// logs can tell them apart, but they render identically on the wire: a
/// client must not be able to probe which tokens exist versus which have
/// merely lapsed.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid token")]
    TokenInvalid,
    #[error("invalid token")]
    TokenExpired,
    #[error("user not found")]
    UserNotFound,
    #[error("role not found")]
    RoleNotFound,
    #[error("permission not found")]
    PermissionNotFound,
    #[error("email already registered")]
    EmailTaken,
    #[error("{0}")]
    Validation(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::TokenInvalid | Self::TokenExpired => "INVALID_TOKEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::RoleNotFound => "ROLE_NOT_FOUND",
            Self::PermissionNotFound => "PERMISSION_NOT_FOUND",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::Validation(_) => "VALIDATION",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidCredentials | Self::TokenInvalid | Self::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            Self::UserNotFound | Self::RoleNotFound | Self::PermissionNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
