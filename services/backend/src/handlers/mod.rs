pub mod auth;
pub mod me;
pub mod role;
pub mod user;

use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};

use crate::error::ServiceError;
use crate::state::AppState;
use crate::usecase::session::{AuthedSession, CheckSessionUseCase};

/// Optional so a missing header maps to 401 instead of the extractor's 400.
pub(crate) type BearerHeader = Option<TypedHeader<Authorization<Bearer>>>;

pub(crate) fn bearer_token(header: BearerHeader) -> Result<String, ServiceError> {
    header
        .map(|TypedHeader(auth)| auth.token().to_owned())
        .ok_or(ServiceError::TokenInvalid)
}

/// Validate the bearer token and its backing session row.
pub(crate) async fn authenticate(
    state: &AppState,
    token: &str,
) -> Result<AuthedSession, ServiceError> {
    let usecase = CheckSessionUseCase {
        users: state.user_repo(),
        sessions: state.session_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    usecase.execute(token).await
}
