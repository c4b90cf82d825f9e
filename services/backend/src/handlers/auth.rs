use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::handlers::{BearerHeader, authenticate, bearer_token};
use crate::state::AppState;
use crate::usecase::password_reset::{
    ChangePasswordInput, ChangePasswordUseCase, RequestPasswordResetInput,
    RequestPasswordResetUseCase,
};
use crate::usecase::session::{LoginInput, LoginUseCase, LogoutUseCase};
use crate::usecase::user::{SignUpInput, SignUpUseCase};

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user_id: uuid::Uuid,
    pub email: String,
    pub token: String,
    #[serde(serialize_with = "hris_core::serde::to_rfc3339_ms")]
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServiceError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        sessions: state.session_repo(),
        jwt_secret: state.jwt_secret.clone(),
        session_ttl_secs: state.session_ttl_secs,
    };
    let out = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok(Json(LoginResponse {
        user_id: out.user.id,
        email: out.user.email,
        token: out.token,
        expires_at: out.expires_at,
    }))
}

// ── GET /auth/session ────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SessionResponse {
    pub user_id: uuid::Uuid,
    pub email: String,
    #[serde(serialize_with = "hris_core::serde::to_rfc3339_ms")]
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

pub async fn check_session(
    State(state): State<AppState>,
    bearer: BearerHeader,
) -> Result<Json<SessionResponse>, ServiceError> {
    let token = bearer_token(bearer)?;
    let session = authenticate(&state, &token).await?;
    Ok(Json(SessionResponse {
        user_id: session.user.id,
        email: session.user.email,
        expires_at: session.expires_at,
    }))
}

// ── DELETE /auth/session ─────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    bearer: BearerHeader,
) -> Result<StatusCode, ServiceError> {
    let token = bearer_token(bearer)?;
    let usecase = LogoutUseCase {
        sessions: state.session_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    usecase.execute(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /auth/signup ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignUpRequest>,
) -> Result<StatusCode, ServiceError> {
    let usecase = SignUpUseCase {
        users: state.user_repo(),
        roles: state.role_repo(),
        default_role: state.default_role.clone(),
    };
    usecase
        .execute(SignUpInput {
            email: body.email,
            password: body.password,
            name: body.name,
            phone: body.phone,
        })
        .await?;
    Ok(StatusCode::CREATED)
}

// ── POST /auth/password/forgot ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let usecase = RequestPasswordResetUseCase {
        users: state.user_repo(),
        resets: state.password_reset_repo(),
    };
    usecase
        .execute(RequestPasswordResetInput { email: body.email })
        .await?;
    // Accepted whether or not the email resolved to a user.
    Ok(StatusCode::ACCEPTED)
}

// ── POST /auth/password/change ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub code: String,
    pub password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ServiceError> {
    let usecase = ChangePasswordUseCase {
        users: state.user_repo(),
        resets: state.password_reset_repo(),
    };
    usecase
        .execute(ChangePasswordInput {
            code: body.code,
            password: body.password,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
