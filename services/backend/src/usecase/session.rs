use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::types::{Session, User};
use crate::error::ServiceError;
use crate::security::{DUMMY_HASH, verify_password};

/// JWT claims for bearer session tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

pub fn issue_session_token(
    user_id: Uuid,
    secret: &str,
    ttl_secs: u64,
) -> Result<(String, u64), ServiceError> {
    let exp = now_secs() + ttl_secs;
    let claims = SessionClaims {
        sub: user_id.to_string(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ServiceError::Internal(e.into()))?;
    Ok((token, exp))
}

/// Validate a session token's signature and expiry, returning its claims.
///
/// Expiry is reported as `TokenExpired` so callers can log the distinction;
/// the response layer collapses both onto the same wire error.
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionClaims, ServiceError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => ServiceError::TokenExpired,
        _ => ServiceError::TokenInvalid,
    })?;

    Ok(data.claims)
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct LoginUseCase<U: UserRepository, S: SessionRepository> {
    pub users: U,
    pub sessions: S,
    pub jwt_secret: String,
    pub session_ttl_secs: u64,
}

impl<U: UserRepository, S: SessionRepository> LoginUseCase<U, S> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, ServiceError> {
        let user = match self.users.find_by_email(&input.email).await? {
            Some(user) => user,
            None => {
                // Unknown email pays the same hash cost as a wrong password,
                // and the caller sees the same error either way.
                let _ = verify_password(&input.password, DUMMY_HASH);
                return Err(ServiceError::InvalidCredentials);
            }
        };

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(ServiceError::InvalidCredentials);
        }

        let (token, exp) = issue_session_token(user.id, &self.jwt_secret, self.session_ttl_secs)?;
        let expires_at = Utc
            .timestamp_opt(exp as i64, 0)
            .single()
            .ok_or_else(|| ServiceError::Internal(anyhow::anyhow!("token expiry out of range")))?;

        let session = Session {
            id: Uuid::now_v7(),
            user_id: user.id,
            token: token.clone(),
            is_active: true,
            issued_at: Utc::now(),
            expires_at,
        };
        self.sessions.upsert_active(&session).await?;

        Ok(LoginOutput {
            user,
            token,
            expires_at,
        })
    }
}

// ── CheckSession ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct AuthedSession {
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

pub struct CheckSessionUseCase<U: UserRepository, S: SessionRepository> {
    pub users: U,
    pub sessions: S,
    pub jwt_secret: String,
}

impl<U: UserRepository, S: SessionRepository> CheckSessionUseCase<U, S> {
    pub async fn execute(&self, token: &str) -> Result<AuthedSession, ServiceError> {
        let claims = validate_session_token(token, &self.jwt_secret)?;

        let user_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| ServiceError::TokenInvalid)?;

        // A valid signature is not enough: the session row must still be
        // active, so an invalidated token fails even before its exp.
        let session = self
            .sessions
            .find_active(user_id, token)
            .await?
            .ok_or(ServiceError::TokenInvalid)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::TokenInvalid)?;

        Ok(AuthedSession {
            user,
            expires_at: session.expires_at,
        })
    }
}

// ── Logout ───────────────────────────────────────────────────────────────────

pub struct LogoutUseCase<S: SessionRepository> {
    pub sessions: S,
    pub jwt_secret: String,
}

impl<S: SessionRepository> LogoutUseCase<S> {
    pub async fn execute(&self, token: &str) -> Result<(), ServiceError> {
        let claims = validate_session_token(token, &self.jwt_secret)?;
        let user_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| ServiceError::TokenInvalid)?;

        if !self.sessions.deactivate(user_id, token).await? {
            return Err(ServiceError::TokenInvalid);
        }
        Ok(())
    }
}
