use chrono::{Duration, Utc};
use rand::RngExt;
use serde_json::json;
use uuid::Uuid;

use crate::domain::repository::{PasswordResetRepository, UserRepository};
use crate::domain::types::{
    OutboxEvent, PasswordReset, RESET_CODE_LEN, RESET_CODE_TTL_SECS, ResetConsume,
};
use crate::error::ServiceError;
use crate::security::hash_password;

/// Charset for generating reset codes (uppercase alphanumeric).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..RESET_CODE_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

// ── RequestPasswordReset ─────────────────────────────────────────────────────

pub struct RequestPasswordResetInput {
    pub email: String,
}

pub struct RequestPasswordResetUseCase<U, R>
where
    U: UserRepository,
    R: PasswordResetRepository,
{
    pub users: U,
    pub resets: R,
}

impl<U, R> RequestPasswordResetUseCase<U, R>
where
    U: UserRepository,
    R: PasswordResetRepository,
{
    /// Succeeds whether or not the email resolves to a user: an unknown
    /// address is a silent no-op, so the endpoint cannot be used to probe
    /// which emails are registered.
    pub async fn execute(&self, input: RequestPasswordResetInput) -> Result<(), ServiceError> {
        let Some(user) = self.users.find_by_email(&input.email).await? else {
            return Ok(());
        };

        let code = generate_code();
        let now = Utc::now();
        let reset = PasswordReset {
            id: Uuid::now_v7(),
            user_id: user.id,
            code: code.clone(),
            expires_at: now + Duration::seconds(RESET_CODE_TTL_SECS),
            consumed_at: None,
            created_at: now,
        };

        let event = OutboxEvent {
            id: Uuid::new_v4(),
            kind: "password_reset_requested".to_owned(),
            payload: json!({ "email": user.email, "code": code }),
            idempotency_key: format!("password_reset_requested:{}", reset.id),
        };

        self.resets.create_with_outbox(&reset, &event).await
    }
}

// ── ChangePassword ───────────────────────────────────────────────────────────

pub struct ChangePasswordInput {
    pub code: String,
    pub password: String,
}

pub struct ChangePasswordUseCase<U, R>
where
    U: UserRepository,
    R: PasswordResetRepository,
{
    pub users: U,
    pub resets: R,
}

impl<U, R> ChangePasswordUseCase<U, R>
where
    U: UserRepository,
    R: PasswordResetRepository,
{
    pub async fn execute(&self, input: ChangePasswordInput) -> Result<(), ServiceError> {
        // Hash first: a too-short password must fail before the code is burned.
        let hash = hash_password(&input.password)?;

        match self.resets.consume(&input.code).await? {
            ResetConsume::Consumed(reset) => {
                self.users
                    .update_password_hash(reset.user_id, &hash)
                    .await?;
                // Other outstanding codes for this user are dead letters now.
                self.resets.delete_for_user(reset.user_id).await?;
                Ok(())
            }
            ResetConsume::Expired => Err(ServiceError::TokenExpired),
            ResetConsume::Invalid => Err(ServiceError::TokenInvalid),
        }
    }
}
