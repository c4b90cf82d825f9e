use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Employee account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub photo: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Projection used by user listings.
#[derive(Debug, Clone)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
}

/// Partial profile update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.is_active.is_none()
    }
}

/// Named permission bundle.
#[derive(Debug, Clone)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Atomic capability with its module label already joined in.
#[derive(Debug, Clone)]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    pub module: Option<String>,
}

/// Bearer session tied to a persisted row; revocation flips `is_active`.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub is_active: bool,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// One-time password-reset code.
#[derive(Debug, Clone)]
pub struct PasswordReset {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PasswordReset {
    pub fn is_valid(&self) -> bool {
        self.consumed_at.is_none() && self.expires_at > Utc::now()
    }
}

/// Result of attempting to consume a one-time reset code.
///
/// `Expired` implies the row has already been deleted so the code cannot be
/// replayed; `Invalid` covers unknown and already-consumed codes alike.
#[derive(Debug, Clone)]
pub enum ResetConsume {
    Consumed(PasswordReset),
    Expired,
    Invalid,
}

/// Outbox event for async delivery (e.g. password-reset email).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub idempotency_key: String,
}

/// Grant change applied by the bulk role-permission update.
#[derive(Debug, Clone, Copy)]
pub struct GrantChange {
    pub role_id: Uuid,
    pub permission_id: Uuid,
    pub is_active: bool,
}

/// Reset code length in characters.
pub const RESET_CODE_LEN: usize = 6;

/// Reset code time-to-live in seconds.
pub const RESET_CODE_TTL_SECS: i64 = 600;
