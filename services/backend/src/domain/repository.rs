#![allow(async_fn_in_trait)]

use uuid::Uuid;

use hris_domain::menu::MenuNode;
use hris_domain::pagination::PageRequest;

use crate::domain::types::{
    GrantChange, OutboxEvent, PasswordReset, Permission, ResetConsume, Role, Session, User,
    UserChanges, UserSummary,
};
use crate::error::ServiceError;

/// Repository for employee accounts. Lookups return active users only;
/// a soft-deleted account behaves like a missing one.
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError>;

    /// Insert a user and their initial role assignment in one transaction.
    async fn create_with_role(&self, user: &User, role_id: Uuid) -> Result<(), ServiceError>;

    async fn update_profile(&self, id: Uuid, changes: &UserChanges) -> Result<(), ServiceError>;

    /// Replace the user's role assignments with the single given role.
    async fn replace_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), ServiceError>;

    async fn update_password_hash(&self, id: Uuid, hash: &str) -> Result<(), ServiceError>;

    /// Page of active users, newest first, with the total match count.
    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<UserSummary>, u64), ServiceError>;

    /// Roles assigned to the user, active or not (callers filter).
    async fn roles_of(&self, user_id: Uuid) -> Result<Vec<Role>, ServiceError>;
}

/// Repository for roles and their permission grants.
pub trait RoleRepository: Send + Sync {
    async fn find_active(&self, id: Uuid) -> Result<Option<Role>, ServiceError>;
    async fn find_active_by_name(&self, name: &str) -> Result<Option<Role>, ServiceError>;
    async fn list_active(&self) -> Result<Vec<Role>, ServiceError>;

    /// Whether the role exists at all, active or not.
    async fn exists(&self, id: Uuid) -> Result<bool, ServiceError>;

    /// Active permissions granted to the role via active grant rows.
    async fn permissions_of(&self, role_id: Uuid) -> Result<Vec<Permission>, ServiceError>;

    /// Insert or update the grant row, setting its active flag.
    async fn upsert_grant(&self, change: GrantChange) -> Result<(), ServiceError>;
}

/// Repository for permissions.
pub trait PermissionRepository: Send + Sync {
    /// Whether the permission exists at all, active or not.
    async fn exists(&self, id: Uuid) -> Result<bool, ServiceError>;
}

/// Repository for menu nodes.
pub trait MenuRepository: Send + Sync {
    /// Load the full node set; filtering and shaping happen in memory.
    async fn load_all(&self) -> Result<Vec<MenuNode>, ServiceError>;
}

/// Repository for bearer sessions.
pub trait SessionRepository: Send + Sync {
    /// Persist a session. On conflict with an existing (user, token) pair the
    /// row is reactivated and its expiry refreshed, never duplicated.
    async fn upsert_active(&self, session: &Session) -> Result<(), ServiceError>;

    /// Find a session that is active and unexpired.
    async fn find_active(&self, user_id: Uuid, token: &str)
    -> Result<Option<Session>, ServiceError>;

    /// Mark an active session inactive. Returns `false` if no matching
    /// active session exists.
    async fn deactivate(&self, user_id: Uuid, token: &str) -> Result<bool, ServiceError>;
}

/// Repository for one-time password-reset codes.
pub trait PasswordResetRepository: Send + Sync {
    /// Insert a reset code and its email outbox event atomically (same transaction).
    async fn create_with_outbox(
        &self,
        reset: &PasswordReset,
        event: &OutboxEvent,
    ) -> Result<(), ServiceError>;

    /// Consume a code via a single conditional update so two concurrent
    /// redemptions cannot both succeed. An expired code is deleted before
    /// `Expired` is returned.
    async fn consume(&self, code: &str) -> Result<ResetConsume, ServiceError>;

    /// Drop every reset code belonging to the user.
    async fn delete_for_user(&self, user_id: Uuid) -> Result<(), ServiceError>;
}
