use crate::domain::repository::{PermissionRepository, RoleRepository};
use crate::domain::types::{GrantChange, Permission, Role};
use crate::error::ServiceError;

// ── RoleManagement ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct RoleWithPermissions {
    pub role: Role,
    pub permissions: Vec<Permission>,
}

/// Admin view: every active role with its effective permission set.
pub struct ListRoleManagementUseCase<R: RoleRepository> {
    pub roles: R,
}

impl<R: RoleRepository> ListRoleManagementUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<RoleWithPermissions>, ServiceError> {
        let mut out = Vec::new();
        for role in self.roles.list_active().await? {
            let permissions = self.roles.permissions_of(role.id).await?;
            out.push(RoleWithPermissions { role, permissions });
        }
        Ok(out)
    }
}

// ── RoleOptions ──────────────────────────────────────────────────────────────

/// Lightweight id/name pairs for select inputs.
pub struct ListRoleOptionsUseCase<R: RoleRepository> {
    pub roles: R,
}

impl<R: RoleRepository> ListRoleOptionsUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<Role>, ServiceError> {
        self.roles.list_active().await
    }
}

// ── UpdateGrants ─────────────────────────────────────────────────────────────

/// Bulk flip of role-permission grants.
///
/// Every referenced role and permission is validated before any row is
/// written, so a bad id rejects the whole batch instead of applying half.
pub struct UpdateGrantsUseCase<R: RoleRepository, P: PermissionRepository> {
    pub roles: R,
    pub permissions: P,
}

impl<R: RoleRepository, P: PermissionRepository> UpdateGrantsUseCase<R, P> {
    pub async fn execute(&self, changes: Vec<GrantChange>) -> Result<(), ServiceError> {
        for change in &changes {
            if !self.roles.exists(change.role_id).await? {
                return Err(ServiceError::RoleNotFound);
            }
            if !self.permissions.exists(change.permission_id).await? {
                return Err(ServiceError::PermissionNotFound);
            }
        }
        for change in changes {
            self.roles.upsert_grant(change).await?;
        }
        Ok(())
    }
}
