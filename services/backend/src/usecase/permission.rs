use std::collections::HashSet;

use uuid::Uuid;

use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::types::Permission;
use crate::error::ServiceError;

/// Compute the caller's granted permission set.
///
/// Walks the user's assigned roles, skipping inactive ones, and collects the
/// active permissions of each role's active grant rows, deduplicated by
/// permission id. A user with no role (or only inactive roles) resolves to
/// the empty set — that is an answer, not an error.
pub struct ResolvePermissionsUseCase<U: UserRepository, R: RoleRepository> {
    pub users: U,
    pub roles: R,
}

impl<U: UserRepository, R: RoleRepository> ResolvePermissionsUseCase<U, R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<Permission>, ServiceError> {
        let assigned = self.users.roles_of(user_id).await?;

        let mut seen = HashSet::new();
        let mut granted = Vec::new();
        for role in assigned.into_iter().filter(|r| r.is_active) {
            for permission in self.roles.permissions_of(role.id).await? {
                if seen.insert(permission.id) {
                    granted.push(permission);
                }
            }
        }
        Ok(granted)
    }
}
