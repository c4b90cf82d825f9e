use std::collections::HashSet;

use uuid::Uuid;

use hris_domain::menu::{MenuEntry, build_menu_tree};

use crate::domain::repository::{MenuRepository, RoleRepository, UserRepository};
use crate::error::ServiceError;
use crate::usecase::permission::ResolvePermissionsUseCase;

/// Produce the caller's filtered, pruned, ordered navigation tree.
///
/// Resolution and shaping are split: this usecase gathers the permission set
/// and the node set, then hands both to the pure builder in `hris-domain`.
pub struct MenuTreeUseCase<U, R, M>
where
    U: UserRepository,
    R: RoleRepository,
    M: MenuRepository,
{
    pub permissions: ResolvePermissionsUseCase<U, R>,
    pub menus: M,
}

impl<U, R, M> MenuTreeUseCase<U, R, M>
where
    U: UserRepository,
    R: RoleRepository,
    M: MenuRepository,
{
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<MenuEntry>, ServiceError> {
        let granted: HashSet<Uuid> = self
            .permissions
            .execute(user_id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        let nodes = self.menus.load_all().await?;
        Ok(build_menu_tree(&nodes, &granted))
    }
}
