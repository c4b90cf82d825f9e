use axum::{Json, extract::State};
use serde::Serialize;

use hris_domain::menu::MenuEntry;

use crate::error::ServiceError;
use crate::handlers::{BearerHeader, authenticate, bearer_token};
use crate::state::AppState;
use crate::usecase::menu::MenuTreeUseCase;
use crate::usecase::permission::ResolvePermissionsUseCase;

// ── GET /me/permissions ──────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PermissionResponse {
    pub id: uuid::Uuid,
    pub name: String,
    pub module: Option<String>,
}

pub async fn get_permissions(
    State(state): State<AppState>,
    bearer: BearerHeader,
) -> Result<Json<Vec<PermissionResponse>>, ServiceError> {
    let token = bearer_token(bearer)?;
    let session = authenticate(&state, &token).await?;

    let usecase = ResolvePermissionsUseCase {
        users: state.user_repo(),
        roles: state.role_repo(),
    };
    let permissions = usecase.execute(session.user.id).await?;

    Ok(Json(
        permissions
            .into_iter()
            .map(|p| PermissionResponse {
                id: p.id,
                name: p.name,
                module: p.module,
            })
            .collect(),
    ))
}

// ── GET /me/menu ─────────────────────────────────────────────────────────────

pub async fn get_menu(
    State(state): State<AppState>,
    bearer: BearerHeader,
) -> Result<Json<Vec<MenuEntry>>, ServiceError> {
    let token = bearer_token(bearer)?;
    let session = authenticate(&state, &token).await?;

    let usecase = MenuTreeUseCase {
        permissions: ResolvePermissionsUseCase {
            users: state.user_repo(),
            roles: state.role_repo(),
        },
        menus: state.menu_repo(),
    };
    let tree = usecase.execute(session.user.id).await?;
    Ok(Json(tree))
}
