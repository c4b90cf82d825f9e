use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::GrantChange;
use crate::error::ServiceError;
use crate::handlers::{BearerHeader, authenticate, bearer_token};
use crate::state::AppState;
use crate::usecase::role::{
    ListRoleManagementUseCase, ListRoleOptionsUseCase, UpdateGrantsUseCase,
};

// ── GET /roles ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct GrantedPermissionResponse {
    pub id: Uuid,
    pub name: String,
    pub module: Option<String>,
}

#[derive(Serialize)]
pub struct RoleManagementResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub permissions: Vec<GrantedPermissionResponse>,
    #[serde(serialize_with = "hris_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "hris_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub async fn role_management(
    State(state): State<AppState>,
    bearer: BearerHeader,
) -> Result<Json<Vec<RoleManagementResponse>>, ServiceError> {
    let token = bearer_token(bearer)?;
    authenticate(&state, &token).await?;

    let usecase = ListRoleManagementUseCase {
        roles: state.role_repo(),
    };
    let roles = usecase.execute().await?;

    Ok(Json(
        roles
            .into_iter()
            .map(|r| RoleManagementResponse {
                id: r.role.id,
                name: r.role.name,
                description: r.role.description,
                is_active: r.role.is_active,
                permissions: r
                    .permissions
                    .into_iter()
                    .map(|p| GrantedPermissionResponse {
                        id: p.id,
                        name: p.name,
                        module: p.module,
                    })
                    .collect(),
                created_at: r.role.created_at,
                updated_at: r.role.updated_at,
            })
            .collect(),
    ))
}

// ── GET /roles/options ───────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RoleOptionResponse {
    pub id: Uuid,
    pub name: String,
}

pub async fn role_options(
    State(state): State<AppState>,
    bearer: BearerHeader,
) -> Result<Json<Vec<RoleOptionResponse>>, ServiceError> {
    let token = bearer_token(bearer)?;
    authenticate(&state, &token).await?;

    let usecase = ListRoleOptionsUseCase {
        roles: state.role_repo(),
    };
    let roles = usecase.execute().await?;

    Ok(Json(
        roles
            .into_iter()
            .map(|r| RoleOptionResponse {
                id: r.id,
                name: r.name,
            })
            .collect(),
    ))
}

// ── PUT /roles/grants ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct GrantChangeRequest {
    pub role_id: Uuid,
    pub permission_id: Uuid,
    pub is_active: bool,
}

#[derive(Deserialize)]
pub struct UpdateGrantsRequest {
    pub grants: Vec<GrantChangeRequest>,
}

pub async fn update_grants(
    State(state): State<AppState>,
    bearer: BearerHeader,
    Json(body): Json<UpdateGrantsRequest>,
) -> Result<StatusCode, ServiceError> {
    let token = bearer_token(bearer)?;
    authenticate(&state, &token).await?;

    let usecase = UpdateGrantsUseCase {
        roles: state.role_repo(),
        permissions: state.permission_repo(),
    };
    usecase
        .execute(
            body.grants
                .into_iter()
                .map(|g| GrantChange {
                    role_id: g.role_id,
                    permission_id: g.permission_id,
                    is_active: g.is_active,
                })
                .collect(),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
