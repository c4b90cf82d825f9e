use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hris_domain::pagination::PageRequest;

use crate::domain::types::UserChanges;
use crate::error::ServiceError;
use crate::handlers::{BearerHeader, authenticate, bearer_token};
use crate::state::AppState;
use crate::usecase::user::{
    GetUserUseCase, ListUsersUseCase, UpdateUserInput, UpdateUserUseCase, UserDetail,
};

// ── GET /users ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ListUsersQuery {
    #[serde(default = "default_per_page", rename = "per-page")]
    pub per_page: u32,
    #[serde(default = "default_page")]
    pub page: u32,
    pub search: Option<String>,
}

fn default_per_page() -> u32 {
    10
}

fn default_page() -> u32 {
    1
}

#[derive(Serialize)]
pub struct UserSummaryResponse {
    pub id: Uuid,
    pub name: String,
}

#[derive(Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserSummaryResponse>,
    pub count: u64,
    pub page_count: u64,
    pub per_page: u32,
    pub page: u32,
}

pub async fn list_users(
    State(state): State<AppState>,
    bearer: BearerHeader,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ListUsersResponse>, ServiceError> {
    let token = bearer_token(bearer)?;
    authenticate(&state, &token).await?;

    let usecase = ListUsersUseCase {
        users: state.user_repo(),
    };
    let page = usecase
        .execute(
            query.search,
            PageRequest {
                per_page: query.per_page,
                page: query.page,
            },
        )
        .await?;

    Ok(Json(ListUsersResponse {
        users: page
            .users
            .into_iter()
            .map(|u| UserSummaryResponse {
                id: u.id,
                name: u.name,
            })
            .collect(),
        count: page.meta.count,
        page_count: page.meta.page_count,
        per_page: page.meta.per_page,
        page: page.meta.page,
    }))
}

// ── GET /users/{user_id} ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RoleRefResponse {
    pub id: Uuid,
    pub name: String,
}

#[derive(Serialize)]
pub struct UserDetailResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub photo: Option<String>,
    pub is_active: bool,
    pub role: Option<RoleRefResponse>,
    #[serde(serialize_with = "hris_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "hris_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

fn detail_response(detail: UserDetail) -> UserDetailResponse {
    UserDetailResponse {
        id: detail.user.id,
        email: detail.user.email,
        name: detail.user.name,
        phone: detail.user.phone,
        address: detail.user.address,
        photo: detail.user.photo,
        is_active: detail.user.is_active,
        role: detail.role.map(|r| RoleRefResponse {
            id: r.id,
            name: r.name,
        }),
        created_at: detail.user.created_at,
        updated_at: detail.user.updated_at,
    }
}

pub async fn get_user(
    State(state): State<AppState>,
    bearer: BearerHeader,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserDetailResponse>, ServiceError> {
    let token = bearer_token(bearer)?;
    authenticate(&state, &token).await?;

    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let detail = usecase.execute(user_id).await?;
    Ok(Json(detail_response(detail)))
}

// ── PATCH /users/{user_id} ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
    pub role_id: Option<Uuid>,
}

pub async fn update_user(
    State(state): State<AppState>,
    bearer: BearerHeader,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<axum::http::StatusCode, ServiceError> {
    let token = bearer_token(bearer)?;
    authenticate(&state, &token).await?;

    let usecase = UpdateUserUseCase {
        users: state.user_repo(),
        roles: state.role_repo(),
    };
    usecase
        .execute(
            user_id,
            UpdateUserInput {
                changes: UserChanges {
                    name: body.name,
                    phone: body.phone,
                    address: body.address,
                    is_active: body.is_active,
                },
                role_id: body.role_id,
            },
        )
        .await?;

    // No body: a deactivating update leaves nothing to echo back.
    Ok(axum::http::StatusCode::NO_CONTENT)
}
