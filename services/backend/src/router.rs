use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};
use tower_http::trace::TraceLayer;

use hris_core::health::{healthz, readyz};
use hris_core::middleware::request_id_layer;

use crate::handlers::{
    auth::{change_password, check_session, forgot_password, login, logout, signup},
    me::{get_menu, get_permissions},
    role::{role_management, role_options, update_grants},
    user::{get_user, list_users, update_user},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Auth
        .route("/auth/login", post(login))
        .route("/auth/session", get(check_session))
        .route("/auth/session", delete(logout))
        .route("/auth/signup", post(signup))
        .route("/auth/password/forgot", post(forgot_password))
        .route("/auth/password/change", post(change_password))
        // Caller-scoped
        .route("/me/permissions", get(get_permissions))
        .route("/me/menu", get(get_menu))
        // Users
        .route("/users", get(list_users))
        .route("/users/{user_id}", get(get_user))
        .route("/users/{user_id}", patch(update_user))
        // Roles
        .route("/roles", get(role_management))
        .route("/roles/options", get(role_options))
        .route("/roles/grants", put(update_grants))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
