use chrono::Utc;
use uuid::Uuid;

use hris_domain::pagination::{PageMeta, PageRequest};

use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::types::{Role, User, UserChanges, UserSummary};
use crate::error::ServiceError;
use crate::security::hash_password;

// ── SignUp ───────────────────────────────────────────────────────────────────

pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
}

pub struct SignUpUseCase<U: UserRepository, R: RoleRepository> {
    pub users: U,
    pub roles: R,
    /// Name of the role attached to self-registered accounts.
    pub default_role: String,
}

impl<U: UserRepository, R: RoleRepository> SignUpUseCase<U, R> {
    pub async fn execute(&self, input: SignUpInput) -> Result<(), ServiceError> {
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(ServiceError::EmailTaken);
        }

        let password_hash = hash_password(&input.password)?;

        let role = self
            .roles
            .find_active_by_name(&self.default_role)
            .await?
            .ok_or(ServiceError::RoleNotFound)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email: input.email,
            password_hash,
            name: input.name,
            phone: input.phone,
            address: None,
            photo: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.users.create_with_role(&user, role.id).await
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct UserDetail {
    pub user: User,
    pub role: Option<Role>,
}

pub struct GetUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetUserUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<UserDetail, ServiceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound)?;
        let role = self.users.roles_of(user_id).await?.into_iter().next();
        Ok(UserDetail { user, role })
    }
}

// ── UpdateUser ───────────────────────────────────────────────────────────────

pub struct UpdateUserInput {
    pub changes: UserChanges,
    pub role_id: Option<Uuid>,
}

pub struct UpdateUserUseCase<U: UserRepository, R: RoleRepository> {
    pub users: U,
    pub roles: R,
}

impl<U: UserRepository, R: RoleRepository> UpdateUserUseCase<U, R> {
    pub async fn execute(&self, user_id: Uuid, input: UpdateUserInput) -> Result<(), ServiceError> {
        if input.changes.is_empty() && input.role_id.is_none() {
            return Err(ServiceError::Validation("nothing to update".to_owned()));
        }

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound)?;

        if !input.changes.is_empty() {
            self.users.update_profile(user_id, &input.changes).await?;
        }

        if let Some(role_id) = input.role_id {
            // Only an active role may be assigned.
            let role = self
                .roles
                .find_active(role_id)
                .await?
                .ok_or(ServiceError::RoleNotFound)?;
            self.users.replace_role(user_id, role.id).await?;
        }
        Ok(())
    }
}

// ── ListUsers ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct UserPage {
    pub users: Vec<UserSummary>,
    pub meta: PageMeta,
}

pub struct ListUsersUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ListUsersUseCase<U> {
    pub async fn execute(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<UserPage, ServiceError> {
        let page = page.clamped();
        let (users, count) = self.users.list(search.as_deref(), page).await?;
        Ok(UserPage {
            users,
            meta: PageMeta::new(count, page),
        })
    }
}
