use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use hris_backend_schema::{
    menus, modules, outbox_events, password_resets, permissions, role_permissions, roles,
    sessions, user_roles, users,
};
use hris_domain::menu::MenuNode;
use hris_domain::pagination::PageRequest;

use crate::domain::repository::{
    MenuRepository, PasswordResetRepository, PermissionRepository, RoleRepository,
    SessionRepository, UserRepository,
};
use crate::domain::types::{
    GrantChange, OutboxEvent, PasswordReset, Permission, ResetConsume, Role, Session, User,
    UserChanges, UserSummary,
};
use crate::error::ServiceError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .filter(users::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        let model = users::Entity::find_by_id(id)
            .filter(users::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn create_with_role(&self, user: &User, role_id: Uuid) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let user = user.clone();
                Box::pin(async move {
                    insert_user(txn, &user).await?;
                    user_roles::ActiveModel {
                        user_id: Set(user.id),
                        role_id: Set(role_id),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("create user with role")?;
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, changes: &UserChanges) -> Result<(), ServiceError> {
        let mut am = users::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(ref name) = changes.name {
            am.name = Set(name.clone());
        }
        if let Some(ref phone) = changes.phone {
            am.phone = Set(Some(phone.clone()));
        }
        if let Some(ref address) = changes.address {
            am.address = Set(Some(address.clone()));
        }
        if let Some(is_active) = changes.is_active {
            am.is_active = Set(is_active);
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db).await.context("update user profile")?;
        Ok(())
    }

    async fn replace_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    user_roles::Entity::delete_many()
                        .filter(user_roles::Column::UserId.eq(user_id))
                        .exec(txn)
                        .await?;
                    user_roles::ActiveModel {
                        user_id: Set(user_id),
                        role_id: Set(role_id),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("replace user role")?;
        Ok(())
    }

    async fn update_password_hash(&self, id: Uuid, hash: &str) -> Result<(), ServiceError> {
        users::ActiveModel {
            id: Set(id),
            password_hash: Set(hash.to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update password hash")?;
        Ok(())
    }

    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<UserSummary>, u64), ServiceError> {
        let mut query = users::Entity::find().filter(users::Column::IsActive.eq(true));
        if let Some(search) = search {
            query = query.filter(users::Column::Name.contains(search));
        }
        let paginator = query
            .order_by_desc(users::Column::CreatedAt)
            .paginate(&self.db, page.per_page as u64);

        let count = paginator.num_items().await.context("count users")?;
        let models = paginator
            .fetch_page((page.page - 1) as u64)
            .await
            .context("list users")?;

        let summaries = models
            .into_iter()
            .map(|m| UserSummary {
                id: m.id,
                name: m.name,
            })
            .collect();
        Ok((summaries, count))
    }

    async fn roles_of(&self, user_id: Uuid) -> Result<Vec<Role>, ServiceError> {
        let links = user_roles::Entity::find()
            .filter(user_roles::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .context("load user role links")?;
        let role_ids: Vec<Uuid> = links.iter().map(|l| l.role_id).collect();
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = roles::Entity::find()
            .filter(roles::Column::Id.is_in(role_ids))
            .all(&self.db)
            .await
            .context("load roles of user")?;
        Ok(models.into_iter().map(role_from_model).collect())
    }
}

async fn insert_user(txn: &DatabaseTransaction, user: &User) -> Result<(), sea_orm::DbErr> {
    users::ActiveModel {
        id: Set(user.id),
        email: Set(user.email.clone()),
        password_hash: Set(user.password_hash.clone()),
        name: Set(user.name.clone()),
        phone: Set(user.phone.clone()),
        address: Set(user.address.clone()),
        photo: Set(user.photo.clone()),
        is_active: Set(user.is_active),
        created_at: Set(user.created_at),
        updated_at: Set(user.updated_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        name: model.name,
        phone: model.phone,
        address: model.address,
        photo: model.photo,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn role_from_model(model: roles::Model) -> Role {
    Role {
        id: model.id,
        name: model.name,
        description: model.description,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Role repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRoleRepository {
    pub db: DatabaseConnection,
}

impl RoleRepository for DbRoleRepository {
    async fn find_active(&self, id: Uuid) -> Result<Option<Role>, ServiceError> {
        let model = roles::Entity::find_by_id(id)
            .filter(roles::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .context("find active role")?;
        Ok(model.map(role_from_model))
    }

    async fn find_active_by_name(&self, name: &str) -> Result<Option<Role>, ServiceError> {
        let model = roles::Entity::find()
            .filter(roles::Column::Name.eq(name))
            .filter(roles::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .context("find active role by name")?;
        Ok(model.map(role_from_model))
    }

    async fn list_active(&self) -> Result<Vec<Role>, ServiceError> {
        let models = roles::Entity::find()
            .filter(roles::Column::IsActive.eq(true))
            .order_by_asc(roles::Column::Name)
            .all(&self.db)
            .await
            .context("list active roles")?;
        Ok(models.into_iter().map(role_from_model).collect())
    }

    async fn exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        let model = roles::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("check role exists")?;
        Ok(model.is_some())
    }

    async fn permissions_of(&self, role_id: Uuid) -> Result<Vec<Permission>, ServiceError> {
        let grants = role_permissions::Entity::find()
            .filter(role_permissions::Column::RoleId.eq(role_id))
            .filter(role_permissions::Column::IsActive.eq(true))
            .all(&self.db)
            .await
            .context("load role grants")?;
        let permission_ids: Vec<Uuid> = grants.iter().map(|g| g.permission_id).collect();
        if permission_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = permissions::Entity::find()
            .filter(permissions::Column::Id.is_in(permission_ids))
            .filter(permissions::Column::IsActive.eq(true))
            .find_also_related(modules::Entity)
            .all(&self.db)
            .await
            .context("load granted permissions")?;

        Ok(rows
            .into_iter()
            .map(|(p, module)| Permission {
                id: p.id,
                name: p.name,
                module: module.map(|m| m.name),
            })
            .collect())
    }

    async fn upsert_grant(&self, change: GrantChange) -> Result<(), ServiceError> {
        role_permissions::Entity::insert(role_permissions::ActiveModel {
            role_id: Set(change.role_id),
            permission_id: Set(change.permission_id),
            is_active: Set(change.is_active),
        })
        .on_conflict(
            OnConflict::columns([
                role_permissions::Column::RoleId,
                role_permissions::Column::PermissionId,
            ])
            .update_column(role_permissions::Column::IsActive)
            .to_owned(),
        )
        .exec(&self.db)
        .await
        .context("upsert role permission grant")?;
        Ok(())
    }
}

// ── Permission repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPermissionRepository {
    pub db: DatabaseConnection,
}

impl PermissionRepository for DbPermissionRepository {
    async fn exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        let model = permissions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("check permission exists")?;
        Ok(model.is_some())
    }
}

// ── Menu repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMenuRepository {
    pub db: DatabaseConnection,
}

impl MenuRepository for DbMenuRepository {
    async fn load_all(&self) -> Result<Vec<MenuNode>, ServiceError> {
        let models = menus::Entity::find()
            .all(&self.db)
            .await
            .context("load menus")?;
        Ok(models.into_iter().map(menu_node_from_model).collect())
    }
}

fn menu_node_from_model(model: menus::Model) -> MenuNode {
    MenuNode {
        id: model.id,
        parent_id: model.parent_id,
        title: model.title,
        path: model.path,
        icon: model.icon,
        permission_id: model.permission_id,
        has_children: model.has_children,
        is_active: model.is_active,
        is_show: model.is_show,
        sort_order: model.sort_order,
    }
}

// ── Session repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSessionRepository {
    pub db: DatabaseConnection,
}

impl SessionRepository for DbSessionRepository {
    async fn upsert_active(&self, session: &Session) -> Result<(), ServiceError> {
        sessions::Entity::insert(sessions::ActiveModel {
            id: Set(session.id),
            user_id: Set(session.user_id),
            token: Set(session.token.clone()),
            is_active: Set(true),
            issued_at: Set(session.issued_at),
            expires_at: Set(session.expires_at),
        })
        .on_conflict(
            OnConflict::columns([sessions::Column::UserId, sessions::Column::Token])
                .update_columns([
                    sessions::Column::IsActive,
                    sessions::Column::IssuedAt,
                    sessions::Column::ExpiresAt,
                ])
                .to_owned(),
        )
        .exec(&self.db)
        .await
        .context("upsert session")?;
        Ok(())
    }

    async fn find_active(
        &self,
        user_id: Uuid,
        token: &str,
    ) -> Result<Option<Session>, ServiceError> {
        let now = Utc::now();
        let model = sessions::Entity::find()
            .filter(sessions::Column::UserId.eq(user_id))
            .filter(sessions::Column::Token.eq(token))
            .filter(sessions::Column::IsActive.eq(true))
            .filter(sessions::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await
            .context("find active session")?;
        Ok(model.map(session_from_model))
    }

    async fn deactivate(&self, user_id: Uuid, token: &str) -> Result<bool, ServiceError> {
        let result = sessions::Entity::update_many()
            .col_expr(sessions::Column::IsActive, Expr::value(false))
            .filter(sessions::Column::UserId.eq(user_id))
            .filter(sessions::Column::Token.eq(token))
            .filter(sessions::Column::IsActive.eq(true))
            .exec(&self.db)
            .await
            .context("deactivate session")?;
        Ok(result.rows_affected > 0)
    }
}

fn session_from_model(model: sessions::Model) -> Session {
    Session {
        id: model.id,
        user_id: model.user_id,
        token: model.token,
        is_active: model.is_active,
        issued_at: model.issued_at,
        expires_at: model.expires_at,
    }
}

// ── PasswordReset repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPasswordResetRepository {
    pub db: DatabaseConnection,
}

impl PasswordResetRepository for DbPasswordResetRepository {
    async fn create_with_outbox(
        &self,
        reset: &PasswordReset,
        event: &OutboxEvent,
    ) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let reset = reset.clone();
                let event = event.clone();
                Box::pin(async move {
                    insert_password_reset(txn, &reset).await?;
                    insert_outbox_event(txn, &event).await?;
                    Ok(())
                })
            })
            .await
            .context("create password reset with outbox")?;
        Ok(())
    }

    async fn consume(&self, code: &str) -> Result<ResetConsume, ServiceError> {
        let now = Utc::now();

        // Single conditional update: of any number of concurrent redemption
        // attempts, exactly one observes rows_affected == 1.
        let result = password_resets::Entity::update_many()
            .col_expr(password_resets::Column::ConsumedAt, Expr::value(Some(now)))
            .filter(password_resets::Column::Code.eq(code))
            .filter(password_resets::Column::ConsumedAt.is_null())
            .filter(password_resets::Column::ExpiresAt.gt(now))
            .exec(&self.db)
            .await
            .context("consume reset code")?;

        if result.rows_affected > 0 {
            let model = password_resets::Entity::find()
                .filter(password_resets::Column::Code.eq(code))
                .one(&self.db)
                .await
                .context("load consumed reset code")?
                .ok_or_else(|| anyhow::anyhow!("consumed reset code vanished"))?;
            return Ok(ResetConsume::Consumed(reset_from_model(model)));
        }

        match password_resets::Entity::find()
            .filter(password_resets::Column::Code.eq(code))
            .one(&self.db)
            .await
            .context("inspect reset code")?
        {
            None => Ok(ResetConsume::Invalid),
            Some(model) if model.consumed_at.is_some() => Ok(ResetConsume::Invalid),
            Some(model) => {
                // Expired: remove the row so the code cannot be replayed.
                password_resets::Entity::delete_by_id(model.id)
                    .exec(&self.db)
                    .await
                    .context("delete expired reset code")?;
                Ok(ResetConsume::Expired)
            }
        }
    }

    async fn delete_for_user(&self, user_id: Uuid) -> Result<(), ServiceError> {
        password_resets::Entity::delete_many()
            .filter(password_resets::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("delete reset codes for user")?;
        Ok(())
    }
}

async fn insert_password_reset(
    txn: &DatabaseTransaction,
    reset: &PasswordReset,
) -> Result<(), sea_orm::DbErr> {
    password_resets::ActiveModel {
        id: Set(reset.id),
        user_id: Set(reset.user_id),
        code: Set(reset.code.clone()),
        expires_at: Set(reset.expires_at),
        consumed_at: Set(None),
        created_at: Set(reset.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn insert_outbox_event(
    txn: &DatabaseTransaction,
    event: &OutboxEvent,
) -> Result<(), sea_orm::DbErr> {
    let now = Utc::now();
    outbox_events::ActiveModel {
        id: Set(event.id),
        kind: Set(event.kind.clone()),
        payload: Set(event.payload.clone()),
        idempotency_key: Set(event.idempotency_key.clone()),
        attempts: Set(0),
        last_error: Set(None),
        created_at: Set(now),
        next_attempt_at: Set(now),
        processed_at: Set(None),
        failed_at: Set(None),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn reset_from_model(model: password_resets::Model) -> PasswordReset {
    PasswordReset {
        id: model.id,
        user_id: model.user_id,
        code: model.code,
        expires_at: model.expires_at,
        consumed_at: model.consumed_at,
        created_at: model.created_at,
    }
}
