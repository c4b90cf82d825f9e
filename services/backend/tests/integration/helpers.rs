use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use hris_backend::domain::repository::{
    MenuRepository, PasswordResetRepository, PermissionRepository, RoleRepository,
    SessionRepository, UserRepository,
};
use hris_backend::domain::types::{
    GrantChange, OutboxEvent, PasswordReset, Permission, ResetConsume, Role, Session, User,
    UserChanges, UserSummary,
};
use hris_backend::error::ServiceError;
use hris_backend::security::hash_password;
use hris_domain::menu::MenuNode;
use hris_domain::pagination::PageRequest;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-integration-tests";
pub const TEST_PASSWORD: &str = "correct horse battery";

pub fn test_user() -> User {
    let now = Utc::now();
    User {
        id: Uuid::now_v7(),
        email: "alice@example.com".to_owned(),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
        name: "alice".to_owned(),
        phone: None,
        address: None,
        photo: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_role(name: &str, is_active: bool) -> Role {
    let now = Utc::now();
    Role {
        id: Uuid::now_v7(),
        name: name.to_owned(),
        description: None,
        is_active,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_permission(name: &str) -> Permission {
    Permission {
        id: Uuid::now_v7(),
        name: name.to_owned(),
        module: None,
    }
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
    pub roles: Arc<Mutex<HashMap<Uuid, Vec<Role>>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
            roles: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn with_roles(self, user_id: Uuid, roles: Vec<Role>) -> Self {
        self.roles.lock().unwrap().insert(user_id, roles);
        self
    }

    /// Shared handle to the user list for post-execution inspection.
    pub fn users_handle(&self) -> Arc<Mutex<Vec<User>>> {
        Arc::clone(&self.users)
    }

    pub fn share(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            roles: Arc::clone(&self.roles),
        }
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email && u.is_active)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id && u.is_active)
            .cloned())
    }

    async fn create_with_role(&self, user: &User, role_id: Uuid) -> Result<(), ServiceError> {
        self.users.lock().unwrap().push(user.clone());
        self.roles
            .lock()
            .unwrap()
            .insert(user.id, vec![test_role_with_id(role_id)]);
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, changes: &UserChanges) -> Result<(), ServiceError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            if let Some(ref name) = changes.name {
                user.name = name.clone();
            }
            if let Some(ref phone) = changes.phone {
                user.phone = Some(phone.clone());
            }
            if let Some(ref address) = changes.address {
                user.address = Some(address.clone());
            }
            if let Some(is_active) = changes.is_active {
                user.is_active = is_active;
            }
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn replace_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), ServiceError> {
        self.roles
            .lock()
            .unwrap()
            .insert(user_id, vec![test_role_with_id(role_id)]);
        Ok(())
    }

    async fn update_password_hash(&self, id: Uuid, hash: &str) -> Result<(), ServiceError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.password_hash = hash.to_owned();
        }
        Ok(())
    }

    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<UserSummary>, u64), ServiceError> {
        let users = self.users.lock().unwrap();
        let mut matches: Vec<&User> = users
            .iter()
            .filter(|u| u.is_active && search.is_none_or(|s| u.name.contains(s)))
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let count = matches.len() as u64;
        let start = ((page.page - 1) * page.per_page) as usize;
        let summaries = matches
            .into_iter()
            .skip(start)
            .take(page.per_page as usize)
            .map(|u| UserSummary {
                id: u.id,
                name: u.name.clone(),
            })
            .collect();
        Ok((summaries, count))
    }

    async fn roles_of(&self, user_id: Uuid) -> Result<Vec<Role>, ServiceError> {
        Ok(self
            .roles
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

fn test_role_with_id(role_id: Uuid) -> Role {
    let mut role = test_role("assigned", true);
    role.id = role_id;
    role
}

// ── MockRoleRepo ─────────────────────────────────────────────────────────────

pub struct MockRoleRepo {
    pub roles: Vec<Role>,
    pub permissions: HashMap<Uuid, Vec<Permission>>,
    pub grants: Arc<Mutex<Vec<GrantChange>>>,
}

impl MockRoleRepo {
    pub fn new(roles: Vec<Role>) -> Self {
        Self {
            roles,
            permissions: HashMap::new(),
            grants: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn with_permissions(mut self, role_id: Uuid, permissions: Vec<Permission>) -> Self {
        self.permissions.insert(role_id, permissions);
        self
    }
}

impl RoleRepository for MockRoleRepo {
    async fn find_active(&self, id: Uuid) -> Result<Option<Role>, ServiceError> {
        Ok(self
            .roles
            .iter()
            .find(|r| r.id == id && r.is_active)
            .cloned())
    }

    async fn find_active_by_name(&self, name: &str) -> Result<Option<Role>, ServiceError> {
        Ok(self
            .roles
            .iter()
            .find(|r| r.name == name && r.is_active)
            .cloned())
    }

    async fn list_active(&self) -> Result<Vec<Role>, ServiceError> {
        Ok(self.roles.iter().filter(|r| r.is_active).cloned().collect())
    }

    async fn exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        Ok(self.roles.iter().any(|r| r.id == id))
    }

    async fn permissions_of(&self, role_id: Uuid) -> Result<Vec<Permission>, ServiceError> {
        Ok(self.permissions.get(&role_id).cloned().unwrap_or_default())
    }

    async fn upsert_grant(&self, change: GrantChange) -> Result<(), ServiceError> {
        self.grants.lock().unwrap().push(change);
        Ok(())
    }
}

// ── MockPermissionRepo ───────────────────────────────────────────────────────

pub struct MockPermissionRepo {
    pub existing: Vec<Uuid>,
}

impl PermissionRepository for MockPermissionRepo {
    async fn exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        Ok(self.existing.contains(&id))
    }
}

// ── MockMenuRepo ─────────────────────────────────────────────────────────────

pub struct MockMenuRepo {
    pub nodes: Vec<MenuNode>,
}

impl MenuRepository for MockMenuRepo {
    async fn load_all(&self) -> Result<Vec<MenuNode>, ServiceError> {
        Ok(self.nodes.clone())
    }
}

// ── MockSessionRepo ──────────────────────────────────────────────────────────

pub struct MockSessionRepo {
    pub sessions: Arc<Mutex<Vec<Session>>>,
}

impl MockSessionRepo {
    pub fn empty() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn sessions_handle(&self) -> Arc<Mutex<Vec<Session>>> {
        Arc::clone(&self.sessions)
    }

    pub fn share(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
        }
    }
}

impl SessionRepository for MockSessionRepo {
    async fn upsert_active(&self, session: &Session) -> Result<(), ServiceError> {
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(existing) = sessions
            .iter_mut()
            .find(|s| s.user_id == session.user_id && s.token == session.token)
        {
            existing.is_active = true;
            existing.issued_at = session.issued_at;
            existing.expires_at = session.expires_at;
        } else {
            sessions.push(session.clone());
        }
        Ok(())
    }

    async fn find_active(
        &self,
        user_id: Uuid,
        token: &str,
    ) -> Result<Option<Session>, ServiceError> {
        let now = Utc::now();
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.user_id == user_id && s.token == token && s.is_active && s.expires_at > now)
            .cloned())
    }

    async fn deactivate(&self, user_id: Uuid, token: &str) -> Result<bool, ServiceError> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions
            .iter_mut()
            .find(|s| s.user_id == user_id && s.token == token && s.is_active)
        {
            Some(session) => {
                session.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── MockResetRepo ────────────────────────────────────────────────────────────

pub struct MockResetRepo {
    pub resets: Arc<Mutex<Vec<PasswordReset>>>,
    pub outbox: Arc<Mutex<Vec<OutboxEvent>>>,
}

impl MockResetRepo {
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn new(resets: Vec<PasswordReset>) -> Self {
        Self {
            resets: Arc::new(Mutex::new(resets)),
            outbox: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn resets_handle(&self) -> Arc<Mutex<Vec<PasswordReset>>> {
        Arc::clone(&self.resets)
    }

    pub fn outbox_handle(&self) -> Arc<Mutex<Vec<OutboxEvent>>> {
        Arc::clone(&self.outbox)
    }

    pub fn share(&self) -> Self {
        Self {
            resets: Arc::clone(&self.resets),
            outbox: Arc::clone(&self.outbox),
        }
    }
}

impl PasswordResetRepository for MockResetRepo {
    async fn create_with_outbox(
        &self,
        reset: &PasswordReset,
        event: &OutboxEvent,
    ) -> Result<(), ServiceError> {
        self.resets.lock().unwrap().push(reset.clone());
        self.outbox.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn consume(&self, code: &str) -> Result<ResetConsume, ServiceError> {
        let now = Utc::now();
        let mut resets = self.resets.lock().unwrap();
        let Some(pos) = resets.iter().position(|r| r.code == code) else {
            return Ok(ResetConsume::Invalid);
        };
        if resets[pos].consumed_at.is_some() {
            return Ok(ResetConsume::Invalid);
        }
        if resets[pos].expires_at <= now {
            resets.remove(pos);
            return Ok(ResetConsume::Expired);
        }
        resets[pos].consumed_at = Some(now);
        Ok(ResetConsume::Consumed(resets[pos].clone()))
    }

    async fn delete_for_user(&self, user_id: Uuid) -> Result<(), ServiceError> {
        self.resets.lock().unwrap().retain(|r| r.user_id != user_id);
        Ok(())
    }
}
