//! Sea-ORM entities for the HRIS backend, one module per table.

pub mod menus;
pub mod modules;
pub mod outbox_events;
pub mod password_resets;
pub mod permissions;
pub mod role_permissions;
pub mod roles;
pub mod sessions;
pub mod user_roles;
pub mod users;
