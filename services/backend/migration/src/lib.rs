use sea_orm_migration::prelude::*;

mod m20260401_000001_create_users;
mod m20260401_000002_create_rbac;
mod m20260401_000003_create_menus;
mod m20260401_000004_create_sessions;
mod m20260401_000005_create_password_resets;
mod m20260401_000006_create_outbox_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260401_000001_create_users::Migration),
            Box::new(m20260401_000002_create_rbac::Migration),
            Box::new(m20260401_000003_create_menus::Migration),
            Box::new(m20260401_000004_create_sessions::Migration),
            Box::new(m20260401_000005_create_password_resets::Migration),
            Box::new(m20260401_000006_create_outbox_events::Migration),
        ]
    }
}
