use hris_backend::domain::types::GrantChange;
use hris_backend::error::ServiceError;
use hris_backend::usecase::role::{ListRoleManagementUseCase, UpdateGrantsUseCase};
use uuid::Uuid;

use crate::helpers::{MockPermissionRepo, MockRoleRepo, test_permission, test_role};

#[tokio::test]
async fn should_list_active_roles_with_their_permissions() {
    let manager = test_role("manager", true);
    let retired = test_role("retired", false);
    let read = test_permission("employees.read");

    let usecase = ListRoleManagementUseCase {
        roles: MockRoleRepo::new(vec![manager.clone(), retired])
            .with_permissions(manager.id, vec![read.clone()]),
    };

    let view = usecase.execute().await.unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].role.id, manager.id);
    assert_eq!(view[0].permissions.len(), 1);
    assert_eq!(view[0].permissions[0].id, read.id);
}

#[tokio::test]
async fn should_apply_grant_changes() {
    let role = test_role("manager", true);
    let permission = test_permission("employees.read");
    let roles = MockRoleRepo::new(vec![role.clone()]);
    let grants_handle = std::sync::Arc::clone(&roles.grants);

    let usecase = UpdateGrantsUseCase {
        roles,
        permissions: MockPermissionRepo {
            existing: vec![permission.id],
        },
    };
    usecase
        .execute(vec![GrantChange {
            role_id: role.id,
            permission_id: permission.id,
            is_active: false,
        }])
        .await
        .unwrap();

    let grants = grants_handle.lock().unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].role_id, role.id);
    assert_eq!(grants[0].permission_id, permission.id);
    assert!(!grants[0].is_active);
}

#[tokio::test]
async fn should_reject_whole_batch_on_unknown_role() {
    let role = test_role("manager", true);
    let permission = test_permission("employees.read");
    let roles = MockRoleRepo::new(vec![role.clone()]);
    let grants_handle = std::sync::Arc::clone(&roles.grants);

    let usecase = UpdateGrantsUseCase {
        roles,
        permissions: MockPermissionRepo {
            existing: vec![permission.id],
        },
    };
    let result = usecase
        .execute(vec![
            GrantChange {
                role_id: role.id,
                permission_id: permission.id,
                is_active: true,
            },
            GrantChange {
                role_id: Uuid::now_v7(),
                permission_id: permission.id,
                is_active: true,
            },
        ])
        .await;

    assert!(matches!(result, Err(ServiceError::RoleNotFound)));
    // Validation happens before any write: nothing was applied.
    assert!(grants_handle.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_batch_on_unknown_permission() {
    let role = test_role("manager", true);
    let usecase = UpdateGrantsUseCase {
        roles: MockRoleRepo::new(vec![role.clone()]),
        permissions: MockPermissionRepo { existing: vec![] },
    };

    let result = usecase
        .execute(vec![GrantChange {
            role_id: role.id,
            permission_id: Uuid::now_v7(),
            is_active: true,
        }])
        .await;

    assert!(matches!(result, Err(ServiceError::PermissionNotFound)));
}
