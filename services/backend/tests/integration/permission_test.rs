use hris_backend::usecase::permission::ResolvePermissionsUseCase;
use uuid::Uuid;

use crate::helpers::{MockRoleRepo, MockUserRepo, test_permission, test_role, test_user};

#[tokio::test]
async fn should_resolve_permissions_via_active_role() {
    let user = test_user();
    let role = test_role("manager", true);
    let read = test_permission("employees.read");
    let write = test_permission("employees.write");

    let usecase = ResolvePermissionsUseCase {
        users: MockUserRepo::new(vec![user.clone()]).with_roles(user.id, vec![role.clone()]),
        roles: MockRoleRepo::new(vec![role.clone()])
            .with_permissions(role.id, vec![read.clone(), write.clone()]),
    };

    let granted = usecase.execute(user.id).await.unwrap();
    let ids: Vec<Uuid> = granted.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![read.id, write.id]);
}

#[tokio::test]
async fn should_return_empty_set_for_user_without_role() {
    let user = test_user();
    let usecase = ResolvePermissionsUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        roles: MockRoleRepo::empty(),
    };

    let granted = usecase.execute(user.id).await.unwrap();
    assert!(granted.is_empty());
}

#[tokio::test]
async fn should_return_empty_set_for_inactive_role() {
    let user = test_user();
    let role = test_role("suspended", false);
    let read = test_permission("employees.read");

    let usecase = ResolvePermissionsUseCase {
        users: MockUserRepo::new(vec![user.clone()]).with_roles(user.id, vec![role.clone()]),
        roles: MockRoleRepo::new(vec![role.clone()]).with_permissions(role.id, vec![read]),
    };

    let granted = usecase.execute(user.id).await.unwrap();
    assert!(granted.is_empty());
}

#[tokio::test]
async fn should_return_empty_set_for_unknown_user() {
    let usecase = ResolvePermissionsUseCase {
        users: MockUserRepo::empty(),
        roles: MockRoleRepo::empty(),
    };

    let granted = usecase.execute(Uuid::now_v7()).await.unwrap();
    assert!(granted.is_empty());
}

#[tokio::test]
async fn should_dedupe_permissions_across_roles() {
    let user = test_user();
    let first = test_role("manager", true);
    let second = test_role("auditor", true);
    let shared = test_permission("reports.read");
    let extra = test_permission("reports.export");

    let usecase = ResolvePermissionsUseCase {
        users: MockUserRepo::new(vec![user.clone()])
            .with_roles(user.id, vec![first.clone(), second.clone()]),
        roles: MockRoleRepo::new(vec![first.clone(), second.clone()])
            .with_permissions(first.id, vec![shared.clone()])
            .with_permissions(second.id, vec![shared.clone(), extra.clone()]),
    };

    let granted = usecase.execute(user.id).await.unwrap();
    let ids: Vec<Uuid> = granted.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![shared.id, extra.id]);
}
