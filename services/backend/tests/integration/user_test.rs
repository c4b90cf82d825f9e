use hris_backend::domain::types::UserChanges;
use hris_backend::error::ServiceError;
use hris_backend::security::verify_password;
use hris_backend::usecase::user::{
    GetUserUseCase, ListUsersUseCase, SignUpInput, SignUpUseCase, UpdateUserInput,
    UpdateUserUseCase,
};
use hris_domain::pagination::PageRequest;
use uuid::Uuid;

use crate::helpers::{MockRoleRepo, MockUserRepo, test_role, test_user};

fn signup_input(email: &str) -> SignUpInput {
    SignUpInput {
        email: email.to_owned(),
        password: "a decent password".to_owned(),
        name: "bob".to_owned(),
        phone: None,
    }
}

#[tokio::test]
async fn should_sign_up_with_default_role_and_hashed_password() {
    let employee = test_role("employee", true);
    let users = MockUserRepo::empty();
    let users_handle = users.users_handle();

    let usecase = SignUpUseCase {
        users,
        roles: MockRoleRepo::new(vec![employee]),
        default_role: "employee".to_owned(),
    };
    usecase.execute(signup_input("bob@example.com")).await.unwrap();

    let users = users_handle.lock().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "bob@example.com");
    // The password is stored hashed, never verbatim.
    assert_ne!(users[0].password_hash, "a decent password");
    assert!(verify_password("a decent password", &users[0].password_hash).unwrap());
}

#[tokio::test]
async fn should_reject_duplicate_email_on_sign_up() {
    let user = test_user();
    let email = user.email.clone();
    let usecase = SignUpUseCase {
        users: MockUserRepo::new(vec![user]),
        roles: MockRoleRepo::new(vec![test_role("employee", true)]),
        default_role: "employee".to_owned(),
    };

    let result = usecase.execute(signup_input(&email)).await;
    assert!(matches!(result, Err(ServiceError::EmailTaken)));
}

#[tokio::test]
async fn should_reject_sign_up_when_default_role_missing() {
    let usecase = SignUpUseCase {
        users: MockUserRepo::empty(),
        roles: MockRoleRepo::empty(),
        default_role: "employee".to_owned(),
    };

    let result = usecase.execute(signup_input("bob@example.com")).await;
    assert!(matches!(result, Err(ServiceError::RoleNotFound)));
}

#[tokio::test]
async fn should_update_profile_fields() {
    let user = test_user();
    let users = MockUserRepo::new(vec![user.clone()]);
    let users_handle = users.users_handle();

    let usecase = UpdateUserUseCase {
        users,
        roles: MockRoleRepo::empty(),
    };
    usecase
        .execute(
            user.id,
            UpdateUserInput {
                changes: UserChanges {
                    name: Some("alice b".to_owned()),
                    phone: Some("+62 812 0000".to_owned()),
                    ..Default::default()
                },
                role_id: None,
            },
        )
        .await
        .unwrap();

    let users = users_handle.lock().unwrap();
    assert_eq!(users[0].name, "alice b");
    assert_eq!(users[0].phone.as_deref(), Some("+62 812 0000"));
}

#[tokio::test]
async fn should_reject_empty_update() {
    let user = test_user();
    let usecase = UpdateUserUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        roles: MockRoleRepo::empty(),
    };

    let result = usecase
        .execute(
            user.id,
            UpdateUserInput {
                changes: UserChanges::default(),
                role_id: None,
            },
        )
        .await;
    assert!(matches!(result, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn should_reject_role_assignment_of_inactive_role() {
    let user = test_user();
    let suspended = test_role("suspended", false);
    let usecase = UpdateUserUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        roles: MockRoleRepo::new(vec![suspended.clone()]),
    };

    let result = usecase
        .execute(
            user.id,
            UpdateUserInput {
                changes: UserChanges::default(),
                role_id: Some(suspended.id),
            },
        )
        .await;
    assert!(matches!(result, Err(ServiceError::RoleNotFound)));
}

#[tokio::test]
async fn should_return_not_found_for_unknown_user() {
    let usecase = GetUserUseCase {
        users: MockUserRepo::empty(),
    };
    let result = usecase.execute(Uuid::now_v7()).await;
    assert!(matches!(result, Err(ServiceError::UserNotFound)));
}

#[tokio::test]
async fn should_page_and_filter_user_list() {
    let mut anna = test_user();
    anna.email = "anna@example.com".to_owned();
    anna.name = "anna".to_owned();
    let mut bart = test_user();
    bart.email = "bart@example.com".to_owned();
    bart.name = "bart".to_owned();
    let mut inactive = test_user();
    inactive.email = "gone@example.com".to_owned();
    inactive.name = "anna gone".to_owned();
    inactive.is_active = false;

    let usecase = ListUsersUseCase {
        users: MockUserRepo::new(vec![anna.clone(), bart, inactive]),
    };

    let page = usecase
        .execute(
            Some("anna".to_owned()),
            PageRequest {
                per_page: 10,
                page: 1,
            },
        )
        .await
        .unwrap();

    assert_eq!(page.meta.count, 1);
    assert_eq!(page.users.len(), 1);
    assert_eq!(page.users[0].id, anna.id);
}
