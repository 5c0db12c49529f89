mod common;

use common::Harness;
use quill_core::DomainError;
use quill_core::domain::Role;
use quill_core::services::NewAccount;

fn account(username: &str, email: &str) -> NewAccount {
    NewAccount {
        username: username.into(),
        email: email.into(),
        password: "hunter2hunter2".into(),
    }
}

#[tokio::test]
async fn test_register_then_login() {
    let h = Harness::new();
    let service = h.auth_service();

    let issued = service
        .register(account("reader", "Reader@Example.com"))
        .await
        .unwrap();
    assert_eq!(issued.user.role, Role::User);
    assert_eq!(issued.user.email, "reader@example.com");
    assert_eq!(issued.expires_in, 24 * 3600);

    let login = service
        .login("reader@example.com", "hunter2hunter2")
        .await
        .unwrap();
    assert_eq!(login.user.id, issued.user.id);
    assert!(!login.access_token.is_empty());
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let h = Harness::new();
    let service = h.auth_service();
    service
        .register(account("reader", "reader@example.com"))
        .await
        .unwrap();

    assert!(matches!(
        service.login("reader@example.com", "wrong-password").await,
        Err(DomainError::Unauthorized)
    ));
    assert!(matches!(
        service.login("nobody@example.com", "hunter2hunter2").await,
        Err(DomainError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_duplicate_email_and_username_conflict() {
    let h = Harness::new();
    let service = h.auth_service();
    service
        .register(account("reader", "reader@example.com"))
        .await
        .unwrap();

    let err = service
        .register(account("someone", "READER@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ref m) if m == "Email already registered"));

    let err = service
        .register(account("reader", "other@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ref m) if m == "Username already taken"));
}

#[tokio::test]
async fn test_registration_validation_lists_every_field() {
    let h = Harness::new();
    let service = h.auth_service();

    let err = service
        .register(NewAccount {
            username: "ab".into(),
            email: "not-an-email".into(),
            password: "short".into(),
        })
        .await
        .unwrap_err();

    let DomainError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(errors.fields(), vec!["username", "email", "password"]);
}

#[tokio::test]
async fn test_ensure_admin_is_idempotent() {
    let h = Harness::new();
    let service = h.auth_service();

    let first = service
        .ensure_admin(account("admin", "admin@example.com"))
        .await
        .unwrap();
    let second = service
        .ensure_admin(account("admin", "admin@example.com"))
        .await
        .unwrap();

    assert_eq!(first.role, Role::Admin);
    assert_eq!(first.id, second.id);
}
