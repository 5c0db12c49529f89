mod common;

use common::Harness;
use quill_core::DomainError;
use quill_core::domain::Role;
use quill_core::services::NewCategory;

fn named(name: &str) -> NewCategory {
    NewCategory {
        name: name.into(),
        ..NewCategory::default()
    }
}

#[tokio::test]
async fn test_slug_is_derived_and_duplicates_rejected() {
    let h = Harness::new();
    let service = h.category_service();
    let admin = h.actor("admin", Role::Admin).await;

    let created = service.create(&admin, named("Tech Notes")).await.unwrap();
    assert_eq!(created.slug, "tech-notes");

    let err = service.create(&admin, named("Tech Notes")).await.unwrap_err();
    assert!(matches!(err, DomainError::Duplicate(ref msg) if msg == "Category already exists"));
}

#[tokio::test]
async fn test_explicit_slug_is_kept() {
    let h = Harness::new();
    let service = h.category_service();
    let admin = h.actor("admin", Role::Admin).await;

    let created = service
        .create(
            &admin,
            NewCategory {
                slug: Some("Web-Dev".into()),
                description: Some("Browsers and servers".into()),
                ..named("Web Development")
            },
        )
        .await
        .unwrap();

    assert_eq!(created.slug, "web-dev");
    assert_eq!(created.description.as_deref(), Some("Browsers and servers"));
}

#[tokio::test]
async fn test_regular_users_may_not_create() {
    let h = Harness::new();
    let service = h.category_service();
    let user = h.actor("writer", Role::User).await;

    let err = service.create(&user, named("Rust")).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden("Admin access required")));
    assert!(service.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_short_name_is_rejected() {
    let h = Harness::new();
    let service = h.category_service();
    let admin = h.actor("admin", Role::Admin).await;

    let err = service.create(&admin, named(" R ")).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_list_is_sorted_by_name() {
    let h = Harness::new();
    let service = h.category_service();
    let admin = h.actor("admin", Role::Admin).await;

    for name in ["Rust", "Databases", "Networking"] {
        service.create(&admin, named(name)).await.unwrap();
    }

    let names: Vec<String> = service
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Databases", "Networking", "Rust"]);
}
