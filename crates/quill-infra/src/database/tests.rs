use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, Value};
use uuid::Uuid;

use quill_core::domain::{Post, Role};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CategoryRepository, PostQuery, PostRepository, UserRepository,
};

use super::entity::{category, comment, post, post_category, user};
use super::post_repo::PostgresPostRepository;
use super::postgres_base::map_db_err;
use super::postgres_repo::{PostgresCategoryRepository, PostgresUserRepository};

fn post_row(id: Uuid, title: &str) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        author_id: Uuid::new_v4(),
        title: title.to_owned(),
        content: "Content long enough".to_owned(),
        excerpt: None,
        tags: serde_json::json!(["rust", "web"]),
        is_published: true,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id_attaches_links_and_comments() {
    let post_id = Uuid::new_v4();
    let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
    let commented_at = Utc::now() - Duration::minutes(5);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_row(post_id, "Test Post")]])
        .append_query_results([vec![
            post_category::Model {
                post_id,
                category_id: first,
                position: 0,
            },
            post_category::Model {
                post_id,
                category_id: second,
                position: 1,
            },
        ]])
        .append_query_results([vec![comment::Model {
            id: Uuid::new_v4(),
            post_id,
            author: "Jo".to_owned(),
            content: "Great read".to_owned(),
            created_at: commented_at.into(),
        }]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post: Post = repo.find_by_id(post_id).await.unwrap().unwrap();

    assert_eq!(post.id, post_id);
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.category_ids, vec![first, second]);
    assert_eq!(post.tags, vec!["rust".to_string(), "web".to_string()]);
    assert_eq!(post.comments.len(), 1);
    assert_eq!(post.comments[0].author, "Jo");
}

#[tokio::test]
async fn test_find_missing_post_skips_child_queries() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_page_reports_total_and_window() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[BTreeMap::from([(
            "num_items",
            Value::BigInt(Some(12)),
        )])]])
        .append_query_results([vec![post_row(a, "Newest"), post_row(b, "Older")]])
        .append_query_results([Vec::<post_category::Model>::new()])
        .append_query_results([Vec::<comment::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let page = repo
        .find_page(&PostQuery {
            published_only: true,
            search: Some("rust".into()),
            offset: 5,
            limit: 5,
            ..PostQuery::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total, 12);
    let titles: Vec<&str> = page.posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Newest", "Older"]);
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    assert!(matches!(
        repo.delete(Uuid::new_v4()).await,
        Err(RepoError::NotFound)
    ));
}

#[tokio::test]
async fn test_find_user_by_email() {
    let now = Utc::now();
    let id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user::Model {
            id,
            username: "admin".to_owned(),
            email: "admin@example.com".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            role: "admin".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let user = repo
        .find_by_email("admin@example.com")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(user.id, id);
    assert_eq!(user.role, Role::Admin);
}

#[tokio::test]
async fn test_unknown_role_reads_as_regular_user() {
    let now = Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user::Model {
            id: Uuid::new_v4(),
            username: "jo".to_owned(),
            email: "jo@example.com".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            role: "superuser".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let user = repo.find_by_username("jo").await.unwrap().unwrap();
    assert_eq!(user.role, Role::User);
}

#[tokio::test]
async fn test_list_categories() {
    let now = Utc::now();
    let row = |name: &str, slug: &str| category::Model {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        description: None,
        slug: slug.to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row("Databases", "databases"), row("Rust", "rust")]])
        .into_connection();

    let repo = PostgresCategoryRepository::new(db);
    let categories = repo.list_by_name().await.unwrap();

    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].slug, "databases");
}

#[tokio::test]
async fn test_find_by_ids_with_no_ids_does_not_query() {
    // No results are queued; any query would fail.
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let repo = PostgresCategoryRepository::new(db);
    assert!(repo.find_by_ids(&[]).await.unwrap().is_empty());
}

#[test]
fn test_map_db_err() {
    assert!(matches!(
        map_db_err(DbErr::RecordNotUpdated),
        RepoError::NotFound
    ));
    assert!(matches!(
        map_db_err(DbErr::Custom("boom".into())),
        RepoError::Query(_)
    ));
}
