//! Service wiring over the in-memory repositories.

#![allow(dead_code)]

use std::sync::Arc;

use quill_core::domain::{Category, Role, User};
use quill_core::policy::Actor;
use quill_core::ports::{BaseRepository, CategoryRepository, PostRepository, UserRepository};
use quill_core::services::{AuthService, CategoryService, PostService};
use quill_infra::{
    Argon2PasswordService, InMemoryCategoryRepository, InMemoryPostRepository,
    InMemoryUserRepository, JwtConfig, JwtTokenService,
};

pub struct Harness {
    pub users: Arc<InMemoryUserRepository>,
    pub categories: Arc<InMemoryCategoryRepository>,
    pub posts: Arc<InMemoryPostRepository>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            categories: Arc::new(InMemoryCategoryRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
        }
    }

    pub fn post_service(&self) -> PostService {
        PostService::new(
            self.posts.clone() as Arc<dyn PostRepository>,
            self.categories.clone() as Arc<dyn CategoryRepository>,
            self.users.clone() as Arc<dyn UserRepository>,
        )
    }

    pub fn category_service(&self) -> CategoryService {
        CategoryService::new(self.categories.clone() as Arc<dyn CategoryRepository>)
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(
            self.users.clone() as Arc<dyn UserRepository>,
            Arc::new(JwtTokenService::new(JwtConfig {
                secret: "integration-secret".into(),
                ..JwtConfig::default()
            })),
            Arc::new(Argon2PasswordService::new()),
        )
    }

    /// Store an account directly and return it as an actor.
    pub async fn actor(&self, username: &str, role: Role) -> Actor {
        let user = User::new(
            username.into(),
            format!("{username}@example.com"),
            "not-a-real-hash".into(),
            role,
        );
        let user = self.users.insert(user).await.unwrap();
        Actor::new(user.id, user.role)
    }

    pub async fn category(&self, name: &str, slug: &str) -> Category {
        self.categories
            .insert(Category::new(name.into(), None, slug.into()))
            .await
            .unwrap()
    }
}
