//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{CategoryRepository, PostRepository, TokenService, UserRepository};
use quill_core::services::{AuthService, CategoryService, PostService};
use quill_infra::{
    Argon2PasswordService, InMemoryCategoryRepository, InMemoryPostRepository,
    InMemoryUserRepository, JwtConfig, JwtTokenService,
};

use crate::config::AppConfig;

#[cfg(feature = "postgres")]
use anyhow::Context;
#[cfg(feature = "postgres")]
use migration::{Migrator, MigratorTrait};
#[cfg(feature = "postgres")]
use quill_infra::database::Database;
#[cfg(feature = "postgres")]
use quill_infra::{PostgresCategoryRepository, PostgresPostRepository, PostgresUserRepository};

/// Which store backs the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Postgres => "postgres",
            StoreKind::Memory => "memory",
        }
    }
}

/// The repositories a state is assembled from.
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub posts: Arc<dyn PostRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            categories: Arc::new(InMemoryCategoryRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub categories: CategoryService,
    pub auth: AuthService,
    pub tokens: Arc<dyn TokenService>,
    pub store: StoreKind,
    #[cfg(feature = "postgres")]
    pub db: Option<Database>,
}

impl AppState {
    /// Build the application state from configuration.
    ///
    /// A configured database that cannot be reached is a startup error.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            let db = Database::init(db_config)
                .await
                .context("failed to connect to the database")?;
            if config.run_migrations {
                Migrator::up(db.conn(), None)
                    .await
                    .context("failed to apply migrations")?;
                tracing::info!("Schema migrations applied");
            }
            let conn = db.conn().clone();
            let repos = Repositories {
                users: Arc::new(PostgresUserRepository::new(conn.clone())),
                categories: Arc::new(PostgresCategoryRepository::new(conn.clone())),
                posts: Arc::new(PostgresPostRepository::new(conn)),
            };

            let mut state = Self::from_repos(repos, config.jwt.clone(), StoreKind::Postgres);
            state.db = Some(db);
            tracing::info!(store = state.store.as_str(), "Application state initialized");
            return Ok(state);
        }

        #[cfg(not(feature = "postgres"))]
        if config.database.is_some() {
            tracing::warn!("DATABASE_URL is set but the postgres feature is disabled");
        }

        tracing::warn!("Running without database (in-memory mode). Data is lost on restart.");
        let state = Self::from_repos(Repositories::in_memory(), config.jwt.clone(), StoreKind::Memory);
        tracing::info!(store = state.store.as_str(), "Application state initialized");
        Ok(state)
    }

    pub fn from_repos(repos: Repositories, jwt: JwtConfig, store: StoreKind) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(jwt));

        Self {
            posts: PostService::new(
                repos.posts,
                repos.categories.clone(),
                repos.users.clone(),
            ),
            categories: CategoryService::new(repos.categories),
            auth: AuthService::new(
                repos.users,
                tokens.clone(),
                Arc::new(Argon2PasswordService::new()),
            ),
            tokens,
            store,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    /// Whether the backing store answers. Always true for the in-memory store.
    pub async fn store_healthy(&self) -> bool {
        #[cfg(feature = "postgres")]
        if let Some(db) = &self.db {
            return db.is_healthy().await;
        }
        true
    }
}
