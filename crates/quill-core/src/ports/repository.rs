use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Comment, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity. Unique-key clashes surface as [`RepoError::Constraint`].
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Missing entities surface as [`RepoError::NotFound`].
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Load every user in `ids`; unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// All categories, sorted by name.
    async fn list_by_name(&self) -> Result<Vec<Category>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// Load every category in `ids`; unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError>;
}

/// Filter and window for a post listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub published_only: bool,
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub offset: u64,
    pub limit: u64,
}

/// One window of a post listing plus the size of the whole result set.
#[derive(Debug, Clone, Default)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total: u64,
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Run a filtered listing, newest first.
    async fn find_page(&self, query: &PostQuery) -> Result<PostPage, RepoError>;

    /// Append a comment to a post. Returns `None` when the post does not exist.
    async fn append_comment(
        &self,
        post_id: Uuid,
        comment: Comment,
    ) -> Result<Option<Comment>, RepoError>;
}
