//! Post service: listing, retrieval, authoring and comments.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Comment, Post};
use crate::error::{DomainError, RepoError};
use crate::policy::{Action, Actor, Resource, authorize};
use crate::ports::{CategoryRepository, PostQuery, PostRepository, UserRepository};
use crate::validation::{ValidationErrors, Validator, escape_html, parse_id};

use super::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

const TITLE_MIN: usize = 3;
const CONTENT_MIN: usize = 10;
const EXCERPT_MAX: usize = 200;
const COMMENT_AUTHOR_MIN: usize = 2;
const COMMENT_CONTENT_MIN: usize = 3;

/// Raw listing parameters, exactly as they arrived in the query string.
#[derive(Debug, Clone, Default)]
pub struct ListPostsParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

/// Partial update of a post; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct NewComment {
    pub author: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRef {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// A post with its author and categories resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulatedPost {
    pub post: Post,
    /// `None` when the author account no longer exists.
    pub author: Option<AuthorRef>,
    pub categories: Vec<CategoryRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current: u64,
    pub pages: u64,
    pub total: u64,
}

#[derive(Debug, Clone)]
pub struct PostListing {
    pub posts: Vec<PopulatedPost>,
    pub pagination: Pagination,
}

/// Post operations over the repository ports.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            posts,
            categories,
            users,
        }
    }

    /// List published posts, newest first.
    pub async fn list(&self, params: ListPostsParams) -> Result<PostListing, DomainError> {
        let mut v = Validator::new();
        let page = v.int_in_range("page", params.page.as_deref(), 1, None, 1);
        let limit = v.int_in_range(
            "limit",
            params.limit.as_deref(),
            1,
            Some(MAX_PAGE_SIZE),
            DEFAULT_PAGE_SIZE,
        );
        // Storage offsets are signed 64-bit.
        let offset = (page - 1)
            .checked_mul(limit)
            .filter(|offset| i64::try_from(*offset).is_ok());
        if offset.is_none() {
            v.push("page", "is too large");
        }
        v.finish(())?;
        let offset = offset.unwrap_or_default();

        let search = non_blank(params.search);

        // Slugs are stored lowercase. An unknown slug leaves the listing
        // unfiltered by category.
        let category_id = match non_blank(params.category) {
            Some(slug) => self
                .categories
                .find_by_slug(&slug.to_lowercase())
                .await?
                .map(|c| c.id),
            None => None,
        };

        let query = PostQuery {
            published_only: true,
            search,
            category_id,
            offset,
            limit,
        };
        tracing::debug!(?query, "Listing posts");

        let result = self.posts.find_page(&query).await?;
        let posts = self.populate(result.posts).await?;

        Ok(PostListing {
            posts,
            pagination: Pagination {
                current: page,
                pages: result.total.div_ceil(limit),
                total: result.total,
            },
        })
    }

    pub async fn get(&self, raw_id: &str) -> Result<PopulatedPost, DomainError> {
        let id = parse_id(raw_id)?;
        let post = self.load(id).await?;
        self.populate_one(post).await
    }

    pub async fn create(&self, actor: &Actor, input: NewPost) -> Result<PopulatedPost, DomainError> {
        let mut v = Validator::new();
        let title = escape_html(&v.min_chars("title", &input.title, TITLE_MIN));
        let content = v.min_chars("content", &input.content, CONTENT_MIN);
        let excerpt = input
            .excerpt
            .as_deref()
            .map(|e| v.max_chars("excerpt", e, EXCERPT_MAX));
        let category_ids = input
            .categories
            .as_deref()
            .map(|raw| category_ids(&mut v, raw))
            .unwrap_or_default();
        v.finish(())?;

        authorize(actor, Action::Create, Resource::Post { author_id: None })?;
        self.ensure_categories_exist(&category_ids).await?;

        let mut post = Post::new(actor.user_id, title, content);
        post.excerpt = excerpt;
        post.category_ids = category_ids;
        post.tags = input.tags.map(trim_all).unwrap_or_default();
        post.is_published = input.is_published.unwrap_or(true);

        let saved = self.posts.insert(post).await?;
        tracing::info!(post_id = %saved.id, author_id = %saved.author_id, "Post created");

        self.populate_one(saved).await
    }

    pub async fn update(
        &self,
        actor: &Actor,
        raw_id: &str,
        changes: PostChanges,
    ) -> Result<PopulatedPost, DomainError> {
        let mut v = Validator::new();
        let id = v.uuid("id", raw_id);
        let title = changes
            .title
            .as_deref()
            .map(|t| escape_html(&v.min_chars("title", t, TITLE_MIN)));
        let content = changes
            .content
            .as_deref()
            .map(|c| v.min_chars("content", c, CONTENT_MIN));
        let excerpt = changes
            .excerpt
            .as_deref()
            .map(|e| v.max_chars("excerpt", e, EXCERPT_MAX));
        let new_category_ids = changes
            .categories
            .as_deref()
            .map(|raw| category_ids(&mut v, raw));
        let id = v.finish(id.unwrap_or_default())?;

        let mut post = self.load(id).await?;
        authorize(
            actor,
            Action::Update,
            Resource::Post {
                author_id: Some(post.author_id),
            },
        )?;

        if let Some(ids) = &new_category_ids {
            self.ensure_categories_exist(ids).await?;
        }

        if let Some(title) = title {
            post.title = title;
        }
        if let Some(content) = content {
            post.content = content;
        }
        if let Some(excerpt) = excerpt {
            post.excerpt = Some(excerpt);
        }
        if let Some(ids) = new_category_ids {
            post.category_ids = ids;
        }
        if let Some(tags) = changes.tags {
            post.tags = trim_all(tags);
        }
        if let Some(is_published) = changes.is_published {
            post.is_published = is_published;
        }
        post.updated_at = Utc::now();

        let saved = self.posts.update(post).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Post", id),
            other => other.into(),
        })?;
        tracing::info!(post_id = %id, user_id = %actor.user_id, "Post updated");

        self.populate_one(saved).await
    }

    pub async fn delete(&self, actor: &Actor, raw_id: &str) -> Result<(), DomainError> {
        let id = parse_id(raw_id)?;
        let post = self.load(id).await?;
        authorize(
            actor,
            Action::Delete,
            Resource::Post {
                author_id: Some(post.author_id),
            },
        )?;

        self.posts.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Post", id),
            other => other.into(),
        })?;
        tracing::info!(post_id = %id, user_id = %actor.user_id, "Post deleted");

        Ok(())
    }

    /// Append a reader comment and return it as stored.
    pub async fn add_comment(&self, raw_id: &str, input: NewComment) -> Result<Comment, DomainError> {
        let mut v = Validator::new();
        let id = v.uuid("id", raw_id);
        let author = v.min_chars("author", &input.author, COMMENT_AUTHOR_MIN);
        let content = v.min_chars("content", &input.content, COMMENT_CONTENT_MIN);
        let id = v.finish(id.unwrap_or_default())?;

        let comment = self
            .posts
            .append_comment(id, Comment::new(author, content))
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))?;
        tracing::info!(post_id = %id, comment_id = %comment.id, "Comment added");

        Ok(comment)
    }

    async fn load(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    async fn ensure_categories_exist(&self, ids: &[Uuid]) -> Result<(), DomainError> {
        if ids.is_empty() {
            return Ok(());
        }
        let found = self.categories.find_by_ids(ids).await?;
        if found.len() != ids.len() {
            return Err(ValidationErrors::single("categories", "references an unknown category").into());
        }
        Ok(())
    }

    async fn populate_one(&self, post: Post) -> Result<PopulatedPost, DomainError> {
        let mut populated = self.populate(vec![post]).await?;
        populated
            .pop()
            .ok_or_else(|| DomainError::Internal("population dropped a post".into()))
    }

    /// Resolve author and category references for a batch of posts.
    async fn populate(&self, posts: Vec<Post>) -> Result<Vec<PopulatedPost>, DomainError> {
        let mut author_ids: Vec<Uuid> = posts.iter().map(|p| p.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let mut category_ids: Vec<Uuid> = posts
            .iter()
            .flat_map(|p| p.category_ids.iter().copied())
            .collect();
        category_ids.sort_unstable();
        category_ids.dedup();

        let authors: HashMap<Uuid, AuthorRef> = self
            .users
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    AuthorRef {
                        id: u.id,
                        username: u.username,
                    },
                )
            })
            .collect();

        let categories: HashMap<Uuid, CategoryRef> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            self.categories
                .find_by_ids(&category_ids)
                .await?
                .into_iter()
                .map(|c| {
                    (
                        c.id,
                        CategoryRef {
                            id: c.id,
                            name: c.name,
                            slug: c.slug,
                        },
                    )
                })
                .collect()
        };

        Ok(posts
            .into_iter()
            .map(|post| PopulatedPost {
                author: authors.get(&post.author_id).cloned(),
                categories: post
                    .category_ids
                    .iter()
                    .filter_map(|id| categories.get(id).cloned())
                    .collect(),
                post,
            })
            .collect())
    }
}

/// Parse category identifiers, dropping repeats while keeping first-seen order.
fn category_ids(v: &mut Validator, raw: &[String]) -> Vec<Uuid> {
    let mut ids = Vec::with_capacity(raw.len());
    let mut invalid = false;
    for value in raw {
        match Uuid::parse_str(value.trim()) {
            Ok(id) if !ids.contains(&id) => ids.push(id),
            Ok(_) => {}
            Err(_) => invalid = true,
        }
    }
    if invalid {
        v.push("categories", "must contain valid category identifiers");
    }
    ids
}

fn trim_all(values: Vec<String>) -> Vec<String> {
    values.into_iter().map(|s| s.trim().to_string()).collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
