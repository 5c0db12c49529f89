use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - represents a blog post or article.
///
/// `author_id` is fixed at creation and `comments` only ever grows; the
/// services never hand out a way to change either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub category_ids: Vec<Uuid>,
    pub tags: Vec<String>,
    pub comments: Vec<Comment>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(author_id: Uuid, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            content,
            excerpt: None,
            category_ids: Vec::new(),
            tags: Vec::new(),
            comments: Vec::new(),
            is_published: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

/// A reader comment on a post. Comments have no lifecycle of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(author: String, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            content,
            created_at: Utc::now(),
        }
    }
}
