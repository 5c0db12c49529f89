use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Comment, Post};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostPage, PostQuery, PostRepository};
use quill_shared::search::any_word_matches;

/// In-memory post store.
///
/// Text search matches a post when any word of the query appears, ignoring
/// case, in its title or content.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(post: &Post, query: &PostQuery) -> bool {
    if query.published_only && !post.is_published {
        return false;
    }
    if let Some(category_id) = query.category_id {
        if !post.category_ids.contains(&category_id) {
            return false;
        }
    }
    match &query.search {
        Some(search) => any_word_matches(&post.title, &post.content, search),
        None => true,
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&post.id) {
            return Err(RepoError::Constraint("Post already exists".into()));
        }
        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        let existing = store.get_mut(&post.id).ok_or(RepoError::NotFound)?;

        // Author and comments belong to the stored record, not the caller's copy.
        let comments = std::mem::take(&mut existing.comments);
        let author_id = existing.author_id;
        *existing = Post {
            author_id,
            comments,
            ..post
        };
        Ok(existing.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_page(&self, query: &PostQuery) -> Result<PostPage, RepoError> {
        let store = self.store.read().await;
        let mut hits: Vec<&Post> = store.values().filter(|p| matches(p, query)).collect();
        hits.sort_by_key(|p| Reverse((p.created_at, p.id)));

        let total = hits.len() as u64;
        let posts = hits
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect();

        Ok(PostPage { posts, total })
    }

    async fn append_comment(
        &self,
        post_id: Uuid,
        comment: Comment,
    ) -> Result<Option<Comment>, RepoError> {
        let mut store = self.store.write().await;
        Ok(store.get_mut(&post_id).map(|post| {
            post.comments.push(comment.clone());
            comment
        }))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn post(title: &str, minutes_ago: i64) -> Post {
        let mut post = Post::new(Uuid::new_v4(), title.into(), "Some body text here".into());
        post.created_at = Utc::now() - Duration::minutes(minutes_ago);
        post
    }

    fn everything(limit: u64) -> PostQuery {
        PostQuery {
            published_only: true,
            limit,
            ..PostQuery::default()
        }
    }

    #[tokio::test]
    async fn test_page_is_newest_first_and_counts_everything() {
        let repo = InMemoryPostRepository::new();
        for i in 0..7 {
            repo.insert(post(&format!("Post {i}"), i)).await.unwrap();
        }

        let page = repo
            .find_page(&PostQuery {
                offset: 2,
                ..everything(3)
            })
            .await
            .unwrap();

        assert_eq!(page.total, 7);
        let titles: Vec<&str> = page.posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Post 2", "Post 3", "Post 4"]);
    }

    #[tokio::test]
    async fn test_unpublished_and_other_categories_are_filtered() {
        let repo = InMemoryPostRepository::new();
        let category = Uuid::new_v4();

        let mut draft = post("Draft", 1);
        draft.is_published = false;
        repo.insert(draft).await.unwrap();

        let mut tagged = post("Tagged", 2);
        tagged.category_ids = vec![category];
        repo.insert(tagged).await.unwrap();
        repo.insert(post("Plain", 3)).await.unwrap();

        assert_eq!(repo.find_page(&everything(10)).await.unwrap().total, 2);

        let page = repo
            .find_page(&PostQuery {
                category_id: Some(category),
                ..everything(10)
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.posts[0].title, "Tagged");
    }

    #[tokio::test]
    async fn test_search_matches_any_word() {
        let repo = InMemoryPostRepository::new();
        repo.insert(post("Learning Rust", 1)).await.unwrap();
        repo.insert(post("CSS Grid tricks", 2)).await.unwrap();

        let page = repo
            .find_page(&PostQuery {
                search: Some("rust python".into()),
                ..everything(10)
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.posts[0].title, "Learning Rust");
    }

    #[tokio::test]
    async fn test_update_keeps_author_and_comments() {
        let repo = InMemoryPostRepository::new();
        let original = repo.insert(post("Original", 1)).await.unwrap();
        repo.append_comment(original.id, Comment::new("Jo".into(), "Nice!".into()))
            .await
            .unwrap();

        let mut edited = original.clone();
        edited.title = "Edited".into();
        edited.author_id = Uuid::new_v4();
        let saved = repo.update(edited).await.unwrap();

        assert_eq!(saved.title, "Edited");
        assert_eq!(saved.author_id, original.author_id);
        assert_eq!(saved.comments.len(), 1);
    }

    #[tokio::test]
    async fn test_append_comment_to_missing_post() {
        let repo = InMemoryPostRepository::new();
        let result = repo
            .append_comment(Uuid::new_v4(), Comment::new("Jo".into(), "Nice!".into()))
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
