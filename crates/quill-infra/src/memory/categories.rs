use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::Category;
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, CategoryRepository};

/// In-memory category store; name and slug are unique.
#[derive(Default)]
pub struct InMemoryCategoryRepository {
    store: RwLock<HashMap<Uuid, Category>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn clashes(a: &Category, b: &Category) -> bool {
    a.id != b.id && (a.name == b.name || a.slug == b.slug)
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, category: Category) -> Result<Category, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&category.id) || store.values().any(|c| clashes(c, &category)) {
            return Err(RepoError::Constraint("Category already exists".into()));
        }
        store.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, category: Category) -> Result<Category, RepoError> {
        let mut store = self.store.write().await;
        if !store.contains_key(&category.id) {
            return Err(RepoError::NotFound);
        }
        if store.values().any(|c| clashes(c, &category)) {
            return Err(RepoError::Constraint("Category already exists".into()));
        }
        store.insert(category.id, category.clone());
        Ok(category)
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
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list_by_name(&self) -> Result<Vec<Category>, RepoError> {
        let mut all: Vec<Category> = self.store.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|c| c.slug == slug).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError> {
        let store = self.store.read().await;
        Ok(ids.iter().filter_map(|id| store.get(id).cloned()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, slug: &str) -> Category {
        Category::new(name.into(), None, slug.into())
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_name() {
        let repo = InMemoryCategoryRepository::new();
        repo.insert(category("Rust", "rust")).await.unwrap();
        repo.insert(category("Design", "design")).await.unwrap();
        repo.insert(category("Linux", "linux")).await.unwrap();

        let names: Vec<String> = repo
            .list_by_name()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Design", "Linux", "Rust"]);
    }

    #[tokio::test]
    async fn test_name_or_slug_clash_is_rejected() {
        let repo = InMemoryCategoryRepository::new();
        repo.insert(category("Tech Notes", "tech-notes")).await.unwrap();

        assert!(matches!(
            repo.insert(category("Tech Notes", "other")).await,
            Err(RepoError::Constraint(_))
        ));
        assert!(matches!(
            repo.insert(category("Other", "tech-notes")).await,
            Err(RepoError::Constraint(_))
        ));
        assert_eq!(repo.list_by_name().await.unwrap().len(), 1);
    }
}
