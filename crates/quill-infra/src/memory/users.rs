use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::User;
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, UserRepository};

/// In-memory user store; email and username are unique.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn clashes(a: &User, b: &User) -> bool {
    a.id != b.id && (a.email == b.email || a.username == b.username)
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&user.id) || store.values().any(|u| clashes(u, &user)) {
            return Err(RepoError::Constraint("User already exists".into()));
        }
        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if !store.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        if store.values().any(|u| clashes(u, &user)) {
            return Err(RepoError::Constraint("User already exists".into()));
        }
        store.insert(user.id, user.clone());
        Ok(user)
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
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let store = self.store.read().await;
        Ok(ids.iter().filter_map(|id| store.get(id).cloned()).collect())
    }
}

#[cfg(test)]
mod tests {
    use quill_core::domain::Role;

    use super::*;

    fn user(username: &str, email: &str) -> User {
        User::new(username.into(), email.into(), "hash".into(), Role::User)
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let repo = InMemoryUserRepository::new();
        let saved = repo.insert(user("jo", "jo@example.com")).await.unwrap();

        assert_eq!(repo.find_by_email("jo@example.com").await.unwrap().unwrap().id, saved.id);
        assert_eq!(repo.find_by_username("jo").await.unwrap().unwrap().id, saved.id);
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_constraint_error() {
        let repo = InMemoryUserRepository::new();
        repo.insert(user("jo", "jo@example.com")).await.unwrap();

        let err = repo.insert(user("jo2", "jo@example.com")).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_unknown() {
        let repo = InMemoryUserRepository::new();
        let saved = repo.insert(user("jo", "jo@example.com")).await.unwrap();

        let found = repo.find_by_ids(&[saved.id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(found.len(), 1);
    }
}
