//! Category service.

use std::sync::Arc;

use crate::domain::Category;
use crate::error::{DomainError, RepoError};
use crate::policy::{Action, Actor, Resource, authorize};
use crate::ports::CategoryRepository;
use crate::validation::{Validator, escape_html, slugify};

const NAME_MIN: usize = 2;
const DESCRIPTION_MAX: usize = 500;

#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub slug: Option<String>,
}

#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    /// All categories, alphabetical by name.
    pub async fn list(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.categories.list_by_name().await?)
    }

    /// Create a category. Admin only; names and slugs are unique.
    pub async fn create(&self, actor: &Actor, input: NewCategory) -> Result<Category, DomainError> {
        let mut v = Validator::new();
        let name = escape_html(&v.min_chars("name", &input.name, NAME_MIN));
        let description = input
            .description
            .as_deref()
            .map(|d| v.max_chars("description", d, DESCRIPTION_MAX))
            .filter(|d| !d.is_empty());
        v.finish(())?;

        authorize(actor, Action::Create, Resource::Category)?;

        let slug = input
            .slug
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slugify(&name));

        let category = Category::new(name, description, slug);
        let saved = self.categories.insert(category).await.map_err(|e| match e {
            RepoError::Constraint(_) => DomainError::Duplicate("Category already exists".into()),
            other => other.into(),
        })?;
        tracing::info!(category_id = %saved.id, slug = %saved.slug, "Category created");

        Ok(saved)
    }
}
