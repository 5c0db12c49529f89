//! Category handlers.

use actix_web::{HttpResponse, web};

use quill_core::domain::Category;
use quill_core::services::NewCategory;
use quill_shared::dto::{CategoryResponse, CreateCategoryRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn category_response(category: Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        name: category.name,
        description: category.description,
        slug: category.slug,
        created_at: category.created_at,
        updated_at: category.updated_at,
    }
}

/// GET /api/categories
pub async fn list_categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories: Vec<CategoryResponse> = state
        .categories
        .list()
        .await?
        .into_iter()
        .map(category_response)
        .collect();

    Ok(HttpResponse::Ok().json(categories))
}

/// POST /api/categories - admin only
pub async fn create_category(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let category = state
        .categories
        .create(
            &identity.actor(),
            NewCategory {
                name: req.name,
                description: req.description,
                slug: req.slug,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(category_response(category)))
}
