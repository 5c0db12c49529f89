//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod health;
mod posts;


use actix_web::{HttpRequest, HttpResponse, error, web};

use quill_shared::ErrorResponse;

use crate::middleware::error::AppError;
use crate::observability::RequestId;
use crate::state::AppState;

/// Register shared state, extractor settings and every route.
pub fn configure_app(state: AppState) -> impl Fn(&mut web::ServiceConfig) + Clone {
    move |cfg| {
        cfg.app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(state.tokens.clone()))
            .app_data(json_config())
            .app_data(query_config());
        configure_routes(cfg);
    }
}

/// Malformed or unexpected request bodies become 400 problem responses.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1024 * 1024)
        .error_handler(|err, _req| {
            let detail = match &err {
                error::JsonPayloadError::ContentType => {
                    "Content-Type must be application/json".to_string()
                }
                other => other.to_string(),
            };
            AppError::BadRequest(detail).into()
        })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_posts))
                    .route("", web::post().to(posts::create_post))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post))
                    .route("/{id}/comments", web::post().to(posts::add_comment)),
            )
            .service(
                web::scope("/categories")
                    .route("", web::get().to(categories::list_categories))
                    .route("", web::post().to(categories::create_category)),
            ),
    );
}

/// Fallback for every unmatched route.
pub async fn route_not_found(req: HttpRequest, request_id: RequestId) -> HttpResponse {
    tracing::debug!(path = %req.path(), "No route matched");
    HttpResponse::NotFound().json(
        ErrorResponse::not_found("API route not found").with_request_id(request_id.as_str()),
    )
}
