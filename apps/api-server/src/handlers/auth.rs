//! Authentication handlers.

use actix_web::{HttpResponse, web};

use quill_core::domain::User;
use quill_core::services::{IssuedToken, NewAccount};
use quill_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        role: user.role.to_string(),
    }
}

fn auth_response(issued: IssuedToken) -> AuthResponse {
    AuthResponse {
        access_token: issued.access_token,
        token_type: "Bearer".to_string(),
        expires_in: issued.expires_in,
        user: user_response(&issued.user),
    }
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let issued = state
        .auth
        .register(NewAccount {
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;
    tracing::info!(user_id = %issued.user.id, "User registered");

    Ok(HttpResponse::Created().json(auth_response(issued)))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let issued = state.auth.login(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok().json(auth_response(issued)))
}

/// GET /api/auth/me - Protected route
pub async fn me(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(UserResponse {
        id: identity.user_id,
        username: identity.username,
        role: identity.role.to_string(),
    }))
}
