//! Post and comment handlers.

use actix_web::{HttpResponse, web};

use quill_core::domain::Comment;
use quill_core::services::{
    ListPostsParams, NewComment, NewPost, PopulatedPost, PostChanges, PostListing,
};
use quill_shared::MessageResponse;
use quill_shared::dto::{
    AuthorSummary, CategorySummary, CommentResponse, CreateCommentRequest, CreatePostRequest,
    ListPostsQuery, PaginationResponse, PostListResponse, PostResponse, UpdatePostRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn comment_response(comment: Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        author: comment.author,
        content: comment.content,
        created_at: comment.created_at,
    }
}

fn post_response(populated: PopulatedPost) -> PostResponse {
    let PopulatedPost {
        post,
        author,
        categories,
    } = populated;

    PostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        excerpt: post.excerpt,
        author: author.map(|a| AuthorSummary {
            id: a.id,
            username: a.username,
        }),
        categories: categories
            .into_iter()
            .map(|c| CategorySummary {
                id: c.id,
                name: c.name,
                slug: c.slug,
            })
            .collect(),
        tags: post.tags,
        comments: post.comments.into_iter().map(comment_response).collect(),
        is_published: post.is_published,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn listing_response(listing: PostListing) -> PostListResponse {
    PostListResponse {
        posts: listing.posts.into_iter().map(post_response).collect(),
        pagination: PaginationResponse {
            current: listing.pagination.current,
            pages: listing.pagination.pages,
            total: listing.pagination.total,
        },
    }
}

/// GET /api/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();

    let listing = state
        .posts
        .list(ListPostsParams {
            page: query.page,
            limit: query.limit,
            search: query.search,
            category: query.category,
        })
        .await?;

    Ok(HttpResponse::Ok().json(listing_response(listing)))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get(&path).await?;
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = state
        .posts
        .create(
            &identity.actor(),
            NewPost {
                title: req.title,
                content: req.content,
                excerpt: req.excerpt,
                categories: req.categories,
                tags: req.tags,
                is_published: req.is_published,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(post_response(post)))
}

/// PUT /api/posts/{id} - author or admin
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = state
        .posts
        .update(
            &identity.actor(),
            &path,
            PostChanges {
                title: req.title,
                content: req.content,
                excerpt: req.excerpt,
                categories: req.categories,
                tags: req.tags,
                is_published: req.is_published,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// DELETE /api/posts/{id} - author or admin
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.posts.delete(&identity.actor(), &path).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted successfully")))
}

/// POST /api/posts/{id}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let comment = state
        .posts
        .add_comment(
            &path,
            NewComment {
                author: req.author,
                content: req.content,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(comment_response(comment)))
}
