//! Post handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::PageRequest;
use quill_core::validation::{ValidationError, validate_new_post, validate_post_changes};
use quill_shared::dto::{ListPostsQuery, MessageResponse, PostEnvelope, PostListResponse, PostRequest};

use super::mapping;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts?page&limit&categoryId
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let page = PageRequest::new(query.page, query.limit);

    let result = state.posts.list(query.category_id, page).await?;

    Ok(HttpResponse::Ok().json(PostListResponse {
        posts: result.items.into_iter().map(mapping::post).collect(),
        pagination: mapping::pagination(page, result.total),
    }))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let input = validate_new_post(
        req.title.as_deref(),
        req.content.as_deref(),
        req.category_id.as_deref(),
        req.published,
    )?;

    let view = state.posts.create(identity.claims(), input).await?;

    Ok(HttpResponse::Created().json(PostEnvelope {
        post: mapping::post(view),
    }))
}

/// GET /api/posts/{id}
pub async fn detail(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let view = state.posts.detail(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(PostEnvelope {
        post: mapping::post(view),
    }))
}

/// PUT /api/posts/{id}
///
/// The body is kept raw and only decoded once the caller is known to own the
/// post, so non-authors get 403 whatever they sent.
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let changes = || {
        let req: PostRequest = serde_json::from_slice(&body)
            .map_err(|e| ValidationError(format!("Invalid request body: {e}")))?;
        validate_post_changes(
            req.title.as_deref(),
            req.content.as_deref(),
            req.category_id.as_deref(),
            req.published,
        )
    };

    let view = state
        .posts
        .update(identity.claims(), path.into_inner(), changes)
        .await?;

    Ok(HttpResponse::Ok().json(PostEnvelope {
        post: mapping::post(view),
    }))
}

/// DELETE /api/posts/{id} - soft delete.
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .soft_delete(identity.claims(), path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted")))
}
