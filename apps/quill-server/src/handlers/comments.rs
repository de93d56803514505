use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::validation::validate_comment;
use quill_shared::dto::{CommentEnvelope, CreateCommentRequest};

use super::mapping;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts/{id}/comments
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let content = validate_comment(body.content.as_deref())?;

    let view = state
        .comments
        .add(identity.claims(), path.into_inner(), content)
        .await?;

    Ok(HttpResponse::Created().json(CommentEnvelope {
        comment: mapping::comment(view),
    }))
}
