//! Authentication handlers.

use actix_web::{HttpResponse, web};

use quill_core::validation::{validate_credentials, validate_registration};
use quill_shared::dto::{AuthResponse, LoginRequest, MessageResponse, RegisterUserRequest};

use super::mapping;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let input = validate_registration(
        req.email.as_deref(),
        req.password.as_deref(),
        req.name.as_deref(),
    )?;

    let session = state.auth.register(input).await?;

    Ok(state
        .session
        .attach(&mut HttpResponse::Created(), session.token)
        .json(AuthResponse {
            user: mapping::user(session.user),
        }))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let input = validate_credentials(req.email.as_deref(), req.password.as_deref())?;

    let session = state.auth.login(input).await?;

    Ok(state
        .session
        .attach(&mut HttpResponse::Ok(), session.token)
        .json(AuthResponse {
            user: mapping::user(session.user),
        }))
}

/// POST /api/auth/logout - always succeeds, with or without a session.
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    state
        .session
        .clear(&mut HttpResponse::Ok())
        .json(MessageResponse::new("Logged out"))
}

/// GET /api/auth/me
pub async fn me(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let claims = identity.0.as_ref().map(|id| id.claims());
    let user = state.auth.current_user(claims).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        user: mapping::user(user),
    }))
}
