//! Authentication extractors backed by the session cookie.

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use std::future::{Ready, ready};

use quill_core::ports::TokenClaims;

use crate::middleware::error::AppError;
use crate::session;
use crate::state::AppState;

/// Authenticated user identity extractor.
///
/// Use this in handlers to require a valid session:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.claims().user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity(pub TokenClaims);

impl Identity {
    pub fn claims(&self) -> &TokenClaims {
        &self.0
    }
}

fn resolve(req: &HttpRequest) -> Result<Option<TokenClaims>, AppError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        tracing::error!("AppState not found in app data");
        return Err(AppError::Internal("Server configuration error".to_string()));
    };
    Ok(session::current(req, state.tokens.as_ref()))
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(match resolve(req) {
            Ok(Some(claims)) => Ok(Identity(claims)),
            Ok(None) => Err(AppError::unauthenticated()),
            Err(e) => Err(e),
        })
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequest for OptionalIdentity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req).map(|claims| OptionalIdentity(claims.map(Identity))))
    }
}
