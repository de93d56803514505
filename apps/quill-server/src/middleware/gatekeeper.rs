//! Gatekeeper middleware: classifies each request as public or protected and
//! sends anonymous visitors of protected pages to the login page.
//!
//! The gatekeeper only routes. It never injects the identity it verified;
//! handlers derive identity from the cookie again on their own.

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header,
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::sync::Arc;

use quill_core::ports::TokenService;

use crate::session::SESSION_COOKIE;

pub const LOGIN_PATH: &str = "/login";

const AUTH_PREFIXES: &[&str] = &["/auth", "/api/auth", "/login", "/register"];
const ASSET_PREFIXES: &[&str] = &["/_next", "/static", "/assets"];

/// How the gatekeeper treats a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
}

/// Classify a request path. First match wins.
///
/// Any path containing a dot counts as an asset, so `/posts/v1.2` is public.
pub fn classify(path: &str) -> Access {
    if path == "/" {
        return Access::Public;
    }
    if AUTH_PREFIXES.iter().any(|prefix| under(path, prefix)) {
        return Access::Public;
    }
    if ASSET_PREFIXES.iter().any(|prefix| under(path, prefix)) || path.contains('.') {
        return Access::Public;
    }
    Access::Protected
}

/// `path` is `prefix` itself or lies below it (`/login` but not `/loginx`).
fn under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Gatekeeper middleware factory.
pub struct Gatekeeper {
    tokens: Arc<dyn TokenService>,
    excluded: Vec<String>,
}

impl Gatekeeper {
    pub fn new(tokens: Arc<dyn TokenService>) -> Self {
        Self {
            tokens,
            excluded: Vec::new(),
        }
    }

    /// Leave every path under `prefix` alone.
    pub fn excluding(mut self, prefix: impl Into<String>) -> Self {
        self.excluded.push(prefix.into());
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for Gatekeeper
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = GatekeeperService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(GatekeeperService {
            service,
            tokens: self.tokens.clone(),
            excluded: self.excluded.clone(),
        }))
    }
}

pub struct GatekeeperService<S> {
    service: S,
    tokens: Arc<dyn TokenService>,
    excluded: Vec<String>,
}

impl<S> GatekeeperService<S> {
    fn admits(&self, req: &ServiceRequest) -> bool {
        let path = req.path();
        if self.excluded.iter().any(|prefix| under(path, prefix)) {
            return true;
        }
        if classify(path) == Access::Public {
            return true;
        }

        req.cookie(SESSION_COOKIE)
            .and_then(|cookie| self.tokens.validate_token(cookie.value()))
            .is_some()
    }
}

impl<S, B> Service<ServiceRequest> for GatekeeperService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if self.admits(&req) {
            let fut = self.service.call(req);
            return Box::pin(async move {
                let res = fut.await?;
                Ok(res.map_into_left_body())
            });
        }

        tracing::debug!(path = %req.path(), "Redirecting anonymous request to login");

        let response = HttpResponse::TemporaryRedirect()
            .insert_header((header::LOCATION, LOGIN_PATH))
            .finish();
        let (http_req, _payload) = req.into_parts();
        let srv_response = ServiceResponse::new(http_req, response);

        Box::pin(async move { Ok(srv_response.map_into_right_body()) })
    }
}
