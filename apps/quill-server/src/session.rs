//! Session cookie adapter.
//!
//! The session lives entirely in a signed token stored in an HTTP-only
//! cookie; nothing is kept server-side.

use actix_web::HttpRequest;
use actix_web::HttpResponseBuilder;
use actix_web::cookie::{Cookie, SameSite, time::Duration};

use quill_core::ports::{TokenClaims, TokenService};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "blog-token";

/// Attributes applied to every session cookie this server writes.
#[derive(Debug, Clone, Copy)]
pub struct SessionCookie {
    secure: bool,
    max_age_seconds: i64,
}

impl SessionCookie {
    pub fn new(secure: bool, max_age_seconds: i64) -> Self {
        Self {
            secure,
            max_age_seconds,
        }
    }

    fn base(&self, value: String) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, value)
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .finish()
    }

    /// The cookie carrying `token`.
    pub fn issue(&self, token: String) -> Cookie<'static> {
        let mut cookie = self.base(token);
        cookie.set_max_age(Duration::seconds(self.max_age_seconds));
        cookie
    }

    /// An expired, empty cookie that makes the browser drop the session.
    pub fn removal(&self) -> Cookie<'static> {
        let mut cookie = self.base(String::new());
        cookie.make_removal();
        cookie
    }

    /// Set the session cookie on a response under construction.
    pub fn attach<'a>(
        &self,
        response: &'a mut HttpResponseBuilder,
        token: String,
    ) -> &'a mut HttpResponseBuilder {
        response.cookie(self.issue(token))
    }

    /// Remove the session cookie. Harmless when no cookie was sent.
    pub fn clear<'a>(&self, response: &'a mut HttpResponseBuilder) -> &'a mut HttpResponseBuilder {
        response.cookie(self.removal())
    }
}

/// Identity of the current request, if it carries a valid session cookie.
pub fn current(req: &HttpRequest, tokens: &dyn TokenService) -> Option<TokenClaims> {
    let cookie = req.cookie(SESSION_COOKIE)?;
    tokens.validate_token(cookie.value())
}
