//! Application services - the authenticated content lifecycle.
//!
//! Services receive the caller's verified [`TokenClaims`](crate::ports::TokenClaims)
//! explicitly; they never look at transport state.

mod auth;
mod categories;
mod comments;
mod posts;

pub use auth::{AuthService, Session};
pub use categories::CategoryService;
pub use comments::CommentService;
pub use posts::PostService;
