//! Domain entities - the core business objects.

mod category;
mod comment;
mod page;
mod post;
mod user;

pub use category::{Category, CategoryWithCount};
pub use comment::{Comment, CommentView};
pub use page::{Page, PageRequest};
pub use post::{Post, PostChanges, PostFilter, PostRelations, PostView};
pub use user::User;
