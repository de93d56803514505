use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, CommentView, User};

/// Post entity - a blog post owned by its author.
///
/// A post with `deleted_at` set is soft-deleted: the row stays for the sake of
/// its comments but is hidden from every read path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
}

impl Post {
    /// Create a new post.
    pub fn new(
        author_id: Uuid,
        title: String,
        content: String,
        category_id: Option<Uuid>,
        published: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            content,
            published,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            author_id,
            category_id,
        }
    }

    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }

    /// Apply a partial update in place. `author_id` is never touched.
    pub fn apply(&mut self, changes: PostChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(content) = changes.content {
            self.content = content;
        }
        if let Some(category_id) = changes.category_id {
            self.category_id = Some(category_id);
        }
        if let Some(published) = changes.published {
            self.published = published;
        }
        self.updated_at = Utc::now();
    }
}

/// Validated partial update of a post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<Uuid>,
    pub published: Option<bool>,
}

/// Which relations to hydrate alongside a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostRelations {
    pub author: bool,
    pub category: bool,
    /// Comments, newest first, each with its author.
    pub comments: bool,
}

impl PostRelations {
    /// Author and category, as shown in listings.
    pub const SUMMARY: Self = Self {
        author: true,
        category: true,
        comments: false,
    };

    pub const DETAIL: Self = Self {
        author: true,
        category: true,
        comments: true,
    };
}

/// Filter for post listings.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub published: Option<bool>,
    pub include_deleted: bool,
    pub category_id: Option<Uuid>,
}

impl PostFilter {
    /// Published, non-deleted posts.
    pub fn public() -> Self {
        Self {
            published: Some(true),
            include_deleted: false,
            category_id: None,
        }
    }

    pub fn in_category(mut self, category_id: Option<Uuid>) -> Self {
        self.category_id = category_id;
        self
    }

    pub fn matches(&self, post: &Post) -> bool {
        self.published.is_none_or(|p| post.published == p)
            && (self.include_deleted || post.is_live())
            && self
                .category_id
                .is_none_or(|c| post.category_id == Some(c))
    }
}

/// A post with the relations that were requested for it.
#[derive(Debug, Clone)]
pub struct PostView {
    pub post: Post,
    pub author: Option<User>,
    pub category: Option<Category>,
    pub comments: Option<Vec<CommentView>>,
}
