use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Category, CategoryWithCount, Comment, Page, PageRequest, Post, PostChanges, PostFilter,
    PostRelations, PostView, User,
};
use crate::error::RepoError;

/// Generic repository trait shared by every entity.
///
/// There is no physical delete: users and categories are never removed and
/// posts are soft-deleted through [`PostRepository::soft_delete`].
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity. Unique violations surface as `RepoError::Constraint`.
    async fn create(&self, entity: T) -> Result<T, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// All categories ordered by name, each with its non-deleted post count.
    async fn list_with_post_counts(&self) -> Result<Vec<CategoryWithCount>, RepoError>;
}

/// Post repository.
///
/// `find_by_id` returns soft-deleted rows too; callers check
/// [`Post::is_live`] themselves.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Load one post with the requested relations, deleted or not.
    async fn find_with_relations(
        &self,
        id: Uuid,
        relations: PostRelations,
    ) -> Result<Option<PostView>, RepoError>;

    /// Filtered page ordered newest first, with the total match count.
    async fn find_page(
        &self,
        filter: &PostFilter,
        page: PageRequest,
        relations: PostRelations,
    ) -> Result<Page<PostView>, RepoError>;

    /// Write the supplied fields and refresh `updated_at`.
    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError>;

    /// Set `deleted_at` on a live post. `RepoError::NotFound` if the post is
    /// missing or already deleted.
    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError>;
}

/// Comment repository. Comments are read through the post relation loader.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {}
