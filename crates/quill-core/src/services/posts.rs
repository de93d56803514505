use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Page, PageRequest, Post, PostChanges, PostFilter, PostRelations, PostView};
use crate::error::{DomainError, RepoError};
use crate::ports::{CategoryRepository, PostRepository, TokenClaims};
use crate::validation::{NewPost, Validated};

/// Post lifecycle: listing, detail, create, update and soft delete.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, categories: Arc<dyn CategoryRepository>) -> Self {
        Self { posts, categories }
    }

    /// Published, live posts, newest first, with author and category.
    pub async fn list(
        &self,
        category_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Page<PostView>, DomainError> {
        let filter = PostFilter::public().in_category(category_id);
        Ok(self
            .posts
            .find_page(&filter, page, PostRelations::SUMMARY)
            .await?)
    }

    /// A live post with author, category and comments (newest first).
    pub async fn detail(&self, id: Uuid) -> Result<PostView, DomainError> {
        self.posts
            .find_with_relations(id, PostRelations::DETAIL)
            .await?
            .filter(|view| view.post.is_live())
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    pub async fn create(&self, actor: &TokenClaims, input: NewPost) -> Result<PostView, DomainError> {
        self.ensure_category(input.category_id).await?;

        let post = Post::new(
            actor.user_id,
            input.title,
            input.content,
            input.category_id,
            input.published,
        );
        let post = self.posts.create(post).await?;
        tracing::info!(post_id = %post.id, author_id = %actor.user_id, "Post created");

        self.reload(post.id).await
    }

    /// Existence and authorship are settled before `changes` is evaluated, so
    /// a caller who cannot touch the post never learns how its payload fared.
    pub async fn update<F>(
        &self,
        actor: &TokenClaims,
        id: Uuid,
        changes: F,
    ) -> Result<PostView, DomainError>
    where
        F: FnOnce() -> Validated<PostChanges>,
    {
        self.owned_live_post(actor, id).await?;

        let changes = changes()?;
        self.ensure_category(changes.category_id).await?;

        self.posts
            .update(id, changes)
            .await
            .map_err(|e| not_found_or(e, id))?;

        self.reload(id).await
    }

    pub async fn soft_delete(&self, actor: &TokenClaims, id: Uuid) -> Result<(), DomainError> {
        self.owned_live_post(actor, id).await?;

        self.posts
            .soft_delete(id, Utc::now())
            .await
            .map_err(|e| not_found_or(e, id))?;

        tracing::info!(post_id = %id, author_id = %actor.user_id, "Post soft-deleted");
        Ok(())
    }

    async fn owned_live_post(&self, actor: &TokenClaims, id: Uuid) -> Result<Post, DomainError> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .filter(Post::is_live)
            .ok_or_else(|| DomainError::post_not_found(id))?;

        if !post.is_authored_by(actor.user_id) {
            tracing::warn!(post_id = %id, user_id = %actor.user_id, "Rejected mutation by non-author");
            return Err(DomainError::Forbidden(
                "Only the author may modify this post".to_string(),
            ));
        }

        Ok(post)
    }

    async fn ensure_category(&self, category_id: Option<Uuid>) -> Result<(), DomainError> {
        let Some(category_id) = category_id else {
            return Ok(());
        };
        match self.categories.find_by_id(category_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::Validation("Unknown category".to_string())),
        }
    }

    async fn reload(&self, id: Uuid) -> Result<PostView, DomainError> {
        self.posts
            .find_with_relations(id, PostRelations::SUMMARY)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))
    }
}

/// A post that vanished between the ownership check and the write.
fn not_found_or(err: RepoError, id: Uuid) -> DomainError {
    match err {
        RepoError::NotFound => DomainError::post_not_found(id),
        other => other.into(),
    }
}
