use std::sync::Arc;

use crate::domain::{Comment, CommentView};
use crate::error::DomainError;
use crate::ports::{CommentRepository, PostRepository, TokenClaims, UserRepository};

/// Comment creation. Comments have no update or delete path.
#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            comments,
            posts,
            users,
        }
    }

    pub async fn add(
        &self,
        actor: &TokenClaims,
        post_id: uuid::Uuid,
        content: String,
    ) -> Result<CommentView, DomainError> {
        match self.posts.find_by_id(post_id).await? {
            Some(post) if post.is_live() => {}
            _ => return Err(DomainError::post_not_found(post_id)),
        }

        let comment = self
            .comments
            .create(Comment::new(actor.user_id, post_id, content))
            .await?;
        let author = self.users.find_by_id(actor.user_id).await?;

        Ok(CommentView { comment, author })
    }
}
