//! In-memory repository - used when no database is configured and in tests.
//!
//! Enforces the same unique and foreign-key rules as the relational schema.
//! Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{
    Category, CategoryWithCount, Comment, CommentView, Page, PageRequest, Post, PostChanges,
    PostFilter, PostRelations, PostView, User,
};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, PostRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    fn view(&self, post: &Post, relations: PostRelations) -> PostView {
        let author = relations
            .author
            .then(|| self.users.get(&post.author_id).cloned())
            .flatten();
        let category = relations
            .category
            .then(|| post.category_id.and_then(|id| self.categories.get(&id).cloned()))
            .flatten();
        let comments = relations.comments.then(|| {
            let mut comments: Vec<&Comment> = self
                .comments
                .values()
                .filter(|c| c.post_id == post.id)
                .collect();
            comments.sort_by(|a, b| newest_first(a.created_at, a.id, b.created_at, b.id));
            comments
                .into_iter()
                .map(|c| CommentView {
                    comment: c.clone(),
                    author: self.users.get(&c.author_id).cloned(),
                })
                .collect()
        });

        PostView {
            post: post.clone(),
            author,
            category,
            comments,
        }
    }
}

fn newest_first(
    a_at: DateTime<Utc>,
    a_id: Uuid,
    b_at: DateTime<Utc>,
    b_id: Uuid,
) -> std::cmp::Ordering {
    b_at.cmp(&a_at).then_with(|| b_id.cmp(&a_id))
}

/// A single in-memory store implementing every repository port.
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn create(&self, category: Category) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .categories
            .values()
            .any(|c| c.name == category.name || c.slug == category.slug)
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryRepository {
    async fn list_with_post_counts(&self) -> Result<Vec<CategoryWithCount>, RepoError> {
        let tables = self.tables.read().await;

        let mut counts: HashMap<Uuid, u64> = HashMap::new();
        for post in tables.posts.values().filter(|p| p.is_live()) {
            if let Some(category_id) = post.category_id {
                *counts.entry(category_id).or_default() += 1;
            }
        }

        let mut categories: Vec<CategoryWithCount> = tables
            .categories
            .values()
            .map(|c| CategoryWithCount {
                category: c.clone(),
                post_count: counts.get(&c.id).copied().unwrap_or(0),
            })
            .collect();
        categories.sort_by(|a, b| a.category.name.cmp(&b.category.name));
        Ok(categories)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn create(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&post.author_id) {
            return Err(RepoError::Query("post author does not exist".to_string()));
        }
        if post
            .category_id
            .is_some_and(|id| !tables.categories.contains_key(&id))
        {
            return Err(RepoError::Query("post category does not exist".to_string()));
        }
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }
}

#[async_trait]
impl PostRepository for InMemoryRepository {
    async fn find_with_relations(
        &self,
        id: Uuid,
        relations: PostRelations,
    ) -> Result<Option<PostView>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).map(|p| tables.view(p, relations)))
    }

    async fn find_page(
        &self,
        filter: &PostFilter,
        page: PageRequest,
        relations: PostRelations,
    ) -> Result<Page<PostView>, RepoError> {
        let tables = self.tables.read().await;

        let mut matching: Vec<&Post> = tables.posts.values().filter(|p| filter.matches(p)).collect();
        matching.sort_by(|a, b| newest_first(a.created_at, a.id, b.created_at, b.id));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .map(|p| tables.view(p, relations))
            .collect();

        Ok(Page { items, total })
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if changes
            .category_id
            .is_some_and(|id| !tables.categories.contains_key(&id))
        {
            return Err(RepoError::Query("post category does not exist".to_string()));
        }

        let post = tables
            .posts
            .get_mut(&id)
            .filter(|p| p.is_live())
            .ok_or(RepoError::NotFound)?;
        post.apply(changes);
        Ok(post.clone())
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let post = tables
            .posts
            .get_mut(&id)
            .filter(|p| p.is_live())
            .ok_or(RepoError::NotFound)?;
        post.deleted_at = Some(at);
        Ok(())
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn create(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&comment.author_id)
            || !tables.posts.contains_key(&comment.post_id)
        {
            return Err(RepoError::Query(
                "comment author or post does not exist".to_string(),
            ));
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }
}

#[async_trait]
impl CommentRepository for InMemoryRepository {}
