//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

use quill_core::domain::{
    CategoryWithCount, Page, PageRequest, Post, PostChanges, PostFilter, PostRelations, PostView,
    User,
};
use quill_core::error::RepoError;
use quill_core::ports::{CategoryRepository, CommentRepository, PostRepository, UserRepository};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::Entity as CommentEntity;
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::loader;
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// Mask an email for logging to avoid PII in logs.
pub(crate) fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) if local.chars().count() > 1 => format!("{first}***@{domain}"),
            _ => format!("***@{domain}"),
        },
        None => "***".to_string(),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.conn().await?)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn list_with_post_counts(&self) -> Result<Vec<CategoryWithCount>, RepoError> {
        let db = self.conn().await?;

        let categories = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(db)
            .await
            .map_err(map_db_err)?;

        let counts: HashMap<Uuid, i64> = PostEntity::find()
            .select_only()
            .column(post::Column::CategoryId)
            .column_as(Expr::col(post::Column::Id).count(), "post_count")
            .filter(post::Column::DeletedAt.is_null())
            .filter(post::Column::CategoryId.is_not_null())
            .group_by(post::Column::CategoryId)
            .into_tuple::<(Uuid, i64)>()
            .all(db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .collect();

        Ok(categories
            .into_iter()
            .map(|model| CategoryWithCount {
                post_count: counts.get(&model.id).copied().unwrap_or(0).max(0) as u64,
                category: model.into(),
            })
            .collect())
    }
}

fn filtered(filter: &PostFilter) -> Select<PostEntity> {
    let mut query = PostEntity::find();
    if let Some(published) = filter.published {
        query = query.filter(post::Column::Published.eq(published));
    }
    if !filter.include_deleted {
        query = query.filter(post::Column::DeletedAt.is_null());
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(post::Column::CategoryId.eq(category_id));
    }
    // Id breaks timestamp ties so pages never overlap.
    query
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id)
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_with_relations(
        &self,
        id: Uuid,
        relations: PostRelations,
    ) -> Result<Option<PostView>, RepoError> {
        let db = self.conn().await?;

        let Some(model) = PostEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        let views = loader::hydrate(db, vec![model], relations)
            .await
            .map_err(map_db_err)?;
        Ok(views.into_iter().next())
    }

    async fn find_page(
        &self,
        filter: &PostFilter,
        page: PageRequest,
        relations: PostRelations,
    ) -> Result<Page<PostView>, RepoError> {
        let db = self.conn().await?;

        let paginator = filtered(filter).paginate(db, page.limit);
        let total = paginator.num_items().await.map_err(map_db_err)?;
        let models = paginator
            .fetch_page(page.page.saturating_sub(1))
            .await
            .map_err(map_db_err)?;

        let items = loader::hydrate(db, models, relations)
            .await
            .map_err(map_db_err)?;

        Ok(Page { items, total })
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError> {
        let db = self.conn().await?;

        let existing = PostEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(map_db_err)?
            .filter(|model| model.deleted_at.is_none())
            .ok_or(RepoError::NotFound)?;

        let mut active = existing.into_active_model();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(content) = changes.content {
            active.content = Set(content);
        }
        if let Some(category_id) = changes.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(published) = changes.published {
            active.published = Set(published);
        }
        active.updated_at = Set(Utc::now().into());

        let model = active.update(db).await.map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        let deleted_at: sea_orm::prelude::DateTimeWithTimeZone = at.into();

        let result = PostEntity::update_many()
            .col_expr(post::Column::DeletedAt, Expr::value(deleted_at))
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::DeletedAt.is_null())
            .exec(self.conn().await?)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {}
