//! Declarative relation loading for posts.
//!
//! Given a batch of post rows and the relations the caller asked for, issue at
//! most one follow-up query per relation kind (`WHERE id IN (...)`) and stitch
//! the results together. Nothing is loaded lazily.

use std::collections::{HashMap, HashSet};

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use quill_core::domain::{Category, CommentView, PostRelations, PostView, User};

use super::entity::{category, comment, post, user};

pub(crate) async fn hydrate<C>(
    db: &C,
    posts: Vec<post::Model>,
    relations: PostRelations,
) -> Result<Vec<PostView>, DbErr>
where
    C: ConnectionTrait,
{
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let mut comments = if relations.comments {
        load_comments(db, posts.iter().map(|p| p.id)).await?
    } else {
        HashMap::new()
    };

    // Post authors and comment authors share one lookup.
    let mut user_ids = HashSet::new();
    if relations.author {
        user_ids.extend(posts.iter().map(|p| p.author_id));
    }
    user_ids.extend(comments.values().flatten().map(|c| c.author_id));
    let users = load_users(db, user_ids).await?;

    let categories = if relations.category {
        load_categories(db, posts.iter().filter_map(|p| p.category_id).collect()).await?
    } else {
        HashMap::new()
    };

    Ok(posts
        .into_iter()
        .map(|model| {
            let author = relations
                .author
                .then(|| users.get(&model.author_id).cloned())
                .flatten();
            let category = model
                .category_id
                .and_then(|id| categories.get(&id).cloned());
            let post_comments = relations.comments.then(|| {
                comments
                    .remove(&model.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|c| CommentView {
                        author: users.get(&c.author_id).cloned(),
                        comment: c.into(),
                    })
                    .collect()
            });

            PostView {
                post: model.into(),
                author,
                category,
                comments: post_comments,
            }
        })
        .collect())
}

/// Comments grouped by post, newest first within each group.
async fn load_comments<C, I>(db: &C, post_ids: I) -> Result<HashMap<Uuid, Vec<comment::Model>>, DbErr>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = Uuid>,
{
    let rows = comment::Entity::find()
        .filter(comment::Column::PostId.is_in(post_ids))
        .order_by_desc(comment::Column::CreatedAt)
        .order_by_desc(comment::Column::Id)
        .all(db)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<comment::Model>> = HashMap::new();
    for row in rows {
        grouped.entry(row.post_id).or_default().push(row);
    }
    Ok(grouped)
}

async fn load_users<C>(db: &C, ids: HashSet<Uuid>) -> Result<HashMap<Uuid, User>, DbErr>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|u| (u.id, u.into())).collect())
}

async fn load_categories<C>(db: &C, ids: HashSet<Uuid>) -> Result<HashMap<Uuid, Category>, DbErr>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = category::Entity::find()
        .filter(category::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|c| (c.id, c.into())).collect())
}
