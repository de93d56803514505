//! Domain to wire conversions. Password digests never cross this boundary.

use quill_core::domain::{
    Category, CategoryWithCount, CommentView, PageRequest, PostView, User,
};
use quill_shared::dto::{
    CategoryResponse, CategoryWithCountResponse, CommentResponse, Pagination, PostResponse,
    UserResponse,
};

pub fn user(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email,
        name: user.name,
        created_at: user.created_at,
    }
}

pub fn category(category: Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        name: category.name,
        slug: category.slug,
        created_at: category.created_at,
    }
}

pub fn category_with_count(entry: CategoryWithCount) -> CategoryWithCountResponse {
    CategoryWithCountResponse {
        category: category(entry.category),
        post_count: entry.post_count,
    }
}

pub fn comment(view: CommentView) -> CommentResponse {
    let CommentView { comment, author } = view;
    CommentResponse {
        id: comment.id,
        content: comment.content,
        created_at: comment.created_at,
        updated_at: comment.updated_at,
        author_id: comment.author_id,
        post_id: comment.post_id,
        author: author.map(user),
    }
}

pub fn post(view: PostView) -> PostResponse {
    let PostView {
        post,
        author,
        category: post_category,
        comments,
    } = view;

    PostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        published: post.published,
        created_at: post.created_at,
        updated_at: post.updated_at,
        author_id: post.author_id,
        category_id: post.category_id,
        author: author.map(user),
        category: post_category.map(category),
        comments: comments.map(|list| list.into_iter().map(comment).collect()),
    }
}

pub fn pagination(page: PageRequest, total: u64) -> Pagination {
    Pagination {
        page: page.page,
        limit: page.limit,
        total,
        total_pages: page.total_pages(total),
    }
}
