//! Content lifecycle over the in-memory repository with real Argon2 and JWT.

#![cfg(feature = "auth")]

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use quill_core::DomainError;
use quill_core::domain::{Category, PageRequest, PostChanges};
use quill_core::ports::{BaseRepository, TokenClaims, TokenService};
use quill_core::services::{AuthService, CategoryService, CommentService, PostService};
use quill_core::validation::{
    NewPost, validate_credentials, validate_post_changes, validate_registration,
};
use quill_infra::{Argon2PasswordService, InMemoryRepository, JwtConfig, JwtTokenService};

struct Harness {
    repo: Arc<InMemoryRepository>,
    tokens: Arc<JwtTokenService>,
    auth: AuthService,
    posts: PostService,
    categories: CategoryService,
    comments: CommentService,
}

fn harness() -> Harness {
    let repo = Arc::new(InMemoryRepository::new());
    let tokens = Arc::new(JwtTokenService::new(JwtConfig {
        secret: "lifecycle-secret".to_string(),
        ..JwtConfig::default()
    }));

    Harness {
        auth: AuthService::new(
            repo.clone(),
            Arc::new(Argon2PasswordService::new()),
            tokens.clone(),
        ),
        posts: PostService::new(repo.clone(), repo.clone()),
        categories: CategoryService::new(repo.clone()),
        comments: CommentService::new(repo.clone(), repo.clone(), repo.clone()),
        repo,
        tokens,
    }
}

impl Harness {
    async fn user(&self, email: &str) -> TokenClaims {
        let reg = validate_registration(Some(email), Some("secret1"), Some("User")).unwrap();
        let session = self.auth.register(reg).await.unwrap();
        self.tokens.validate_token(&session.token).unwrap()
    }

    async fn category(&self, name: &str) -> Category {
        BaseRepository::<Category, Uuid>::create(
            self.repo.as_ref(),
            Category::new(name.to_string(), name.to_lowercase()),
        )
        .await
        .unwrap()
    }

    async fn post(&self, actor: &TokenClaims, title: &str, published: bool) -> Uuid {
        self.posts
            .create(
                actor,
                NewPost {
                    title: title.to_string(),
                    content: "C".to_string(),
                    category_id: None,
                    published,
                },
            )
            .await
            .unwrap()
            .post
            .id
    }
}

fn no_changes() -> Result<PostChanges, quill_core::validation::ValidationError> {
    Ok(PostChanges::default())
}

#[tokio::test]
async fn register_then_login_yields_verifiable_session() {
    let h = harness();
    let reg = validate_registration(Some("a@x.com"), Some("secret1"), Some("A")).unwrap();
    let registered = h.auth.register(reg).await.unwrap();

    let creds = validate_credentials(Some("a@x.com"), Some("secret1")).unwrap();
    let session = h.auth.login(creds).await.unwrap();

    assert_eq!(session.user.id, registered.user.id);
    let claims = h.tokens.validate_token(&session.token).unwrap();
    assert_eq!(claims.user_id, registered.user.id);
    assert_eq!(claims.email, "a@x.com");
    assert_ne!(session.user.password_hash, "secret1");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let h = harness();
    h.user("a@x.com").await;

    let again = validate_registration(Some("a@x.com"), Some("secret2"), Some("B")).unwrap();
    assert!(matches!(
        h.auth.register(again).await,
        Err(DomainError::Duplicate(_))
    ));
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let h = harness();
    h.user("a@x.com").await;

    let wrong_password = h
        .auth
        .login(validate_credentials(Some("a@x.com"), Some("nope")).unwrap())
        .await
        .unwrap_err();
    let unknown_email = h
        .auth
        .login(validate_credentials(Some("b@x.com"), Some("secret1")).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, DomainError::InvalidCredentials));
    assert!(matches!(unknown_email, DomainError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn current_user_requires_identity() {
    let h = harness();
    let a = h.user("a@x.com").await;

    assert!(matches!(
        h.auth.current_user(None).await,
        Err(DomainError::Unauthorized)
    ));
    let me = h.auth.current_user(Some(&a)).await.unwrap();
    assert_eq!(me.email, "a@x.com");
}

#[tokio::test]
async fn only_the_author_may_mutate() {
    let h = harness();
    let a = h.user("a@x.com").await;
    let b = h.user("b@x.com").await;
    let id = h.post(&a, "T", true).await;

    assert!(matches!(
        h.posts.update(&b, id, no_changes).await,
        Err(DomainError::Forbidden(_))
    ));
    assert!(matches!(
        h.posts.soft_delete(&b, id).await,
        Err(DomainError::Forbidden(_))
    ));

    let updated = h
        .posts
        .update(&a, id, || validate_post_changes(Some("T2"), None, None, None))
        .await
        .unwrap();
    assert_eq!(updated.post.title, "T2");
    assert_eq!(updated.post.content, "C");
    assert_eq!(updated.author.unwrap().id, a.user_id);
}

#[tokio::test]
async fn payload_is_not_evaluated_for_non_authors() {
    let h = harness();
    let a = h.user("a@x.com").await;
    let b = h.user("b@x.com").await;
    let id = h.post(&a, "T", true).await;

    let result = h
        .posts
        .update(&b, id, || panic!("payload parsed before ownership check"))
        .await;
    assert!(matches!(result, Err(DomainError::Forbidden(_))));

    // The author gets the validation error.
    let result = h
        .posts
        .update(&a, id, || validate_post_changes(Some(""), None, None, None))
        .await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn soft_deleted_post_is_not_found_everywhere() {
    let h = harness();
    let a = h.user("a@x.com").await;
    let id = h.post(&a, "T", true).await;

    h.posts.soft_delete(&a, id).await.unwrap();

    assert!(matches!(
        h.posts.detail(id).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        h.posts.update(&a, id, no_changes).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        h.posts.soft_delete(&a, id).await,
        Err(DomainError::NotFound { .. })
    ));
    let listed = h.posts.list(None, PageRequest::default()).await.unwrap();
    assert!(listed.items.iter().all(|v| v.post.id != id));

    let missing = Uuid::new_v4();
    assert_eq!(
        h.posts.detail(missing).await.unwrap_err().to_string(),
        format!("Post with id {missing} not found")
    );
}

#[tokio::test]
async fn listing_hides_drafts_and_deleted_posts() {
    let h = harness();
    let a = h.user("a@x.com").await;
    let live = h.post(&a, "live", true).await;
    let draft = h.post(&a, "draft", false).await;
    let gone = h.post(&a, "gone", true).await;
    h.posts.soft_delete(&a, gone).await.unwrap();

    let page = h.posts.list(None, PageRequest::default()).await.unwrap();
    let ids: Vec<Uuid> = page.items.iter().map(|v| v.post.id).collect();

    assert_eq!(ids, vec![live]);
    assert_eq!(page.total, 1);
    assert!(!ids.contains(&draft));
    assert!(page.items[0].author.is_some());
}

#[tokio::test]
async fn pages_partition_the_full_ordering() {
    let h = harness();
    let a = h.user("a@x.com").await;
    for i in 0..7 {
        h.post(&a, &format!("post {i}"), true).await;
    }

    let everything = h.posts.list(None, PageRequest::new(Some(1), Some(100))).await.unwrap();
    assert_eq!(everything.total, 7);

    let limit = 3;
    let request = PageRequest::new(Some(1), Some(limit));
    let total_pages = request.total_pages(everything.total);
    assert_eq!(total_pages, 3);

    let mut collected = Vec::new();
    for page in 1..=total_pages {
        let chunk = h
            .posts
            .list(None, PageRequest::new(Some(page), Some(limit)))
            .await
            .unwrap();
        assert_eq!(chunk.total, 7);
        collected.extend(chunk.items.into_iter().map(|v| v.post.id));
    }

    let expected: Vec<Uuid> = everything.items.iter().map(|v| v.post.id).collect();
    assert_eq!(collected, expected);
    assert_eq!(collected.iter().collect::<HashSet<_>>().len(), 7);

    let created: Vec<_> = everything.items.iter().map(|v| v.post.created_at).collect();
    assert!(created.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn category_filter_and_counts() {
    let h = harness();
    let a = h.user("a@x.com").await;
    let rust = h.category("Rust").await;
    let go = h.category("Go").await;

    let in_rust = h
        .posts
        .create(
            &a,
            NewPost {
                title: "R".into(),
                content: "C".into(),
                category_id: Some(rust.id),
                published: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(in_rust.category.as_ref().unwrap().id, rust.id);
    h.post(&a, "uncategorised", true).await;

    let filtered = h
        .posts
        .list(Some(rust.id), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(filtered.total, 1);
    assert_eq!(filtered.items[0].post.id, in_rust.post.id);

    let categories = h.categories.list().await.unwrap();
    let names: Vec<_> = categories.iter().map(|c| c.category.name.as_str()).collect();
    assert_eq!(names, vec!["Go", "Rust"]);
    assert_eq!(categories[0].post_count, 0);
    assert_eq!(categories[1].post_count, 1);
    assert_eq!(categories[0].category.id, go.id);

    h.posts.soft_delete(&a, in_rust.post.id).await.unwrap();
    let categories = h.categories.list().await.unwrap();
    assert_eq!(categories[1].post_count, 0);
}

#[tokio::test]
async fn unknown_category_is_a_validation_error() {
    let h = harness();
    let a = h.user("a@x.com").await;

    let result = h
        .posts
        .create(
            &a,
            NewPost {
                title: "T".into(),
                content: "C".into(),
                category_id: Some(Uuid::new_v4()),
                published: true,
            },
        )
        .await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn comments_attach_to_live_posts_only() {
    let h = harness();
    let a = h.user("a@x.com").await;
    let b = h.user("b@x.com").await;
    let id = h.post(&a, "T", true).await;

    let first = h.comments.add(&b, id, "first".into()).await.unwrap();
    assert_eq!(first.author.unwrap().id, b.user_id);
    h.comments.add(&a, id, "second".into()).await.unwrap();

    let detail = h.posts.detail(id).await.unwrap();
    let comments = detail.comments.unwrap();
    assert_eq!(comments.len(), 2);
    assert!(comments[0].comment.created_at >= comments[1].comment.created_at);

    h.posts.soft_delete(&a, id).await.unwrap();
    assert!(matches!(
        h.comments.add(&b, id, "late".into()).await,
        Err(DomainError::NotFound { .. })
    ));
}
