//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    CategoryRepository, CommentRepository, PasswordService, PostRepository, TokenService,
    UserRepository,
};
use quill_core::services::{AuthService, CategoryService, CommentService, PostService};
use quill_infra::{Argon2PasswordService, InMemoryRepository, JwtTokenService};

use crate::config::AppConfig;
use crate::session::SessionCookie;

/// The repository set backing the services.
struct Repositories {
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    backend: &'static str,
}

impl Repositories {
    fn in_memory() -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        Self {
            users: repo.clone(),
            categories: repo.clone(),
            posts: repo.clone(),
            comments: repo,
            backend: "memory",
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(config: &quill_infra::DatabaseConfig) -> Self {
        use quill_infra::LazyDatabase;
        use quill_infra::database::{
            PostgresCategoryRepository, PostgresCommentRepository, PostgresPostRepository,
            PostgresUserRepository,
        };

        let db = Arc::new(LazyDatabase::new(config.clone()));
        Self {
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db)),
            backend: "postgres",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub posts: PostService,
    pub categories: CategoryService,
    pub comments: CommentService,
    pub tokens: Arc<dyn TokenService>,
    pub session: SessionCookie,
    pub storage: &'static str,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// The database is not touched here; the first request that needs it
    /// opens the pool.
    pub fn new(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));

        #[cfg(feature = "postgres")]
        let repos = match &config.database {
            Some(db_config) => Repositories::postgres(db_config),
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Repositories::in_memory()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let repos = {
            tracing::info!("Running without postgres feature - using in-memory repository");
            Repositories::in_memory()
        };

        let session = SessionCookie::new(
            config.environment.is_production(),
            tokens.expiration_seconds(),
        );

        let state = Self::assemble(repos, tokens, session);
        tracing::info!(storage = state.storage, "Application state initialized");
        state
    }

    /// In-memory state with the given token service.
    #[cfg(test)]
    pub fn in_memory(tokens: Arc<dyn TokenService>, session: SessionCookie) -> Self {
        Self::assemble(Repositories::in_memory(), tokens, session)
    }

    fn assemble(repos: Repositories, tokens: Arc<dyn TokenService>, session: SessionCookie) -> Self {
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        Self {
            auth: AuthService::new(repos.users.clone(), passwords, tokens.clone()),
            posts: PostService::new(repos.posts.clone(), repos.categories.clone()),
            categories: CategoryService::new(repos.categories),
            comments: CommentService::new(repos.comments, repos.posts, repos.users),
            tokens,
            session,
            storage: repos.backend,
        }
    }
}
