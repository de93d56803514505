#[cfg(feature = "postgres")]
use std::time::Duration;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, Database, DbConn, DbErr};
#[cfg(feature = "postgres")]
use tokio::sync::OnceCell;

#[cfg(feature = "postgres")]
use quill_core::error::RepoError;

/// Configuration for the relational store.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Create missing tables from the entities on first connect.
    pub sync_schema: bool,
}

/// Process-wide database handle, connected on first use.
///
/// The pool is created exactly once: concurrent first callers all await the
/// same initialisation. A failed attempt leaves the cell empty so the next
/// request retries.
///
/// # Example
/// ```ignore
/// let db = Arc::new(LazyDatabase::new(config));
/// let users = PostgresUserRepository::new(db.clone());
/// let posts = PostgresPostRepository::new(db);
/// ```
#[cfg(feature = "postgres")]
pub struct LazyDatabase {
    config: Option<DatabaseConfig>,
    conn: OnceCell<DbConn>,
}

#[cfg(feature = "postgres")]
impl LazyDatabase {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config: Some(config),
            conn: OnceCell::new(),
        }
    }

    /// Wrap an already-open connection (used with SeaORM's mock database).
    pub fn from_connection(conn: DbConn) -> Self {
        Self {
            config: None,
            conn: OnceCell::new_with(Some(conn)),
        }
    }

    /// The shared connection pool, connecting if this is the first call.
    pub async fn connection(&self) -> Result<&DbConn, RepoError> {
        self.conn
            .get_or_try_init(|| self.connect())
            .await
            .map_err(|e| {
                tracing::error!("Database connection failed: {}", e);
                RepoError::Connection(e.to_string())
            })
    }

    /// Take the connection back out, e.g. to read a mock's transaction log.
    #[cfg(test)]
    pub(crate) fn into_connection(self) -> Option<DbConn> {
        self.conn.into_inner()
    }

    async fn connect(&self) -> Result<DbConn, DbErr> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| DbErr::Custom("database is not configured".to_string()))?;

        tracing::info!("Initializing database connection...");

        let opts = ConnectOptions::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(true)
            .to_owned();

        let conn = Database::connect(opts).await?;
        tracing::info!("Database connected (pool: {})", config.max_connections);

        if config.sync_schema {
            super::schema::sync(&conn).await?;
        }

        Ok(conn)
    }
}
