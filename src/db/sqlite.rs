use crate::error::TabulaError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub type SqlitePool = Pool<Sqlite>;

/// Owner of the process-wide SQLite pool.
///
/// Built once before serving and handed to every component by clone; the pool
/// itself is reference counted.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database behind `database_url`.
    ///
    /// In-memory databases exist per connection, so they get a single
    /// connection that is never recycled.
    pub async fn connect(database_url: &str) -> Result<Self, TabulaError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool_opts = if is_in_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = pool_opts.connect_with(connect_opts).await?;

        info!(database_url = %database_url, "database connected");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}
