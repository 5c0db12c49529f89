use std::time::Duration;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, ConnectionTrait, DbConn, DbErr};

/// Configuration for the primary database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
}

/// Process-wide database handle.
///
/// Created once at startup, shared by cloning (the pool is reference counted)
/// and closed explicitly on shutdown.
#[cfg(feature = "postgres")]
#[derive(Clone)]
pub struct Database {
    conn: DbConn,
}

#[cfg(feature = "postgres")]
impl Database {
    /// Open the connection pool and check that the server answers.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DbErr> {
        tracing::info!("Initializing database connection...");

        let opts = ConnectOptions::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(config.connect_timeout)
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(true)
            .to_owned();

        let conn = sea_orm::Database::connect(opts).await?;
        conn.ping().await?;
        tracing::info!(
            max_connections = config.max_connections,
            backend = ?conn.get_database_backend(),
            "Database connected"
        );

        Ok(Self { conn })
    }

    pub fn conn(&self) -> &DbConn {
        &self.conn
    }

    /// Whether the server still answers.
    pub async fn is_healthy(&self) -> bool {
        self.conn.ping().await.is_ok()
    }

    /// Close the pool. Other clones of this handle stop working too.
    pub async fn close(self) -> Result<(), DbErr> {
        tracing::info!("Closing database connection");
        self.conn.close().await
    }
}
