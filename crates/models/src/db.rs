use std::time::Duration;

use configs::DatabaseConfig;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::info;

/// SQLite 内存库每个连接都是独立的数据库，连接池必须只保留一个长期连接
fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// 内存库连接不得被回收（未显式设置时 sqlx 默认 idle 10 分钟、lifetime 30 分钟）
const PINNED_CONNECTION_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

pub(crate) fn connect_options(cfg: &DatabaseConfig) -> ConnectOptions {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);

    if is_in_memory(&cfg.url) {
        opts.max_connections(1)
            .min_connections(1)
            .idle_timeout(PINNED_CONNECTION_TTL)
            .max_lifetime(PINNED_CONNECTION_TTL);
    } else {
        opts.max_connections(cfg.max_connections)
            .min_connections(cfg.min_connections)
            .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs));
    }
    opts
}

pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let db = Database::connect(connect_options(cfg)).await?;
    info!(backend = ?db.get_database_backend(), "database connected");
    Ok(db)
}

/// Connect to a URL with default pool settings.
pub async fn connect(url: &str) -> anyhow::Result<DatabaseConnection> {
    let cfg = DatabaseConfig { url: url.to_string(), ..DatabaseConfig::default() };
    connect_with_config(&cfg).await
}

/// Apply all pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
    migration::Migrator::up(db, None).await?;
    Ok(())
}

pub async fn test_connection(db: &DatabaseConnection) -> anyhow::Result<()> {
    db.ping().await?;
    Ok(())
}
