
use sea_orm::DatabaseConnection;

/// Fresh, migrated in-memory database per test
pub(crate) async fn memory_db() -> anyhow::Result<DatabaseConnection> {
    let db = crate::db::connect("sqlite::memory:").await?;
    crate::db::migrate(&db).await?;
    Ok(db)
}
