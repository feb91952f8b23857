#![cfg(test)]
use sea_orm::DatabaseConnection;

/// In-memory SQLite, migrated and seeded with the demo catalog.
///
/// Each call yields an independent database, so tests never share rows.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = models::db::connect("sqlite::memory:").await?;
    models::db::migrate(&db).await?;
    models::seed::seed_if_empty(&db).await?;
    Ok(db)
}

/// Migrated but empty in-memory database
pub async fn empty_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = models::db::connect("sqlite::memory:").await?;
    models::db::migrate(&db).await?;
    Ok(db)
}
