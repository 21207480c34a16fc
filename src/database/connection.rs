use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbErr,
    Statement, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;

use super::migrations::Migrator;

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);

    // Every connection to `sqlite::memory:` opens its own empty database
    let max_connections = if is_in_memory(database_url) { 1 } else { 10 };

    // SQLite serialises writers, so a small pool is enough
    opt.max_connections(max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug);

    Database::connect(opt).await
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

pub fn get_database_url(database_path: Option<&str>) -> String {
    match database_path {
        Some(":memory:") => "sqlite::memory:".to_string(),
        Some(path) if path.starts_with("sqlite:") => path.to_string(),
        Some(path) => format!("sqlite://{}?mode=rwc", path),
        None => "sqlite://supplynet.db?mode=rwc".to_string(),
    }
}

/// Bring the schema up to date
pub async fn setup_database(db: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(db, None).await
}

/// Open a transaction that already holds SQLite's write lock.
///
/// A plain `BEGIN` is deferred: two writers can both read, and the second to
/// upgrade fails with `SQLITE_BUSY` instead of waiting. Issuing a write as the
/// first statement makes a concurrent writer wait on the busy timeout before
/// it reads anything, so its validation sees the committed result.
pub async fn begin_write(db: &DatabaseConnection) -> Result<DatabaseTransaction, DbErr> {
    let txn = db.begin().await?;
    txn.execute(Statement::from_string(
        txn.get_database_backend(),
        "UPDATE network_nodes SET id = id WHERE id = -1".to_string(),
    ))
    .await?;
    Ok(txn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_urls() {
        assert_eq!(get_database_url(Some(":memory:")), "sqlite::memory:");
        assert_eq!(
            get_database_url(Some("network.db")),
            "sqlite://network.db?mode=rwc"
        );
        assert_eq!(
            get_database_url(Some("sqlite://other.db")),
            "sqlite://other.db"
        );
        assert_eq!(get_database_url(None), "sqlite://supplynet.db?mode=rwc");
    }

    #[tokio::test]
    async fn test_in_memory_database_is_shared_across_queries() {
        let db = establish_connection(&get_database_url(Some(":memory:")))
            .await
            .unwrap();
        setup_database(&db).await.unwrap();

        // Each statement may check out a pooled connection; all must see the schema
        for _ in 0..3 {
            db.execute(Statement::from_string(
                db.get_database_backend(),
                "SELECT COUNT(*) FROM network_nodes".to_string(),
            ))
            .await
            .unwrap();
        }
        assert!(is_in_memory("sqlite::memory:"));
        assert!(!is_in_memory("sqlite://network.db?mode=rwc"));
    }
}
