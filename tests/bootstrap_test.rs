use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use tempfile::TempDir;

use supplynet::config::{AdminCredentials, AppConfig};
use supplynet::database::entities::users;
use supplynet::database::{establish_connection, get_database_url, setup_database};
use supplynet::services::{BootstrapOutcome, BootstrapService};

async fn setup_db() -> (TempDir, DatabaseConnection) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("bootstrap.db");
    let db = establish_connection(&get_database_url(path.to_str()))
        .await
        .expect("connect");
    setup_database(&db).await.expect("migrations");
    (dir, db)
}

fn credentials() -> AdminCredentials {
    AdminCredentials {
        email: "admin@example.com".to_string(),
        username: "admin".to_string(),
        password: "correct horse".to_string(),
    }
}

#[tokio::test]
async fn test_superuser_created_once() {
    let (_dir, db) = setup_db().await;
    let service = BootstrapService::new(db.clone());
    let creds = credentials();

    let first = service.ensure_superuser(Some(&creds)).await.unwrap();
    assert_eq!(
        first,
        BootstrapOutcome::Created {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
        }
    );

    let second = service.ensure_superuser(Some(&creds)).await.unwrap();
    assert_eq!(second, BootstrapOutcome::AlreadyPresent);

    let superusers = users::Entity::find()
        .filter(users::Column::IsSuperuser.eq(true))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(superusers.len(), 1);
    assert_ne!(superusers[0].password_hash, "correct horse");
    assert!(bcrypt::verify("correct horse", &superusers[0].password_hash).unwrap());
}

#[tokio::test]
async fn test_incomplete_credentials_skip_bootstrap() {
    let (_dir, db) = setup_db().await;
    let service = BootstrapService::new(db.clone());

    let outcome = service.ensure_superuser(None).await.unwrap();
    assert_eq!(outcome, BootstrapOutcome::MissingCredentials);

    // Only an email arrives from the environment
    let mut config = AppConfig::default();
    config.apply_env(|key| (key == "ADMIN_EMAIL").then(|| "admin@example.com".to_string()));
    let outcome = service.ensure_superuser(config.admin.as_ref()).await.unwrap();
    assert_eq!(outcome, BootstrapOutcome::MissingCredentials);

    assert_eq!(users::Entity::find().count(&db).await.unwrap(), 0);
}
