mod common;

use assert_matches::assert_matches;
use common::TestDb;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
use sea_orm_migration::MigratorTrait;
use tenant_issue_tracker::{
    db::{self, DbConfig},
    migrator::Migrator,
    schema::{self, FEEDBACKS, ISSUES, USERS},
    ServiceError,
};

#[tokio::test]
async fn migrated_database_matches_table_definitions() {
    let db = TestDb::new().await;

    schema::verify(&db.pool).await.unwrap();
    assert_eq!(db.counts().await, vec![(USERS, 0), (ISSUES, 0), (FEEDBACKS, 0)]);
    db::check_connection(&db.pool).await.unwrap();
    assert_eq!(db::backend_name(&db.pool), "sqlite");
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = TestDb::new().await;

    db::run_migrations(&db.pool).await.unwrap();
    let status = Migrator::get_applied_migrations(db.pool.as_ref()).await.unwrap();
    assert_eq!(status.len(), Migrator::migrations().len());
}

#[tokio::test]
async fn unmigrated_database_fails_verification() {
    let pool = db::establish_connection_with_config(&DbConfig::in_memory())
        .await
        .unwrap();

    let err = schema::verify(&pool).await.unwrap_err();
    assert_matches!(err, ServiceError::SchemaMismatch(ref msg) if msg.contains(USERS));
}

#[tokio::test]
async fn missing_column_fails_verification() {
    let db = TestDb::new().await;

    db.pool
        .execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "ALTER TABLE feedbacks DROP COLUMN rating".to_string(),
        ))
        .await
        .unwrap();

    let err = schema::verify(&db.pool).await.unwrap_err();
    assert_matches!(err, ServiceError::SchemaMismatch(ref msg) if msg.contains("feedbacks.rating"));
}

#[tokio::test]
async fn rolling_back_removes_every_table() {
    let db = TestDb::new().await;

    Migrator::down(db.pool.as_ref(), None).await.unwrap();
    assert!(schema::verify(&db.pool).await.is_err());

    Migrator::up(db.pool.as_ref(), None).await.unwrap();
    schema::verify(&db.pool).await.unwrap();
}
