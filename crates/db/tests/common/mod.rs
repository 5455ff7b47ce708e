//! Shared setup for store-backed tests.
//!
//! Each test gets its own in-memory SQLite database with all migrations
//! applied. The pool holds a single connection, since every connection to
//! `sqlite::memory:` opens a separate database.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    TransactionTrait,
};
use sea_orm_migration::MigratorTrait;

use bank_core::OperationContext;
use bank_db::AccountLedger;
use bank_db::entities::{balances, ledger_lines};
use bank_db::migration::Migrator;
use bank_shared::types::AccountId;

/// Creates a migrated in-memory store.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory SQLite database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Creates a migrated SQLite database in a fresh temporary file.
///
/// Unlike the in-memory store, several pools can open the same file, so a
/// test can hold locks on one connection while another one writes.
pub async fn setup_file_db() -> (DatabaseConnection, PathBuf) {
    let path = std::env::temp_dir().join(format!("bank-test-{}.db", uuid::Uuid::new_v4()));
    let db = open_file_db(&path).await;
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    (db, path)
}

/// Opens a single-connection pool on a database file.
///
/// Rollback journaling is forced so an open read transaction holds a shared
/// lock that a writer's COMMIT has to wait for.
pub async fn open_file_db(path: &Path) -> DatabaseConnection {
    let mut options = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open SQLite database file");
    db.execute_unprepared("PRAGMA journal_mode=DELETE;")
        .await
        .expect("Failed to set journal mode");
    db
}

/// Removes a database file created by [`setup_file_db`].
pub fn remove_file_db(path: &Path) {
    let _ = std::fs::remove_file(path);
    let _ = std::fs::remove_file(path.with_extension("db-journal"));
}

/// A context generous enough for any single test operation.
pub fn ctx() -> OperationContext {
    OperationContext::with_timeout(Duration::from_secs(10))
}

/// Opens `account` with a balance of `cents` without recording a transfer.
pub async fn open_account(db: &DatabaseConnection, cents: i64) -> AccountId {
    let account = AccountId::new();
    set_balance(db, account, cents).await;
    account
}

/// Adds `cents` to the stored balance of `account`.
pub async fn set_balance(db: &DatabaseConnection, account: AccountId, cents: i64) {
    let txn = db.begin().await.expect("Failed to begin transaction");
    AccountLedger::apply_delta(&txn, account, cents)
        .await
        .expect("Failed to apply delta");
    txn.commit().await.expect("Failed to commit");
}

/// Reads a balance, panicking if the account has no live row.
pub async fn balance_of(db: &DatabaseConnection, account: AccountId) -> i64 {
    AccountLedger::new(db.clone())
        .get_balance(&ctx(), account)
        .await
        .expect("Failed to read balance")
}

/// Number of ledger lines in the store, tombstoned or not.
pub async fn ledger_line_count(db: &DatabaseConnection) -> u64 {
    ledger_lines::Entity::find()
        .count(db)
        .await
        .expect("Failed to count ledger lines")
}

/// Sum of every stored balance.
pub async fn total_balance(db: &DatabaseConnection) -> i64 {
    balances::Entity::find()
        .all(db)
        .await
        .expect("Failed to read balances")
        .iter()
        .map(|b| b.amount_cents)
        .sum()
}
