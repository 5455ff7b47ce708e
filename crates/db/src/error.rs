//! Translation of store errors into ledger errors.
//!
//! Serialization failures and lock timeouts become `Conflict` so callers may
//! retry the whole operation. Everything else is logged here and surfaced as
//! an opaque `Storage` failure.

use std::borrow::Cow;

use sea_orm::{DbErr, RuntimeErr};
use tracing::{error, warn};

use bank_core::ledger::LedgerError;

/// Postgres `serialization_failure`.
const PG_SERIALIZATION_FAILURE: &str = "40001";
/// Postgres `deadlock_detected`.
const PG_DEADLOCK_DETECTED: &str = "40P01";
/// SQLite `SQLITE_BUSY`.
const SQLITE_BUSY: &str = "5";
/// SQLite `SQLITE_BUSY_SNAPSHOT`.
const SQLITE_BUSY_SNAPSHOT: &str = "517";

/// Returns the SQLSTATE (Postgres) or result code (SQLite) of a database error.
fn database_code(err: &DbErr) -> Option<Cow<'_, str>> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(e)))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(e)))
        | DbErr::Conn(RuntimeErr::SqlxError(sqlx::Error::Database(e))) => e.code(),
        _ => None,
    }
}

/// Returns true if the store rejected the statement because of a concurrent
/// transaction.
pub fn is_serialization_failure(err: &DbErr) -> bool {
    database_code(err).is_some_and(|code| {
        matches!(
            code.as_ref(),
            PG_SERIALIZATION_FAILURE | PG_DEADLOCK_DETECTED | SQLITE_BUSY | SQLITE_BUSY_SNAPSHOT
        )
    })
}

/// Classifies a failed statement.
pub fn classify(err: DbErr) -> LedgerError {
    if is_serialization_failure(&err) {
        warn!(error = %err, "Concurrent update rejected by the store");
        return LedgerError::Conflict(err.to_string());
    }
    error!(error = %err, "Database operation failed");
    LedgerError::Storage(err.to_string())
}

/// Classifies a failed commit. The unit of work was not applied.
pub fn classify_commit(err: DbErr) -> LedgerError {
    warn!(error = %err, "Failed to commit unit of work");
    LedgerError::Conflict(err.to_string())
}
