//! Soft-delete tombstones.
//!
//! Financial records are never physically deleted. Each table carries a
//! nullable timestamp column marking a row as logically gone, and every read
//! path goes through [`SoftDelete::find_live`].

use sea_orm::sea_query::SimpleExpr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Select};

use crate::entities::{balances, ledger_lines, payments, unlimited_balances};

/// An entity with a nullable tombstone column.
pub trait SoftDelete: EntityTrait {
    /// The column that is set when the row is logically deleted.
    fn tombstone_column() -> Self::Column;

    /// Condition matching rows that are not tombstoned.
    fn is_live() -> SimpleExpr {
        Self::tombstone_column().is_null()
    }

    /// Selects only rows that are not tombstoned.
    fn find_live() -> Select<Self> {
        Self::find().filter(Self::is_live())
    }
}

impl SoftDelete for balances::Entity {
    fn tombstone_column() -> Self::Column {
        balances::Column::DeletedAt
    }
}

impl SoftDelete for ledger_lines::Entity {
    fn tombstone_column() -> Self::Column {
        ledger_lines::Column::DeletedAt
    }
}

impl SoftDelete for payments::Entity {
    fn tombstone_column() -> Self::Column {
        payments::Column::DeletedAt
    }
}

// A revoked exemption is a tombstoned one; granting again clears it.
impl SoftDelete for unlimited_balances::Entity {
    fn tombstone_column() -> Self::Column {
        unlimited_balances::Column::RevokedAt
    }
}
