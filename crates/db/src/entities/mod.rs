//! `SeaORM` entity definitions.

pub mod balances;
pub mod ledger_lines;
pub mod payments;
pub mod sea_orm_active_enums;
pub mod unlimited_balances;
