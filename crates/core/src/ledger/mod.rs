//! Balance ledger rules.
//!
//! This module implements the store-independent half of the transfer engine:
//! - Amount, description and page validation
//! - The affordability rule with the unlimited-balance exemption
//! - Deterministic lock ordering for balance rows
//! - Transfer plans and their balance deltas
//! - Error types for ledger operations

pub mod affordability;
pub mod error;
pub mod lock;
pub mod transfer;
pub mod validation;

#[cfg(test)]
mod lock_props;
#[cfg(test)]
mod transfer_props;

pub use affordability::can_afford;
pub use error::LedgerError;
pub use lock::LockSet;
pub use transfer::TransferPlan;
pub use validation::{validate_amount, validate_description, validate_page};
