//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod balance;
pub mod payment;
pub mod transfer;
pub mod unlimited_balance;

pub use balance::{AccountLedger, BalanceSummary};
pub use payment::{ExecutedPayment, PaymentWorkflow};
pub use transfer::TransferEngine;
pub use unlimited_balance::UnlimitedBalanceRegistry;
