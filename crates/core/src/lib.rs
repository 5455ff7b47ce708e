//! Core business logic for the bank ledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and state machines live here.
//!
//! # Modules
//!
//! - `ledger` - Transfer validation, affordability and lock ordering
//! - `payment` - Payment lifecycle state machine
//! - `context` - Per-operation deadlines and cancellation

pub mod context;
pub mod ledger;
pub mod payment;

pub use context::OperationContext;
