//! Shared types, errors, and configuration for the bank backend.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for accounts, payments and ledger lines
//! - Pagination types for list operations
//! - The authenticated principal handed in by the identity layer
//! - Application-wide error types
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod types;

pub use auth::{PAYMENT_CREATE_SCOPE, Principal};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
