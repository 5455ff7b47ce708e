//! Payment lifecycle management.
//!
//! A payment is a transfer request that sits in `Pending` until one of its
//! parties executes or cancels it.
//!
//! # Modules
//!
//! - `types` - Payment domain types (PaymentStatus, PaymentParties, PaymentAction)
//! - `error` - Payment-specific error types
//! - `service` - State transition and authorization logic

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::PaymentError;
pub use service::PaymentWorkflowService;
pub use types::{PaymentAction, PaymentParties, PaymentStatus};
