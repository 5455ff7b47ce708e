//! Payment workflow error types.

use bank_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::ledger::LedgerError;
use crate::payment::types::PaymentStatus;

/// Errors that can occur during payment operations.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Payment does not exist or is not visible to the requester.
    #[error("Payment {0} not found")]
    NotFound(Uuid),

    /// Requester is not one of the payment's parties.
    #[error("Account {requester} is not a party to payment {payment_id}")]
    Unauthorized {
        /// The payment.
        payment_id: Uuid,
        /// The account that attempted the operation.
        requester: Uuid,
    },

    /// The principal lacks a required scope.
    #[error("Missing required scope: {0}")]
    MissingScope(&'static str),

    /// Attempted a transition out of a terminal status.
    #[error("Invalid payment status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: PaymentStatus,
        /// The attempted target status.
        to: PaymentStatus,
    },

    /// The underlying transfer or store operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl PaymentError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Unauthorized { .. } => 401,
            Self::MissingScope(_) => 403,
            Self::InvalidTransition { .. } => 409,
            Self::Ledger(err) => err.http_status_code(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "PAYMENT_NOT_FOUND",
            Self::Unauthorized { .. } => "NOT_A_PAYMENT_PARTY",
            Self::MissingScope(_) => "MISSING_SCOPE",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Ledger(err) => err.error_code(),
        }
    }

    /// Returns true if retrying the whole operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Ledger(err) if err.is_retryable())
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        let message = err.to_string();
        match err {
            PaymentError::NotFound(_) => Self::NotFound(message),
            PaymentError::Unauthorized { .. } => Self::Unauthorized(message),
            PaymentError::MissingScope(_) => Self::Forbidden(message),
            PaymentError::InvalidTransition { .. } => Self::Conflict(message),
            PaymentError::Ledger(err) => err.into(),
        }
    }
}
