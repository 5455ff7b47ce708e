//! Ledger error types for validation, funds and store errors.
//!
//! Every variant describes an outcome in which nothing was written: the
//! transfer engine either commits all of its effects or none of them.

use bank_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Amount must be strictly positive.
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(i64),

    /// Description exceeds the allowed length.
    #[error("Description is {actual} characters long, at most {max} allowed")]
    DescriptionTooLong {
        /// Allowed number of characters.
        max: usize,
        /// Actual number of characters.
        actual: usize,
    },

    /// Page size outside of the accepted range.
    #[error("Page size must be between 1 and {max}, got {page_size}")]
    InvalidPage {
        /// Requested page size.
        page_size: u32,
        /// Largest accepted page size.
        max: u32,
    },

    // ========== Lookup Errors ==========
    /// Account has no live balance row.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Ledger line does not exist or is not visible to the requester.
    #[error("Transfer not found: {0}")]
    TransferNotFound(Uuid),

    // ========== Funds Errors ==========
    /// The paying account cannot afford the amount.
    #[error("Insufficient funds on account {account}: {requested} requested")]
    InsufficientFunds {
        /// The paying account.
        account: Uuid,
        /// The requested amount in minor units.
        requested: i64,
    },

    /// Applying the transfer would push a balance outside the `i64` range.
    #[error("Balance of account {account} would overflow")]
    BalanceOverflow {
        /// The account whose balance would overflow.
        account: Uuid,
    },

    // ========== Concurrency Errors ==========
    /// The store rejected the unit of work (serialization failure or failed commit).
    #[error("Conflicting concurrent update, please retry: {0}")]
    Conflict(String),

    /// The operation's deadline passed before it completed.
    #[error("Operation deadline exceeded")]
    DeadlineExceeded,

    /// The operation was cancelled by its caller.
    #[error("Operation cancelled")]
    Cancelled,

    // ========== Store Errors ==========
    /// Opaque infrastructure failure.
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::DescriptionTooLong { .. } => "DESCRIPTION_TOO_LONG",
            Self::InvalidPage { .. } => "INVALID_PAGE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::BalanceOverflow { .. } => "BALANCE_OVERFLOW",
            Self::Conflict(_) => "CONFLICT",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::Cancelled => "CANCELLED",
            Self::Storage(_) => "STORAGE_FAILURE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InvalidAmount(_)
            | Self::DescriptionTooLong { .. }
            | Self::InvalidPage { .. }
            | Self::BalanceOverflow { .. } => 400,

            // 402 Payment Required - affordability
            Self::InsufficientFunds { .. } => 402,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::TransferNotFound(_) => 404,

            // 409 Conflict - concurrency errors
            Self::Conflict(_) => 409,

            // 504 Gateway Timeout
            Self::DeadlineExceeded => 504,

            // 500 Internal Server Error
            Self::Cancelled | Self::Storage(_) => 500,
        }
    }

    /// Returns true if retrying the whole operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::DeadlineExceeded)
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::InvalidAmount(_)
            | LedgerError::DescriptionTooLong { .. }
            | LedgerError::InvalidPage { .. }
            | LedgerError::BalanceOverflow { .. } => Self::Validation(message),
            LedgerError::AccountNotFound(_) | LedgerError::TransferNotFound(_) => {
                Self::NotFound(message)
            }
            LedgerError::InsufficientFunds { .. } => Self::PaymentRequired(message),
            LedgerError::Conflict(_) => Self::Conflict(message),
            LedgerError::DeadlineExceeded => Self::Timeout(message),
            // Store details stay out of user-facing responses.
            LedgerError::Cancelled | LedgerError::Storage(_) => {
                Self::Internal("internal failure".to_string())
            }
        }
    }
}
