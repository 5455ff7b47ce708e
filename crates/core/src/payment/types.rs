//! Payment domain types for the payment lifecycle.
//!
//! This module defines the payment status, the parties allowed to act on a
//! payment, and the actions produced by valid transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use bank_shared::types::AccountId;

/// Payment status in the payment workflow.
///
/// The valid transitions are:
/// - Pending → Completed (execute)
/// - Pending → Cancelled (cancel)
///
/// Completed and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Payment is waiting to be executed or cancelled.
    Pending,
    /// The transfer was applied (terminal).
    Completed,
    /// The payment was withdrawn (terminal).
    Cancelled,
}

impl PaymentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true if no transition leaves this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The three accounts associated with a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentParties {
    /// Paying account.
    pub from: AccountId,
    /// Receiving account.
    pub to: AccountId,
    /// Account that requested the payment; may be neither party.
    pub creator: AccountId,
}

impl PaymentParties {
    /// Returns true if `account` may see and act on the payment.
    #[must_use]
    pub fn involves(&self, account: AccountId) -> bool {
        account == self.from || account == self.to || account == self.creator
    }
}

/// A state transition with its audit data.
#[derive(Debug, Clone)]
pub enum PaymentAction {
    /// Execute a pending payment.
    Complete {
        /// The new status after execution.
        new_status: PaymentStatus,
        /// The party that executed the payment.
        executed_by: AccountId,
        /// When the payment was executed.
        completed_at: DateTime<Utc>,
    },
    /// Cancel a pending payment.
    Cancel {
        /// The new status after cancellation.
        new_status: PaymentStatus,
        /// The party that cancelled the payment.
        cancelled_by: AccountId,
        /// When the payment was cancelled.
        cancelled_at: DateTime<Utc>,
    },
}

impl PaymentAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub const fn new_status(&self) -> PaymentStatus {
        match self {
            Self::Complete { new_status, .. } | Self::Cancel { new_status, .. } => *new_status,
        }
    }

    /// Returns when the action took effect.
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::Complete { completed_at, .. } => *completed_at,
            Self::Cancel { cancelled_at, .. } => *cancelled_at,
        }
    }
}
