//! Payment service for status transitions and party checks.
//!
//! This module implements the state machine that moves a payment out of
//! `Pending` exactly once, plus the authorization rules for who may create,
//! see and act on a payment.

use chrono::Utc;

use bank_shared::types::{AccountId, PaymentId};
use bank_shared::{PAYMENT_CREATE_SCOPE, Principal};

use crate::ledger::{validate_amount, validate_description};
use crate::payment::error::PaymentError;
use crate::payment::types::{PaymentAction, PaymentParties, PaymentStatus};

/// Stateless service for managing payment lifecycle transitions.
pub struct PaymentWorkflowService;

impl PaymentWorkflowService {
    /// Checks that `principal` may request a new payment.
    ///
    /// # Returns
    /// * `Err(PaymentError::MissingScope)` without the `payment_create` scope
    /// * `Err(PaymentError::Ledger)` for a non-positive amount or a description too long
    pub fn authorize_creation(
        principal: &Principal,
        amount_cents: i64,
        description: &str,
        description_max: usize,
    ) -> Result<(), PaymentError> {
        if !principal.has_scope(PAYMENT_CREATE_SCOPE) {
            return Err(PaymentError::MissingScope(PAYMENT_CREATE_SCOPE));
        }
        validate_amount(amount_cents)?;
        validate_description(description, description_max)?;
        Ok(())
    }

    /// Checks that `requester` is one of the payment's parties.
    pub fn authorize(
        payment_id: PaymentId,
        parties: &PaymentParties,
        requester: AccountId,
    ) -> Result<(), PaymentError> {
        if parties.involves(requester) {
            Ok(())
        } else {
            Err(PaymentError::Unauthorized {
                payment_id: payment_id.into_inner(),
                requester: requester.into_inner(),
            })
        }
    }

    /// Execute a pending payment.
    ///
    /// # Returns
    /// * `Ok(PaymentAction::Complete)` if the transition is valid
    /// * `Err(PaymentError::InvalidTransition)` if not in Pending status
    pub fn complete(
        current_status: PaymentStatus,
        executed_by: AccountId,
    ) -> Result<PaymentAction, PaymentError> {
        match current_status {
            PaymentStatus::Pending => Ok(PaymentAction::Complete {
                new_status: PaymentStatus::Completed,
                executed_by,
                completed_at: Utc::now(),
            }),
            _ => Err(PaymentError::InvalidTransition {
                from: current_status,
                to: PaymentStatus::Completed,
            }),
        }
    }

    /// Cancel a pending payment.
    ///
    /// # Returns
    /// * `Ok(PaymentAction::Cancel)` if the transition is valid
    /// * `Err(PaymentError::InvalidTransition)` if not in Pending status
    pub fn cancel(
        current_status: PaymentStatus,
        cancelled_by: AccountId,
    ) -> Result<PaymentAction, PaymentError> {
        match current_status {
            PaymentStatus::Pending => Ok(PaymentAction::Cancel {
                new_status: PaymentStatus::Cancelled,
                cancelled_by,
                cancelled_at: Utc::now(),
            }),
            _ => Err(PaymentError::InvalidTransition {
                from: current_status,
                to: PaymentStatus::Cancelled,
            }),
        }
    }

    /// Check if a transition from one status to another is valid.
    pub fn is_valid_transition(from: PaymentStatus, to: PaymentStatus) -> bool {
        matches!(
            (from, to),
            (
                PaymentStatus::Pending,
                PaymentStatus::Completed | PaymentStatus::Cancelled
            )
        )
    }
}
