//! A validated plan for one transfer.
//!
//! The plan owns everything the engine needs to decide before and after it
//! takes locks: the lock set, the affordability rule and the balance deltas.
//! The store-backed engine only executes it.

use std::collections::BTreeMap;

use bank_shared::types::AccountId;

use super::affordability::can_afford;
use super::error::LedgerError;
use super::lock::LockSet;
use super::validation::{validate_amount, validate_description};

/// A validated request to move `amount_cents` from one account to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    from: AccountId,
    to: AccountId,
    amount_cents: i64,
    description: String,
    locks: LockSet,
}

impl TransferPlan {
    /// Validates a transfer request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for non-positive amounts and
    /// `DescriptionTooLong` when `description` exceeds `description_max`.
    pub fn new(
        from: AccountId,
        to: AccountId,
        amount_cents: i64,
        description: impl Into<String>,
        description_max: usize,
    ) -> Result<Self, LedgerError> {
        validate_amount(amount_cents)?;
        let description = description.into();
        validate_description(&description, description_max)?;

        Ok(Self {
            from,
            to,
            amount_cents,
            description,
            locks: LockSet::for_transfer(from, to),
        })
    }

    /// Paying account.
    #[must_use]
    pub const fn from(&self) -> AccountId {
        self.from
    }

    /// Receiving account.
    #[must_use]
    pub const fn to(&self) -> AccountId {
        self.to
    }

    /// Amount in minor units, always positive.
    #[must_use]
    pub const fn amount_cents(&self) -> i64 {
        self.amount_cents
    }

    /// Free-form description recorded on the ledger line.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Balance rows to lock, in acquisition order.
    #[must_use]
    pub const fn locks(&self) -> &LockSet {
        &self.locks
    }

    /// Returns true if the transfer moves money to the paying account itself.
    #[must_use]
    pub fn is_self_transfer(&self) -> bool {
        self.from == self.to
    }

    /// Checks the paying account against its locked balance.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds` when the account is not exempt and its
    /// balance does not cover the amount.
    pub fn check_affordability(
        &self,
        from_balance: Option<i64>,
        from_exempt: bool,
    ) -> Result<(), LedgerError> {
        if can_afford(from_balance, from_exempt, self.amount_cents) {
            Ok(())
        } else {
            Err(LedgerError::InsufficientFunds {
                account: self.from.into_inner(),
                requested: self.amount_cents,
            })
        }
    }

    /// Checks that every delta fits into the locked balance it is added to.
    ///
    /// Missing balances count as zero, the way the first delta seeds them.
    ///
    /// # Errors
    ///
    /// Returns `BalanceOverflow` for the first account whose balance would
    /// leave the `i64` range.
    pub fn check_headroom(
        &self,
        balances: &BTreeMap<AccountId, Option<i64>>,
    ) -> Result<(), LedgerError> {
        for (account, delta) in self.deltas() {
            let current = balances.get(&account).copied().flatten().unwrap_or(0);
            if current.checked_add(delta).is_none() {
                return Err(LedgerError::BalanceOverflow {
                    account: account.into_inner(),
                });
            }
        }
        Ok(())
    }

    /// Balance deltas to apply after the ledger line is recorded.
    ///
    /// A self-transfer has no net effect and yields no deltas; otherwise the
    /// deltas sum to zero.
    #[must_use]
    pub fn deltas(&self) -> Vec<(AccountId, i64)> {
        if self.is_self_transfer() {
            return Vec::new();
        }
        vec![
            (self.from, -self.amount_cents),
            (self.to, self.amount_cents),
        ]
    }
}
