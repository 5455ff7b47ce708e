//! Account balance repository.
//!
//! One row per account, created on the first delta that touches it. Rows are
//! only ever changed by additive deltas applied inside a transfer's unit of
//! work.

use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set,
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use bank_core::OperationContext;
use bank_core::ledger::{LedgerError, LockSet, can_afford, validate_amount};
use bank_shared::types::AccountId;

use crate::entities::{balances, ledger_lines};
use crate::error::classify;
use crate::repositories::unlimited_balance::UnlimitedBalanceRegistry;
use crate::tombstone::SoftDelete;

/// Balance of one account plus the size of its transfer history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSummary {
    /// The account.
    pub account_id: Uuid,
    /// Stored balance in minor units.
    pub amount_cents: i64,
    /// Number of live ledger lines sending from or receiving into the account.
    pub total_transfers: u64,
}

/// Per-account balance state.
#[derive(Debug, Clone)]
pub struct AccountLedger {
    db: DatabaseConnection,
}

impl AccountLedger {
    /// Creates a new account ledger.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the stored balance of `account`.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account has never transacted or its
    /// balance row is tombstoned.
    pub async fn get_balance(
        &self,
        ctx: &OperationContext,
        account: AccountId,
    ) -> Result<i64, LedgerError> {
        ctx.run(async {
            find_live_balance(&self.db, account)
                .await?
                .ok_or(LedgerError::AccountNotFound(account.into_inner()))
        })
        .await
    }

    /// Returns the balance together with the number of transfers touching the account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` like [`Self::get_balance`].
    pub async fn get_balance_summary(
        &self,
        ctx: &OperationContext,
        account: AccountId,
    ) -> Result<BalanceSummary, LedgerError> {
        ctx.run(async {
            let amount_cents = find_live_balance(&self.db, account)
                .await?
                .ok_or(LedgerError::AccountNotFound(account.into_inner()))?;

            let total_transfers = ledger_lines::Entity::find_live()
                .filter(
                    Condition::any()
                        .add(ledger_lines::Column::FromAccount.eq(account.into_inner()))
                        .add(ledger_lines::Column::ToAccount.eq(account.into_inner())),
                )
                .count(&self.db)
                .await
                .map_err(classify)?;

            Ok(BalanceSummary {
                account_id: account.into_inner(),
                amount_cents,
                total_transfers,
            })
        })
        .await
    }

    /// Returns true if `account` can pay `amount_cents` right now.
    ///
    /// The answer is advisory; a transfer re-checks under its row locks.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for non-positive amounts.
    pub async fn can_afford(
        &self,
        ctx: &OperationContext,
        account: AccountId,
        amount_cents: i64,
    ) -> Result<bool, LedgerError> {
        validate_amount(amount_cents)?;
        ctx.run(async {
            let balance = find_live_balance(&self.db, account).await?;
            let exempt = UnlimitedBalanceRegistry::is_exempt_in(&self.db, account).await?;
            Ok(can_afford(balance, exempt, amount_cents))
        })
        .await
    }

    /// Adds `delta` to the balance of `account`, creating the row seeded at
    /// `delta` if it does not exist.
    ///
    /// Only callable inside a caller-owned transaction.
    pub async fn apply_delta(
        txn: &DatabaseTransaction,
        account: AccountId,
        delta: i64,
    ) -> Result<(), LedgerError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let row = balances::ActiveModel {
            account_id: Set(account.into_inner()),
            amount_cents: Set(delta),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        balances::Entity::insert(row)
            .on_conflict(
                OnConflict::column(balances::Column::AccountId)
                    .value(
                        balances::Column::AmountCents,
                        Expr::col((balances::Entity, balances::Column::AmountCents)).add(delta),
                    )
                    .value(balances::Column::UpdatedAt, Expr::value(now))
                    .to_owned(),
            )
            .exec_without_returning(txn)
            .await
            .map_err(classify)?;

        debug!(account_id = %account, delta, "Applied balance delta");
        Ok(())
    }

    /// Takes an exclusive lock on each balance row in `locks`, in order, and
    /// returns the locked balances.
    ///
    /// Accounts without a row map to `None`.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if any row is tombstoned.
    pub async fn lock_balances(
        txn: &DatabaseTransaction,
        locks: &LockSet,
    ) -> Result<BTreeMap<AccountId, Option<i64>>, LedgerError> {
        let mut locked = BTreeMap::new();
        for &account in locks {
            // Tombstoned rows are read on purpose so they can be refused.
            let row = balances::Entity::find_by_id(account.into_inner())
                .lock_exclusive()
                .one(txn)
                .await
                .map_err(classify)?;

            let balance = match row {
                Some(row) if row.deleted_at.is_some() => {
                    return Err(LedgerError::AccountNotFound(account.into_inner()));
                }
                Some(row) => Some(row.amount_cents),
                None => None,
            };
            locked.insert(account, balance);
        }
        Ok(locked)
    }
}

async fn find_live_balance<C: ConnectionTrait>(
    conn: &C,
    account: AccountId,
) -> Result<Option<i64>, LedgerError> {
    let row = balances::Entity::find_live()
        .filter(balances::Column::AccountId.eq(account.into_inner()))
        .one(conn)
        .await
        .map_err(classify)?;
    Ok(row.map(|b| b.amount_cents))
}
