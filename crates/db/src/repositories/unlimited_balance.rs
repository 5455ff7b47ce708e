//! Unlimited-balance registry.
//!
//! An account with a live exemption row passes every affordability check,
//! so its balance may go negative. Exemptions are revoked by tombstoning the
//! row and granted again by clearing the tombstone.

use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;

use bank_core::OperationContext;
use bank_core::ledger::LedgerError;
use bank_shared::types::AccountId;

use crate::entities::unlimited_balances;
use crate::error::{classify, classify_commit};
use crate::repositories::transfer::begin_unit_of_work;
use crate::tombstone::SoftDelete;

/// Revocable per-account affordability exemptions.
#[derive(Debug, Clone)]
pub struct UnlimitedBalanceRegistry {
    db: DatabaseConnection,
}

impl UnlimitedBalanceRegistry {
    /// Creates a new registry.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns true if `account` holds an active exemption.
    pub async fn is_exempt(
        &self,
        ctx: &OperationContext,
        account: AccountId,
    ) -> Result<bool, LedgerError> {
        ctx.run(Self::is_exempt_in(&self.db, account)).await
    }

    /// Same as [`Self::is_exempt`], on the caller's connection or transaction.
    pub async fn is_exempt_in<C: ConnectionTrait>(
        conn: &C,
        account: AccountId,
    ) -> Result<bool, LedgerError> {
        let row = unlimited_balances::Entity::find_live()
            .filter(unlimited_balances::Column::AccountId.eq(account.into_inner()))
            .one(conn)
            .await
            .map_err(classify)?;
        Ok(row.is_some())
    }

    /// Grants an exemption. Granting an active exemption changes nothing.
    pub async fn grant(
        &self,
        ctx: &OperationContext,
        account: AccountId,
    ) -> Result<(), LedgerError> {
        let txn = ctx
            .run(async {
                let txn = begin_unit_of_work(&self.db).await?;
                let row = unlimited_balances::ActiveModel {
                    account_id: Set(account.into_inner()),
                    granted_at: Set(Utc::now().into()),
                    revoked_at: Set(None),
                };

                unlimited_balances::Entity::insert(row)
                    .on_conflict(
                        OnConflict::column(unlimited_balances::Column::AccountId)
                            .update_column(unlimited_balances::Column::RevokedAt)
                            .to_owned(),
                    )
                    .exec_without_returning(&txn)
                    .await
                    .map_err(classify)?;
                Ok::<_, LedgerError>(txn)
            })
            .await?;

        ctx.check()?;
        txn.commit().await.map_err(classify_commit)?;

        info!(account_id = %account, "Unlimited balance granted");
        Ok(())
    }

    /// Revokes an active exemption.
    ///
    /// Returns false if there was nothing to revoke.
    pub async fn revoke(
        &self,
        ctx: &OperationContext,
        account: AccountId,
    ) -> Result<bool, LedgerError> {
        let (txn, revoked) = ctx
            .run(async {
                let txn = begin_unit_of_work(&self.db).await?;
                let result = unlimited_balances::Entity::update_many()
                    .col_expr(
                        unlimited_balances::Column::RevokedAt,
                        Expr::value(Utc::now()),
                    )
                    .filter(unlimited_balances::Column::AccountId.eq(account.into_inner()))
                    .filter(unlimited_balances::Entity::is_live())
                    .exec(&txn)
                    .await
                    .map_err(classify)?;
                Ok::<_, LedgerError>((txn, result.rows_affected > 0))
            })
            .await?;

        ctx.check()?;
        txn.commit().await.map_err(classify_commit)?;

        if revoked {
            info!(account_id = %account, "Unlimited balance revoked");
        }
        Ok(revoked)
    }
}
