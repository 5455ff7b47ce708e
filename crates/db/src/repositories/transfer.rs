//! Transfer engine: one atomic money movement between two accounts.
//!
//! A transfer locks the balance rows it touches in ascending account order,
//! checks affordability under those locks, appends an immutable ledger line
//! and applies the balance deltas. Either all of it commits or none of it.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseBackend,
    DatabaseConnection, DatabaseTransaction, EntityTrait, IsolationLevel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};

use bank_core::OperationContext;
use bank_core::ledger::{LedgerError, TransferPlan, validate_page};
use bank_shared::config::LedgerConfig;
use bank_shared::types::{AccountId, LedgerLineId, PageRequest, PageResponse};

use crate::entities::ledger_lines;
use crate::error::{classify, classify_commit};
use crate::repositories::balance::AccountLedger;
use crate::repositories::unlimited_balance::UnlimitedBalanceRegistry;
use crate::tombstone::SoftDelete;

/// Opens a unit of work.
///
/// Postgres runs it at serializable isolation. SQLite transactions already
/// behave serially, and sea-orm does not accept an isolation level there.
pub(crate) async fn begin_unit_of_work(
    db: &DatabaseConnection,
) -> Result<DatabaseTransaction, LedgerError> {
    let txn = if db.get_database_backend() == DatabaseBackend::Postgres {
        db.begin_with_config(Some(IsolationLevel::Serializable), None)
            .await
    } else {
        db.begin().await
    };
    txn.map_err(classify)
}

/// Moves money between accounts.
#[derive(Debug, Clone)]
pub struct TransferEngine {
    db: DatabaseConnection,
    description_max: usize,
}

impl TransferEngine {
    /// Creates a transfer engine with the default ledger limits.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_config(db, &LedgerConfig::default())
    }

    /// Creates a transfer engine with the limits from `config`.
    #[must_use]
    pub const fn with_config(db: DatabaseConnection, config: &LedgerConfig) -> Self {
        Self {
            db,
            description_max: config.transfer_description_max,
        }
    }

    /// Transfers `amount_cents` from `from` to `to` and returns the ledger line.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The amount is not positive or the description is too long
    /// - Either balance row is tombstoned
    /// - `from` is not exempt and cannot cover the amount
    /// - Either resulting balance would leave the `i64` range
    /// - The store rejects the unit of work (`Conflict`, retryable)
    /// - The context expires or is cancelled before the commit is sent
    pub async fn make_transfer(
        &self,
        ctx: &OperationContext,
        from: AccountId,
        to: AccountId,
        amount_cents: i64,
        description: &str,
    ) -> Result<ledger_lines::Model, LedgerError> {
        let plan = TransferPlan::new(from, to, amount_cents, description, self.description_max)?;

        let (txn, line) = ctx
            .run(async {
                let txn = begin_unit_of_work(&self.db).await?;
                let line = Self::apply_transfer(&txn, &plan).await?;
                Ok::<_, LedgerError>((txn, line))
            })
            .await?;

        // Once COMMIT is sent its outcome is the result, deadline or not.
        ctx.check()?;
        txn.commit().await.map_err(classify_commit)?;

        info!(
            line_id = %line.line_id,
            from = %from,
            to = %to,
            amount_cents,
            "Transfer committed"
        );
        Ok(line)
    }

    /// Executes `plan` inside the caller's unit of work without committing.
    ///
    /// On error the caller must drop the transaction; nothing it wrote
    /// is kept.
    pub async fn apply_transfer(
        txn: &DatabaseTransaction,
        plan: &TransferPlan,
    ) -> Result<ledger_lines::Model, LedgerError> {
        let locked = AccountLedger::lock_balances(txn, plan.locks()).await?;
        let from_balance = locked.get(&plan.from()).copied().flatten();
        let from_exempt = UnlimitedBalanceRegistry::is_exempt_in(txn, plan.from()).await?;

        if let Err(err) = plan.check_affordability(from_balance, from_exempt) {
            debug!(
                from = %plan.from(),
                amount_cents = plan.amount_cents(),
                "Transfer refused for insufficient funds"
            );
            return Err(err);
        }
        plan.check_headroom(&locked)?;

        let line = ledger_lines::ActiveModel {
            line_id: Set(LedgerLineId::new().into_inner()),
            from_account: Set(plan.from().into_inner()),
            to_account: Set(plan.to().into_inner()),
            amount_cents: Set(plan.amount_cents()),
            description: Set(plan.description().to_string()),
            created_at: Set(Utc::now().into()),
            deleted_at: Set(None),
        }
        .insert(txn)
        .await
        .map_err(classify)?;

        for (account, delta) in plan.deltas() {
            AccountLedger::apply_delta(txn, account, delta).await?;
        }

        Ok(line)
    }

    /// Lists transfers sent or received by `account`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPage` for a page size outside `1..=100`.
    pub async fn list_transfers_for_account(
        &self,
        ctx: &OperationContext,
        account: AccountId,
        page: PageRequest,
    ) -> Result<PageResponse<ledger_lines::Model>, LedgerError> {
        validate_page(&page)?;

        ctx.run(async {
            let query = ledger_lines::Entity::find_live().filter(
                Condition::any()
                    .add(ledger_lines::Column::FromAccount.eq(account.into_inner()))
                    .add(ledger_lines::Column::ToAccount.eq(account.into_inner())),
            );

            let total = query.clone().count(&self.db).await.map_err(classify)?;

            let lines = query
                .order_by_desc(ledger_lines::Column::CreatedAt)
                .order_by_desc(ledger_lines::Column::LineId)
                .offset(page.offset)
                .limit(page.limit())
                .all(&self.db)
                .await
                .map_err(classify)?;

            Ok(PageResponse::new(lines, page, total))
        })
        .await
    }

    /// Returns one transfer if `requester` sent or received it.
    ///
    /// # Errors
    ///
    /// Returns `TransferNotFound` for unknown lines and for lines the
    /// requester is not a party to.
    pub async fn get_transfer(
        &self,
        ctx: &OperationContext,
        line_id: LedgerLineId,
        requester: AccountId,
    ) -> Result<ledger_lines::Model, LedgerError> {
        ctx.run(async {
            ledger_lines::Entity::find_live()
                .filter(ledger_lines::Column::LineId.eq(line_id.into_inner()))
                .filter(
                    Condition::any()
                        .add(ledger_lines::Column::FromAccount.eq(requester.into_inner()))
                        .add(ledger_lines::Column::ToAccount.eq(requester.into_inner())),
                )
                .one(&self.db)
                .await
                .map_err(classify)?
                .ok_or(LedgerError::TransferNotFound(line_id.into_inner()))
        })
        .await
    }
}
