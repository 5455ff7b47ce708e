//! Payment workflow repository.
//!
//! A payment is created `pending` and leaves that status exactly once.
//! Executing a payment locks the payment row, applies the transfer and writes
//! the new status in one unit of work, so a failure at any step leaves the
//! payment pending and every balance untouched.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;

use bank_core::OperationContext;
use bank_core::ledger::{TransferPlan, validate_page};
use bank_core::payment::{PaymentAction, PaymentError, PaymentParties, PaymentWorkflowService};
use bank_shared::Principal;
use bank_shared::config::LedgerConfig;
use bank_shared::types::{AccountId, PageRequest, PageResponse, PaymentId};

use crate::entities::{ledger_lines, payments, sea_orm_active_enums::PaymentStatus};
use crate::error::{classify, classify_commit};
use crate::repositories::transfer::{TransferEngine, begin_unit_of_work};
use crate::tombstone::SoftDelete;

/// Outcome of a successful execution.
#[derive(Debug, Clone)]
pub struct ExecutedPayment {
    /// The payment, now completed.
    pub payment: payments::Model,
    /// The ledger line recording the transfer.
    pub line: ledger_lines::Model,
}

/// Cancelable payment requests on top of the transfer engine.
#[derive(Debug, Clone)]
pub struct PaymentWorkflow {
    db: DatabaseConnection,
    description_max: usize,
}

impl PaymentWorkflow {
    /// Creates a payment workflow with the default ledger limits.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_config(db, &LedgerConfig::default())
    }

    /// Creates a payment workflow with the limits from `config`.
    #[must_use]
    pub const fn with_config(db: DatabaseConnection, config: &LedgerConfig) -> Self {
        Self {
            db,
            description_max: config.payment_description_max,
        }
    }

    /// Records a pending payment requested by `principal`.
    ///
    /// The principal may be either party or a third party.
    ///
    /// # Errors
    ///
    /// Returns `MissingScope` without the `payment_create` scope, and a
    /// validation error for a non-positive amount or a description too long.
    pub async fn create_payment(
        &self,
        ctx: &OperationContext,
        principal: &Principal,
        from: AccountId,
        to: AccountId,
        amount_cents: i64,
        description: &str,
    ) -> Result<payments::Model, PaymentError> {
        PaymentWorkflowService::authorize_creation(
            principal,
            amount_cents,
            description,
            self.description_max,
        )?;

        let (txn, payment) = ctx
            .run(async {
                let txn = begin_unit_of_work(&self.db).await?;
                let now: DateTimeWithTimeZone = Utc::now().into();
                let payment = payments::ActiveModel {
                    id: Set(PaymentId::new().into_inner()),
                    from_account: Set(from.into_inner()),
                    to_account: Set(to.into_inner()),
                    creator_account: Set(principal.account_id.into_inner()),
                    amount_cents: Set(amount_cents),
                    description: Set(description.to_string()),
                    status: Set(PaymentStatus::Pending),
                    created_at: Set(now),
                    updated_at: Set(now),
                    deleted_at: Set(None),
                }
                .insert(&txn)
                .await
                .map_err(classify)?;
                Ok::<_, PaymentError>((txn, payment))
            })
            .await?;

        ctx.check()?;
        txn.commit().await.map_err(classify_commit)?;

        info!(
            payment_id = %payment.id,
            creator = %principal.account_id,
            amount_cents,
            "Payment created"
        );
        Ok(payment)
    }

    /// Cancels a pending payment.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown payments, `Unauthorized` if
    /// `requester` is not a party, and `InvalidTransition` if the payment
    /// already left `pending`.
    pub async fn cancel_payment(
        &self,
        ctx: &OperationContext,
        payment_id: PaymentId,
        requester: AccountId,
    ) -> Result<payments::Model, PaymentError> {
        let (txn, cancelled) = ctx
            .run(async {
                let txn = begin_unit_of_work(&self.db).await?;
                let payment = lock_payment(&txn, payment_id).await?;
                PaymentWorkflowService::authorize(payment_id, &parties(&payment), requester)?;

                let action = PaymentWorkflowService::cancel(payment.status.into(), requester)?;
                let cancelled = transition(&txn, payment, &action).await?;
                Ok::<_, PaymentError>((txn, cancelled))
            })
            .await?;

        ctx.check()?;
        txn.commit().await.map_err(classify_commit)?;

        info!(payment_id = %payment_id, requester = %requester, "Payment cancelled");
        Ok(cancelled)
    }

    /// Executes a pending payment: transfers its amount and marks it completed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Unauthorized` and `InvalidTransition` like
    /// [`Self::cancel_payment`], and any transfer error (such as
    /// `InsufficientFunds`). On error the payment stays pending.
    pub async fn execute_payment(
        &self,
        ctx: &OperationContext,
        payment_id: PaymentId,
        requester: AccountId,
    ) -> Result<ExecutedPayment, PaymentError> {
        let (txn, completed, line) = ctx
            .run(async {
                let txn = begin_unit_of_work(&self.db).await?;
                // Payment row first, then balance rows
                let payment = lock_payment(&txn, payment_id).await?;
                let parties = parties(&payment);
                PaymentWorkflowService::authorize(payment_id, &parties, requester)?;

                let action = PaymentWorkflowService::complete(payment.status.into(), requester)?;
                let plan = TransferPlan::new(
                    parties.from,
                    parties.to,
                    payment.amount_cents,
                    payment.description.as_str(),
                    self.description_max,
                )?;

                let line = TransferEngine::apply_transfer(&txn, &plan).await?;
                let completed = transition(&txn, payment, &action).await?;
                Ok::<_, PaymentError>((txn, completed, line))
            })
            .await?;

        // The commit is not raced: its outcome is the caller's answer.
        ctx.check()?;
        txn.commit().await.map_err(classify_commit)?;

        info!(
            payment_id = %payment_id,
            line_id = %line.line_id,
            requester = %requester,
            "Payment executed"
        );
        Ok(ExecutedPayment {
            payment: completed,
            line,
        })
    }

    /// Returns a payment if `requester` is one of its parties.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` both for unknown payments and for payments the
    /// requester may not see.
    pub async fn get_payment(
        &self,
        ctx: &OperationContext,
        payment_id: PaymentId,
        requester: AccountId,
    ) -> Result<payments::Model, PaymentError> {
        ctx.run(async {
            let payment = payments::Entity::find_live()
                .filter(payments::Column::Id.eq(payment_id.into_inner()))
                .one(&self.db)
                .await
                .map_err(classify)?
                .ok_or(PaymentError::NotFound(payment_id.into_inner()))?;

            if parties(&payment).involves(requester) {
                Ok(payment)
            } else {
                Err(PaymentError::NotFound(payment_id.into_inner()))
            }
        })
        .await
    }

    /// Lists payments `account` is a party to, newest first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPage` for a page size outside `1..=100`.
    pub async fn list_payments_for_account(
        &self,
        ctx: &OperationContext,
        account: AccountId,
        page: PageRequest,
    ) -> Result<PageResponse<payments::Model>, PaymentError> {
        validate_page(&page)?;

        ctx.run(async {
            let id = account.into_inner();
            let query = payments::Entity::find_live().filter(
                Condition::any()
                    .add(payments::Column::FromAccount.eq(id))
                    .add(payments::Column::ToAccount.eq(id))
                    .add(payments::Column::CreatorAccount.eq(id)),
            );

            let total = query.clone().count(&self.db).await.map_err(classify)?;

            let items = query
                .order_by_desc(payments::Column::CreatedAt)
                .order_by_desc(payments::Column::Id)
                .offset(page.offset)
                .limit(page.limit())
                .all(&self.db)
                .await
                .map_err(classify)?;

            Ok(PageResponse::new(items, page, total))
        })
        .await
    }
}

fn parties(payment: &payments::Model) -> PaymentParties {
    PaymentParties {
        from: payment.from_account.into(),
        to: payment.to_account.into(),
        creator: payment.creator_account.into(),
    }
}

async fn lock_payment(
    txn: &DatabaseTransaction,
    payment_id: PaymentId,
) -> Result<payments::Model, PaymentError> {
    payments::Entity::find_live()
        .filter(payments::Column::Id.eq(payment_id.into_inner()))
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(classify)?
        .ok_or(PaymentError::NotFound(payment_id.into_inner()))
}

/// Moves a locked pending payment to the status `action` produces.
async fn transition(
    txn: &DatabaseTransaction,
    payment: payments::Model,
    action: &PaymentAction,
) -> Result<payments::Model, PaymentError> {
    let new_status = PaymentStatus::from(action.new_status());
    let updated_at: DateTimeWithTimeZone = action.occurred_at().into();

    let result = payments::Entity::update_many()
        .col_expr(payments::Column::Status, Expr::value(new_status))
        .col_expr(payments::Column::UpdatedAt, Expr::value(updated_at))
        .filter(payments::Column::Id.eq(payment.id))
        .filter(payments::Column::Status.eq(PaymentStatus::Pending))
        .filter(payments::Entity::is_live())
        .exec(txn)
        .await
        .map_err(classify)?;

    if result.rows_affected != 1 {
        return Err(PaymentError::InvalidTransition {
            from: payment.status.into(),
            to: action.new_status(),
        });
    }

    Ok(payments::Model {
        status: new_status,
        updated_at,
        ..payment
    })
}
