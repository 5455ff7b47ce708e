//! Ledger schema: balances, ledger lines and unlimited-balance exemptions.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Balances::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Balances::AccountId).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Balances::AmountCents).big_integer().not_null())
                    .col(
                        ColumnDef::new(Balances::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Balances::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Balances::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LedgerLines::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LedgerLines::LineId).uuid().not_null().primary_key())
                    .col(ColumnDef::new(LedgerLines::FromAccount).uuid().not_null())
                    .col(ColumnDef::new(LedgerLines::ToAccount).uuid().not_null())
                    .col(
                        ColumnDef::new(LedgerLines::AmountCents)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(LedgerLines::AmountCents).gt(0)),
                    )
                    .col(
                        ColumnDef::new(LedgerLines::Description)
                            .string_len(120)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(LedgerLines::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerLines::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Account history, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_lines_from")
                    .table(LedgerLines::Table)
                    .col(LedgerLines::FromAccount)
                    .col(LedgerLines::CreatedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_lines_to")
                    .table(LedgerLines::Table)
                    .col(LedgerLines::ToAccount)
                    .col(LedgerLines::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UnlimitedBalances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UnlimitedBalances::AccountId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UnlimitedBalances::GrantedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(UnlimitedBalances::RevokedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UnlimitedBalances::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerLines::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Balances::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Balances {
    Table,
    AccountId,
    AmountCents,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum LedgerLines {
    Table,
    LineId,
    FromAccount,
    ToAccount,
    AmountCents,
    Description,
    CreatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum UnlimitedBalances {
    Table,
    AccountId,
    GrantedAt,
    RevokedAt,
}
