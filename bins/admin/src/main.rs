//! Administrative commands for the bank ledger.
//!
//! Usage:
//!   admin grant-unlimited <account-uuid>   - Exempt an account from affordability checks
//!   admin revoke-unlimited <account-uuid>  - Revoke an account's exemption
//!   admin balance <account-uuid>           - Show an account's balance and transfer count

use std::time::Duration;

use anyhow::{Context, bail};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bank_core::OperationContext;
use bank_db::{AccountLedger, UnlimitedBalanceRegistry, connect_with};
use bank_shared::AppConfig;
use bank_shared::types::AccountId;

const USAGE: &str = "usage: admin <grant-unlimited|revoke-unlimited|balance> <account-uuid>";

/// A parsed command line.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    GrantUnlimited(AccountId),
    RevokeUnlimited(AccountId),
    Balance(AccountId),
}

impl Command {
    fn parse<I>(mut args: I) -> anyhow::Result<Self>
    where
        I: Iterator<Item = String>,
    {
        let (Some(name), Some(raw_id)) = (args.next(), args.next()) else {
            bail!(USAGE);
        };
        if args.next().is_some() {
            bail!(USAGE);
        }

        let account: AccountId = raw_id
            .parse()
            .with_context(|| format!("invalid account id '{raw_id}'"))?;

        match name.as_str() {
            "grant-unlimited" => Ok(Self::GrantUnlimited(account)),
            "revoke-unlimited" => Ok(Self::RevokeUnlimited(account)),
            "balance" => Ok(Self::Balance(account)),
            other => bail!("unknown command '{other}'\n{USAGE}"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bank=debug,admin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let command = Command::parse(std::env::args().skip(1))?;

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to database
    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let ctx = OperationContext::with_timeout(Duration::from_millis(
        config.ledger.operation_timeout_ms,
    ));

    match command {
        Command::GrantUnlimited(account) => {
            UnlimitedBalanceRegistry::new(db)
                .grant(&ctx, account)
                .await
                .context("Failed to grant unlimited balance")?;
            println!("granted unlimited balance to {account}");
        }
        Command::RevokeUnlimited(account) => {
            let revoked = UnlimitedBalanceRegistry::new(db)
                .revoke(&ctx, account)
                .await
                .context("Failed to revoke unlimited balance")?;
            if revoked {
                println!("revoked unlimited balance of {account}");
            } else {
                println!("{account} had no active unlimited balance");
            }
        }
        Command::Balance(account) => {
            let summary = AccountLedger::new(db)
                .get_balance_summary(&ctx, account)
                .await
                .context("Failed to read balance")?;
            println!(
                "{account}: {} cents across {} transfers",
                summary.amount_cents, summary.total_transfers
            );
        }
    }

    Ok(())
}
