//! Integration tests for the unlimited-balance registry.

mod common;

use bank_db::UnlimitedBalanceRegistry;
use bank_db::entities::unlimited_balances;
use bank_shared::types::AccountId;
use sea_orm::EntityTrait;

use common::{ctx, setup_db};

#[tokio::test]
async fn test_unknown_account_is_not_exempt() {
    let db = setup_db().await;
    let registry = UnlimitedBalanceRegistry::new(db);
    assert!(!registry.is_exempt(&ctx(), AccountId::new()).await.unwrap());
}

#[tokio::test]
async fn test_grant_is_idempotent() {
    let db = setup_db().await;
    let registry = UnlimitedBalanceRegistry::new(db.clone());
    let account = AccountId::new();

    registry.grant(&ctx(), account).await.unwrap();
    registry.grant(&ctx(), account).await.unwrap();
    assert!(registry.is_exempt(&ctx(), account).await.unwrap());

    let rows = unlimited_balances::Entity::find().all(&db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].revoked_at.is_none());
}

#[tokio::test]
async fn test_revoke_is_idempotent() {
    let db = setup_db().await;
    let registry = UnlimitedBalanceRegistry::new(db);
    let account = AccountId::new();

    // Nothing to revoke yet
    assert!(!registry.revoke(&ctx(), account).await.unwrap());

    registry.grant(&ctx(), account).await.unwrap();
    assert!(registry.revoke(&ctx(), account).await.unwrap());
    assert!(!registry.revoke(&ctx(), account).await.unwrap());
    assert!(!registry.is_exempt(&ctx(), account).await.unwrap());
}

#[tokio::test]
async fn test_grant_after_revoke_restores_exemption() {
    let db = setup_db().await;
    let registry = UnlimitedBalanceRegistry::new(db.clone());
    let account = AccountId::new();

    registry.grant(&ctx(), account).await.unwrap();
    registry.revoke(&ctx(), account).await.unwrap();
    registry.grant(&ctx(), account).await.unwrap();
    assert!(registry.is_exempt(&ctx(), account).await.unwrap());

    let row = unlimited_balances::Entity::find_by_id(account.into_inner())
        .one(&db)
        .await
        .unwrap()
        .expect("exemption row");
    assert!(row.revoked_at.is_none());
}

#[tokio::test]
async fn test_exemptions_are_per_account() {
    let db = setup_db().await;
    let registry = UnlimitedBalanceRegistry::new(db);
    let exempt = AccountId::new();
    let other = AccountId::new();

    registry.grant(&ctx(), exempt).await.unwrap();
    assert!(registry.is_exempt(&ctx(), exempt).await.unwrap());
    assert!(!registry.is_exempt(&ctx(), other).await.unwrap());
}
