//! Property-based tests for lock ordering.

use proptest::prelude::*;
use uuid::Uuid;

use bank_shared::types::AccountId;

use crate::ledger::lock::LockSet;

fn arb_account() -> impl Strategy<Value = AccountId> {
    any::<u128>().prop_map(|n| AccountId::from_uuid(Uuid::from_u128(n)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The acquisition order never depends on the transfer direction.
    #[test]
    fn prop_order_is_direction_independent(a in arb_account(), b in arb_account()) {
        prop_assert_eq!(LockSet::for_transfer(a, b), LockSet::for_transfer(b, a));
    }

    /// Accounts are strictly ascending, so no row is locked twice.
    #[test]
    fn prop_accounts_strictly_ascending(
        accounts in proptest::collection::vec(arb_account(), 0..16)
    ) {
        let locks = LockSet::from_accounts(accounts.clone());
        prop_assert!(locks.accounts().windows(2).all(|w| w[0] < w[1]));
        for account in accounts {
            prop_assert!(locks.contains(account));
        }
    }

    /// A transfer locks exactly its distinct parties.
    #[test]
    fn prop_transfer_lock_count(a in arb_account(), b in arb_account()) {
        let expected = if a == b { 1 } else { 2 };
        prop_assert_eq!(LockSet::for_transfer(a, b).len(), expected);
    }
}
