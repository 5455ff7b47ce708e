//! Property-based tests for transfer planning.
//!
//! Balances are projected in memory by applying planned deltas, which is
//! exactly what the store-backed engine does inside its unit of work.

use std::collections::HashMap;

use proptest::prelude::*;
use uuid::Uuid;

use bank_shared::types::AccountId;

use crate::ledger::transfer::TransferPlan;

fn account(n: u8) -> AccountId {
    AccountId::from_uuid(Uuid::from_u128(u128::from(n)))
}

/// Strategy for a transfer between a small set of accounts.
fn arb_transfer() -> impl Strategy<Value = (u8, u8, i64)> {
    (0u8..6, 0u8..6, 1i64..5_000)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Deltas of every plan sum to zero.
    #[test]
    fn prop_deltas_conserve_money((from, to, amount) in arb_transfer()) {
        let plan = TransferPlan::new(account(from), account(to), amount, "", 100).unwrap();
        let sum: i64 = plan.deltas().iter().map(|(_, delta)| delta).sum();
        prop_assert_eq!(sum, 0);
    }

    /// Every delta touches an account the plan locks.
    #[test]
    fn prop_deltas_stay_inside_lock_set((from, to, amount) in arb_transfer()) {
        let plan = TransferPlan::new(account(from), account(to), amount, "", 100).unwrap();
        for (account, _) in plan.deltas() {
            prop_assert!(plan.locks().contains(account));
        }
    }

    /// Any sequence of non-exempt transfers keeps the total and never overdraws.
    #[test]
    fn prop_sequence_conserves_total(
        transfers in proptest::collection::vec(arb_transfer(), 0..64),
        seed in 0i64..10_000,
    ) {
        let mut balances: HashMap<AccountId, i64> = HashMap::new();
        balances.insert(account(0), seed);
        balances.insert(account(1), seed / 2);
        let total_before: i64 = balances.values().sum();

        for (from, to, amount) in transfers {
            let plan = TransferPlan::new(account(from), account(to), amount, "", 100).unwrap();
            let balance = balances.get(&plan.from()).copied();
            if plan.check_affordability(balance, false).is_err() {
                continue;
            }
            for (account, delta) in plan.deltas() {
                *balances.entry(account).or_insert(0) += delta;
            }
        }

        let total_after: i64 = balances.values().sum();
        prop_assert_eq!(total_before, total_after);
        prop_assert!(balances.values().all(|b| *b >= 0));
    }
}
