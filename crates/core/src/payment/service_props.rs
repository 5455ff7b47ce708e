//! Property-based tests for PaymentWorkflowService.

use proptest::prelude::*;
use uuid::Uuid;

use bank_shared::types::AccountId;

use crate::payment::error::PaymentError;
use crate::payment::service::PaymentWorkflowService;
use crate::payment::types::{PaymentAction, PaymentStatus};

fn arb_status() -> impl Strategy<Value = PaymentStatus> {
    prop_oneof![
        Just(PaymentStatus::Pending),
        Just(PaymentStatus::Completed),
        Just(PaymentStatus::Cancelled),
    ]
}

fn arb_account() -> impl Strategy<Value = AccountId> {
    any::<u128>().prop_map(|n| AccountId::from_uuid(Uuid::from_u128(n)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Both actions agree with the transition table.
    #[test]
    fn prop_actions_match_transition_table(status in arb_status(), who in arb_account()) {
        let completed = PaymentWorkflowService::complete(status, who);
        prop_assert_eq!(
            completed.is_ok(),
            PaymentWorkflowService::is_valid_transition(status, PaymentStatus::Completed)
        );

        let cancelled = PaymentWorkflowService::cancel(status, who);
        prop_assert_eq!(
            cancelled.is_ok(),
            PaymentWorkflowService::is_valid_transition(status, PaymentStatus::Cancelled)
        );
    }

    /// Terminal statuses reject every action and report where they are.
    #[test]
    fn prop_terminal_status_rejects_all(status in arb_status(), who in arb_account()) {
        prop_assume!(status.is_terminal());

        match PaymentWorkflowService::complete(status, who) {
            Err(PaymentError::InvalidTransition { from, to }) => {
                prop_assert_eq!(from, status);
                prop_assert_eq!(to, PaymentStatus::Completed);
            }
            other => prop_assert!(false, "Expected InvalidTransition, got {:?}", other),
        }
        prop_assert!(PaymentWorkflowService::cancel(status, who).is_err());
    }

    /// At most one transition ever leaves Pending: whatever happens first,
    /// every later action fails.
    #[test]
    fn prop_pending_leaves_once(
        first_is_complete in any::<bool>(),
        later in prop::collection::vec(any::<bool>(), 1..8),
        who in arb_account(),
    ) {
        let first = if first_is_complete {
            PaymentWorkflowService::complete(PaymentStatus::Pending, who)
        } else {
            PaymentWorkflowService::cancel(PaymentStatus::Pending, who)
        };
        let status = first.map(|action| action.new_status());
        prop_assert!(status.is_ok());
        let status = status.unwrap_or(PaymentStatus::Pending);

        for complete in later {
            let next = if complete {
                PaymentWorkflowService::complete(status, who)
            } else {
                PaymentWorkflowService::cancel(status, who)
            };
            prop_assert!(next.is_err());
        }
    }

    /// Actions carry the acting account.
    #[test]
    fn prop_action_records_actor(who in arb_account()) {
        match PaymentWorkflowService::complete(PaymentStatus::Pending, who) {
            Ok(PaymentAction::Complete { executed_by, .. }) => prop_assert_eq!(executed_by, who),
            other => prop_assert!(false, "Expected Complete, got {:?}", other),
        }
        match PaymentWorkflowService::cancel(PaymentStatus::Pending, who) {
            Ok(PaymentAction::Cancel { cancelled_by, .. }) => prop_assert_eq!(cancelled_by, who),
            other => prop_assert!(false, "Expected Cancel, got {:?}", other),
        }
    }
}
