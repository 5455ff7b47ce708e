//! Database-backed enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment status as stored in `payments.status`.
///
/// Decoding any other string fails the query instead of yielding a
/// half-valid row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl From<PaymentStatus> for bank_core::payment::PaymentStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::Completed => Self::Completed,
            PaymentStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<bank_core::payment::PaymentStatus> for PaymentStatus {
    fn from(status: bank_core::payment::PaymentStatus) -> Self {
        match status {
            bank_core::payment::PaymentStatus::Pending => Self::Pending,
            bank_core::payment::PaymentStatus::Completed => Self::Completed,
            bank_core::payment::PaymentStatus::Cancelled => Self::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_string_values_match_core() {
        for status in PaymentStatus::iter() {
            let core: bank_core::payment::PaymentStatus = status.into();
            assert_eq!(status.to_value(), core.as_str());
            assert_eq!(PaymentStatus::from(core), status);
        }
    }

    #[test]
    fn test_unknown_value_is_rejected() {
        assert!(PaymentStatus::try_from_value(&"unpaid".to_string()).is_err());
        assert!(PaymentStatus::try_from_value(&"CANCELLED".to_string()).is_err());
        assert_eq!(
            PaymentStatus::try_from_value(&"cancelled".to_string()).unwrap(),
            PaymentStatus::Cancelled
        );
    }
}
