//! Affordability rule shared by the ledger and the transfer engine.

/// Returns true if an account can pay `amount_cents`.
///
/// An exempt account can always pay. Otherwise the stored balance must cover
/// the amount; an account without a balance row cannot pay anything.
#[must_use]
pub fn can_afford(balance_cents: Option<i64>, exempt: bool, amount_cents: i64) -> bool {
    if exempt {
        return true;
    }
    balance_cents.is_some_and(|balance| balance >= amount_cents)
}
