//! Deterministic lock ordering for balance rows.
//!
//! Every unit of work that locks more than one balance row acquires the
//! locks in ascending account order. Two transfers moving money in opposite
//! directions between the same pair therefore request the same first lock,
//! and a cyclic wait between them cannot form.

use bank_shared::types::AccountId;

/// The balance rows a transfer must hold, in acquisition order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockSet {
    accounts: Vec<AccountId>,
}

impl LockSet {
    /// Lock set for a transfer from `from` to `to`.
    ///
    /// A self-transfer locks its single account once.
    #[must_use]
    pub fn for_transfer(from: AccountId, to: AccountId) -> Self {
        Self::from_accounts([from, to])
    }

    /// Lock set for an arbitrary group of accounts.
    #[must_use]
    pub fn from_accounts<I>(accounts: I) -> Self
    where
        I: IntoIterator<Item = AccountId>,
    {
        let mut accounts: Vec<AccountId> = accounts.into_iter().collect();
        accounts.sort_unstable();
        accounts.dedup();
        Self { accounts }
    }

    /// Accounts in the order their locks must be taken.
    #[must_use]
    pub fn accounts(&self) -> &[AccountId] {
        &self.accounts
    }

    /// Returns true if `account` is covered by this lock set.
    #[must_use]
    pub fn contains(&self, account: AccountId) -> bool {
        self.accounts.binary_search(&account).is_ok()
    }

    /// Number of distinct rows to lock.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns true if there is nothing to lock.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl<'a> IntoIterator for &'a LockSet {
    type Item = &'a AccountId;
    type IntoIter = std::slice::Iter<'a, AccountId>;

    fn into_iter(self) -> Self::IntoIter {
        self.accounts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn account(n: u128) -> AccountId {
        AccountId::from_uuid(Uuid::from_u128(n))
    }

    #[test]
    fn test_opposite_directions_share_order() {
        let a = account(7);
        let b = account(3);
        assert_eq!(LockSet::for_transfer(a, b), LockSet::for_transfer(b, a));
        assert_eq!(LockSet::for_transfer(a, b).accounts(), &[b, a]);
    }

    #[test]
    fn test_self_transfer_locks_once() {
        let a = account(1);
        let locks = LockSet::for_transfer(a, a);
        assert_eq!(locks.len(), 1);
        assert!(locks.contains(a));
    }

    #[test]
    fn test_contains() {
        let locks = LockSet::for_transfer(account(1), account(2));
        assert!(locks.contains(account(1)));
        assert!(locks.contains(account(2)));
        assert!(!locks.contains(account(3)));
    }
}
