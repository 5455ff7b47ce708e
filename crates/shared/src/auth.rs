//! The authenticated principal handed to the core by the identity layer.
//!
//! Bearer credentials are verified upstream against the published key set.
//! The core only ever sees the resulting account identifier and scope grants,
//! and trusts them as given.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::AccountId;

/// Scope required to create payments on behalf of other accounts.
pub const PAYMENT_CREATE_SCOPE: &str = "payment_create";

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Account the credential was issued to.
    pub account_id: AccountId,
    /// Capabilities granted to the credential.
    #[serde(default)]
    pub scopes: BTreeSet<String>,
}

impl Principal {
    /// Creates a principal without any scope grants.
    #[must_use]
    pub const fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            scopes: BTreeSet::new(),
        }
    }

    /// Creates a principal holding the given scopes.
    #[must_use]
    pub fn with_scopes<I, S>(account_id: AccountId, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            account_id,
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the principal was granted `scope`.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }
}
