//! Owner-gated token approval whitelist.
//!
//! Listing a token pair and earning reward tokens both require the pair's
//! tokens to be on this whitelist. Only the registry owner may change it;
//! the owner role is a single-writer field validated on every privileged
//! call.

use std::collections::HashSet;

use opendutch_types::{AccountId, OpendutchError, Result, Token, TokenPair};

/// Whitelist of tokens eligible for auctions and reward issuance.
#[derive(Debug)]
pub struct ApprovalRegistry {
    owner: AccountId,
    approved: HashSet<Token>,
}

impl ApprovalRegistry {
    /// Create a registry administered by `owner`, with an empty whitelist.
    #[must_use]
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            approved: HashSet::new(),
        }
    }

    #[must_use]
    pub fn owner(&self) -> AccountId {
        self.owner
    }

    /// Hand the registry to a new owner. Current-owner only.
    pub fn update_owner(&mut self, caller: AccountId, new_owner: AccountId) -> Result<()> {
        self.ensure_owner(caller)?;
        self.owner = new_owner;
        Ok(())
    }

    /// Add or remove a token from the whitelist. Owner only.
    pub fn update_approval_of_token(
        &mut self,
        caller: AccountId,
        token: &str,
        approved: bool,
    ) -> Result<()> {
        self.ensure_owner(caller)?;
        if approved {
            self.approved.insert(token.to_string());
        } else {
            self.approved.remove(token);
        }
        tracing::debug!(token, approved, "token approval updated");
        Ok(())
    }

    #[must_use]
    pub fn is_approved(&self, token: &str) -> bool {
        self.approved.contains(token)
    }

    /// Whether both sides of a pair are whitelisted.
    #[must_use]
    pub fn pair_approved(&self, pair: &TokenPair) -> bool {
        self.is_approved(&pair.sell) && self.is_approved(&pair.buy)
    }

    /// Reject callers other than the owner.
    pub fn ensure_owner(&self, caller: AccountId) -> Result<()> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(OpendutchError::NotOwner)
        }
    }
}
