//! Per-(account, token) balance ledger.
//!
//! Balances are integer smallest units (`u128`). Every mutation either
//! completes or fails with no state change; underflow and overflow are
//! explicit errors, never wraps.

use std::collections::HashMap;

use opendutch_types::{AccountId, OpendutchError, Result, Token};

/// Spendable token balances for all accounts.
#[derive(Debug, Default)]
pub struct TokenLedger {
    balances: HashMap<(AccountId, Token), u128>,
}

impl TokenLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `account` in `token`. Missing entries read as zero.
    #[must_use]
    pub fn balance_of(&self, account: AccountId, token: &str) -> u128 {
        self.balances
            .get(&(account, token.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Credit `amount` to an account, creating the entry if needed.
    ///
    /// # Errors
    /// [`OpendutchError::BalanceOverflow`] if the balance would exceed
    /// `u128::MAX`.
    pub fn credit(&mut self, account: AccountId, token: &str, amount: u128) -> Result<()> {
        let entry = self
            .balances
            .entry((account, token.to_string()))
            .or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(OpendutchError::BalanceOverflow)?;
        Ok(())
    }

    /// Debit `amount` from an account.
    ///
    /// # Errors
    /// [`OpendutchError::InsufficientBalance`] if the account holds less
    /// than `amount`.
    pub fn debit(&mut self, account: AccountId, token: &str, amount: u128) -> Result<()> {
        let available = self.balance_of(account, token);
        if available < amount {
            return Err(OpendutchError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if let Some(entry) = self.balances.get_mut(&(account, token.to_string())) {
            *entry = available - amount;
        }
        Ok(())
    }

    /// Deposit external funds into the ledger.
    pub fn deposit(&mut self, account: AccountId, token: &str, amount: u128) -> Result<()> {
        tracing::debug!(%account, token, amount, "ledger deposit");
        self.credit(account, token, amount)
    }

    /// Withdraw funds out of the ledger.
    pub fn withdraw(&mut self, account: AccountId, token: &str, amount: u128) -> Result<()> {
        tracing::debug!(%account, token, amount, "ledger withdraw");
        self.debit(account, token, amount)
    }

    /// Move `amount` between two accounts atomically.
    pub fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        token: &str,
        amount: u128,
    ) -> Result<()> {
        // Validate the debit before touching either entry so a failed
        // transfer leaves no trace.
        let available = self.balance_of(from, token);
        if available < amount {
            return Err(OpendutchError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let to_balance = self.balance_of(to, token);
        let credited = to_balance
            .checked_add(amount)
            .ok_or(OpendutchError::BalanceOverflow)?;
        self.balances.insert((from, token.to_string()), available - amount);
        self.balances.insert((to, token.to_string()), credited);
        Ok(())
    }

    /// Total supply of `token` held across all accounts.
    #[must_use]
    pub fn total_supply(&self, token: &str) -> u128 {
        self.balances
            .iter()
            .filter(|((_, t), _)| t == token)
            .map(|(_, amount)| amount)
            .sum()
    }
}
