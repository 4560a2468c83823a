//! The time-locked reward token.
//!
//! Claims against cleared auctions mint reward tokens 1:1 against the
//! base-asset value of the claim. Minted tokens are locked; an account
//! unlocks its whole locked amount at once, which starts a 24 h countdown,
//! and only after the countdown may the unlocked amount be withdrawn into
//! the spendable balance. Owner and minter are single-writer role fields
//! validated on every privileged call; reassigning the minter after an
//! ownership handover requires the new owner.

use std::collections::HashMap;
use std::sync::Arc;

use opendutch_types::{
    AccountId, Clock, OpendutchError, Result, Timestamp, constants,
};

/// Pending-unlock bucket: amount waiting out its countdown.
#[derive(Debug, Clone, Copy, Default)]
struct Unlocked {
    amount: u128,
    withdrawal_time: Timestamp,
}

/// The reward token: mint → lock → unlock → withdraw.
pub struct RewardToken {
    owner: AccountId,
    minter: AccountId,
    clock: Arc<dyn Clock>,
    unlock_window_secs: i64,
    locked: HashMap<AccountId, u128>,
    unlocked: HashMap<AccountId, Unlocked>,
    balances: HashMap<AccountId, u128>,
}

impl RewardToken {
    /// Create the token with its initial owner and minter roles.
    #[must_use]
    pub fn new(owner: AccountId, minter: AccountId, clock: Arc<dyn Clock>) -> Self {
        Self {
            owner,
            minter,
            clock,
            unlock_window_secs: constants::REWARD_UNLOCK_WINDOW_SECS,
            locked: HashMap::new(),
            unlocked: HashMap::new(),
            balances: HashMap::new(),
        }
    }

    #[must_use]
    pub fn owner(&self) -> AccountId {
        self.owner
    }

    #[must_use]
    pub fn minter(&self) -> AccountId {
        self.minter
    }

    /// Hand the token to a new owner. Current-owner only.
    pub fn update_owner(&mut self, caller: AccountId, new_owner: AccountId) -> Result<()> {
        if caller != self.owner {
            return Err(OpendutchError::NotOwner);
        }
        self.owner = new_owner;
        Ok(())
    }

    /// Appoint a new minter. Owner only — after an ownership handover this
    /// is the *new* owner's call.
    pub fn update_minter(&mut self, caller: AccountId, new_minter: AccountId) -> Result<()> {
        if caller != self.owner {
            return Err(OpendutchError::NotOwner);
        }
        self.minter = new_minter;
        Ok(())
    }

    /// Mint `amount` into `account`'s locked balance. Minter only; the
    /// unlock countdown is untouched.
    pub fn mint(&mut self, caller: AccountId, account: AccountId, amount: u128) -> Result<()> {
        if caller != self.minter {
            return Err(OpendutchError::NotMinter);
        }
        if amount == 0 {
            return Ok(());
        }
        let entry = self.locked.entry(account).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(OpendutchError::BalanceOverflow)?;
        tracing::debug!(%account, amount, "reward tokens minted and locked");
        Ok(())
    }

    /// Move the whole locked amount into the pending-unlock bucket and
    /// (re)start the 24 h countdown. With nothing locked this is a no-op
    /// reporting zero — the "unlock before the auction cleared" path.
    /// Returns the total pending amount and its withdrawal deadline.
    pub fn unlock_tokens(&mut self, account: AccountId) -> Result<(u128, Timestamp)> {
        let locked = self.locked.get(&account).copied().unwrap_or(0);
        if locked == 0 {
            let pending = self.unlocked.get(&account).copied().unwrap_or_default();
            return Ok((pending.amount, pending.withdrawal_time));
        }
        self.locked.remove(&account);
        let entry = self.unlocked.entry(account).or_default();
        entry.amount = entry
            .amount
            .checked_add(locked)
            .ok_or(OpendutchError::BalanceOverflow)?;
        entry.withdrawal_time = self.clock.now() + self.unlock_window_secs;
        tracing::debug!(%account, amount = entry.amount, deadline = entry.withdrawal_time, "reward tokens unlocked");
        Ok((entry.amount, entry.withdrawal_time))
    }

    /// Withdraw the pending-unlock amount into the spendable balance.
    /// Rejected while the countdown runs and when nothing is pending; the
    /// amount becomes spendable exactly once.
    pub fn withdraw_unlocked_tokens(&mut self, account: AccountId) -> Result<u128> {
        let pending = self.unlocked.get(&account).copied().unwrap_or_default();
        if pending.amount == 0 {
            return Err(OpendutchError::NothingToWithdraw);
        }
        let now = self.clock.now();
        if now < pending.withdrawal_time {
            return Err(OpendutchError::TooEarlyToWithdraw {
                deadline: pending.withdrawal_time,
                now,
            });
        }
        self.unlocked.remove(&account);
        let entry = self.balances.entry(account).or_insert(0);
        *entry = entry
            .checked_add(pending.amount)
            .ok_or(OpendutchError::BalanceOverflow)?;
        tracing::debug!(%account, amount = pending.amount, "reward tokens withdrawn");
        Ok(pending.amount)
    }

    /// Locked (not yet unlocked) reward balance.
    #[must_use]
    pub fn locked_token_balances(&self, account: AccountId) -> u128 {
        self.locked.get(&account).copied().unwrap_or(0)
    }

    /// Pending-unlock amount and its withdrawal deadline.
    #[must_use]
    pub fn unlocked_tokens(&self, account: AccountId) -> (u128, Timestamp) {
        let pending = self.unlocked.get(&account).copied().unwrap_or_default();
        (pending.amount, pending.withdrawal_time)
    }

    /// Spendable (withdrawn) reward balance.
    #[must_use]
    pub fn balance_of(&self, account: AccountId) -> u128 {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    /// Everything ever minted and not burned: locked + pending + spendable.
    #[must_use]
    pub fn total_minted(&self) -> u128 {
        let locked: u128 = self.locked.values().sum();
        let pending: u128 = self.unlocked.values().map(|u| u.amount).sum();
        let spendable: u128 = self.balances.values().sum();
        locked + pending + spendable
    }
}

#[cfg(test)]
mod tests {
    use opendutch_types::SimClock;

    use super::*;

    const T0: Timestamp = 1_700_000_000;
    const DAY: i64 = 86_400;

    fn acct(n: u8) -> AccountId {
        AccountId::from_bytes([n; 16])
    }

    fn setup() -> (SimClock, RewardToken, AccountId, AccountId) {
        let clock = SimClock::new(T0);
        let owner = acct(0);
        let minter = acct(1);
        let token = RewardToken::new(owner, minter, Arc::new(clock.clone()));
        (clock, token, owner, minter)
    }

    #[test]
    fn mint_is_minter_gated() {
        let (_clock, mut token, owner, minter) = setup();
        let user = acct(5);

        token.mint(minter, user, 100).unwrap();
        assert_eq!(token.locked_token_balances(user), 100);

        let err = token.mint(owner, user, 100).unwrap_err();
        assert!(matches!(err, OpendutchError::NotMinter));
    }

    #[test]
    fn unlock_with_nothing_locked_reports_zero() {
        let (_clock, mut token, _owner, _minter) = setup();
        let user = acct(5);

        let (amount, deadline) = token.unlock_tokens(user).unwrap();
        assert_eq!(amount, 0);
        assert_eq!(deadline, 0);
        assert_eq!(token.total_minted(), 0);
    }

    #[test]
    fn unlock_starts_countdown() {
        let (clock, mut token, _owner, minter) = setup();
        let user = acct(5);
        token.mint(minter, user, 995).unwrap();

        let (amount, deadline) = token.unlock_tokens(user).unwrap();
        assert_eq!(amount, 995);
        assert_eq!(deadline, clock.now() + DAY);
        assert_eq!(token.locked_token_balances(user), 0);
        assert_eq!(token.unlocked_tokens(user), (995, deadline));
    }

    #[test]
    fn withdraw_before_deadline_rejected() {
        let (clock, mut token, _owner, minter) = setup();
        let user = acct(5);
        token.mint(minter, user, 995).unwrap();
        token.unlock_tokens(user).unwrap();

        clock.advance(DAY - 5);
        let err = token.withdraw_unlocked_tokens(user).unwrap_err();
        assert!(matches!(err, OpendutchError::TooEarlyToWithdraw { .. }));
        // the rejection changed nothing
        assert_eq!(token.unlocked_tokens(user).0, 995);
        assert_eq!(token.balance_of(user), 0);
    }

    #[test]
    fn withdraw_after_deadline_spendable_exactly_once() {
        let (clock, mut token, _owner, minter) = setup();
        let user = acct(5);
        token.mint(minter, user, 995).unwrap();
        token.unlock_tokens(user).unwrap();

        clock.advance(DAY + 5);
        assert_eq!(token.withdraw_unlocked_tokens(user).unwrap(), 995);
        assert_eq!(token.balance_of(user), 995);
        assert_eq!(token.unlocked_tokens(user).0, 0);

        let err = token.withdraw_unlocked_tokens(user).unwrap_err();
        assert!(matches!(err, OpendutchError::NothingToWithdraw));
        assert_eq!(token.balance_of(user), 995);
    }

    #[test]
    fn unlock_again_restarts_countdown_and_accumulates() {
        let (clock, mut token, _owner, minter) = setup();
        let user = acct(5);
        token.mint(minter, user, 100).unwrap();
        token.unlock_tokens(user).unwrap();

        clock.advance(DAY - 100);
        token.mint(minter, user, 50).unwrap();
        let (amount, deadline) = token.unlock_tokens(user).unwrap();
        assert_eq!(amount, 150);
        assert_eq!(deadline, clock.now() + DAY);

        // the first bucket's nearly-elapsed countdown no longer applies
        clock.advance(200);
        assert!(matches!(
            token.withdraw_unlocked_tokens(user),
            Err(OpendutchError::TooEarlyToWithdraw { .. })
        ));
    }

    #[test]
    fn owner_then_minter_handover() {
        let (_clock, mut token, owner, _minter) = setup();
        let next = acct(7);

        token.update_owner(owner, next).unwrap();
        assert_eq!(token.owner(), next);

        // the old owner can no longer appoint minters
        let err = token.update_minter(owner, next).unwrap_err();
        assert!(matches!(err, OpendutchError::NotOwner));

        // the new owner can
        token.update_minter(next, next).unwrap();
        assert_eq!(token.minter(), next);

        let user = acct(8);
        token.mint(next, user, 10).unwrap();
        assert_eq!(token.locked_token_balances(user), 10);
    }

    #[test]
    fn total_minted_tracks_all_buckets() {
        let (clock, mut token, _owner, minter) = setup();
        let a = acct(5);
        let b = acct(6);
        token.mint(minter, a, 100).unwrap();
        token.mint(minter, b, 200).unwrap();
        assert_eq!(token.total_minted(), 300);

        token.unlock_tokens(a).unwrap();
        clock.advance(DAY);
        token.withdraw_unlocked_tokens(a).unwrap();
        assert_eq!(token.total_minted(), 300);
        assert_eq!(token.balance_of(a), 100);
        assert_eq!(token.locked_token_balances(b), 200);
    }
}
