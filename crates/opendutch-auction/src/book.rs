//! Per-direction auction bookkeeping.
//!
//! One [`AuctionSeries`] tracks a single direction of a market (e.g.
//! ETH→GNO) across successive auction indices: cumulative sell volume for
//! the current and the next auction, cumulative matched buy volume,
//! per-account balances, running-claim markers, and the frozen closing
//! record of every finished auction. The reciprocal direction is a fully
//! independent series; the engine links the two only through the shared
//! market index.

use std::collections::HashMap;
use std::fmt;

use opendutch_types::{AccountId, AuctionIndex, Fraction, OpendutchError, Result};

/// Lifecycle of one directed auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuctionState {
    /// Scheduled (or waiting for funding) but not yet running.
    Pending,
    /// Accepting buy orders against the falling price.
    Running,
    /// Closing price frozen; only claims remain.
    Cleared,
}

impl fmt::Display for AuctionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Running => write!(f, "RUNNING"),
            Self::Cleared => write!(f, "CLEARED"),
        }
    }
}

/// The frozen record of a finished auction: exact volumes at the moment of
/// clearing. The closing price is exactly `buy_volume / sell_volume`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosedAuction {
    pub sell_volume: u128,
    pub buy_volume: u128,
    pub closing_price: Fraction,
}

/// Bookkeeping for one direction of a market.
#[derive(Debug, Default)]
pub struct AuctionSeries {
    sell_volume_current: u128,
    sell_volume_next: u128,
    buy_volume: u128,
    seller_balances: HashMap<(AuctionIndex, AccountId), u128>,
    buyer_balances: HashMap<(AuctionIndex, AccountId), u128>,
    /// Funds already returned to a buyer while the auction was running.
    claimed_amounts: HashMap<(AuctionIndex, AccountId), u128>,
    /// Closing records by index. Index 0 holds the seeded "previous
    /// closing price" of a freshly listed pair (volumes zero).
    closed: HashMap<AuctionIndex, ClosedAuction>,
}

impl AuctionSeries {
    /// Fresh series seeded with the previous closing price at index 0.
    #[must_use]
    pub fn seeded(last_closing: Fraction) -> Self {
        let mut series = Self::default();
        series.closed.insert(
            AuctionIndex::SEED,
            ClosedAuction {
                sell_volume: 0,
                buy_volume: 0,
                closing_price: last_closing,
            },
        );
        series
    }

    #[must_use]
    pub fn sell_volume_current(&self) -> u128 {
        self.sell_volume_current
    }

    #[must_use]
    pub fn sell_volume_next(&self) -> u128 {
        self.sell_volume_next
    }

    #[must_use]
    pub fn buy_volume(&self) -> u128 {
        self.buy_volume
    }

    /// Add fee-net sell funds to the current auction.
    pub fn add_sell_current(
        &mut self,
        index: AuctionIndex,
        account: AccountId,
        amount: u128,
    ) -> Result<()> {
        self.sell_volume_current = self
            .sell_volume_current
            .checked_add(amount)
            .ok_or(OpendutchError::BalanceOverflow)?;
        let entry = self.seller_balances.entry((index, account)).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(OpendutchError::BalanceOverflow)?;
        Ok(())
    }

    /// Add fee-net sell funds to the next auction.
    pub fn add_sell_next(
        &mut self,
        index: AuctionIndex,
        account: AccountId,
        amount: u128,
    ) -> Result<()> {
        self.sell_volume_next = self
            .sell_volume_next
            .checked_add(amount)
            .ok_or(OpendutchError::BalanceOverflow)?;
        let entry = self.seller_balances.entry((index, account)).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(OpendutchError::BalanceOverflow)?;
        Ok(())
    }

    /// Record an accepted buy.
    pub fn add_buy(&mut self, index: AuctionIndex, account: AccountId, amount: u128) -> Result<()> {
        self.buy_volume = self
            .buy_volume
            .checked_add(amount)
            .ok_or(OpendutchError::BalanceOverflow)?;
        let entry = self.buyer_balances.entry((index, account)).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(OpendutchError::BalanceOverflow)?;
        Ok(())
    }

    /// Freeze the closing record for `index` from the live volumes.
    /// A zero-sell auction (the dormant reciprocal) closes at the zero
    /// price.
    pub fn close(&mut self, index: AuctionIndex) {
        let closing_price = Fraction::checked(self.buy_volume, self.sell_volume_current)
            .unwrap_or(Fraction::ZERO);
        self.closed.insert(
            index,
            ClosedAuction {
                sell_volume: self.sell_volume_current,
                buy_volume: self.buy_volume,
                closing_price,
            },
        );
    }

    /// Whether `index` has a frozen closing record. The seed index reads
    /// as closed.
    #[must_use]
    pub fn is_closed(&self, index: AuctionIndex) -> bool {
        self.closed.contains_key(&index)
    }

    #[must_use]
    pub fn closed_auction(&self, index: AuctionIndex) -> Option<&ClosedAuction> {
        self.closed.get(&index)
    }

    /// Frozen closing price of `index`, if it cleared.
    #[must_use]
    pub fn closing_price(&self, index: AuctionIndex) -> Option<Fraction> {
        self.closed.get(&index).map(|c| c.closing_price)
    }

    /// Roll into the next auction round: queued sell volume becomes
    /// current, buy volume resets.
    pub fn roll(&mut self) {
        self.sell_volume_current = self.sell_volume_next;
        self.sell_volume_next = 0;
        self.buy_volume = 0;
    }

    #[must_use]
    pub fn seller_balance(&self, index: AuctionIndex, account: AccountId) -> u128 {
        self.seller_balances
            .get(&(index, account))
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn buyer_balance(&self, index: AuctionIndex, account: AccountId) -> u128 {
        self.buyer_balances
            .get(&(index, account))
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn claimed_amount(&self, index: AuctionIndex, account: AccountId) -> u128 {
        self.claimed_amounts
            .get(&(index, account))
            .copied()
            .unwrap_or(0)
    }

    /// Consume a seller balance (settlement). Returns the consumed amount;
    /// zero when there was nothing.
    pub fn take_seller_balance(&mut self, index: AuctionIndex, account: AccountId) -> u128 {
        self.seller_balances.remove(&(index, account)).unwrap_or(0)
    }

    /// Consume a buyer balance and its running-claim marker (settlement).
    pub fn take_buyer_balance(&mut self, index: AuctionIndex, account: AccountId) -> u128 {
        self.claimed_amounts.remove(&(index, account));
        self.buyer_balances.remove(&(index, account)).unwrap_or(0)
    }

    /// Record funds returned to a buyer while the auction still runs.
    pub fn record_buyer_claim(
        &mut self,
        index: AuctionIndex,
        account: AccountId,
        amount: u128,
    ) -> Result<()> {
        let entry = self.claimed_amounts.entry((index, account)).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(OpendutchError::BalanceOverflow)?;
        Ok(())
    }
}
