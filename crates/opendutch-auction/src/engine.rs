//! The auction engine.
//!
//! Owns every market's auction lifecycle: pair listing, sell/buy order
//! routing, clearing detection, reciprocal handling, and auction-index
//! advancement. Funds move only through the [`TokenLedger`] passed into
//! each call; approval checks go through the [`ApprovalRegistry`]; time
//! comes from the injected clock. Each operation validates fully before
//! mutating, so a rejection leaves no trace.

use std::collections::HashMap;
use std::sync::Arc;

use opendutch_ledger::{ApprovalRegistry, TokenLedger};
use opendutch_types::{
    AccountId, AuctionIndex, Clock, ExchangeConfig, Fraction, OpendutchError, Result, Timestamp,
    Token, TokenPair,
};

use crate::book::{AuctionSeries, AuctionState, ClosedAuction};
use crate::curve::{self, CurrentPrice};

/// What happened to a posted buy order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyOutcome {
    /// Amount actually matched and debited.
    pub accepted: u128,
    /// Overpayment never taken from the buyer.
    pub refunded: u128,
    /// Whether this order (or the price cutoff) cleared the auction.
    pub cleared: bool,
}

/// Shared per-market scheduling state. Both directions of a market run on
/// the same index and start time; clearing is tracked per direction.
#[derive(Debug, Clone, Copy)]
struct Market {
    index: AuctionIndex,
    start: Option<Timestamp>,
}

/// The Dutch-auction engine for all listed markets.
pub struct AuctionEngine {
    config: ExchangeConfig,
    clock: Arc<dyn Clock>,
    markets: HashMap<(Token, Token), Market>,
    series: HashMap<TokenPair, AuctionSeries>,
    collected_fees: HashMap<Token, u128>,
}

impl AuctionEngine {
    #[must_use]
    pub fn new(config: ExchangeConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            markets: HashMap::new(),
            series: HashMap::new(),
            collected_fees: HashMap::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Owner-only: adjust the listing threshold.
    pub fn update_threshold_new_token_pair(
        &mut self,
        approvals: &ApprovalRegistry,
        caller: AccountId,
        threshold: u128,
    ) -> Result<()> {
        approvals.ensure_owner(caller)?;
        self.config.threshold_new_token_pair = threshold;
        Ok(())
    }

    /// Owner-only: adjust the follow-up auction threshold.
    pub fn update_threshold_new_auction(
        &mut self,
        approvals: &ApprovalRegistry,
        caller: AccountId,
        threshold: u128,
    ) -> Result<()> {
        approvals.ensure_owner(caller)?;
        self.config.threshold_new_auction = threshold;
        Ok(())
    }

    // =====================================================================
    // Listing
    // =====================================================================

    /// List a new market and fund its first auction.
    ///
    /// `funding_a` seeds the `token_a`→`token_b` direction, `funding_b`
    /// the reciprocal. `initial_price` is the seeded "previous closing
    /// price" of the `token_a`→`token_b` direction (buy units per sell
    /// unit); the reciprocal is seeded with its inverse. The first auction
    /// starts `new_pair_delay_secs` after listing.
    #[allow(clippy::too_many_arguments)]
    pub fn add_token_pair(
        &mut self,
        ledger: &mut TokenLedger,
        approvals: &ApprovalRegistry,
        caller: AccountId,
        token_a: &str,
        token_b: &str,
        funding_a: u128,
        funding_b: u128,
        initial_price: Fraction,
    ) -> Result<()> {
        let forward = TokenPair::new(token_a, token_b);
        if forward.is_degenerate() {
            return Err(OpendutchError::InvalidOrder {
                reason: "pair must name two distinct tokens".into(),
            });
        }
        if initial_price.is_zero() {
            return Err(OpendutchError::InvalidPrice);
        }
        if !approvals.is_approved(token_a) {
            return Err(OpendutchError::TokenNotApproved(token_a.to_string()));
        }
        if !approvals.is_approved(token_b) {
            return Err(OpendutchError::TokenNotApproved(token_b.to_string()));
        }
        let key = forward.market();
        if self.markets.contains_key(&key) {
            return Err(OpendutchError::PairAlreadyListed(forward));
        }

        let reverse = forward.flipped();
        let inverse_price = initial_price
            .inverse()
            .ok_or(OpendutchError::InvalidPrice)?;

        let fee_a = self.config.fee_for(funding_a);
        let fee_b = self.config.fee_for(funding_b);
        let net_a = funding_a - fee_a;
        let net_b = funding_b - fee_b;

        let funded = self
            .base_value(&forward, net_a, Some(initial_price))?
            .saturating_add(self.base_value(&reverse, net_b, Some(inverse_price))?);
        if funded < self.config.threshold_new_token_pair {
            return Err(OpendutchError::BelowThreshold {
                needed: self.config.threshold_new_token_pair,
                funded,
            });
        }

        // Validate both debits before performing either, so a failure
        // leaves the ledger untouched.
        for (token, funding) in [(token_a, funding_a), (token_b, funding_b)] {
            let available = ledger.balance_of(caller, token);
            if available < funding {
                return Err(OpendutchError::InsufficientBalance {
                    needed: funding,
                    available,
                });
            }
        }
        ledger.debit(caller, token_a, funding_a)?;
        ledger.debit(caller, token_b, funding_b)?;
        self.add_fee(token_a, fee_a)?;
        self.add_fee(token_b, fee_b)?;

        let mut series_ab = AuctionSeries::seeded(initial_price);
        if net_a > 0 {
            series_ab.add_sell_current(AuctionIndex::FIRST, caller, net_a)?;
        }
        let mut series_ba = AuctionSeries::seeded(inverse_price);
        if net_b > 0 {
            series_ba.add_sell_current(AuctionIndex::FIRST, caller, net_b)?;
        }
        self.series.insert(forward.clone(), series_ab);
        self.series.insert(reverse, series_ba);

        let start = self.now() + self.config.new_pair_delay_secs;
        self.markets.insert(
            key,
            Market {
                index: AuctionIndex::FIRST,
                start: Some(start),
            },
        );
        tracing::info!(pair = %forward, %initial_price, start, "token pair listed");
        Ok(())
    }

    // =====================================================================
    // Order posting
    // =====================================================================

    /// Post a sell order. Routes into the current auction while it has not
    /// started, otherwise into the next one; `index` 0 means "route for
    /// me", any other value must name the routed target exactly. Returns
    /// the auction index the funds landed in.
    pub fn post_sell_order(
        &mut self,
        ledger: &mut TokenLedger,
        caller: AccountId,
        pair: &TokenPair,
        index: AuctionIndex,
        amount: u128,
    ) -> Result<AuctionIndex> {
        if amount == 0 {
            return Err(OpendutchError::InvalidOrder {
                reason: "zero sell amount".into(),
            });
        }
        let key = pair.market();
        let market = *self
            .markets
            .get(&key)
            .ok_or_else(|| OpendutchError::PairNotListed(pair.clone()))?;
        let now = self.now();
        let started = market.start.is_some_and(|s| now >= s);
        let target = if started {
            market.index.next()
        } else {
            market.index
        };
        if index != AuctionIndex::SEED && index != target {
            return Err(OpendutchError::WrongAuctionIndex {
                expected: target,
                got: index,
            });
        }

        ledger.debit(caller, &pair.sell, amount)?;
        let fee = self.config.fee_for(amount);
        let net = amount - fee;
        self.add_fee(&pair.sell, fee)?;

        let series = self
            .series
            .get_mut(pair)
            .ok_or_else(|| OpendutchError::PairNotListed(pair.clone()))?;
        if target == market.index {
            series.add_sell_current(target, caller, net)?;
        } else {
            series.add_sell_next(target, caller, net)?;
        }
        tracing::debug!(%pair, %caller, amount, net, %target, "sell order accepted");

        // An unscheduled market starts once funding crosses the threshold.
        if market.start.is_none() {
            self.maybe_schedule(&key, now)?;
        }
        Ok(target)
    }

    /// Post a buy order against a running auction. Accepts at most the
    /// outstanding volume at the current price (the rest is never
    /// debited); the order that exhausts the outstanding volume clears the
    /// auction. `index` 0 targets the current auction.
    pub fn post_buy_order(
        &mut self,
        ledger: &mut TokenLedger,
        caller: AccountId,
        pair: &TokenPair,
        index: AuctionIndex,
        amount: u128,
    ) -> Result<BuyOutcome> {
        if amount == 0 {
            return Err(OpendutchError::InvalidOrder {
                reason: "zero buy amount".into(),
            });
        }
        let key = pair.market();
        let market = *self
            .markets
            .get(&key)
            .ok_or_else(|| OpendutchError::PairNotListed(pair.clone()))?;
        let idx = if index == AuctionIndex::SEED {
            market.index
        } else {
            index
        };
        if idx != market.index {
            return if idx < market.index {
                // Historical auctions only take claims.
                Err(OpendutchError::AuctionNotRunning { index: idx })
            } else {
                Err(OpendutchError::AuctionNotFound {
                    pair: pair.clone(),
                    index: idx,
                })
            };
        }

        let now = self.now();
        let Some(start) = market.start.filter(|s| now >= *s) else {
            return Err(OpendutchError::AuctionNotRunning { index: idx });
        };

        let series = self
            .series
            .get(pair)
            .ok_or_else(|| OpendutchError::PairNotListed(pair.clone()))?;
        if series.is_closed(idx) || series.sell_volume_current() == 0 {
            return Err(OpendutchError::AuctionNotRunning { index: idx });
        }
        let last = series
            .closing_price(idx.prev())
            .ok_or_else(|| OpendutchError::Internal("missing previous closing price".into()))?;
        let sell_volume = series.sell_volume_current();
        let buy_volume = series.buy_volume();

        let price = curve::price_at(last, now - start)?;
        if price.is_zero() {
            // 24 h cutoff passed: the auction clears at whatever was
            // bought; the order itself is fully refunded.
            self.close_and_advance(pair, idx, now)?;
            return Ok(BuyOutcome {
                accepted: 0,
                refunded: amount,
                cleared: true,
            });
        }

        let bound = price.scale(sell_volume)?;
        let outstanding = bound.saturating_sub(buy_volume);
        if outstanding == 0 {
            // The falling price already caught up with the matched volume.
            self.close_and_advance(pair, idx, now)?;
            return Ok(BuyOutcome {
                accepted: 0,
                refunded: amount,
                cleared: true,
            });
        }

        let accepted = amount.min(outstanding);
        ledger.debit(caller, &pair.buy, accepted)?;
        let series = self
            .series
            .get_mut(pair)
            .ok_or_else(|| OpendutchError::PairNotListed(pair.clone()))?;
        series.add_buy(idx, caller, accepted)?;
        if series.buy_volume() > bound {
            return Err(OpendutchError::Internal(format!(
                "buy volume {} exceeds price bound {bound}",
                series.buy_volume()
            )));
        }
        let cleared = accepted == outstanding;
        tracing::debug!(%pair, %caller, accepted, outstanding, %price, "buy order accepted");
        if cleared {
            self.close_and_advance(pair, idx, now)?;
        }
        Ok(BuyOutcome {
            accepted,
            refunded: amount - accepted,
            cleared,
        })
    }

    // =====================================================================
    // Clearing / advancement
    // =====================================================================

    /// Freeze the closing record for one direction, auto-close a dormant
    /// reciprocal, and advance the market index once both directions are
    /// done.
    fn close_and_advance(
        &mut self,
        pair: &TokenPair,
        index: AuctionIndex,
        now: Timestamp,
    ) -> Result<()> {
        {
            let series = self
                .series
                .get_mut(pair)
                .ok_or_else(|| OpendutchError::PairNotListed(pair.clone()))?;
            if !series.is_closed(index) {
                series.close(index);
                let closing = series
                    .closing_price(index)
                    .unwrap_or(Fraction::ZERO);
                tracing::info!(%pair, %index, %closing, "auction cleared");
            }
        }

        let flip = pair.flipped();
        if let Some(sibling) = self.series.get_mut(&flip) {
            if !sibling.is_closed(index) && sibling.sell_volume_current() == 0 {
                // A direction nobody funded clears the moment its
                // reciprocal does.
                sibling.close(index);
                tracing::info!(pair = %flip, %index, "dormant reciprocal closed");
            }
        }

        let both_closed = self
            .series
            .get(pair)
            .is_some_and(|s| s.is_closed(index))
            && self
                .series
                .get(&flip)
                .is_some_and(|s| s.is_closed(index));
        if !both_closed {
            return Ok(());
        }

        let key = pair.market();
        for p in [pair, &flip] {
            if let Some(series) = self.series.get_mut(p) {
                series.roll();
            }
        }
        {
            let market = self
                .markets
                .get_mut(&key)
                .ok_or_else(|| OpendutchError::PairNotListed(pair.clone()))?;
            market.index = market.index.next();
            market.start = None;
            tracing::info!(%pair, index = %market.index, "auction index advanced");
        }
        self.maybe_schedule(&key, now)?;
        Ok(())
    }

    /// Schedule the next auction start once either direction's rolled
    /// volume meets the follow-up threshold.
    fn maybe_schedule(&mut self, key: &(Token, Token), now: Timestamp) -> Result<()> {
        let Some(market) = self.markets.get(key).copied() else {
            return Ok(());
        };
        if market.start.is_some() {
            return Ok(());
        }
        let mut funded = false;
        for pair in self.directions(key) {
            let Some(series) = self.series.get(&pair) else {
                continue;
            };
            let last = series.closing_price(market.index.prev());
            let value = self.base_value(&pair, series.sell_volume_current(), last)?;
            if value >= self.config.threshold_new_auction {
                funded = true;
            }
        }
        if funded {
            let start = now + self.config.new_auction_delay_secs;
            if let Some(market) = self.markets.get_mut(key) {
                market.start = Some(start);
            }
            tracing::info!(?key, start, "next auction scheduled");
        }
        Ok(())
    }

    fn directions(&self, key: &(Token, Token)) -> [TokenPair; 2] {
        let fwd = TokenPair::new(key.0.clone(), key.1.clone());
        let rev = fwd.flipped();
        [fwd, rev]
    }

    /// Value of a fee-net sell amount in base-asset units, using the given
    /// direction price when the base asset is on the buy side. Markets
    /// with no base-asset leg are valued in their own sell units.
    fn base_value(
        &self,
        pair: &TokenPair,
        amount: u128,
        price: Option<Fraction>,
    ) -> Result<u128> {
        if amount == 0 {
            return Ok(0);
        }
        if pair.sell == self.config.base_token {
            return Ok(amount);
        }
        if pair.buy == self.config.base_token {
            return match price {
                Some(p) if !p.is_zero() => p.scale(amount),
                _ => Ok(0),
            };
        }
        Ok(amount)
    }

    fn add_fee(&mut self, token: &str, fee: u128) -> Result<()> {
        if fee == 0 {
            return Ok(());
        }
        let entry = self.collected_fees.entry(token.to_string()).or_insert(0);
        *entry = entry
            .checked_add(fee)
            .ok_or(OpendutchError::BalanceOverflow)?;
        Ok(())
    }

    // =====================================================================
    // Queries
    // =====================================================================

    /// Current auction index of the market (same for both directions).
    pub fn auction_index(&self, pair: &TokenPair) -> Result<AuctionIndex> {
        self.market(pair).map(|m| m.index)
    }

    /// Scheduled start of the current auction, if any.
    pub fn auction_start(&self, pair: &TokenPair) -> Result<Option<Timestamp>> {
        self.market(pair).map(|m| m.start)
    }

    pub fn sell_volume_current(&self, pair: &TokenPair) -> Result<u128> {
        self.series_ref(pair).map(AuctionSeries::sell_volume_current)
    }

    pub fn sell_volume_next(&self, pair: &TokenPair) -> Result<u128> {
        self.series_ref(pair).map(AuctionSeries::sell_volume_next)
    }

    pub fn buy_volume(&self, pair: &TokenPair) -> Result<u128> {
        self.series_ref(pair).map(AuctionSeries::buy_volume)
    }

    /// Frozen closing price of `index`, `None` while it has not cleared.
    pub fn closing_price(&self, pair: &TokenPair, index: AuctionIndex) -> Result<Option<Fraction>> {
        self.series_ref(pair).map(|s| s.closing_price(index))
    }

    /// Full closing record (exact volumes) of a cleared auction.
    pub fn closed_auction(
        &self,
        pair: &TokenPair,
        index: AuctionIndex,
    ) -> Result<Option<ClosedAuction>> {
        self.series_ref(pair).map(|s| s.closed_auction(index).copied())
    }

    /// The price view of `index` right now: sentinel before start, the
    /// live curve while running, the frozen price after clearing.
    pub fn current_price(&self, pair: &TokenPair, index: AuctionIndex) -> Result<CurrentPrice> {
        let market = self.market(pair)?;
        let series = self.series_ref(pair)?;
        if let Some(closing) = series.closing_price(index) {
            return Ok(CurrentPrice::Cleared(closing));
        }
        if index == market.index {
            let now = self.now();
            return match market.start.filter(|s| now >= *s) {
                Some(start) => {
                    let last = series.closing_price(index.prev()).ok_or_else(|| {
                        OpendutchError::Internal("missing previous closing price".into())
                    })?;
                    Ok(CurrentPrice::Running(curve::price_at(last, now - start)?))
                }
                None => Ok(CurrentPrice::NotStarted),
            };
        }
        if index == market.index.next() {
            return Ok(CurrentPrice::NotStarted);
        }
        Err(OpendutchError::AuctionNotFound {
            pair: pair.clone(),
            index,
        })
    }

    /// Derived lifecycle state of `index`.
    pub fn auction_state(&self, pair: &TokenPair, index: AuctionIndex) -> Result<AuctionState> {
        Ok(match self.current_price(pair, index)? {
            CurrentPrice::NotStarted => AuctionState::Pending,
            CurrentPrice::Running(_) => AuctionState::Running,
            CurrentPrice::Cleared(_) => AuctionState::Cleared,
        })
    }

    /// Fees collected so far in `token`.
    #[must_use]
    pub fn collected_fees(&self, token: &str) -> u128 {
        self.collected_fees.get(token).copied().unwrap_or(0)
    }

    // =====================================================================
    // Settlement accessors
    // =====================================================================
    // The settlement plane reads balances and consumes them through these
    // narrow methods; it never touches the series directly.

    pub fn seller_balance(
        &self,
        pair: &TokenPair,
        index: AuctionIndex,
        account: AccountId,
    ) -> Result<u128> {
        self.series_ref(pair).map(|s| s.seller_balance(index, account))
    }

    pub fn buyer_balance(
        &self,
        pair: &TokenPair,
        index: AuctionIndex,
        account: AccountId,
    ) -> Result<u128> {
        self.series_ref(pair).map(|s| s.buyer_balance(index, account))
    }

    pub fn claimed_amount(
        &self,
        pair: &TokenPair,
        index: AuctionIndex,
        account: AccountId,
    ) -> Result<u128> {
        self.series_ref(pair).map(|s| s.claimed_amount(index, account))
    }

    pub fn take_seller_balance(
        &mut self,
        pair: &TokenPair,
        index: AuctionIndex,
        account: AccountId,
    ) -> Result<u128> {
        self.series
            .get_mut(pair)
            .ok_or_else(|| OpendutchError::PairNotListed(pair.clone()))
            .map(|s| s.take_seller_balance(index, account))
    }

    pub fn take_buyer_balance(
        &mut self,
        pair: &TokenPair,
        index: AuctionIndex,
        account: AccountId,
    ) -> Result<u128> {
        self.series
            .get_mut(pair)
            .ok_or_else(|| OpendutchError::PairNotListed(pair.clone()))
            .map(|s| s.take_buyer_balance(index, account))
    }

    pub fn record_buyer_claim(
        &mut self,
        pair: &TokenPair,
        index: AuctionIndex,
        account: AccountId,
        amount: u128,
    ) -> Result<()> {
        self.series
            .get_mut(pair)
            .ok_or_else(|| OpendutchError::PairNotListed(pair.clone()))?
            .record_buyer_claim(index, account, amount)
    }

    fn market(&self, pair: &TokenPair) -> Result<Market> {
        self.markets
            .get(&pair.market())
            .copied()
            .ok_or_else(|| OpendutchError::PairNotListed(pair.clone()))
    }

    fn series_ref(&self, pair: &TokenPair) -> Result<&AuctionSeries> {
        self.series
            .get(pair)
            .ok_or_else(|| OpendutchError::PairNotListed(pair.clone()))
    }
}
