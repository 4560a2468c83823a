//! Buyer and seller claims.
//!
//! A claim converts an account's per-auction balance into returned funds
//! (and, once the auction cleared, reward tokens). Claims are idempotent
//! per (account, auction, side): balances are consumed through the
//! engine's narrow accessors, so a second committing claim finds nothing
//! and returns a zero delta. Every committing form has a read-only
//! preview that computes the same numbers without touching state.
//!
//! Reward valuation (only for fully approved pairs):
//! - buyer: the buy balance 1:1 when the buy token is the base asset,
//!   otherwise its sell-token value at the closing price
//! - seller: the sell balance 1:1 when the sell token is the base asset,
//!   otherwise the returned buy-token amount

use opendutch_auction::{AuctionEngine, CurrentPrice};
use opendutch_ledger::{ApprovalRegistry, TokenLedger};
use opendutch_types::{
    AccountId, AuctionIndex, OpendutchError, Result, TokenPair, price,
};

use crate::reward::RewardToken;

/// Outcome of one claim: funds returned in the counter-asset and reward
/// tokens issued. Computed, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimResult {
    pub returned: u128,
    pub reward: u128,
}

impl ClaimResult {
    pub const ZERO: Self = Self {
        returned: 0,
        reward: 0,
    };
}

/// The settlement plane. Its `operator` identity is the reward token's
/// minter, mirroring the exchange-is-the-minter arrangement of the
/// surrounding system.
pub struct SettlementEngine {
    operator: AccountId,
}

#[derive(Debug, Clone, Copy)]
struct Computed {
    result: ClaimResult,
    cleared: bool,
}

impl SettlementEngine {
    #[must_use]
    pub fn new(operator: AccountId) -> Self {
        Self { operator }
    }

    #[must_use]
    pub fn operator(&self) -> AccountId {
        self.operator
    }

    // =====================================================================
    // Buyer claims
    // =====================================================================

    /// Read-only simulation of [`Self::claim_buyer_funds`].
    pub fn preview_buyer_claim(
        &self,
        engine: &AuctionEngine,
        approvals: &ApprovalRegistry,
        pair: &TokenPair,
        account: AccountId,
        index: AuctionIndex,
    ) -> Result<ClaimResult> {
        self.compute_buyer(engine, approvals, pair, account, index)
            .map(|c| c.result)
    }

    /// Return a buyer's entitlement and, once the auction cleared, issue
    /// their reward. While the auction runs, funds come back at the
    /// current price and the reward is always zero.
    pub fn claim_buyer_funds(
        &self,
        engine: &mut AuctionEngine,
        ledger: &mut TokenLedger,
        approvals: &ApprovalRegistry,
        reward: &mut RewardToken,
        pair: &TokenPair,
        account: AccountId,
        index: AuctionIndex,
    ) -> Result<ClaimResult> {
        let computed = self.compute_buyer(engine, approvals, pair, account, index)?;
        self.ensure_can_mint(reward, computed.result)?;
        if computed.cleared {
            engine.take_buyer_balance(pair, index, account)?;
        } else if computed.result.returned > 0 {
            engine.record_buyer_claim(pair, index, account, computed.result.returned)?;
        }
        self.pay_out(ledger, reward, &pair.sell, account, computed.result)?;
        tracing::debug!(
            %pair, %account, %index,
            returned = computed.result.returned,
            reward = computed.result.reward,
            "buyer funds claimed"
        );
        Ok(computed.result)
    }

    fn compute_buyer(
        &self,
        engine: &AuctionEngine,
        approvals: &ApprovalRegistry,
        pair: &TokenPair,
        account: AccountId,
        index: AuctionIndex,
    ) -> Result<Computed> {
        let current = engine.auction_index(pair)?;
        if index > current {
            return Err(OpendutchError::AuctionNotFound {
                pair: pair.clone(),
                index,
            });
        }
        let balance = engine.buyer_balance(pair, index, account)?;
        if balance == 0 {
            // never participated, or already fully claimed
            return Ok(Computed {
                result: ClaimResult::ZERO,
                cleared: false,
            });
        }
        let claimed = engine.claimed_amount(pair, index, account)?;
        let base = &engine.config().base_token;

        if let Some(closed) = engine.closed_auction(pair, index)? {
            // A nonzero buy balance implies a nonzero closing buy volume.
            let entitlement = price::mul_div(balance, closed.sell_volume, closed.buy_volume)?;
            let reward = if approvals.pair_approved(pair) {
                if &pair.buy == base { balance } else { entitlement }
            } else {
                0
            };
            return Ok(Computed {
                result: ClaimResult {
                    returned: entitlement.saturating_sub(claimed),
                    reward,
                },
                cleared: true,
            });
        }

        match engine.current_price(pair, index)? {
            CurrentPrice::Running(p) if !p.is_zero() => {
                let entitlement = p.scale_inv(balance)?;
                Ok(Computed {
                    result: ClaimResult {
                        returned: entitlement.saturating_sub(claimed),
                        reward: 0,
                    },
                    cleared: false,
                })
            }
            // Past the cutoff (awaiting the closing poke) or not started:
            // nothing claimable yet.
            _ => Ok(Computed {
                result: ClaimResult::ZERO,
                cleared: false,
            }),
        }
    }

    // =====================================================================
    // Seller claims
    // =====================================================================

    /// Read-only simulation of [`Self::claim_seller_funds`].
    pub fn preview_seller_claim(
        &self,
        engine: &AuctionEngine,
        approvals: &ApprovalRegistry,
        pair: &TokenPair,
        account: AccountId,
        index: AuctionIndex,
    ) -> Result<ClaimResult> {
        self.compute_seller(engine, approvals, pair, account, index)
            .map(|c| c.result)
    }

    /// Return a seller's pro-rata share of the cleared buy volume and
    /// issue their reward. Sellers have no entitlement before clearing.
    pub fn claim_seller_funds(
        &self,
        engine: &mut AuctionEngine,
        ledger: &mut TokenLedger,
        approvals: &ApprovalRegistry,
        reward: &mut RewardToken,
        pair: &TokenPair,
        account: AccountId,
        index: AuctionIndex,
    ) -> Result<ClaimResult> {
        let computed = self.compute_seller(engine, approvals, pair, account, index)?;
        self.ensure_can_mint(reward, computed.result)?;
        engine.take_seller_balance(pair, index, account)?;
        self.pay_out(ledger, reward, &pair.buy, account, computed.result)?;
        tracing::debug!(
            %pair, %account, %index,
            returned = computed.result.returned,
            reward = computed.result.reward,
            "seller funds claimed"
        );
        Ok(computed.result)
    }

    fn compute_seller(
        &self,
        engine: &AuctionEngine,
        approvals: &ApprovalRegistry,
        pair: &TokenPair,
        account: AccountId,
        index: AuctionIndex,
    ) -> Result<Computed> {
        let current = engine.auction_index(pair)?;
        if index > current {
            return Err(OpendutchError::AuctionNotFound {
                pair: pair.clone(),
                index,
            });
        }
        let Some(closed) = engine.closed_auction(pair, index)? else {
            return Err(OpendutchError::AuctionNotCleared { index });
        };
        let balance = engine.seller_balance(pair, index, account)?;
        if balance == 0 {
            return Ok(Computed {
                result: ClaimResult::ZERO,
                cleared: true,
            });
        }
        // A nonzero seller balance implies a nonzero closing sell volume.
        let returned = price::mul_div(balance, closed.buy_volume, closed.sell_volume)?;
        let base = &engine.config().base_token;
        let reward = if approvals.pair_approved(pair) {
            if &pair.sell == base { balance } else { returned }
        } else {
            0
        };
        Ok(Computed {
            result: ClaimResult { returned, reward },
            cleared: true,
        })
    }

    /// A claim that would mint must be rejected before any balance is
    /// consumed, so losing the minter role never leaves a half-settled
    /// claim behind.
    fn ensure_can_mint(&self, reward: &RewardToken, result: ClaimResult) -> Result<()> {
        if result.reward > 0 && reward.minter() != self.operator {
            return Err(OpendutchError::NotMinter);
        }
        Ok(())
    }

    fn pay_out(
        &self,
        ledger: &mut TokenLedger,
        reward: &mut RewardToken,
        token: &str,
        account: AccountId,
        result: ClaimResult,
    ) -> Result<()> {
        if result.returned > 0 {
            ledger.credit(account, token, result.returned)?;
        }
        if result.reward > 0 {
            reward.mint(self.operator, account, result.reward)?;
        }
        Ok(())
    }
}
