//! Configuration for the OpenDutch exchange core.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::ids::Token;

/// Tunable parameters of one exchange instance.
///
/// Thresholds are expressed in base-asset smallest units; delays in
/// seconds. The owner can raise or lower both thresholds at runtime, the
/// rest is fixed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// The asset reward issuance is valued against (e.g., "ETH").
    pub base_token: Token,
    /// Sell-side fee, as a ratio `fee_num / fee_den`.
    pub fee_num: u128,
    pub fee_den: u128,
    /// Minimum base-equivalent funding for `add_token_pair`.
    pub threshold_new_token_pair: u128,
    /// Minimum base-equivalent sell volume to schedule a follow-up auction.
    pub threshold_new_auction: u128,
    /// Listing-to-first-auction delay in seconds.
    pub new_pair_delay_secs: i64,
    /// Clearing-to-next-auction delay in seconds.
    pub new_auction_delay_secs: i64,
}

impl ExchangeConfig {
    /// The fee skimmed from `amount` on its way into a sell volume.
    /// Floors, so dust amounts below `fee_den / fee_num` pay no fee.
    #[must_use]
    pub fn fee_for(&self, amount: u128) -> u128 {
        // fee_num is tiny (5 by default); amount * fee_num stays in range
        // for any plausible token supply.
        amount.saturating_mul(self.fee_num) / self.fee_den
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_token: constants::DEFAULT_BASE_TOKEN.to_string(),
            fee_num: constants::FEE_NUM,
            fee_den: constants::FEE_DEN,
            threshold_new_token_pair: constants::DEFAULT_THRESHOLD_NEW_TOKEN_PAIR,
            threshold_new_auction: constants::DEFAULT_THRESHOLD_NEW_AUCTION,
            new_pair_delay_secs: constants::DEFAULT_NEW_PAIR_DELAY_SECS,
            new_auction_delay_secs: constants::DEFAULT_NEW_AUCTION_DELAY_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fee_is_half_percent() {
        let cfg = ExchangeConfig::default();
        assert_eq!(cfg.fee_for(100_000), 500);
        // 100 ether in wei
        assert_eq!(
            cfg.fee_for(100_000_000_000_000_000_000),
            500_000_000_000_000_000
        );
    }

    #[test]
    fn fee_floors_dust() {
        let cfg = ExchangeConfig::default();
        assert_eq!(cfg.fee_for(199), 0);
        assert_eq!(cfg.fee_for(200), 1);
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = ExchangeConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ExchangeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.base_token, back.base_token);
        assert_eq!(cfg.threshold_new_auction, back.threshold_new_auction);
        assert_eq!(cfg.new_pair_delay_secs, back.new_pair_delay_secs);
    }
}
