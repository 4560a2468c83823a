//! System-wide constants for the OpenDutch exchange core.

/// Sell-side fee numerator: 5 / 1000 = 0.5% skimmed from every deposit
/// into an auction's sell volume.
pub const FEE_NUM: u128 = 5;

/// Sell-side fee denominator.
pub const FEE_DEN: u128 = 1000;

/// Seconds until a running auction's price reaches zero. The curve
/// numerator is `(CUTOFF - elapsed) * last.num`.
pub const PRICE_CURVE_CUTOFF_SECS: i64 = 86_400;

/// Denominator offset of the price curve: `(OFFSET + elapsed) * last.den`.
/// Together with the cutoff this opens at 2x the previous closing price
/// and crosses 1x at six hours.
pub const PRICE_CURVE_OFFSET_SECS: i64 = 43_200;

/// Delay between listing a new token pair and its first auction start.
pub const DEFAULT_NEW_PAIR_DELAY_SECS: i64 = 21_600;

/// Delay between an auction clearing and the next one starting.
pub const DEFAULT_NEW_AUCTION_DELAY_SECS: i64 = 600;

/// Minimum base-asset-equivalent funding to list a new token pair.
pub const DEFAULT_THRESHOLD_NEW_TOKEN_PAIR: u128 = 10_000;

/// Minimum base-asset-equivalent sell volume to schedule a follow-up
/// auction.
pub const DEFAULT_THRESHOLD_NEW_AUCTION: u128 = 1_000;

/// Countdown between unlocking reward tokens and being able to withdraw
/// them (24 hours).
pub const REWARD_UNLOCK_WINDOW_SECS: i64 = 86_400;

/// Default base asset used for reward-token valuation.
pub const DEFAULT_BASE_TOKEN: &str = "ETH";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "OpenDutch";
