//! # opendutch-settlement
//!
//! The finality plane of OpenDutch: once (or while) an auction runs its
//! course, participants claim their proportional outcome here.
//!
//! - [`claims`] — buyer/seller fund claims with read-only previews,
//!   idempotent per (account, auction, side)
//! - [`reward`] — the secondary reward token: minted on cleared claims,
//!   locked, unlocked on a 24 h countdown, then withdrawable
//!
//! Settlement reads auction state and consumes participant balances only
//! through the engine's narrow accessors; reward issuance goes through the
//! reward token's minter role.

pub mod claims;
pub mod reward;

pub use claims::{ClaimResult, SettlementEngine};
pub use reward::RewardToken;
