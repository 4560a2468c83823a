//! # opendutch-types
//!
//! Shared types, errors, and configuration for the **OpenDutch** auction
//! exchange core.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`AuctionIndex`], [`TokenPair`], [`Token`]
//! - **Price model**: [`Fraction`] — exact rational prices, cross-multiplied
//!   comparison, floored scaling
//! - **Time**: [`Clock`], [`SystemClock`], [`Timestamp`] (and `SimClock`
//!   behind the `test-helpers` feature)
//! - **Configuration**: [`ExchangeConfig`]
//! - **Errors**: [`OpendutchError`] with `OD_ERR_` prefix codes
//! - **Constants**: fee rate, curve shape, delays, unlock window

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod price;

// Re-export all primary types at crate root for ergonomic imports:
//   use opendutch_types::{AccountId, Fraction, TokenPair, ...};

pub use clock::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use price::*;

// Constants are accessed via `opendutch_types::constants::FOO`
// (not re-exported to avoid name collisions).
