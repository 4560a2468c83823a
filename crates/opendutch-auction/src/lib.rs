//! # opendutch-auction
//!
//! The auction plane of OpenDutch: a pure, deterministic descending-price
//! auction engine. Zero side effects beyond its own bookkeeping — balances
//! move through the [`opendutch_ledger::TokenLedger`] collaborator, time
//! comes from an injected clock, and every operation is a synchronous
//! state transition that either completes or rejects.
//!
//! - [`curve`] — the exact-rational price decay function
//! - [`book`] — per-direction cumulative volume and balance bookkeeping
//! - [`engine`] — pair listing, order posting, clearing detection, and
//!   auction-index advancement

pub mod book;
pub mod curve;
pub mod engine;

pub use book::{AuctionSeries, AuctionState, ClosedAuction};
pub use curve::{CurrentPrice, price_at};
pub use engine::{AuctionEngine, BuyOutcome};
