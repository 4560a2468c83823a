//! # opendutch-ledger
//!
//! The external collaborators of the auction core, realized in-process:
//!
//! - [`TokenLedger`] — per-(account, token) spendable balances with
//!   deposit, withdraw, and transfer
//! - [`ApprovalRegistry`] — the owner-gated whitelist of tokens eligible
//!   for reward-bearing auctions
//!
//! The auction engine and the settlement plane take these as `&mut`
//! collaborators; they never reach into each other's state.

pub mod approval;
pub mod balances;

pub use approval::ApprovalRegistry;
pub use balances::TokenLedger;
