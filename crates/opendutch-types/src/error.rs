//! Error types for the OpenDutch exchange core.
//!
//! All errors use the `OD_ERR_` prefix convention for easy grepping in
//! logs. Error codes are grouped by subsystem:
//! - 1xx: Auction / order errors
//! - 2xx: Balance errors
//! - 3xx: Settlement / claim errors
//! - 4xx: Reward lock errors
//! - 5xx: Admin / authorization errors
//! - 9xx: Arithmetic / internal errors

use thiserror::Error;

use crate::clock::Timestamp;
use crate::ids::{AuctionIndex, Token, TokenPair};

/// Central error enum for all OpenDutch operations.
#[derive(Debug, Error)]
pub enum OpendutchError {
    // =================================================================
    // Auction / Order Errors (1xx)
    // =================================================================
    /// The directed token pair has not been listed.
    #[error("OD_ERR_100: Token pair not listed: {0}")]
    PairNotListed(TokenPair),

    /// The market already exists (either direction).
    #[error("OD_ERR_101: Token pair already listed: {0}")]
    PairAlreadyListed(TokenPair),

    /// The order named an auction index that cannot take it.
    #[error("OD_ERR_102: Wrong auction index: expected {expected}, got {got}")]
    WrongAuctionIndex {
        expected: AuctionIndex,
        got: AuctionIndex,
    },

    /// Buy orders are only accepted while the auction is running.
    #[error("OD_ERR_103: Auction {index} is not running")]
    AuctionNotRunning { index: AuctionIndex },

    /// The auction index does not exist (yet) for this pair.
    #[error("OD_ERR_104: Auction {index} not found for pair {pair}")]
    AuctionNotFound { pair: TokenPair, index: AuctionIndex },

    /// Zero amounts and degenerate pairs are rejected outright.
    #[error("OD_ERR_105: Invalid order: {reason}")]
    InvalidOrder { reason: String },

    /// The seeded closing price must be a positive rational.
    #[error("OD_ERR_106: Invalid initial price")]
    InvalidPrice,

    /// Funding below the configured listing / follow-up threshold.
    #[error("OD_ERR_107: Funding below threshold: need {needed}, have {funded}")]
    BelowThreshold { needed: u128, funded: u128 },

    /// The token is not on the owner-approved whitelist.
    #[error("OD_ERR_108: Token not approved: {0}")]
    TokenNotApproved(Token),

    // =================================================================
    // Balance Errors (2xx)
    // =================================================================
    /// Not enough ledger balance to perform the operation.
    #[error("OD_ERR_200: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    /// A credit would overflow the balance representation.
    #[error("OD_ERR_201: Balance overflow")]
    BalanceOverflow,

    // =================================================================
    // Settlement / Claim Errors (3xx)
    // =================================================================
    /// Seller funds only become claimable once the auction cleared.
    #[error("OD_ERR_300: Auction {index} has not cleared yet")]
    AuctionNotCleared { index: AuctionIndex },

    // =================================================================
    // Reward Lock Errors (4xx)
    // =================================================================
    /// The 24 h unlock countdown has not elapsed.
    #[error("OD_ERR_400: Too early to withdraw: deadline {deadline}, now {now}")]
    TooEarlyToWithdraw { deadline: Timestamp, now: Timestamp },

    /// There is no unlocked amount to withdraw.
    #[error("OD_ERR_401: Nothing to withdraw")]
    NothingToWithdraw,

    // =================================================================
    // Admin / Authorization Errors (5xx)
    // =================================================================
    /// The caller is not the owner of the resource.
    #[error("OD_ERR_500: Caller is not the owner")]
    NotOwner,

    /// The caller is not the authorized minter.
    #[error("OD_ERR_501: Caller is not the minter")]
    NotMinter,

    // =================================================================
    // Arithmetic / Internal (9xx)
    // =================================================================
    /// A cross product left the 128-bit range even after cancellation.
    #[error("OD_ERR_900: Arithmetic overflow")]
    ArithmeticOverflow,

    /// Division by a zero denominator was attempted.
    #[error("OD_ERR_901: Division by zero")]
    DivisionByZero,

    /// Invariant breach — a logic defect, never expected in operation.
    #[error("OD_ERR_902: Internal error: {0}")]
    Internal(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, OpendutchError>;
