//! Identifiers used throughout OpenDutch.
//!
//! Accounts use UUIDv7 for time-ordered lexicographic sorting. Tokens are
//! plain symbol strings; a [`TokenPair`] is one *direction* of a market
//! (sell side → buy side), and the reciprocal direction is a distinct pair.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Unique identifier for a trading account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Deterministic account from raw bytes — used by tests to get stable,
    /// readable fixtures.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Token / TokenPair
// ---------------------------------------------------------------------------

/// Type alias for token identifiers (e.g., "ETH", "GNO").
pub type Token = String;

/// One direction of a market: `sell` tokens are auctioned off against
/// `buy` tokens. The reciprocal direction is [`TokenPair::flipped`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TokenPair {
    pub sell: Token,
    pub buy: Token,
}

impl TokenPair {
    #[must_use]
    pub fn new(sell: impl Into<Token>, buy: impl Into<Token>) -> Self {
        Self {
            sell: sell.into(),
            buy: buy.into(),
        }
    }

    /// The reciprocal direction of the same market.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            sell: self.buy.clone(),
            buy: self.sell.clone(),
        }
    }

    /// Canonical (order-independent) key for the market both directions
    /// belong to.
    #[must_use]
    pub fn market(&self) -> (Token, Token) {
        if self.sell <= self.buy {
            (self.sell.clone(), self.buy.clone())
        } else {
            (self.buy.clone(), self.sell.clone())
        }
    }

    /// Whether both directions refer to the same token (never valid).
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.sell == self.buy
    }
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.sell, self.buy)
    }
}

// ---------------------------------------------------------------------------
// AuctionIndex
// ---------------------------------------------------------------------------

/// Monotonically increasing identifier of successive auction rounds for a
/// market. Index 0 is reserved (it anchors the seeded previous closing
/// price); the first live auction is index 1. Never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AuctionIndex(pub u64);

impl AuctionIndex {
    /// The reserved, never-running index.
    pub const SEED: Self = Self(0);
    /// The first live auction of a freshly listed pair.
    pub const FIRST: Self = Self(1);

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The preceding index (saturating at the reserved index 0).
    #[must_use]
    pub fn prev(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl fmt::Display for AuctionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "auction:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
