//! Descending price curve.
//!
//! A running auction's price decays from twice the previous closing price
//! toward zero:
//!
//! ```text
//! price(t) = last * (86_400 - t) / (43_200 + t)
//! ```
//!
//! so `price(0) = 2 * last`, `price(6 h) = last`, `price(12 h) = last / 2`,
//! and the curve hits zero at the 24 h cutoff. All arithmetic is exact
//! rational; overflow is reported, never wrapped.

use opendutch_types::{Fraction, OpendutchError, Result, Timestamp, constants};

/// Price of a running auction `elapsed_secs` after its start, given the
/// previous closing price. Negative elapsed times (callers racing the
/// start) read as zero; times past the cutoff clamp to the zero price.
pub fn price_at(last_closing: Fraction, elapsed_secs: i64) -> Result<Fraction> {
    let elapsed = elapsed_secs.max(0);
    if elapsed >= constants::PRICE_CURVE_CUTOFF_SECS {
        return Ok(Fraction::ZERO);
    }
    // Both factors fit comfortably: the curve constants are < 2^17 and the
    // closing fraction is stored reduced.
    let num_factor = u128::try_from(constants::PRICE_CURVE_CUTOFF_SECS - elapsed)
        .map_err(|_| OpendutchError::Internal("negative curve factor".into()))?;
    let den_factor = u128::try_from(constants::PRICE_CURVE_OFFSET_SECS + elapsed)
        .map_err(|_| OpendutchError::Internal("negative curve factor".into()))?;
    let num = num_factor
        .checked_mul(last_closing.num())
        .ok_or(OpendutchError::ArithmeticOverflow)?;
    let den = den_factor
        .checked_mul(last_closing.den())
        .ok_or(OpendutchError::ArithmeticOverflow)?;
    Ok(Fraction::new(num, den))
}

/// The price view of one auction at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentPrice {
    /// The auction has no start scheduled yet, or its start lies in the
    /// future.
    NotStarted,
    /// Live curve value.
    Running(Fraction),
    /// Frozen closing price — the auction cleared.
    Cleared(Fraction),
}

impl CurrentPrice {
    /// The underlying fraction, if the auction has one yet.
    #[must_use]
    pub fn fraction(&self) -> Option<Fraction> {
        match self {
            Self::NotStarted => None,
            Self::Running(f) | Self::Cleared(f) => Some(*f),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }
}

/// Seconds remaining until `start`, or zero once it has passed. `None`
/// start means the auction is unscheduled.
#[must_use]
pub fn secs_until_start(start: Option<Timestamp>, now: Timestamp) -> Option<i64> {
    start.map(|s| (s - now).max(0))
}
