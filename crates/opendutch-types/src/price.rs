//! Exact rational prices.
//!
//! Every price in OpenDutch is a [`Fraction`] of unsigned 128-bit integers,
//! reduced on construction. There is no floating point anywhere in the
//! clearing path: comparisons cross-multiply, scaling floors, and overflow
//! is reported as an explicit error rather than wrapped or panicked on.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{OpendutchError, Result};

/// Greatest common divisor (Euclid). `gcd(0, n) == n`.
#[must_use]
pub fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// An exact rational number `num / den`, always reduced, `den != 0`.
///
/// The numerator may be zero (a zero price is how a timed-out auction or a
/// zero-demand closing is expressed); the denominator never is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fraction {
    num: u128,
    den: u128,
}

impl Fraction {
    /// Create a reduced fraction.
    ///
    /// # Panics
    /// Panics if `den == 0`. Use [`Fraction::checked`] where the
    /// denominator comes from untrusted arithmetic.
    #[must_use]
    pub fn new(num: u128, den: u128) -> Self {
        assert!(den != 0, "Fraction denominator must be nonzero");
        if num == 0 {
            return Self { num: 0, den: 1 };
        }
        let g = gcd(num, den);
        Self {
            num: num / g,
            den: den / g,
        }
    }

    /// Create a reduced fraction, or `None` when `den == 0`.
    #[must_use]
    pub fn checked(num: u128, den: u128) -> Option<Self> {
        if den == 0 { None } else { Some(Self::new(num, den)) }
    }

    /// The zero price `0/1`.
    pub const ZERO: Self = Self { num: 0, den: 1 };

    /// The unit price `1/1`.
    pub const ONE: Self = Self { num: 1, den: 1 };

    #[must_use]
    pub fn num(&self) -> u128 {
        self.num
    }

    #[must_use]
    pub fn den(&self) -> u128 {
        self.den
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// The reciprocal price, or `None` for a zero price.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        (self.num != 0).then(|| Self::new(self.den, self.num))
    }

    /// Cross-multiplied comparison: `self.num * other.den` vs
    /// `other.num * self.den`, overflow-checked.
    pub fn cmp_cross(&self, other: &Self) -> Result<Ordering> {
        let lhs = self
            .num
            .checked_mul(other.den)
            .ok_or(OpendutchError::ArithmeticOverflow)?;
        let rhs = other
            .num
            .checked_mul(self.den)
            .ok_or(OpendutchError::ArithmeticOverflow)?;
        Ok(lhs.cmp(&rhs))
    }

    /// `floor(amount * num / den)` — converts a buy-token amount into
    /// sell-token value at this price. Overflow-checked.
    pub fn scale(&self, amount: u128) -> Result<u128> {
        mul_div(amount, self.num, self.den)
    }

    /// `floor(amount * den / num)` — converts a sell-token amount into
    /// buy-token value at this price. Fails on a zero price.
    pub fn scale_inv(&self, amount: u128) -> Result<u128> {
        mul_div(amount, self.den, self.num)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// `floor(amount * num / den)` with explicit error reporting.
///
/// Common factors between `amount`/`den` and `num`/`den` are cancelled
/// first so realistic smallest-unit amounts (wei-scale) stay inside u128.
///
/// # Errors
/// - [`OpendutchError::DivisionByZero`] when `den == 0`
/// - [`OpendutchError::ArithmeticOverflow`] when the cross product cannot
///   be represented even after cancellation
pub fn mul_div(amount: u128, num: u128, den: u128) -> Result<u128> {
    if den == 0 {
        return Err(OpendutchError::DivisionByZero);
    }
    if amount == 0 || num == 0 {
        return Ok(0);
    }
    let g1 = gcd(amount, den);
    let (amount, den) = (amount / g1, den / g1);
    let g2 = gcd(num, den);
    let (num, den) = (num / g2, den / g2);
    let prod = amount
        .checked_mul(num)
        .ok_or(OpendutchError::ArithmeticOverflow)?;
    Ok(prod / den)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_reduces() {
        let f = Fraction::new(172_800, 43_200);
        assert_eq!((f.num(), f.den()), (4, 1));

        let f = Fraction::new(398, 199);
        assert_eq!((f.num(), f.den()), (2, 1));
    }

    #[test]
    fn zero_numerator_normalizes() {
        let f = Fraction::new(0, 995);
        assert_eq!(f, Fraction::ZERO);
        assert!(f.is_zero());
    }

    #[test]
    #[should_panic(expected = "denominator must be nonzero")]
    fn zero_denominator_panics() {
        let _ = Fraction::new(1, 0);
    }

    #[test]
    fn checked_rejects_zero_denominator() {
        assert!(Fraction::checked(1, 0).is_none());
        assert_eq!(Fraction::checked(2, 4), Some(Fraction::new(1, 2)));
    }

    #[test]
    fn inverse() {
        assert_eq!(Fraction::new(4, 1).inverse(), Some(Fraction::new(1, 4)));
        assert_eq!(Fraction::ZERO.inverse(), None);
    }

    #[test]
    fn cross_comparison() {
        let a = Fraction::new(4, 1);
        let b = Fraction::new(7, 2);
        assert_eq!(a.cmp_cross(&b).unwrap(), Ordering::Greater);
        assert_eq!(b.cmp_cross(&a).unwrap(), Ordering::Less);
        assert_eq!(a.cmp_cross(&Fraction::new(8, 2)).unwrap(), Ordering::Equal);
    }

    #[test]
    fn scale_floors() {
        let p = Fraction::new(4, 1);
        // 20 buy tokens at 4:1 are worth 5 sell tokens
        assert_eq!(p.scale_inv(20).unwrap(), 5);
        // 5 sell tokens need 20 buy tokens
        assert_eq!(p.scale(5).unwrap(), 20);
        // flooring
        let p = Fraction::new(3, 1);
        assert_eq!(p.scale_inv(20).unwrap(), 6);
    }

    #[test]
    fn scale_inv_zero_price_errors() {
        let err = Fraction::ZERO.scale_inv(10).unwrap_err();
        assert!(matches!(err, OpendutchError::DivisionByZero));
    }

    #[test]
    fn mul_div_cancels_before_multiplying() {
        // 1e20 * 1e20 would overflow u128 without cancellation
        let amount = 100_000_000_000_000_000_000u128;
        let num = 100_000_000_000_000_000_000u128;
        let den = 200_000_000_000_000_000_000u128;
        assert_eq!(mul_div(amount, num, den).unwrap(), amount / 2);
    }

    #[test]
    fn mul_div_reports_overflow() {
        let err = mul_div(u128::MAX, u128::MAX - 1, 3).unwrap_err();
        assert!(matches!(err, OpendutchError::ArithmeticOverflow));
    }

    #[test]
    fn wei_scale_clearing_math() {
        // 99.5 ether sell volume at the 4:1 opening price needs 398 ether
        let sell_volume = 99_500_000_000_000_000_000u128;
        let price = Fraction::new(4, 1);
        assert_eq!(
            price.scale(sell_volume).unwrap(),
            398_000_000_000_000_000_000u128
        );
    }

    #[test]
    fn serde_roundtrip() {
        let f = Fraction::new(3, 7);
        let json = serde_json::to_string(&f).unwrap();
        let back: Fraction = serde_json::from_str(&json).unwrap();
        assert_eq!(f, back);
    }
}
