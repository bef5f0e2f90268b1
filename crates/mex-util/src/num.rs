//! Arbitrary-precision rational numbers.
//!
//! [`Rational`] is the exact numeric backbone of the engine: integers and
//! ratios of integers with a `BigInt` numerator and denominator. Two
//! invariants hold for every constructed value:
//!
//! - the denominator is strictly positive (the sign lives in the numerator),
//! - numerator and denominator are coprime (the fraction is reduced).
//!
//! A zero denominator is not representable. Operations that would produce
//! one (division by zero, inverting zero) return `None` so the caller can
//! fall back to IEEE-754 semantics instead.

use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error produced when parsing a numeric literal into a [`Rational`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumError {
    /// The literal contains a character that is not valid in a number
    #[error("invalid numeric literal '{0}'")]
    InvalidLiteral(String),

    /// The exponent part of a scientific literal is missing its digits
    #[error("missing digits in exponent of '{0}'")]
    EmptyExponent(String),
}

/// An exact rational number with arbitrary-precision components.
///
/// # Examples
///
/// ```
/// use mex_util::num::Rational;
///
/// let third: Rational = "1".parse::<Rational>().unwrap()
///     .checked_div(&Rational::from(3)).unwrap();
/// let one = third.clone() + third.clone() + third;
/// assert_eq!(one, Rational::from(1));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Rational {
    num: BigInt,
    den: BigInt,
}

impl Rational {
    /// Construct from numerator and denominator.
    ///
    /// Returns `None` when `den` is zero. The result is reduced and its
    /// denominator made positive.
    pub fn new(num: BigInt, den: BigInt) -> Option<Self> {
        if den.is_zero() {
            return None;
        }
        Some(Self::normalized(num, den))
    }

    /// Construct an integer value.
    pub fn from_integer(value: BigInt) -> Self {
        Self {
            num: value,
            den: BigInt::from(1),
        }
    }

    /// Internal constructor that restores the invariants.
    fn normalized(mut num: BigInt, mut den: BigInt) -> Self {
        debug_assert!(!den.is_zero());
        if den.sign() == Sign::Minus {
            num = -num;
            den = -den;
        }
        let gcd = num.gcd(&den);
        if !gcd.is_zero() && gcd != BigInt::from(1) {
            num /= &gcd;
            den /= &gcd;
        }
        Self { num, den }
    }

    /// The reduced numerator (carries the sign).
    pub fn numer(&self) -> &BigInt {
        &self.num
    }

    /// The reduced denominator (always positive).
    pub fn denom(&self) -> &BigInt {
        &self.den
    }

    /// True when the denominator is 1.
    pub fn is_integer(&self) -> bool {
        self.den == BigInt::from(1)
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.num.sign() == Sign::Minus
    }

    /// Exact division. `None` when `rhs` is zero.
    pub fn checked_div(&self, rhs: &Rational) -> Option<Rational> {
        if rhs.num.is_zero() {
            return None;
        }
        Some(Self::normalized(
            &self.num * &rhs.den,
            &self.den * &rhs.num,
        ))
    }

    /// Truncated remainder, with the sign of the dividend.
    ///
    /// `None` when `rhs` is zero.
    pub fn checked_rem(&self, rhs: &Rational) -> Option<Rational> {
        let quotient = self.checked_div(rhs)?;
        Some(self.clone() - rhs.clone() * quotient.trunc())
    }

    /// Integer power. `None` when the operation leaves the rationals:
    /// a negative exponent on zero, or an exponent too large to apply.
    pub fn checked_pow(&self, exponent: i64) -> Option<Rational> {
        if exponent == 0 {
            return Some(Rational::from(1));
        }
        let magnitude = exponent.unsigned_abs();
        if magnitude > u32::MAX as u64 {
            return None;
        }
        let magnitude = magnitude as u32;
        let num = self.num.pow(magnitude);
        let den = self.den.pow(magnitude);
        if exponent > 0 {
            Some(Self { num, den })
        } else {
            if self.num.is_zero() {
                return None;
            }
            Some(Self::normalized(den, num))
        }
    }

    pub fn abs(&self) -> Rational {
        Rational {
            num: self.num.abs(),
            den: self.den.clone(),
        }
    }

    /// Largest integer not greater than `self`.
    pub fn floor(&self) -> Rational {
        Rational::from_integer(self.num.div_floor(&self.den))
    }

    /// Smallest integer not less than `self`.
    pub fn ceil(&self) -> Rational {
        Rational::from_integer(self.num.div_ceil(&self.den))
    }

    /// Integer part, rounding toward zero.
    pub fn trunc(&self) -> Rational {
        if self.is_negative() {
            self.ceil()
        } else {
            self.floor()
        }
    }

    /// Round half away from zero.
    pub fn round(&self) -> Rational {
        if self.is_negative() {
            return -(-self.clone()).round();
        }
        let two = BigInt::from(2);
        let rounded = (&self.num * &two + &self.den).div_floor(&(&self.den * &two));
        Rational::from_integer(rounded)
    }

    /// Closest `f64` approximation.
    pub fn to_f64(&self) -> f64 {
        match (self.num.to_f64(), self.den.to_f64()) {
            (Some(n), Some(d)) => n / d,
            _ => {
                // Components too large for f64; scale both down together.
                let digits = self.den.to_string().len() as u32;
                let scale = BigInt::from(10).pow(digits.saturating_sub(15));
                let n = (&self.num / &scale).to_f64().unwrap_or(f64::NAN);
                let d = (&self.den / &scale).to_f64().unwrap_or(f64::NAN);
                n / d
            }
        }
    }

    /// The value as an `i64`, when it is an integer that fits.
    pub fn to_i64(&self) -> Option<i64> {
        if self.is_integer() {
            self.num.to_i64()
        } else {
            None
        }
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Rational::from_integer(BigInt::from(value))
    }
}

impl FromStr for Rational {
    type Err = NumError;

    /// Parse an integer, decimal, or scientific literal exactly.
    ///
    /// `"1.5"` becomes `3/2`, `"25e-2"` becomes `1/4`. The `n/d` form is
    /// not handled here; the lexer assembles it from two integer scans.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NumError::InvalidLiteral(s.to_string());

        let (mantissa, exponent) = match s.find(['e', 'E']) {
            Some(at) => {
                let exp_text = &s[at + 1..];
                let trimmed = exp_text.strip_prefix(['+', '-']).unwrap_or(exp_text);
                if trimmed.is_empty() {
                    return Err(NumError::EmptyExponent(s.to_string()));
                }
                let exp: i64 = exp_text.parse().map_err(|_| invalid())?;
                (&s[..at], exp)
            }
            None => (s, 0),
        };

        let (int_part, frac_part) = match mantissa.find('.') {
            Some(at) => (&mantissa[..at], &mantissa[at + 1..]),
            None => (mantissa, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        let digits: String = format!("{}{}", int_part, frac_part);
        if !digits
            .strip_prefix('-')
            .unwrap_or(&digits)
            .chars()
            .all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        let num = BigInt::from_str(&digits).map_err(|_| invalid())?;

        // Net power of ten: the scientific exponent minus fractional digits.
        let shift = exponent - frac_part.len() as i64;
        let ten = BigInt::from(10);
        let value = if shift >= 0 {
            Rational::from_integer(num * ten.pow(shift as u32))
        } else {
            Rational::normalized(num, ten.pow((-shift) as u32))
        };
        Ok(value)
    }
}

impl std::ops::Add for Rational {
    type Output = Rational;

    fn add(self, rhs: Rational) -> Rational {
        Rational::normalized(
            &self.num * &rhs.den + &rhs.num * &self.den,
            &self.den * &rhs.den,
        )
    }
}

impl std::ops::Sub for Rational {
    type Output = Rational;

    fn sub(self, rhs: Rational) -> Rational {
        Rational::normalized(
            &self.num * &rhs.den - &rhs.num * &self.den,
            &self.den * &rhs.den,
        )
    }
}

impl std::ops::Mul for Rational {
    type Output = Rational;

    fn mul(self, rhs: Rational) -> Rational {
        Rational::normalized(&self.num * &rhs.num, &self.den * &rhs.den)
    }
}

impl std::ops::Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            num: -self.num,
            den: self.den,
        }
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        // Cross-multiplication keeps the comparison exact. Denominators are
        // positive, so the inequality direction is preserved.
        (&self.num * &other.den).cmp(&(&other.num * &self.den))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({})", self)
    }
}
