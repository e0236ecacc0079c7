//! Integer-first rational arithmetic.
//!
//! Vcore quantities are specified to one-decimal precision (§3). Representing
//! them as `f64` would let capacity comparisons drift; `Vcores` instead
//! stores tenths of a vcore as an exact `i64` and all arithmetic is integer.
//! `Ratio` is kept as a general-purpose exact fraction for anything that
//! doesn't fit the fixed-precision `Vcores` shape (e.g. the pcore→vcore
//! ratio itself).

use crate::errors::CoreError;
use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Exact ratio with normalized sign and positive denominator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ratio {
    pub num: i128,
    pub den: i128,
}

#[inline]
fn abs_i128(x: i128) -> i128 {
    if x < 0 { -x } else { x }
}

fn gcd_i128(mut a: i128, mut b: i128) -> i128 {
    a = abs_i128(a);
    b = abs_i128(b);
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    if a == 0 { 1 } else { a }
}

impl Ratio {
    /// Construct a ratio, ensuring `den > 0` and reducing by GCD.
    pub fn new_checked(num: i128, den: i128) -> Result<Ratio, CoreError> {
        if den == 0 {
            return Err(CoreError::InvalidRatio);
        }
        let (mut n, mut d) = (num, den);
        if d < 0 {
            n = -n;
            d = -d;
        }
        let g = gcd_i128(n, d);
        Ok(Ratio { num: n / g, den: d / g })
    }

    pub fn whole(n: i128) -> Ratio {
        Ratio { num: n, den: 1 }
    }

    /// Compare two ratios exactly via cross-multiplication.
    ///
    /// Falls back to an `f64` comparison only if both reduced numerators and
    /// denominators still overflow `i128` on cross-multiply — unreachable
    /// for the magnitudes this engine deals in (core counts, vcore tenths).
    pub fn cmp_exact(&self, other: &Ratio) -> Ordering {
        if let (Some(l), Some(r)) = (self.num.checked_mul(other.den), other.num.checked_mul(self.den)) {
            l.cmp(&r)
        } else {
            let af = (self.num as f64) / (self.den as f64);
            let bf = (other.num as f64) / (other.den as f64);
            af.partial_cmp(&bf).unwrap_or(Ordering::Equal)
        }
    }
}

/// A quantity of virtual cores, exact to one decimal place.
///
/// Stored as tenths internally (`48.5` vcores is `485`). All arithmetic is
/// plain integer addition/subtraction; there is no rounding step anywhere
/// in capacity evaluation.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Vcores(i64);

impl Vcores {
    pub const ZERO: Vcores = Vcores(0);

    /// Construct from a whole number of vcores.
    pub const fn from_whole(n: i64) -> Self {
        Vcores(n * 10)
    }

    /// Construct from tenths directly (e.g. `485` means `48.5`).
    pub const fn from_tenths(tenths: i64) -> Self {
        Vcores(tenths)
    }

    /// Parse a one-decimal-precision quantity, e.g. `"48.5"` or `"48"`.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let s = s.trim();
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        let whole: i64 = whole.parse().map_err(|_| CoreError::InvalidRatio)?;
        let tenth: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse().map_err(|_| CoreError::InvalidRatio)?,
            _ => return Err(CoreError::InvalidRatio),
        };
        let sign = if whole < 0 || s.starts_with('-') { -1 } else { 1 };
        Ok(Vcores(whole * 10 + sign * tenth))
    }

    pub fn tenths(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn checked_sub(&self, other: Vcores) -> Option<Vcores> {
        self.0.checked_sub(other.0).map(Vcores)
    }

    /// Divide into `n` equal whole shares. `None` if `n` is zero or the
    /// split is not exact (a server's vcores must split evenly across its
    /// sockets; an inexact split is a catalog/input defect, not something to
    /// round away).
    pub fn divide_evenly(&self, n: u32) -> Option<Vcores> {
        if n == 0 {
            return None;
        }
        let n = n as i64;
        if self.0 % n == 0 {
            Some(Vcores(self.0 / n))
        } else {
            None
        }
    }

    /// Saturating subtract, clamped at zero — used when a deduction would
    /// otherwise drive a slot negative; callers that need to detect the
    /// clamp should use `checked_sub` instead.
    pub fn saturating_sub(&self, other: Vcores) -> Vcores {
        Vcores((self.0 - other.0).max(0))
    }

    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / 10.0
    }

    /// Scale by a pod's `quantity`. Demand sums stay exact integer tenths.
    pub fn mul_u32(&self, n: u32) -> Vcores {
        Vcores(self.0 * n as i64)
    }
}

impl Add for Vcores {
    type Output = Vcores;
    fn add(self, rhs: Vcores) -> Vcores {
        Vcores(self.0 + rhs.0)
    }
}

impl Sub for Vcores {
    type Output = Vcores;
    fn sub(self, rhs: Vcores) -> Vcores {
        Vcores(self.0 - rhs.0)
    }
}

impl fmt::Display for Vcores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 10;
        let tenth = (self.0 % 10).abs();
        if tenth == 0 {
            write!(f, "{whole}")
        } else {
            write!(f, "{whole}.{tenth}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_whole_and_fraction() {
        assert_eq!(Vcores::parse("48").unwrap(), Vcores::from_whole(48));
        assert_eq!(Vcores::parse("48.5").unwrap(), Vcores::from_tenths(485));
        assert!(Vcores::parse("48.55").is_err());
    }

    #[test]
    fn arithmetic_is_exact() {
        let a = Vcores::from_tenths(485);
        let b = Vcores::from_whole(2);
        assert_eq!((a - b).tenths(), 465);
        assert_eq!((a + b).tenths(), 505);
    }

    #[test]
    fn display_roundtrip() {
        assert_eq!(Vcores::from_whole(48).to_string(), "48");
        assert_eq!(Vcores::from_tenths(485).to_string(), "48.5");
    }

    #[test]
    fn divide_evenly_rejects_inexact_split() {
        assert_eq!(Vcores::from_whole(48).divide_evenly(2), Some(Vcores::from_whole(24)));
        assert_eq!(Vcores::from_whole(48).divide_evenly(0), None);
        assert_eq!(Vcores::from_tenths(485).divide_evenly(2), None);
    }

    #[test]
    fn ratio_cmp_exact_cross_multiply() {
        let a = Ratio::new_checked(1, 3).unwrap();
        let b = Ratio::new_checked(2, 6).unwrap();
        assert_eq!(a.cmp_exact(&b), Ordering::Equal);
    }
}
