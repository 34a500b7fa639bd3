//! Arbitrary-magnitude decimal number.
//!
//! A value is a normalized `f64` mantissa in `[1, 10)` times a power of ten
//! held in an `i64`. Magnitudes far beyond `f64::MAX` keep their ~15
//! significant digits instead of collapsing to infinity, which is what an
//! incremental game needs once production starts compounding.
//!
//! The canonical string form is `"<mantissa>e<exponent>"` (or `"0"`). Because
//! the mantissa is printed with Rust's shortest round-trip formatting, parsing
//! the canonical string of any finite value yields the identical value.

use std::cmp::Ordering;
use std::fmt;
use std::iter::{Product, Sum};
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use thiserror::Error;

/// Exponent gap beyond which the smaller addend is below the larger one's precision.
const MAX_SIGNIFICANT_DIGITS: i64 = 17;

/// Largest power of ten applied in a single `f64` scaling step.
const MAX_SCALE_STEP: i64 = 300;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decimal {
    mantissa: f64,
    exponent: i64,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid decimal literal: {0:?}")]
pub struct ParseDecimalError(pub String);

/// 10^k as an `f64`. Exact for `0 <= k <= 22`.
fn pow10(k: i64) -> f64 {
    10f64.powi(k.clamp(-400, 400) as i32)
}

/// Multiply `value` by 10^k, stepping so intermediate powers stay finite.
fn scale(mut value: f64, mut k: i64) -> f64 {
    while k > MAX_SCALE_STEP {
        value *= pow10(MAX_SCALE_STEP);
        k -= MAX_SCALE_STEP;
    }
    while k < -MAX_SCALE_STEP {
        value /= pow10(MAX_SCALE_STEP);
        k += MAX_SCALE_STEP;
    }
    if k >= 0 {
        value * pow10(k)
    } else {
        value / pow10(-k)
    }
}

impl Decimal {
    pub const ZERO: Decimal = Decimal {
        mantissa: 0.0,
        exponent: 0,
    };
    pub const ONE: Decimal = Decimal {
        mantissa: 1.0,
        exponent: 0,
    };
    /// Sentinel for "can never be afforded".
    pub const INFINITY: Decimal = Decimal {
        mantissa: f64::INFINITY,
        exponent: 0,
    };
    pub const NAN: Decimal = Decimal {
        mantissa: f64::NAN,
        exponent: 0,
    };

    /// Build a value from any mantissa/exponent pair, normalizing it.
    pub fn new(mantissa: f64, exponent: i64) -> Self {
        Self::normalize(mantissa, exponent)
    }

    fn normalize(mantissa: f64, exponent: i64) -> Self {
        if mantissa == 0.0 {
            return Self::ZERO;
        }
        if !mantissa.is_finite() {
            return Self {
                mantissa,
                exponent: 0,
            };
        }
        if (1.0..10.0).contains(&mantissa.abs()) {
            return Self { mantissa, exponent };
        }
        let shift = mantissa.abs().log10().floor() as i64;
        let mut m = scale(mantissa, -shift);
        let mut e = exponent.saturating_add(shift);
        // log10 rounding can leave the mantissa one step outside [1, 10).
        if m.abs() >= 10.0 {
            m /= 10.0;
            e = e.saturating_add(1);
        } else if m.abs() < 1.0 {
            m *= 10.0;
            e = e.saturating_sub(1);
        }
        Self {
            mantissa: m,
            exponent: e,
        }
    }

    pub fn from_f64(value: f64) -> Self {
        Self::normalize(value, 0)
    }

    pub fn mantissa(&self) -> f64 {
        self.mantissa
    }

    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.mantissa.is_finite()
    }

    pub fn is_nan(&self) -> bool {
        self.mantissa.is_nan()
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa < 0.0
    }

    /// Nearest `f64`. Saturates to ±infinity above ~1.8e308 and to 0 below ~5e-324.
    pub fn to_f64(&self) -> f64 {
        if !self.is_finite() || self.is_zero() {
            return self.mantissa;
        }
        if self.exponent > 308 {
            return self.mantissa.signum() * f64::INFINITY;
        }
        if self.exponent < -324 {
            return 0.0;
        }
        scale(self.mantissa, self.exponent)
    }

    /// Base-10 logarithm of the magnitude.
    pub fn log10(&self) -> f64 {
        self.exponent as f64 + self.mantissa.abs().log10()
    }

    pub fn abs(self) -> Self {
        Self {
            mantissa: self.mantissa.abs(),
            exponent: self.exponent,
        }
    }

    pub fn max(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }

    pub fn min(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }

    /// Integer power by repeated squaring, so large `n` never overflows `f64`.
    pub fn powi(self, n: i64) -> Self {
        if n == 0 {
            return Self::ONE;
        }
        if n < 0 {
            return Self::ONE / self.powi(n.saturating_neg());
        }
        let mut base = self;
        let mut remaining = n;
        let mut acc = Self::ONE;
        while remaining > 0 {
            if remaining & 1 == 1 {
                acc *= base;
            }
            remaining >>= 1;
            if remaining > 0 {
                base *= base;
            }
        }
        acc
    }

    pub fn sqrt(self) -> Self {
        if self.is_negative() {
            return Self::NAN;
        }
        if self.is_zero() || !self.is_finite() {
            return self;
        }
        if self.exponent.rem_euclid(2) == 0 {
            Self::normalize(self.mantissa.sqrt(), self.exponent / 2)
        } else {
            Self::normalize((self.mantissa * 10.0).sqrt(), (self.exponent - 1).div_euclid(2))
        }
    }

    pub fn floor(self) -> Self {
        if !self.is_finite() || self.is_zero() || self.exponent >= MAX_SIGNIFICANT_DIGITS {
            return self;
        }
        if self.exponent < 0 {
            return if self.is_negative() {
                Self::from_f64(-1.0)
            } else {
                Self::ZERO
            };
        }
        Self::from_f64(self.to_f64().floor())
    }

    fn sign_class(&self) -> i8 {
        if self.mantissa > 0.0 {
            1
        } else if self.mantissa < 0.0 {
            -1
        } else {
            0
        }
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for Decimal {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<u32> for Decimal {
    fn from(value: u32) -> Self {
        Self::from_f64(value as f64)
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Self::from_f64(value as f64)
    }
}

impl From<i32> for Decimal {
    fn from(value: i32) -> Self {
        Self::from_f64(value as f64)
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.is_nan() || other.is_nan() {
            return None;
        }
        if !self.is_finite() || !other.is_finite() {
            if !self.is_finite() && !other.is_finite() {
                return self.mantissa.partial_cmp(&other.mantissa);
            }
            let infinite_side = if self.is_finite() { other } else { self };
            let ord = if infinite_side.mantissa > 0.0 {
                Ordering::Greater
            } else {
                Ordering::Less
            };
            return Some(if self.is_finite() { ord.reverse() } else { ord });
        }

        let (a, b) = (self.sign_class(), other.sign_class());
        if a != b {
            return Some(a.cmp(&b));
        }
        let ord = match a {
            0 => Ordering::Equal,
            1 => self
                .exponent
                .cmp(&other.exponent)
                .then(self.mantissa.total_cmp(&other.mantissa)),
            _ => other
                .exponent
                .cmp(&self.exponent)
                .then(self.mantissa.total_cmp(&other.mantissa)),
        };
        Some(ord)
    }
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        if self.is_zero() {
            return rhs;
        }
        if rhs.is_zero() {
            return self;
        }
        if !self.is_finite() || !rhs.is_finite() {
            return Self::from_f64(self.mantissa + rhs.mantissa);
        }
        let (big, small) = if self.exponent >= rhs.exponent {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let gap = big.exponent - small.exponent;
        if gap > MAX_SIGNIFICANT_DIGITS {
            return big;
        }
        Self::normalize(big.mantissa + small.mantissa / pow10(gap), big.exponent)
    }
}

impl Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        self + (-rhs)
    }
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        if self.is_zero() {
            return self;
        }
        Self {
            mantissa: -self.mantissa,
            exponent: self.exponent,
        }
    }
}

impl Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        if !self.is_finite() || !rhs.is_finite() {
            return Self::from_f64(self.mantissa * rhs.mantissa);
        }
        if self.is_zero() || rhs.is_zero() {
            return Self::ZERO;
        }
        Self::normalize(
            self.mantissa * rhs.mantissa,
            self.exponent.saturating_add(rhs.exponent),
        )
    }
}

impl Div for Decimal {
    type Output = Decimal;

    fn div(self, rhs: Decimal) -> Decimal {
        if rhs.is_zero() || !self.is_finite() || !rhs.is_finite() {
            return Self::from_f64(self.mantissa / rhs.mantissa);
        }
        if self.is_zero() {
            return Self::ZERO;
        }
        Self::normalize(
            self.mantissa / rhs.mantissa,
            self.exponent.saturating_sub(rhs.exponent),
        )
    }
}

impl AddAssign for Decimal {
    fn add_assign(&mut self, rhs: Decimal) {
        *self = *self + rhs;
    }
}

impl SubAssign for Decimal {
    fn sub_assign(&mut self, rhs: Decimal) {
        *self = *self - rhs;
    }
}

impl MulAssign for Decimal {
    fn mul_assign(&mut self, rhs: Decimal) {
        *self = *self * rhs;
    }
}

impl Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Self {
        iter.fold(Decimal::ZERO, |acc, d| acc + d)
    }
}

impl<'a> Sum<&'a Decimal> for Decimal {
    fn sum<I: Iterator<Item = &'a Decimal>>(iter: I) -> Self {
        iter.fold(Decimal::ZERO, |acc, d| acc + *d)
    }
}

impl Product for Decimal {
    fn product<I: Iterator<Item = Decimal>>(iter: I) -> Self {
        iter.fold(Decimal::ONE, |acc, d| acc * d)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nan() {
            return write!(f, "NaN");
        }
        if !self.is_finite() {
            let sign = if self.mantissa < 0.0 { "-" } else { "" };
            return write!(f, "{sign}Infinity");
        }
        if self.is_zero() {
            return write!(f, "0");
        }
        write!(f, "{}e{}", self.mantissa, self.exponent)
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    /// Accepts the canonical form plus plain `f64` literals ("1000", "0.5", "1e400").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        match text {
            "Infinity" | "inf" | "+Infinity" => return Ok(Self::INFINITY),
            "-Infinity" | "-inf" => return Ok(-Self::INFINITY),
            "NaN" => return Ok(Self::NAN),
            _ => {}
        }
        let err = || ParseDecimalError(s.to_string());
        match text.find(['e', 'E']) {
            Some(idx) => {
                let mantissa: f64 = text[..idx].parse().map_err(|_| err())?;
                let exponent: i64 = text[idx + 1..]
                    .trim_start_matches('+')
                    .parse()
                    .map_err(|_| err())?;
                if !mantissa.is_finite() {
                    return Err(err());
                }
                Ok(Self::normalize(mantissa, exponent))
            }
            None => {
                let value: f64 = text.parse().map_err(|_| err())?;
                Ok(Self::from_f64(value))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(v: f64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn normalizes_mantissa_into_range() {
        let v = d(4000.0);
        assert_eq!(v.mantissa(), 4.0);
        assert_eq!(v.exponent(), 3);

        let v = d(0.05);
        assert!((v.mantissa() - 5.0).abs() < 1e-12);
        assert_eq!(v.exponent(), -2);
    }

    #[test]
    fn zero_is_canonical() {
        assert_eq!(d(0.0), Decimal::ZERO);
        assert_eq!(d(-0.0), Decimal::ZERO);
        assert_eq!(d(5.0) - d(5.0), Decimal::ZERO);
        assert!(Decimal::ZERO.is_zero());
    }

    #[test]
    fn small_integer_arithmetic_is_exact() {
        let mut total = Decimal::ZERO;
        for _ in 0..10 {
            total += Decimal::ONE;
        }
        assert_eq!(total, d(10.0));
        assert_eq!(d(2.0) * d(5.0), d(10.0));
        assert_eq!(d(4000.0) / d(1000.0), d(4.0));
        assert_eq!(d(10.0) - d(10.0), Decimal::ZERO);
    }

    #[test]
    fn subtraction_may_go_negative() {
        let v = d(3.0) - d(5.0);
        assert!(v.is_negative());
        assert_eq!(v, d(-2.0));
    }

    #[test]
    fn addition_ignores_negligible_addend() {
        let big = Decimal::new(1.0, 300);
        assert_eq!(big + Decimal::ONE, big);
    }

    #[test]
    fn values_beyond_f64_range() {
        let big = Decimal::new(1.0, 300) * Decimal::new(1.0, 300);
        assert_eq!(big.exponent(), 600);
        assert!(big.is_finite());
        assert_eq!(big.to_f64(), f64::INFINITY);
        assert!(big > Decimal::new(9.99, 599));
    }

    #[test]
    fn comparison_across_magnitudes() {
        assert!(Decimal::new(1.0, 3) < Decimal::new(1.0, 300));
        assert!(Decimal::new(9.9, 2) < Decimal::new(1.0, 3));
        assert!(d(-1.0) < Decimal::ZERO);
        assert!(Decimal::new(-1.0, 300) < d(-5.0));
        assert!(Decimal::INFINITY > Decimal::new(9.0, 100_000));
        assert!(-Decimal::INFINITY < d(-1e300));
        assert!(d(10.0) >= d(10.0));
    }

    #[test]
    fn nan_is_unordered() {
        assert_eq!(Decimal::NAN.partial_cmp(&Decimal::ONE), None);
        assert!(!(Decimal::NAN >= Decimal::ONE));
    }

    #[test]
    fn powi_uses_squaring() {
        assert!((d(2.0).powi(10).to_f64() - 1024.0).abs() < 1e-9);
        assert_eq!(d(1.15).powi(0), Decimal::ONE);
        let huge = d(1.15).powi(100_000);
        assert!(huge.is_finite());
        assert!((huge.log10() - 100_000.0 * 1.15f64.log10()).abs() < 1e-3);
        assert!((d(2.0).powi(-2).to_f64() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn sqrt_handles_odd_exponents() {
        assert_eq!(d(4.0).sqrt(), d(2.0));
        assert!((d(1000.0).sqrt().to_f64() - 1000f64.sqrt()).abs() < 1e-9);
        assert!((d(0.01).sqrt().to_f64() - 0.1).abs() < 1e-12);
        let v = Decimal::new(4.0, 401).sqrt();
        assert_eq!(v.exponent(), 200);
        assert!((v.mantissa() - 40f64.sqrt()).abs() < 1e-12);
        assert!(d(-4.0).sqrt().is_nan());
    }

    #[test]
    fn floor_rounds_down() {
        assert_eq!(d(2.0).floor(), d(2.0));
        assert_eq!(d(2.9).floor(), d(2.0));
        assert_eq!(d(0.7).floor(), Decimal::ZERO);
        assert_eq!(d(-0.7).floor(), d(-1.0));
        let huge = Decimal::new(1.234, 50);
        assert_eq!(huge.floor(), huge);
    }

    #[test]
    fn division_by_zero_is_infinite() {
        assert_eq!(Decimal::ONE / Decimal::ZERO, Decimal::INFINITY);
        assert!((Decimal::ZERO / Decimal::ZERO).is_nan());
    }

    #[test]
    fn canonical_string_form() {
        assert_eq!(Decimal::ZERO.to_string(), "0");
        assert_eq!(d(1500.0).to_string(), "1.5e3");
        assert_eq!(Decimal::new(1.0, 400).to_string(), "1e400");
        assert_eq!(Decimal::INFINITY.to_string(), "Infinity");
    }

    #[test]
    fn parse_accepts_plain_and_canonical() {
        assert_eq!("1000".parse::<Decimal>().unwrap(), d(1000.0));
        assert_eq!("1.5e3".parse::<Decimal>().unwrap(), d(1500.0));
        assert_eq!("1e400".parse::<Decimal>().unwrap(), Decimal::new(1.0, 400));
        assert_eq!("Infinity".parse::<Decimal>().unwrap(), Decimal::INFINITY);
        assert!("glyphs".parse::<Decimal>().is_err());
        assert!("1e".parse::<Decimal>().is_err());
    }

    #[test]
    fn string_round_trip_is_bit_identical() {
        let v = d(12345.6) * d(7.0).powi(40);
        let back: Decimal = v.to_string().parse().unwrap();
        assert_eq!(back.mantissa().to_bits(), v.mantissa().to_bits());
        assert_eq!(back.exponent(), v.exponent());
    }

    #[test]
    fn sum_and_product() {
        let total: Decimal = [d(1.0), d(2.0), d(3.0)].into_iter().sum();
        assert_eq!(total, d(6.0));
        let prod: Decimal = [d(2.0), d(3.0), d(4.0)].into_iter().product();
        assert_eq!(prod, d(24.0));
    }
}
