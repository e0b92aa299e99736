use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

/// number of decimal places carried by every monetary field
pub const MONEY_SCALE: u32 = 2;

fn to_scale(d: Decimal, strategy: RoundingStrategy) -> Decimal {
    let mut rounded = d.round_dp_with_strategy(MONEY_SCALE, strategy);
    rounded.rescale(MONEY_SCALE);
    rounded
}

fn round_half_up(d: Decimal) -> Decimal {
    to_scale(d, RoundingStrategy::MidpointAwayFromZero)
}

/// Money type with currency minor-unit precision (scale 2, round half up)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::from_parts(0, 0, 0, false, MONEY_SCALE));
    pub const CENT: Money = Money(Decimal::from_parts(1, 0, 0, false, 2));

    /// create from decimal, rounding half up to two places
    pub fn from_decimal(d: Decimal) -> Self {
        Money(round_half_up(d))
    }

    /// create from decimal, dropping anything below one cent
    pub fn from_decimal_truncated(d: Decimal) -> Self {
        Money(to_scale(d, RoundingStrategy::ToZero))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(round_half_up(Decimal::from_str(s)?)))
    }

    /// create from whole currency units
    pub fn from_major(amount: i64) -> Self {
        Money(round_half_up(Decimal::from(amount)))
    }

    /// create from minor units (cents)
    pub fn from_minor(amount: i64) -> Self {
        Money(Decimal::new(amount, MONEY_SCALE))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// strictly less than zero
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// subtraction floored at zero
    pub fn saturating_sub(self, other: Self) -> Self {
        (self - other).max(Money::ZERO)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<i32> for Money {
    fn from(i: i32) -> Self {
        Money::from_major(i as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(round_half_up(self.0 + other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = round_half_up(self.0 + other.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(round_half_up(self.0 - other.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 = round_half_up(self.0 - other.0);
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, other: Decimal) -> Money {
        Money(round_half_up(self.0 * other))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, x| acc + *x)
    }
}

/// rate type for periodic interest and daily mora rates (unrounded)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// create from decimal (e.g., 0.01 for 1% per period)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from percentage (e.g., 5 for 5%)
    pub fn from_percentage(p: u32) -> Self {
        Rate(Decimal::from(p) / Decimal::from(100))
    }

    /// create from basis points (e.g., 500 for 5%)
    pub fn from_bps(bps: u32) -> Self {
        Rate(Decimal::from(bps) / Decimal::from(10000))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn as_percentage(&self) -> Decimal {
        self.0 * Decimal::from(100)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// split an annual rate into `periods_per_year` equal periodic rates
    pub fn periodic(&self, periods_per_year: u32) -> Rate {
        Rate(self.0 / Decimal::from(periods_per_year))
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().normalize())
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_decimal(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_rounds_half_up() {
        assert_eq!(Money::from_decimal(dec!(10.005)), Money::from_decimal(dec!(10.01)));
        assert_eq!(Money::from_decimal(dec!(10.004)), Money::from_decimal(dec!(10.00)));
        assert_eq!(Money::from_str_exact("2.675").unwrap().to_string(), "2.68");
    }

    #[test]
    fn test_money_display_keeps_two_places() {
        assert_eq!(Money::from_major(500).to_string(), "500.00");
        assert_eq!(Money::from_minor(150).to_string(), "1.50");
        assert_eq!(Money::CENT.to_string(), "0.01");
    }

    #[test]
    fn test_truncation_drops_sub_cent() {
        assert_eq!(Money::from_decimal_truncated(dec!(0.0066)), Money::ZERO);
        assert_eq!(Money::from_decimal_truncated(dec!(1.669)), Money::from_decimal(dec!(1.66)));
    }

    #[test]
    fn test_serde_keeps_two_places() {
        let parsed: Money = serde_json::from_str("\"12000.005\"").unwrap();
        assert_eq!(parsed, Money::from_decimal(dec!(12000.01)));
        assert_eq!(parsed.as_decimal().scale(), MONEY_SCALE);

        assert_eq!(serde_json::to_string(&Money::from_major(500)).unwrap(), "\"500.00\"");
        assert_eq!(serde_json::to_string(&Money::ZERO).unwrap(), "\"0.00\"");
        assert_eq!(serde_json::to_string(&Money::default()).unwrap(), "\"0.00\"");

        let round_trip: Money = serde_json::from_str(&serde_json::to_string(&Money::from_minor(1999)).unwrap()).unwrap();
        assert_eq!(round_trip, Money::from_minor(1999));
    }

    #[test]
    fn test_sign_checks() {
        assert!(!Money::ZERO.is_positive());
        assert!(!Money::ZERO.is_negative());
        assert!(Money::CENT.is_positive());
        assert!(Money::from_major(-1).is_negative());
        assert_eq!(Money::from_major(3).saturating_sub(Money::from_major(5)), Money::ZERO);
    }

    #[test]
    fn test_multiplication_rounds_to_scale() {
        // 500.00 * 0.001 * 10 = 5.00
        let mora = Money::from_major(500) * (dec!(0.001) * dec!(10));
        assert_eq!(mora, Money::from_major(5));

        let interest = Money::from_decimal(dec!(333.33)) * dec!(0.015);
        assert_eq!(interest.to_string(), "5.00");
    }

    #[test]
    fn test_sum() {
        let parts = vec![Money::from_minor(3333), Money::from_minor(3333), Money::from_minor(3334)];
        let total: Money = parts.iter().sum();
        assert_eq!(total, Money::from_major(100));
    }

    #[test]
    fn test_rate_periodic() {
        let annual = Rate::from_percentage(24);
        assert_eq!(annual.periodic(12).as_decimal(), dec!(0.02));
        assert_eq!(Rate::from_bps(150).as_decimal(), dec!(0.015));
        assert_eq!(Rate::from_decimal(dec!(0.01)).to_string(), "1%");
    }
}
