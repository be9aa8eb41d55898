//! Exact currency amounts, rounding increments and display helpers.

use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::errors::SplitError;

const MINOR_PER_MAJOR: i64 = 100;

/// A signed amount of currency minor units (cents).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);
    /// Largest amount accepted from input: ten trillion major units.
    pub const MAX_AMOUNT: Money = Money(1_000_000_000_000_000);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Checked addition, `None` on overflow.
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let major = abs / MINOR_PER_MAJOR as u64;
        let minor = abs % MINOR_PER_MAJOR as u64;
        write!(f, "{sign}{major}.{minor:02}")
    }
}

impl FromStr for Money {
    type Err = SplitError;

    /// Parses `12`, `12.5`, `12.35` or `-3.10`. More than two decimals is rejected.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || SplitError::InvalidInput(format!("invalid amount `{input}`"));
        let trimmed = input.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (whole, fraction) = match body.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (body, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
            || fraction.len() > 2
        {
            return Err(invalid());
        }
        let major: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let minor: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };
        let total = major
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|value| value.checked_add(minor))
            .ok_or_else(invalid)?;
        if total > Self::MAX_AMOUNT.0 {
            return Err(SplitError::InvalidInput(format!(
                "amount `{input}` exceeds the largest supported amount {}",
                Self::MAX_AMOUNT
            )));
        }
        Ok(Self(if negative { -total } else { total }))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

/// Granularity that computed shares are rounded to, in minor units.
///
/// The default of five cents lets a group paying cash settle with the coins
/// it actually has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct RoundingIncrement(i64);

impl RoundingIncrement {
    pub const DEFAULT_MINOR: i64 = 5;

    pub fn new(minor_units: i64) -> Result<Self, SplitError> {
        if minor_units <= 0 {
            return Err(SplitError::InvalidInput(format!(
                "rounding increment must be positive, got {minor_units}"
            )));
        }
        Ok(Self(minor_units))
    }

    pub fn minor_units(self) -> i64 {
        self.0
    }

    /// Rounds `numerator / denominator` minor units to the nearest multiple of
    /// the increment, halves away from zero.
    pub fn round_ratio(self, numerator: i128, denominator: i128) -> Money {
        debug_assert!(denominator > 0);
        let unit = denominator * self.0 as i128;
        let magnitude = (2 * numerator.abs() + unit) / (2 * unit);
        let steps = if numerator < 0 { -magnitude } else { magnitude };
        Money((steps * self.0 as i128) as i64)
    }
}

impl Default for RoundingIncrement {
    fn default() -> Self {
        Self(Self::DEFAULT_MINOR)
    }
}

impl TryFrom<i64> for RoundingIncrement {
    type Error = SplitError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoundingIncrement> for i64 {
    fn from(value: RoundingIncrement) -> Self {
        value.0
    }
}

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "CHF" => "CHF ".into(),
        "CAD" => "CA$".into(),
        "AUD" => "A$".into(),
        _ => format!("{code} "),
    }
}

/// Separators used when rendering amounts for people.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberStyle {
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl NumberStyle {
    pub fn for_locale(tag: &str) -> Self {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "de" | "es" | "it" | "nl" | "pt" => Self {
                decimal_separator: ',',
                grouping_separator: '.',
            },
            "fr" => Self {
                decimal_separator: ',',
                grouping_separator: ' ',
            },
            _ => Self::default(),
        }
    }
}

impl Default for NumberStyle {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            grouping_separator: ',',
        }
    }
}

/// Renders `amount` with currency symbol and digit grouping, e.g. `-$1,234.50`.
pub fn format_money(amount: Money, code: &CurrencyCode, style: NumberStyle) -> String {
    let plain = amount.abs().to_string();
    let (whole, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    let sign = if amount.is_negative() { "-" } else { "" };
    format!(
        "{sign}{}{}{}{fraction}",
        symbol_for(code.as_str()),
        group_digits(whole, style.grouping_separator),
        style.decimal_separator
    )
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_text() {
        assert_eq!("90".parse::<Money>().unwrap(), Money::from_minor(9000));
        assert_eq!("12.5".parse::<Money>().unwrap(), Money::from_minor(1250));
        assert_eq!("-3.07".parse::<Money>().unwrap(), Money::from_minor(-307));
        assert_eq!(".5".parse::<Money>().unwrap(), Money::from_minor(50));
        assert!("1.234".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert_eq!(
            "10000000000000.00".parse::<Money>().unwrap(),
            Money::MAX_AMOUNT
        );
        assert!("10000000000000.01".parse::<Money>().is_err());
        assert!("90000000000000000".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
    }

    #[test]
    fn displays_two_decimals() {
        assert_eq!(Money::from_minor(3500).to_string(), "35.00");
        assert_eq!(Money::from_minor(-5).to_string(), "-0.05");
    }

    #[test]
    fn rounds_half_away_from_zero_to_increment() {
        let inc = RoundingIncrement::default();
        // 10.00 / 3 = 3.333.. -> 3.35
        assert_eq!(inc.round_ratio(1000, 3), Money::from_minor(335));
        // 0.025 sits exactly between 0.00 and 0.05
        assert_eq!(inc.round_ratio(5, 2), Money::from_minor(5));
        assert_eq!(inc.round_ratio(-5, 2), Money::from_minor(-5));
        assert_eq!(inc.round_ratio(9000, 3), Money::from_minor(3000));
    }

    #[test]
    fn rejects_non_positive_increment() {
        assert!(RoundingIncrement::new(0).is_err());
        assert!(RoundingIncrement::new(-5).is_err());
    }

    #[test]
    fn formats_with_grouping() {
        let usd = CurrencyCode::default();
        assert_eq!(
            format_money(Money::from_minor(123_450), &usd, NumberStyle::default()),
            "$1,234.50"
        );
        assert_eq!(
            format_money(
                Money::from_minor(-4000),
                &CurrencyCode::new("eur"),
                NumberStyle::for_locale("de-DE")
            ),
            "-€40,00"
        );
    }
}
