//! Monetary amounts using decimal arithmetic.
//!
//! The shop trades in a single currency, so a [`Price`] is just a
//! non-negative decimal rounded to cents, no larger than [`Price::MAX`] (the
//! range of a `NUMERIC(12, 2)` column). On the wire it is a JSON number
//! (the SPA formats it with `toFixed(2)`); on input both numbers and numeric
//! strings are accepted, since admin forms post prices as text.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount is above [`Price::MAX`].
    #[error("price cannot exceed {}", Price::MAX)]
    TooLarge,
    /// The input is not a decimal number.
    #[error("price is not a number: {0}")]
    NotANumber(String),
}

/// A non-negative amount in the shop currency, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// The largest storable amount, 9 999 999 999.99.
    pub const MAX: Self = Self(Decimal::from_parts(3_567_587_327, 232, 0, false, 2));

    /// Create a price, rounding to cents.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero and
    /// `PriceError::TooLarge` if it rounds above [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        let amount = amount.round_dp(2);
        if amount > Self::MAX.0 {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::TooLarge` if the result exceeds [`Price::MAX`].
    pub fn times(&self, quantity: u32) -> Result<Self, PriceError> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .ok_or(PriceError::TooLarge)
            .and_then(Self::new)
    }

    /// Add two amounts.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::TooLarge` if the sum exceeds [`Price::MAX`].
    pub fn checked_add(self, rhs: Self) -> Result<Self, PriceError> {
        Self::new(self.0 + rhs.0)
    }

    /// Sum a sequence of amounts.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::TooLarge` as soon as the running total exceeds
    /// [`Price::MAX`].
    pub fn total<I: IntoIterator<Item = Self>>(prices: I) -> Result<Self, PriceError> {
        prices.into_iter().try_fold(Self::ZERO, Self::checked_add)
    }

    /// Whether two amounts differ by more than one cent.
    #[must_use]
    pub fn differs_from(&self, other: Decimal) -> bool {
        (self.0 - other).abs() > Decimal::new(1, 2)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let amount = Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map_err(|_| PriceError::NotANumber(s.to_owned()))?;
        Self::new(amount)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.to_f64() {
            Some(value) => serializer.serialize_f64(value),
            None => serializer.serialize_str(&self.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(serde_json::Number),
            Text(String),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n.to_string(),
            Raw::Text(s) => s,
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_to_cents() {
        let price: Price = "19.999".parse().unwrap();
        assert_eq!(price.to_string(), "20.00");
    }

    #[test]
    fn test_rejects_negative() {
        assert_eq!("-0.01".parse::<Price>(), Err(PriceError::Negative));
    }

    #[test]
    fn test_rejects_text() {
        assert!(matches!(
            "cheap".parse::<Price>(),
            Err(PriceError::NotANumber(_))
        ));
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let a: Price = serde_json::from_str("24.5").unwrap();
        let b: Price = serde_json::from_str("\"24.50\"").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&Price::from_cents(1999)).unwrap();
        assert_eq!(json, "19.99");
    }

    #[test]
    fn test_times_and_total() {
        let total =
            Price::total([Price::from_cents(250).times(3).unwrap(), Price::from_cents(125)])
                .unwrap();
        assert_eq!(total, Price::from_cents(875));
    }

    #[test]
    fn test_max_fits_numeric_12_2() {
        assert_eq!(Price::MAX.to_string(), "9999999999.99");
        assert_eq!("9999999999.99".parse::<Price>(), Ok(Price::MAX));
        assert_eq!("100000000000".parse::<Price>(), Err(PriceError::TooLarge));
        assert_eq!("9999999999.995".parse::<Price>(), Err(PriceError::TooLarge));
    }

    #[test]
    fn test_arithmetic_stays_in_range() {
        let unit: Price = "5000000000".parse().unwrap();
        assert_eq!(unit.times(3), Err(PriceError::TooLarge));
        assert_eq!(Price::MAX.checked_add(Price::from_cents(1)), Err(PriceError::TooLarge));
        assert_eq!(Price::total([unit, unit]), Err(PriceError::TooLarge));
        assert_eq!(Price::total(std::iter::empty()), Ok(Price::ZERO));
    }

    #[test]
    fn test_deserialize_rejects_oversized() {
        assert!(serde_json::from_str::<Price>("100000000000").is_err());
    }

    #[test]
    fn test_differs_from() {
        let price = Price::from_cents(1000);
        assert!(!price.differs_from(Decimal::new(1001, 2)));
        assert!(price.differs_from(Decimal::new(1002, 2)));
    }
}
