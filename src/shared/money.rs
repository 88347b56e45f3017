use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Amount in the smallest currency unit (cents)
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
    ToSchema,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Amount with the symbol of an ISO currency code, e.g. `$20.00`.
    /// Codes without a known symbol are written in front, `CHF 20.00`.
    pub fn format_in(self, currency: &str) -> String {
        let code = currency.trim().to_ascii_uppercase();
        let symbol = match code.as_str() {
            "USD" | "AUD" | "CAD" | "NZD" | "SGD" => "$",
            "EUR" => "€",
            "GBP" => "£",
            "JPY" => "¥",
            "INR" => "₹",
            "" => return self.to_string(),
            _ => return format!("{} {}", code, self),
        };

        if self.0 < 0 {
            format!("-{}{}", symbol, Money(-self.0))
        } else {
            format!("{}{}", symbol, self)
        }
    }

    /// `self - other`, floored at zero
    pub fn saturating_sub(self, other: Money) -> Money {
        Money((self.0 - other.0).max(0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(4000).to_string(), "40.00");
        assert_eq!(Money::from_cents(1999).to_string(), "19.99");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-250).to_string(), "-2.50");
    }

    #[test]
    fn test_format_in_currency() {
        assert_eq!(Money::from_cents(4000).format_in("usd"), "$40.00");
        assert_eq!(Money::from_cents(1000).format_in("USD"), "$10.00");
        assert_eq!(Money::from_cents(2050).format_in("gbp"), "£20.50");
        assert_eq!(Money::from_cents(-250).format_in("eur"), "-€2.50");
        assert_eq!(Money::from_cents(2000).format_in("chf"), "CHF 20.00");
        assert_eq!(Money::from_cents(2000).format_in(""), "20.00");
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let total = Money::from_cents(1500);
        assert_eq!(total.saturating_sub(Money::from_cents(1000)).cents(), 500);
        assert_eq!(total.saturating_sub(Money::from_cents(4000)), Money::ZERO);
    }

    #[test]
    fn test_serializes_as_plain_cents() {
        let json = serde_json::to_string(&Money::from_cents(2000)).unwrap();
        assert_eq!(json, "2000");
    }
}
