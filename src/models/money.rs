//! Numeric coercion for legacy monetary fields.
//!
//! The production database stores booking amounts in TEXT columns and inside
//! JSON blobs whose values may be numbers, numeric strings, or garbage.
//! Every coercion here is total: malformed input yields zero instead of
//! failing the surrounding aggregation.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

/// Parse a text-typed amount, defaulting to zero on missing or garbage input.
pub fn parse_amount(raw: Option<&str>) -> Decimal {
    raw.and_then(|s| s.trim().parse::<Decimal>().ok())
        .unwrap_or(Decimal::ZERO)
}

/// Coerce a JSON value (number or numeric string) into a `Decimal`.
pub fn json_amount(value: Option<&Value>) -> Decimal {
    match value {
        Some(Value::Number(n)) => n.to_string().parse().unwrap_or(Decimal::ZERO),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

/// Round to cent precision using round-half-away-from-zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Final conversion for the wire: cent-rounded plain JSON number.
pub fn to_money(amount: Decimal) -> f64 {
    round_cents(amount).to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_plain_and_padded_strings() {
        assert_eq!(parse_amount(Some("10.005")), Decimal::new(10005, 3));
        assert_eq!(parse_amount(Some(" 5.00 ")), Decimal::new(500, 2));
    }

    #[test]
    fn garbage_and_missing_coerce_to_zero() {
        assert_eq!(parse_amount(Some("N/A")), Decimal::ZERO);
        assert_eq!(parse_amount(Some("")), Decimal::ZERO);
        assert_eq!(parse_amount(None), Decimal::ZERO);
    }

    #[test]
    fn json_amount_accepts_numbers_and_strings() {
        assert_eq!(json_amount(Some(&json!(2.75))), Decimal::new(275, 2));
        assert_eq!(json_amount(Some(&json!("2.75"))), Decimal::new(275, 2));
        assert_eq!(json_amount(Some(&json!(3))), Decimal::new(3, 0));
    }

    #[test]
    fn json_amount_rejects_non_numeric_shapes() {
        assert_eq!(json_amount(Some(&json!(true))), Decimal::ZERO);
        assert_eq!(json_amount(Some(&json!({"amount": 1}))), Decimal::ZERO);
        assert_eq!(json_amount(Some(&json!(null))), Decimal::ZERO);
        assert_eq!(json_amount(None), Decimal::ZERO);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_cents(Decimal::new(15005, 3)).to_string(), "15.01");
        assert_eq!(round_cents(Decimal::new(-15005, 3)).to_string(), "-15.01");
        assert_eq!(round_cents(Decimal::new(2004, 3)).to_string(), "2.00");
    }

    #[test]
    fn to_money_emits_plain_numbers() {
        assert_eq!(to_money(Decimal::new(15005, 3)), 15.01);
        assert_eq!(to_money(Decimal::ZERO), 0.0);
    }
}
