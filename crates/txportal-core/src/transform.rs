//! Normalization helpers shared by the provider adapters

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};

/// Convert `YYYY-MM-DD` to the `DD/MM/YYYY` form the banks expect
pub fn iso_to_display_date(iso: &str) -> CoreResult<String> {
    NaiveDate::parse_from_str(iso.trim(), "%Y-%m-%d")
        .map(|d| d.format("%d/%m/%Y").to_string())
        .map_err(|_| CoreError::validation(format!("Fecha inválida: {}", iso)))
}

/// Parse a comma-decimal amount such as `1.234,56`
///
/// Every `.` is a thousands separator and the first `,` is the decimal
/// point. Unparsable input yields 0.
pub fn parse_locale_amount(raw: &str) -> f64 {
    let normalized = raw.trim().replace('.', "").replacen(',', ".", 1);
    finite_or_zero(normalized.parse().ok())
}

/// Parse a period-decimal amount such as `1939.68`; 0 on failure
pub fn parse_plain_amount(raw: &str) -> f64 {
    finite_or_zero(raw.trim().parse().ok())
}

/// `HHMM` becomes `HH:MM`; anything else passes through
pub fn format_hhmm(raw: &str) -> String {
    if raw.chars().count() == 4 {
        let (hours, minutes) = raw.split_at(raw.char_indices().nth(2).map_or(2, |(i, _)| i));
        format!("{}:{}", hours, minutes)
    } else {
        raw.to_string()
    }
}

/// Amount from a JSON scalar that may be a number or a numeric string
pub fn amount_from_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => finite_or_zero(n.as_f64()),
        Value::String(s) => parse_plain_amount(s),
        _ => 0.0,
    }
}

/// Text from a JSON scalar; empty strings, zero and null count as absent
pub fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Deserialize `null` as the type's default
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn finite_or_zero(parsed: Option<f64>) -> f64 {
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_iso_to_display_date() {
        assert_eq!(iso_to_display_date("2024-01-31").unwrap(), "31/01/2024");
        assert_eq!(iso_to_display_date("2024-12-05").unwrap(), "05/12/2024");
        assert!(iso_to_display_date("31/01/2024").is_err());
        assert!(iso_to_display_date("").is_err());
    }

    #[test]
    fn test_parse_locale_amount() {
        assert_eq!(parse_locale_amount("1.234,56"), 1234.56);
        assert_eq!(parse_locale_amount("0,00"), 0.0);
        assert_eq!(parse_locale_amount("520,00"), 520.0);
        assert_eq!(parse_locale_amount("12.345.678,9"), 12345678.9);
        assert_eq!(parse_locale_amount("-1.000,50"), -1000.5);
        assert_eq!(parse_locale_amount("75"), 75.0);
    }

    #[test]
    fn test_parse_locale_amount_falls_back_to_zero() {
        assert_eq!(parse_locale_amount(""), 0.0);
        assert_eq!(parse_locale_amount("abc"), 0.0);
        assert_eq!(parse_locale_amount("NaN"), 0.0);
        assert_eq!(parse_locale_amount("inf"), 0.0);
    }

    #[test]
    fn test_locale_amount_grid() {
        for (whole, cents) in [(1u32, 5u32), (12, 50), (999, 99), (4321, 10)] {
            let raw = format!("{}.{:03},{:02}", whole, 234, cents);
            let expected: f64 = format!("{}234.{:02}", whole, cents).parse().unwrap();
            assert_eq!(parse_locale_amount(&raw), expected, "input {}", raw);
        }
    }

    #[test]
    fn test_parse_plain_amount() {
        assert_eq!(parse_plain_amount("1939.68"), 1939.68);
        assert_eq!(parse_plain_amount(" 10 "), 10.0);
        assert_eq!(parse_plain_amount("1939,68"), 0.0);
    }

    #[test]
    fn test_format_hhmm() {
        assert_eq!(format_hhmm("2304"), "23:04");
        assert_eq!(format_hhmm("0000"), "00:00");
        assert_eq!(format_hhmm("930"), "930");
        assert_eq!(format_hhmm("10:15"), "10:15");
        assert_eq!(format_hhmm(""), "");
        assert_eq!(format_hhmm("123456"), "123456");
    }

    #[test]
    fn test_amount_from_value() {
        assert_eq!(amount_from_value(&json!(150.25)), 150.25);
        assert_eq!(amount_from_value(&json!("99.5")), 99.5);
        assert_eq!(amount_from_value(&json!(null)), 0.0);
        assert_eq!(amount_from_value(&json!("n/a")), 0.0);
    }

    #[test]
    fn test_text_from_value() {
        assert_eq!(text_from_value(&json!("ABC")).as_deref(), Some("ABC"));
        assert_eq!(text_from_value(&json!(123456)).as_deref(), Some("123456"));
        assert_eq!(text_from_value(&json!("")), None);
        assert_eq!(text_from_value(&json!(0)), None);
        assert_eq!(text_from_value(&json!(null)), None);
    }
}
