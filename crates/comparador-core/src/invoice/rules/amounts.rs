//! Number parsing and formatting for Spanish-formatted values.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a Spanish-formatted number (e.g., "1,5", "1.234,56" or "0.1234").
///
/// A comma is the decimal separator. When both separators appear, the one
/// that comes last is the decimal separator and the other is dropped as a
/// thousands separator.
pub fn parse_spanish_decimal(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}

/// Parse a number printed on a bill, where a comma is always the decimal
/// separator (e.g., "1.234" is 1234, "1.234,5" is 1234.5).
///
/// Dots are read as thousands separators when they split the digits into
/// groups of three; anything else falls back to [`parse_spanish_decimal`].
pub fn parse_bill_decimal(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    if !trimmed.contains(',') && is_dot_grouped(trimmed) {
        return Decimal::from_str(&trimmed.replace('.', "")).ok();
    }
    parse_spanish_decimal(trimmed)
}

/// Whether `s` is digits grouped by dots in thousands ("1.234", "12.345.678").
fn is_dot_grouped(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut groups = digits.split('.');

    let lead_ok = groups.next().is_some_and(|lead| {
        (1..=3).contains(&lead.len())
            && !lead.starts_with('0')
            && lead.chars().all(|c| c.is_ascii_digit())
    });

    let mut rest = groups.peekable();
    lead_ok
        && rest.peek().is_some()
        && rest.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

/// Format an amount in Spanish style (1.234,56).
pub fn format_spanish_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount);
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };

    let Some((integer_part, decimal_part)) = digits.split_once('.') else {
        return s;
    };

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    format!("{}{},{}", sign, formatted, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_spanish_decimal() {
        assert_eq!(parse_spanish_decimal("1,5"), Some(dec("1.5")));
        assert_eq!(parse_spanish_decimal("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_spanish_decimal("0.104"), Some(dec("0.104")));
        assert_eq!(parse_spanish_decimal(" 3,300 "), Some(dec("3.3")));
        assert_eq!(parse_spanish_decimal("1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_spanish_decimal("0,123 €/kWh"), Some(dec("0.123")));
    }

    #[test]
    fn test_parse_bill_decimal_thousands() {
        assert_eq!(parse_bill_decimal("1.234"), Some(dec("1234")));
        assert_eq!(parse_bill_decimal("12.345.678"), Some(dec("12345678")));
        assert_eq!(parse_bill_decimal("1.234,5"), Some(dec("1234.5")));
        assert_eq!(parse_bill_decimal("120,5"), Some(dec("120.5")));
        assert_eq!(parse_bill_decimal("3.3"), Some(dec("3.3")));
        assert_eq!(parse_bill_decimal("0.104"), Some(dec("0.104")));
        assert_eq!(parse_bill_decimal("98"), Some(dec("98")));
        assert_eq!(parse_bill_decimal("n/d"), None);
    }

    #[test]
    fn test_parse_rejects_non_numbers() {
        assert_eq!(parse_spanish_decimal(""), None);
        assert_eq!(parse_spanish_decimal("n/d"), None);
        assert_eq!(parse_spanish_decimal("-"), None);
    }

    #[test]
    fn test_format_spanish_amount() {
        assert_eq!(format_spanish_amount(dec("1234.56")), "1.234,56");
        assert_eq!(format_spanish_amount(dec("39.3")), "39,30");
        assert_eq!(format_spanish_amount(dec("-1234567.891")), "-1.234.567,89");
    }
}
