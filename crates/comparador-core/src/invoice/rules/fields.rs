//! Labeled field specifications and the default/error policy.

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use super::amounts::parse_bill_decimal;
use super::{ExtractionMatch, FieldExtractor};
use crate::error::ExtractionError;

/// Kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Whole number, digits only.
    Integer,
    /// Decimal number with comma as decimal separator and dot thousands.
    Decimal,
}

/// A typed value pulled out of the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(u64),
    Decimal(Decimal),
}

impl FieldValue {
    /// The value as a decimal, widening integers.
    pub fn as_decimal(&self) -> Decimal {
        match self {
            FieldValue::Integer(n) => Decimal::from(*n),
            FieldValue::Decimal(d) => *d,
        }
    }

    /// The value as an integer, `None` for decimals.
    pub fn as_integer(&self) -> Option<u64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            FieldValue::Decimal(_) => None,
        }
    }
}

/// How to find one field in the text and what to do when it is absent.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    label: String,
    pattern: Regex,
    kind: ValueKind,
    default: Option<FieldValue>,
}

impl FieldSpec {
    /// Create a required field. `pattern` must capture the value in group 1.
    pub fn new(label: impl Into<String>, pattern: Regex, kind: ValueKind) -> Self {
        Self {
            label: label.into(),
            pattern,
            kind,
            default: None,
        }
    }

    /// Value used when the label is not found, making the field optional.
    pub fn with_default(mut self, default: FieldValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Replace the label pattern.
    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn default_value(&self) -> Option<FieldValue> {
        self.default
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// Whether the label occurs in the text at all.
    pub fn is_present(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Number of capture groups in the pattern, excluding the whole match.
    pub fn capture_groups(&self) -> usize {
        self.pattern.captures_len() - 1
    }

    fn parse_value(&self, raw: &str) -> Result<FieldValue, ExtractionError> {
        let parsed = match self.kind {
            ValueKind::Integer => raw.trim().parse::<u64>().ok().map(FieldValue::Integer),
            ValueKind::Decimal => parse_bill_decimal(raw).map(FieldValue::Decimal),
        };

        parsed.ok_or_else(|| ExtractionError::InvalidValue {
            field: self.label.clone(),
            value: raw.to_string(),
        })
    }
}

impl FieldExtractor for FieldSpec {
    type Output = FieldValue;

    fn extract(&self, text: &str) -> Result<FieldValue, ExtractionError> {
        let raw = self
            .pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str());

        match raw {
            Some(raw) => self.parse_value(raw),
            None => self
                .default
                .ok_or_else(|| ExtractionError::MissingField(self.label.clone())),
        }
    }

    fn extract_all(&self, text: &str) -> Vec<ExtractionMatch<FieldValue>> {
        let mut results = Vec::new();

        for caps in self.pattern.captures_iter(text) {
            let (Some(full), Some(raw)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if let Ok(value) = self.parse_value(raw.as_str()) {
                results.push(
                    ExtractionMatch::new(value, full.as_str())
                        .with_position(full.start(), full.end()),
                );
            }
        }

        results
    }
}

/// Extract one field from text, falling back to its default.
pub fn extract(text: &str, spec: &FieldSpec) -> Result<FieldValue, ExtractionError> {
    spec.extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn spec(pattern: &str, kind: ValueKind) -> FieldSpec {
        FieldSpec::new("campo", Regex::new(pattern).unwrap(), kind)
    }

    #[test]
    fn test_decimal_comma_normalized() {
        let field = spec(r"(?i)potencia:\s*([\d,]+)", ValueKind::Decimal);
        assert_eq!(
            extract("POTENCIA: 1,5 kW", &field),
            Ok(FieldValue::Decimal(Decimal::from_str("1.5").unwrap()))
        );
    }

    #[test]
    fn test_first_match_wins() {
        let field = spec(r"(?i)d[ií]as:\s*(\d+)", ValueKind::Integer);
        let text = "dias: 30\nDÍAS: 31";
        assert_eq!(extract(text, &field), Ok(FieldValue::Integer(30)));
        assert_eq!(field.extract_all(text).len(), 2);
        assert_eq!(field.extract_all(text)[1].value, FieldValue::Integer(31));
    }

    #[test]
    fn test_missing_required_field() {
        let field = spec(r"total:\s*([\d,]+)", ValueKind::Decimal);
        assert_eq!(
            extract("sin importe", &field),
            Err(ExtractionError::MissingField("campo".to_string()))
        );
    }

    #[test]
    fn test_missing_field_with_default() {
        let field = spec(r"iva:\s*([\d,]+)", ValueKind::Decimal)
            .with_default(FieldValue::Decimal(Decimal::ZERO));
        assert!(!field.is_required());
        assert_eq!(extract("", &field), Ok(FieldValue::Decimal(Decimal::ZERO)));
    }

    #[test]
    fn test_unparseable_match_is_invalid() {
        let field = spec(r"dias:\s*(\S+)", ValueKind::Integer);
        assert_eq!(
            extract("dias: treinta", &field),
            Err(ExtractionError::InvalidValue {
                field: "campo".to_string(),
                value: "treinta".to_string(),
            })
        );
    }

    #[test]
    fn test_match_position() {
        let field = spec(r"llano:\s*(\d+)", ValueKind::Integer);
        let found = field.extract_all("xx llano: 50");
        assert_eq!(found[0].position, Some((3, 12)));
        assert_eq!(found[0].source, "llano: 50");
    }
}
