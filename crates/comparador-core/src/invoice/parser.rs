//! Rule-based bill parser building an [`InvoiceRecord`] from text.

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{ComparadorError, ExtractionError};
use crate::models::config::ExtractionConfig;
use crate::models::invoice::{Energia, InvoiceRecord, Potencia};

use super::rules::{
    patterns::*,
    FieldExtractor, FieldSpec, FieldValue, ValueKind,
};
use super::Result;

/// Field labels, as reported in errors and accepted as pattern override keys.
pub mod labels {
    pub const DIAS_FACTURA: &str = "dias_factura";
    pub const POTENCIA_PUNTA: &str = "potencia.punta";
    pub const POTENCIA_VALLE: &str = "potencia.valle";
    pub const ENERGIA_PUNTA: &str = "energia.punta";
    pub const ENERGIA_LLANO: &str = "energia.llano";
    pub const ENERGIA_VALLE: &str = "energia.valle";
    pub const FACTURA_TOTAL: &str = "factura_total";
    pub const FACTURA_IMPUESTO: &str = "factura_impuesto";
    pub const FACTURA_ALQUILER: &str = "factura_alquiler";
}

/// Result of bill extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted record.
    pub record: InvoiceRecord,
    /// Raw text the record was extracted from.
    pub raw_text: String,
    /// Optional fields that were not found and took their default.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for bill parsing.
pub trait InvoiceParser {
    /// Parse a bill from text.
    fn parse(&self, text: &str) -> Result<ExtractionResult>;
}

/// Parser driven by one labeled pattern per field.
#[derive(Debug, Clone)]
pub struct RuleInvoiceParser {
    dias_factura: FieldSpec,
    potencia_punta: FieldSpec,
    potencia_valle: FieldSpec,
    energia_punta: FieldSpec,
    energia_llano: FieldSpec,
    energia_valle: FieldSpec,
    factura_total: FieldSpec,
    factura_impuesto: FieldSpec,
    factura_alquiler: FieldSpec,
}

impl RuleInvoiceParser {
    /// Create a parser with the built-in label patterns.
    pub fn new() -> Self {
        let zero = FieldValue::Decimal(Decimal::ZERO);

        Self {
            dias_factura: FieldSpec::new(
                labels::DIAS_FACTURA,
                DIAS_FACTURADOS.clone(),
                ValueKind::Integer,
            ),
            potencia_punta: FieldSpec::new(
                labels::POTENCIA_PUNTA,
                POTENCIA_PUNTA.clone(),
                ValueKind::Decimal,
            ),
            potencia_valle: FieldSpec::new(
                labels::POTENCIA_VALLE,
                POTENCIA_VALLE.clone(),
                ValueKind::Decimal,
            ),
            energia_punta: FieldSpec::new(
                labels::ENERGIA_PUNTA,
                ENERGIA_PUNTA.clone(),
                ValueKind::Decimal,
            ),
            energia_llano: FieldSpec::new(
                labels::ENERGIA_LLANO,
                ENERGIA_LLANO.clone(),
                ValueKind::Decimal,
            ),
            energia_valle: FieldSpec::new(
                labels::ENERGIA_VALLE,
                ENERGIA_VALLE.clone(),
                ValueKind::Decimal,
            ),
            factura_total: FieldSpec::new(
                labels::FACTURA_TOTAL,
                TOTAL_FACTURA.clone(),
                ValueKind::Decimal,
            ),
            factura_impuesto: FieldSpec::new(
                labels::FACTURA_IMPUESTO,
                IMPUESTO.clone(),
                ValueKind::Decimal,
            )
            .with_default(zero),
            factura_alquiler: FieldSpec::new(
                labels::FACTURA_ALQUILER,
                ALQUILER.clone(),
                ValueKind::Decimal,
            )
            .with_default(zero),
        }
    }

    /// Create a parser applying the pattern overrides from configuration.
    pub fn from_config(config: &ExtractionConfig) -> std::result::Result<Self, ComparadorError> {
        let mut parser = Self::new();

        for (label, pattern) in &config.patterns {
            let regex = Regex::new(pattern).map_err(|e| {
                ComparadorError::Config(format!("invalid pattern for {}: {}", label, e))
            })?;
            if regex.captures_len() < 2 {
                return Err(ComparadorError::Config(format!(
                    "pattern for {} has no capture group",
                    label
                )));
            }

            let spec = parser.spec_mut(label).ok_or_else(|| {
                ComparadorError::Config(format!("unknown field: {}", label))
            })?;
            *spec = spec.clone().with_pattern(regex);
            debug!("Overriding pattern for {}", label);
        }

        Ok(parser)
    }

    /// All field specifications, in extraction order.
    pub fn fields(&self) -> [&FieldSpec; 9] {
        [
            &self.dias_factura,
            &self.potencia_punta,
            &self.potencia_valle,
            &self.energia_punta,
            &self.energia_llano,
            &self.energia_valle,
            &self.factura_total,
            &self.factura_impuesto,
            &self.factura_alquiler,
        ]
    }

    fn spec_mut(&mut self, label: &str) -> Option<&mut FieldSpec> {
        let spec = match label {
            labels::DIAS_FACTURA => &mut self.dias_factura,
            labels::POTENCIA_PUNTA => &mut self.potencia_punta,
            labels::POTENCIA_VALLE => &mut self.potencia_valle,
            labels::ENERGIA_PUNTA => &mut self.energia_punta,
            labels::ENERGIA_LLANO => &mut self.energia_llano,
            labels::ENERGIA_VALLE => &mut self.energia_valle,
            labels::FACTURA_TOTAL => &mut self.factura_total,
            labels::FACTURA_IMPUESTO => &mut self.factura_impuesto,
            labels::FACTURA_ALQUILER => &mut self.factura_alquiler,
            _ => return None,
        };
        Some(spec)
    }

    fn extract_days(&self, text: &str) -> Result<u32> {
        let value = self.dias_factura.extract(text)?;
        let invalid = || ExtractionError::InvalidValue {
            field: labels::DIAS_FACTURA.to_string(),
            value: value.as_decimal().to_string(),
        };

        let days = value.as_integer().ok_or_else(invalid)?;
        match u32::try_from(days) {
            Ok(days) if days > 0 => Ok(days),
            _ => Err(invalid()),
        }
    }

    fn extract_optional(&self, spec: &FieldSpec, text: &str, warnings: &mut Vec<String>) -> Result<Decimal> {
        if !spec.is_present(text) {
            warnings.push(format!("{} not found, using default", spec.label()));
        }
        Ok(spec.extract(text)?.as_decimal())
    }
}

impl Default for RuleInvoiceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceParser for RuleInvoiceParser {
    fn parse(&self, text: &str) -> Result<ExtractionResult> {
        let elapsed_ms = timer();
        let mut warnings = Vec::new();

        info!("Parsing bill from {} characters of text", text.len());

        // Required fields, first failure aborts
        let dias_factura = self.extract_days(text)?;
        let potencia = Potencia {
            punta: self.potencia_punta.extract(text)?.as_decimal(),
            valle: self.potencia_valle.extract(text)?.as_decimal(),
        };
        let energia = Energia {
            punta: self.energia_punta.extract(text)?.as_decimal(),
            llano: self.energia_llano.extract(text)?.as_decimal(),
            valle: self.energia_valle.extract(text)?.as_decimal(),
        };
        let factura_total = self.factura_total.extract(text)?.as_decimal();

        // Optional amounts default to zero
        let factura_impuesto = self.extract_optional(&self.factura_impuesto, text, &mut warnings)?;
        let factura_alquiler = self.extract_optional(&self.factura_alquiler, text, &mut warnings)?;

        let record = InvoiceRecord::new(
            dias_factura,
            potencia,
            energia,
            factura_total,
            factura_impuesto,
            factura_alquiler,
        );

        debug!(
            "Extracted bill: {} days, total {}, {} warnings",
            record.dias_factura(),
            record.factura_total(),
            warnings.len()
        );

        Ok(ExtractionResult {
            record,
            raw_text: text.to_string(),
            warnings,
            processing_time_ms: elapsed_ms(),
        })
    }
}

/// Millisecond stopwatch; wasm32 has no clock in std, so it reads zero there.
#[cfg(not(target_arch = "wasm32"))]
fn timer() -> impl Fn() -> u64 {
    let start = Instant::now();
    move || start.elapsed().as_millis() as u64
}

#[cfg(target_arch = "wasm32")]
fn timer() -> impl Fn() -> u64 {
    || 0
}

/// Extract a bill's consumption and totals with the built-in patterns.
pub fn extract_invoice_fields(text: &str) -> Result<InvoiceRecord> {
    RuleInvoiceParser::new().parse(text).map(|r| r.record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const BILL: &str = r#"
        FACTURA DE ELECTRICIDAD
        Periodo de facturación: 01/03/2024 - 31/03/2024
        DIAS FACTURADOS: 31

        Potencia contratada
        Potencia punta: 3,450 kW
        Potencia valle: 3,450 kW

        Consumo por periodos
        punta: 120,5 kWh
        llano: 98 kWh
        valle 210,25 kWh

        Alquiler de equipos de medida 0,81 €
        IVA 21% s/ 66,19 €   13,90 €
        TOTAL IMPORTE FACTURA 80,09 €
    "#;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_full_bill() {
        let result = RuleInvoiceParser::new().parse(BILL).unwrap();
        let record = result.record;

        assert_eq!(record.dias_factura(), 31);
        assert_eq!(record.potencia().punta, dec("3.45"));
        assert_eq!(record.potencia().valle, dec("3.45"));
        assert_eq!(record.energia().punta, dec("120.5"));
        assert_eq!(record.energia().llano, dec("98"));
        assert_eq!(record.energia().valle, dec("210.25"));
        assert_eq!(record.factura_total(), dec("80.09"));
        assert_eq!(record.factura_impuesto(), dec("13.90"));
        assert_eq!(record.factura_alquiler(), dec("0.81"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_dot_groups_thousands_in_bill_values() {
        let text = BILL
            .replace("punta: 120,5 kWh", "punta: 1.234 kWh")
            .replace("valle 210,25 kWh", "valle 1.234,5 kWh");

        let record = extract_invoice_fields(&text).unwrap();
        assert_eq!(record.energia().punta, dec("1234"));
        assert_eq!(record.energia().valle, dec("1234.5"));
        assert_eq!(record.potencia().punta, dec("3.45"));
    }

    #[test]
    fn test_optional_amounts_default_to_zero() {
        let text = BILL
            .replace("Alquiler de equipos de medida 0,81 €", "")
            .replace("IVA 21% s/ 66,19 €   13,90 €", "");

        let result = RuleInvoiceParser::new().parse(&text).unwrap();
        assert_eq!(result.record.factura_impuesto(), Decimal::ZERO);
        assert_eq!(result.record.factura_alquiler(), Decimal::ZERO);
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_missing_days_fails_whole_record() {
        let text = BILL.replace("DIAS FACTURADOS: 31", "");
        assert_eq!(
            extract_invoice_fields(&text),
            Err(ExtractionError::MissingField("dias_factura".to_string()))
        );
    }

    #[test]
    fn test_first_missing_field_is_reported() {
        let text = BILL
            .replace("llano: 98 kWh", "")
            .replace("TOTAL IMPORTE FACTURA 80,09 €", "");
        let err = extract_invoice_fields(&text).unwrap_err();
        assert_eq!(err.field(), labels::ENERGIA_LLANO);
    }

    #[test]
    fn test_zero_days_is_invalid() {
        let text = BILL.replace("DIAS FACTURADOS: 31", "DIAS FACTURADOS: 0");
        assert!(matches!(
            extract_invoice_fields(&text),
            Err(ExtractionError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_case_insensitive_labels() {
        let text = BILL.to_lowercase();
        let record = extract_invoice_fields(&text).unwrap();
        assert_eq!(record.dias_factura(), 31);
        assert_eq!(record.factura_total(), dec("80.09"));
    }

    #[test]
    fn test_pattern_override_from_config() {
        let mut config = ExtractionConfig::default();
        config.patterns.insert(
            labels::DIAS_FACTURA.to_string(),
            r"(?i)periodo de (\d+) d[ií]as".to_string(),
        );
        let parser = RuleInvoiceParser::from_config(&config).unwrap();

        let text = BILL.replace("DIAS FACTURADOS: 31", "Periodo de 29 días");
        let record = parser.parse(&text).unwrap().record;
        assert_eq!(record.dias_factura(), 29);
    }

    #[test]
    fn test_invalid_overrides_rejected() {
        let mut config = ExtractionConfig::default();
        config.patterns.insert("desconocido".to_string(), r"(\d+)".to_string());
        assert!(matches!(
            RuleInvoiceParser::from_config(&config),
            Err(ComparadorError::Config(_))
        ));

        let mut config = ExtractionConfig::default();
        config.patterns.insert(labels::FACTURA_TOTAL.to_string(), r"TOTAL \d+".to_string());
        assert!(matches!(
            RuleInvoiceParser::from_config(&config),
            Err(ComparadorError::Config(_))
        ));
    }

    #[test]
    fn test_required_fields_order() {
        let parser = RuleInvoiceParser::new();
        let required: Vec<&str> = parser
            .fields()
            .iter()
            .filter(|f| f.is_required())
            .map(|f| f.label())
            .collect();
        assert_eq!(required.len(), 7);
        assert_eq!(required[0], labels::DIAS_FACTURA);
        assert_eq!(required[6], labels::FACTURA_TOTAL);
    }
}
