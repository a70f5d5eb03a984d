//! WASM bindings for electricity bill extraction and tariff comparison.
//!
//! Text must be extracted on the JavaScript side (e.g. with pdf.js); these
//! bindings cover field extraction and pricing against a CSV rate catalog.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

use comparador_core::invoice::rules::{format_spanish_amount, parse_bill_decimal};
use comparador_core::{ConsumptionInput, CsvSource, InvoiceParser, RateOptions, RuleInvoiceParser};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Extract consumption data from bill text.
///
/// Returns the record as a plain object; amounts are decimal strings.
#[wasm_bindgen]
pub fn extract_invoice_from_text(text: &str) -> Result<JsValue, JsValue> {
    let result = RuleInvoiceParser::new().parse(text).map_err(to_js_error)?;

    for warning in &result.warnings {
        web_sys::console::warn_1(&JsValue::from_str(warning));
    }

    serde_wasm_bindgen::to_value(&result.record).map_err(to_js_error)
}

/// Rank the tariffs of a CSV rate catalog for a consumption.
///
/// `consumption` is an object shaped like the output of
/// [`extract_invoice_from_text`]; `factura_impuesto` and `factura_alquiler`
/// may be omitted to rank by variable cost only.
#[wasm_bindgen]
pub fn compare_tariffs(consumption: JsValue, csv_text: &str) -> Result<JsValue, JsValue> {
    let consumption: ConsumptionInput =
        serde_wasm_bindgen::from_value(consumption).map_err(to_js_error)?;

    let source = CsvSource::from_text(csv_text);
    let report = comparador_core::compare_tariffs(&consumption, &source, &RateOptions::default())
        .map_err(to_js_error)?;

    serde_wasm_bindgen::to_value(&report).map_err(to_js_error)
}

/// Parse a Spanish-formatted amount (e.g., "1.234,56").
#[wasm_bindgen]
pub fn parse_amount(amount: &str) -> Option<f64> {
    parse_bill_decimal(amount).and_then(|d| d.to_f64())
}

/// Format an amount in Spanish style (1.234,56).
#[wasm_bindgen]
pub fn format_amount(amount: f64) -> String {
    Decimal::from_f64(amount)
        .map(format_spanish_amount)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_parse_amount() {
        let amount = parse_amount("1.234,56").unwrap();
        assert!((amount - 1234.56).abs() < 0.001);
        assert_eq!(parse_amount("1.234"), Some(1234.0));
        assert!(parse_amount("n/a").is_none());
    }

    #[wasm_bindgen_test]
    fn test_format_amount() {
        assert_eq!(format_amount(1234.56), "1.234,56");
    }

    #[wasm_bindgen_test]
    fn test_extract_missing_label_is_error() {
        assert!(extract_invoice_from_text("sin datos").is_err());
    }
}
