//! Core library for electricity bill analysis and tariff comparison.
//!
//! This crate provides:
//! - Field extraction from bill text (billing days, contracted power,
//!   energy per period, totals) with per-field default/error policy
//! - Rate tables read from spreadsheet-style grids (CSV)
//! - Cost computation and stable ranking of tariffs
//! - PDF text extraction (feature `pdf`)

pub mod compare;
pub mod error;
pub mod invoice;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod rates;

pub use compare::{compare_tariffs, CostCalculator};
pub use error::{ComparadorError, ComparisonError, ExtractionError, PdfError, Result};
pub use invoice::{extract_invoice_fields, ExtractionResult, InvoiceParser, RuleInvoiceParser};
pub use models::config::ComparadorConfig;
pub use models::invoice::{ConsumptionInput, Energia, InvoiceRecord, Potencia};
pub use models::tariff::{ComparisonReport, CostBreakdown, TariffRate};
#[cfg(feature = "pdf")]
pub use pdf::{PdfExtractor, PdfProcessor, PdfType};
pub use rates::{Cell, CsvSource, Grid, RateOptions, RateTable, TabularSource};
