//! Data models shared by extraction, rate loading and comparison.

pub mod config;
pub mod invoice;
pub mod tariff;

pub use config::ComparadorConfig;
pub use invoice::{ConsumptionInput, Energia, InvoiceRecord, Potencia};
pub use tariff::{ComparisonReport, CostBreakdown, TariffRate};
