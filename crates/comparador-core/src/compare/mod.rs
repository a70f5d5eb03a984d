//! Tariff comparison: price a consumption against a rate catalog.

mod calculator;

pub use calculator::{CostCalculator, TariffCost};

use tracing::info;

use crate::error::ComparisonError;
use crate::models::invoice::ConsumptionInput;
use crate::models::tariff::ComparisonReport;
use crate::rates::{RateOptions, RateTable, TabularSource};

/// Result type for comparison operations.
pub type Result<T> = std::result::Result<T, ComparisonError>;

/// Rank every tariff of `source` by what it would cost for `consumption`.
///
/// The source is read on every call. Fails when the consumption is out of
/// range, when the source cannot be read, or when no tariff could be priced.
pub fn compare_tariffs(
    consumption: &ConsumptionInput,
    source: &dyn TabularSource,
    options: &RateOptions,
) -> Result<ComparisonReport> {
    consumption.validate()?;
    let table = RateTable::load(source, options)?;

    let report = CostCalculator::new()
        .with_llano_fallback(options.llano_fallback)
        .compute(consumption, table.rates());

    if report.is_empty() {
        return Err(ComparisonError::NoValidRates);
    }

    if let Some(best) = report.cheapest() {
        info!(
            "Compared {} tariffs, cheapest: {} ({})",
            report.len(),
            best.tarifa,
            best.coste_total
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::RateLayout;
    use crate::models::invoice::{Energia, Potencia};
    use crate::rates::{CsvSource, Grid};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn consumption() -> ConsumptionInput {
        ConsumptionInput::new(
            30,
            Potencia { punta: dec("3.0"), valle: dec("3.0") },
            Energia { punta: dec("100"), llano: dec("50"), valle: dec("50") },
        )
    }

    /// Catalog laid out like the spreadsheet export: four label columns, a
    /// header row, then plans from column 4.
    const CATALOG: &str = "\
Comparador,,,,,,,,
Nombre,,,,Luz Fija,Luz Plus,Luz Noche,Sin Valle,Luz Eco
Enlace,,,,https://a.example,https://b.example,,https://d.example,
,,,,,,,,
,,,,,,,,
,,,,,,,,
,,,,,,,,
Potencia punta,,,,0.12,0.11,0.10,0.09,0.12
Potencia valle,,,,0.05,0.05,0.03,,0.05
,,,,,,,,
,,,,,,,,
,,,,,,,,
Energia punta,,,,0.15,0.16,0.20,0.10,0.14
Energia llano,,,,0.10,0.12,0.12,0.10,
Energia valle,,,,0.08,0.07,0.05,0.05,0.08
";

    #[test]
    fn test_excludes_incomplete_column() {
        let source = CsvSource::from_text(CATALOG);
        let report = compare_tariffs(&consumption(), &source, &RateOptions::default()).unwrap();

        assert_eq!(report.len(), 4);
        assert!(report.iter().all(|e| e.tarifa != "Sin Valle"));
    }

    #[test]
    fn test_ranked_cheapest_first() {
        let source = CsvSource::from_text(CATALOG);
        let report = compare_tariffs(&consumption(), &source, &RateOptions::default()).unwrap();

        let totals: Vec<Decimal> = report.iter().map(|e| e.coste_total).collect();
        let mut sorted = totals.clone();
        sorted.sort();
        assert_eq!(totals, sorted);

        let fija = report.iter().find(|e| e.tarifa == "Luz Fija").unwrap();
        assert_eq!(fija.coste_variable, dec("39.30"));
        assert_eq!(fija.enlace, "https://a.example");
    }

    #[test]
    fn test_llano_fallback_disabled_drops_tariff() {
        let source = CsvSource::from_text(CATALOG);
        let options = RateOptions {
            layout: RateLayout::default(),
            llano_fallback: false,
        };
        let report = compare_tariffs(&consumption(), &source, &options).unwrap();
        assert_eq!(report.len(), 3);
        assert!(report.iter().all(|e| e.tarifa != "Luz Eco"));
    }

    #[test]
    fn test_no_valid_rates() {
        let grid = Grid::from_rows(vec![vec!["solo", "texto"]]);
        assert!(matches!(
            compare_tariffs(&consumption(), &grid, &RateOptions::default()),
            Err(ComparisonError::NoValidRates)
        ));
    }

    #[test]
    fn test_rejects_zero_days_before_reading_source() {
        let mut input = consumption();
        input.dias_factura = 0;
        let source = CsvSource::from_path("/nonexistent/comparador.csv");
        assert!(matches!(
            compare_tariffs(&input, &source, &RateOptions::default()),
            Err(ComparisonError::InvalidConsumption(_))
        ));
    }

    #[test]
    fn test_unreadable_source() {
        let source = CsvSource::from_path("/nonexistent/comparador.csv");
        assert!(matches!(
            compare_tariffs(&consumption(), &source, &RateOptions::default()),
            Err(ComparisonError::Source(_))
        ));
    }
}
