//! Rate table built by transposing the pricing bands of a grid.

use tracing::{debug, info};

use super::{Cell, Grid, Result, TabularSource};
use crate::error::ComparisonError;
use crate::models::config::{RateLayout, RatesConfig};
use crate::models::tariff::TariffRate;

/// How to read tariffs out of a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateOptions {
    /// Where the pricing bands are.
    pub layout: RateLayout,
    /// Keep tariffs without a mid energy price and bill mid energy at the
    /// peak price.
    pub llano_fallback: bool,
}

impl Default for RateOptions {
    fn default() -> Self {
        Self {
            layout: RateLayout::default(),
            llano_fallback: true,
        }
    }
}

impl From<&RatesConfig> for RateOptions {
    fn from(config: &RatesConfig) -> Self {
        Self {
            layout: config.layout.clone(),
            llano_fallback: config.llano_fallback,
        }
    }
}

/// Tariffs with complete pricing, in source column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTable {
    rates: Vec<TariffRate>,
    excluded: Vec<usize>,
}

impl RateTable {
    /// Read the source and build the table.
    ///
    /// Fails when the source cannot be read or no column has complete pricing.
    pub fn load(source: &dyn TabularSource, options: &RateOptions) -> Result<Self> {
        let grid = source.read_grid()?;
        let table = Self::from_grid(&grid, options);

        if table.is_empty() {
            return Err(ComparisonError::NoValidRates);
        }

        info!(
            "Loaded {} tariffs ({} columns excluded)",
            table.rates.len(),
            table.excluded.len()
        );
        Ok(table)
    }

    /// Build the table from a grid, dropping columns with incomplete pricing.
    pub fn from_grid(grid: &Grid, options: &RateOptions) -> Self {
        let layout = &options.layout;
        let mut rates = Vec::new();
        let mut excluded = Vec::new();

        for col in layout.first_column..grid.width() {
            match read_column(grid, layout, col, options.llano_fallback) {
                Some(rate) => rates.push(rate),
                None => {
                    debug!("Excluding column {}: incomplete pricing", col);
                    excluded.push(col);
                }
            }
        }

        Self { rates, excluded }
    }

    /// Retained tariffs.
    pub fn rates(&self) -> &[TariffRate] {
        &self.rates
    }

    /// Columns dropped for incomplete pricing.
    pub fn excluded_columns(&self) -> &[usize] {
        &self.excluded
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

fn read_column(grid: &Grid, layout: &RateLayout, col: usize, llano_fallback: bool) -> Option<TariffRate> {
    let price = |row: usize| grid.cell(row, col).and_then(Cell::as_decimal);

    let [potencia_punta_row, potencia_valle_row] = layout.potencia_rows;
    let [energia_punta_row, energia_llano_row, energia_valle_row] = layout.energia_rows;

    let potencia_punta = price(potencia_punta_row)?;
    let potencia_valle = price(potencia_valle_row)?;
    let energia_punta = price(energia_punta_row)?;
    let energia_valle = price(energia_valle_row)?;
    let energia_llano = price(energia_llano_row);

    if energia_llano.is_none() && !llano_fallback {
        return None;
    }

    let nombre = grid
        .cell(layout.name_row, col)
        .map(|c| clean_text(&c.as_text()))
        .unwrap_or_default();

    Some(TariffRate {
        nombre,
        potencia_punta,
        potencia_valle,
        energia_punta,
        energia_llano,
        energia_valle,
        enlace: link_for(grid, layout, col),
        columna: col,
    })
}

/// Link of a column: an explicit annotation first, then the link row text.
fn link_for(grid: &Grid, layout: &RateLayout, col: usize) -> String {
    if let Some(link) = grid.link(col) {
        return clean_text(link);
    }

    layout
        .link_row
        .and_then(|row| grid.cell(row, col))
        .map(|c| clean_text(&c.as_text()))
        .unwrap_or_default()
}

fn clean_text(s: &str) -> String {
    s.replace(['\n', '\r'], "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    /// Compact layout keeping the test grids small.
    fn layout() -> RateLayout {
        RateLayout {
            first_column: 1,
            name_row: 0,
            potencia_rows: [2, 3],
            energia_rows: [4, 5, 6],
            link_row: Some(1),
        }
    }

    fn options(llano_fallback: bool) -> RateOptions {
        RateOptions {
            layout: layout(),
            llano_fallback,
        }
    }

    fn grid() -> Grid {
        Grid::from_rows(vec![
            vec!["Tarifa", "Luz Fija", "Luz Plus", "Luz Noche", "Incompleta"],
            vec!["Enlace", "https://a.example/\nfija", "", "https://c.example", "https://d.example"],
            vec!["P1", "0,12", "0,11", "0,10", "0,13"],
            vec!["P2", "0,05", "0,04", "0,03", ""],
            vec!["E1", "0,15", "0,16", "0,20", "0,14"],
            vec!["E2", "0,10", "", "0,12", "0,11"],
            vec!["E3", "0,08", "0,07", "0,05", "0,06"],
        ])
    }

    #[test]
    fn test_incomplete_columns_excluded() {
        let table = RateTable::from_grid(&grid(), &options(true));

        let names: Vec<&str> = table.rates().iter().map(|r| r.nombre.as_str()).collect();
        assert_eq!(names, vec!["Luz Fija", "Luz Plus", "Luz Noche"]);
        assert_eq!(table.excluded_columns(), &[4]);
    }

    #[test]
    fn test_column_transposed_into_rate() {
        let table = RateTable::from_grid(&grid(), &options(true));
        let rate = &table.rates()[0];

        assert_eq!(
            rate,
            &TariffRate {
                nombre: "Luz Fija".to_string(),
                potencia_punta: dec("0.12"),
                potencia_valle: dec("0.05"),
                energia_punta: dec("0.15"),
                energia_llano: Some(dec("0.10")),
                energia_valle: dec("0.08"),
                enlace: "https://a.example/fija".to_string(),
                columna: 1,
            }
        );
    }

    #[test]
    fn test_missing_llano_kept_with_fallback() {
        let table = RateTable::from_grid(&grid(), &options(true));
        let plus = &table.rates()[1];
        assert_eq!(plus.energia_llano, None);
        assert_eq!(plus.enlace, "");
    }

    #[test]
    fn test_missing_llano_excluded_without_fallback() {
        let table = RateTable::from_grid(&grid(), &options(false));
        assert_eq!(table.len(), 2);
        assert_eq!(table.excluded_columns(), &[2, 4]);
    }

    #[test]
    fn test_explicit_links_take_precedence() {
        let grid = grid().with_links(vec![None, None, Some("https://b.example".to_string())]);
        let table = RateTable::from_grid(&grid, &options(true));
        assert_eq!(table.rates()[0].enlace, "https://a.example/fija");
        assert_eq!(table.rates()[1].enlace, "https://b.example");
    }

    #[test]
    fn test_load_without_complete_rows_fails() {
        let grid = Grid::from_rows(vec![vec!["Tarifa", "Vacia"]]);
        assert!(matches!(
            RateTable::load(&grid, &options(true)),
            Err(ComparisonError::NoValidRates)
        ));
    }

    #[test]
    fn test_load_from_source() {
        let table = RateTable::load(&grid(), &options(true)).unwrap();
        assert_eq!(table.len(), 3);
    }
}
