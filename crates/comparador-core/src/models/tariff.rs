//! Tariff pricing rows and comparison output.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Prices of one pricing plan, as read from a rate catalog column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffRate {
    /// Display name of the plan.
    pub nombre: String,

    /// Peak power price, per kW per day.
    pub potencia_punta: Decimal,

    /// Off-peak power price, per kW per day.
    pub potencia_valle: Decimal,

    /// Peak energy price, per kWh.
    pub energia_punta: Decimal,

    /// Mid energy price, per kWh. Absent when the catalog leaves it blank.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energia_llano: Option<Decimal>,

    /// Off-peak energy price, per kWh.
    pub energia_valle: Decimal,

    /// Link to the offer, empty when none is known.
    #[serde(default)]
    pub enlace: String,

    /// Column of the plan in the source grid.
    pub columna: usize,
}

/// Cost of one tariff for a given consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Plan name.
    pub tarifa: String,

    /// Power term.
    pub coste_potencia: Decimal,

    /// Energy term.
    pub coste_energia: Decimal,

    /// Consumption-driven cost (power + energy).
    pub coste_variable: Decimal,

    /// Tax plus equipment rental, when supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coste_fijo: Option<Decimal>,

    /// Variable cost plus fixed cost.
    pub coste_total: Decimal,

    /// Link to the offer.
    pub enlace: String,
}

/// Tariffs ranked from cheapest to most expensive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ComparisonReport {
    entries: Vec<CostBreakdown>,
    #[serde(skip)]
    fixed_costs_applied: bool,
}

impl ComparisonReport {
    pub(crate) fn new(entries: Vec<CostBreakdown>, fixed_costs_applied: bool) -> Self {
        Self {
            entries,
            fixed_costs_applied,
        }
    }

    /// Ranked entries.
    pub fn entries(&self) -> &[CostBreakdown] {
        &self.entries
    }

    /// Cheapest tariff, if any.
    pub fn cheapest(&self) -> Option<&CostBreakdown> {
        self.entries.first()
    }

    /// Whether the ranking used total cost (fixed costs supplied) rather than
    /// variable cost.
    pub fn fixed_costs_applied(&self) -> bool {
        self.fixed_costs_applied
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CostBreakdown> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ComparisonReport {
    type Item = &'a CostBreakdown;
    type IntoIter = std::slice::Iter<'a, CostBreakdown>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
