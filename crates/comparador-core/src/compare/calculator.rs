//! Per-tariff cost computation and ranking.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::models::invoice::{round_money, ConsumptionInput};
use crate::models::tariff::{ComparisonReport, CostBreakdown, TariffRate};

/// Full-precision cost of one tariff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TariffCost {
    pub coste_potencia: Decimal,
    pub coste_energia: Decimal,
    pub coste_variable: Decimal,
    pub coste_fijo: Option<Decimal>,
    pub coste_total: Decimal,
}

impl TariffCost {
    /// Key the comparison is ranked by.
    fn ranking_key(&self) -> Decimal {
        match self.coste_fijo {
            Some(_) => self.coste_total,
            None => self.coste_variable,
        }
    }
}

/// Computes what each tariff would have cost for a consumption.
#[derive(Debug, Clone)]
pub struct CostCalculator {
    llano_fallback: bool,
}

impl CostCalculator {
    pub fn new() -> Self {
        Self {
            llano_fallback: true,
        }
    }

    /// Bill mid energy at the peak price when a tariff has no mid price.
    pub fn with_llano_fallback(mut self, llano_fallback: bool) -> Self {
        self.llano_fallback = llano_fallback;
        self
    }

    /// Cost of one tariff, `None` when it cannot be priced.
    pub fn cost(&self, consumption: &ConsumptionInput, rate: &TariffRate) -> Option<TariffCost> {
        let dias = Decimal::from(consumption.dias_factura);
        let potencia = &consumption.potencia;
        let energia = &consumption.energia;

        let precio_llano = match rate.energia_llano {
            Some(price) => price,
            None if self.llano_fallback => rate.energia_punta,
            None => return None,
        };

        let coste_potencia = potencia
            .punta
            .checked_mul(rate.potencia_punta)?
            .checked_mul(dias)?
            .checked_add(potencia.valle.checked_mul(rate.potencia_valle)?.checked_mul(dias)?)?;

        let coste_energia = energia
            .punta
            .checked_mul(rate.energia_punta)?
            .checked_add(energia.llano.checked_mul(precio_llano)?)?
            .checked_add(energia.valle.checked_mul(rate.energia_valle)?)?;

        let coste_variable = coste_potencia.checked_add(coste_energia)?;
        let coste_fijo = consumption.coste_fijo();
        let coste_total = coste_variable.checked_add(coste_fijo.unwrap_or(Decimal::ZERO))?;

        Some(TariffCost {
            coste_potencia,
            coste_energia,
            coste_variable,
            coste_fijo,
            coste_total,
        })
    }

    /// Price every tariff and rank them, cheapest first.
    ///
    /// Tariffs that cannot be priced are skipped. Equal costs keep the order
    /// of `rates`.
    pub fn compute(&self, consumption: &ConsumptionInput, rates: &[TariffRate]) -> ComparisonReport {
        let mut costed: Vec<(TariffCost, &TariffRate)> = Vec::with_capacity(rates.len());

        for rate in rates {
            match self.cost(consumption, rate) {
                Some(cost) => costed.push((cost, rate)),
                None => warn!("Skipping tariff {:?} (column {}): cannot be priced", rate.nombre, rate.columna),
            }
        }

        // Vec::sort_by is stable
        costed.sort_by(|(a, _), (b, _)| a.ranking_key().cmp(&b.ranking_key()));

        let entries: Vec<CostBreakdown> = costed
            .into_iter()
            .map(|(cost, rate)| to_breakdown(&cost, rate))
            .collect();

        debug!("Ranked {} of {} tariffs", entries.len(), rates.len());
        ComparisonReport::new(entries, consumption.has_fixed_costs())
    }
}

impl Default for CostCalculator {
    fn default() -> Self {
        Self::new()
    }
}

fn to_breakdown(cost: &TariffCost, rate: &TariffRate) -> CostBreakdown {
    let coste_variable = round_money(cost.coste_variable);
    let coste_fijo = cost.coste_fijo.map(round_money);

    CostBreakdown {
        tarifa: rate.nombre.clone(),
        coste_potencia: round_money(cost.coste_potencia),
        coste_energia: round_money(cost.coste_energia),
        coste_variable,
        coste_fijo,
        // Sum of rounded parts, so the reported total always adds up
        coste_total: coste_variable + coste_fijo.unwrap_or(Decimal::ZERO),
        enlace: rate.enlace.clone(),
    }
}
