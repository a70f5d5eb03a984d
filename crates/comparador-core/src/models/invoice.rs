//! Consumption data extracted from an electricity bill.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ComparisonError;

/// Contracted power per tariff period, in kW.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Potencia {
    /// Peak period.
    pub punta: Decimal,
    /// Off-peak period.
    pub valle: Decimal,
}

/// Energy consumed per tariff period, in kWh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Energia {
    /// Peak period.
    pub punta: Decimal,
    /// Mid (shoulder) period.
    pub llano: Decimal,
    /// Off-peak period.
    pub valle: Decimal,
}

/// Structured result of extracting a bill.
///
/// Built once by the extractor and never modified afterwards; all access goes
/// through the read-only accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceRecord {
    dias_factura: u32,
    potencia: Potencia,
    energia: Energia,
    factura_total: Decimal,
    factura_impuesto: Decimal,
    factura_alquiler: Decimal,
}

impl InvoiceRecord {
    pub(crate) fn new(
        dias_factura: u32,
        potencia: Potencia,
        energia: Energia,
        factura_total: Decimal,
        factura_impuesto: Decimal,
        factura_alquiler: Decimal,
    ) -> Self {
        Self {
            dias_factura,
            potencia,
            energia,
            factura_total: round_money(factura_total),
            factura_impuesto,
            factura_alquiler,
        }
    }

    /// Length of the billing period in days.
    pub fn dias_factura(&self) -> u32 {
        self.dias_factura
    }

    /// Contracted power.
    pub fn potencia(&self) -> &Potencia {
        &self.potencia
    }

    /// Energy consumed.
    pub fn energia(&self) -> &Energia {
        &self.energia
    }

    /// Invoice total, rounded to cents.
    pub fn factura_total(&self) -> Decimal {
        self.factura_total
    }

    /// Tax (IVA) amount; zero when the bill does not show one.
    pub fn factura_impuesto(&self) -> Decimal {
        self.factura_impuesto
    }

    /// Equipment rental amount; zero when the bill does not show one.
    pub fn factura_alquiler(&self) -> Decimal {
        self.factura_alquiler
    }
}

/// Consumption figures fed to the cost calculator.
///
/// Fixed-cost fields are optional: when both are absent the comparison ranks
/// tariffs by variable cost only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionInput {
    pub dias_factura: u32,
    pub potencia: Potencia,
    pub energia: Energia,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factura_impuesto: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factura_alquiler: Option<Decimal>,
}

impl ConsumptionInput {
    /// Consumption without fixed costs.
    pub fn new(dias_factura: u32, potencia: Potencia, energia: Energia) -> Self {
        Self {
            dias_factura,
            potencia,
            energia,
            factura_impuesto: None,
            factura_alquiler: None,
        }
    }

    /// Attach fixed-cost amounts (tax and equipment rental).
    pub fn with_fixed_costs(mut self, impuesto: Decimal, alquiler: Decimal) -> Self {
        self.factura_impuesto = Some(impuesto);
        self.factura_alquiler = Some(alquiler);
        self
    }

    /// Drop fixed-cost amounts so ranking uses variable cost only.
    pub fn without_fixed_costs(mut self) -> Self {
        self.factura_impuesto = None;
        self.factura_alquiler = None;
        self
    }

    /// Whether any fixed-cost input was supplied.
    pub fn has_fixed_costs(&self) -> bool {
        self.factura_impuesto.is_some() || self.factura_alquiler.is_some()
    }

    /// Check the figures can be priced: at least one billed day, and no
    /// negative power, energy or fixed cost.
    pub fn validate(&self) -> Result<(), ComparisonError> {
        if self.dias_factura == 0 {
            return Err(ComparisonError::InvalidConsumption(
                "dias_factura must be greater than zero".to_string(),
            ));
        }

        let quantities = [
            ("potencia.punta", Some(self.potencia.punta)),
            ("potencia.valle", Some(self.potencia.valle)),
            ("energia.punta", Some(self.energia.punta)),
            ("energia.llano", Some(self.energia.llano)),
            ("energia.valle", Some(self.energia.valle)),
            ("factura_impuesto", self.factura_impuesto),
            ("factura_alquiler", self.factura_alquiler),
        ];

        for (field, value) in quantities {
            if let Some(value) = value.filter(|v| v.is_sign_negative() && !v.is_zero()) {
                return Err(ComparisonError::InvalidConsumption(format!(
                    "{} is negative: {}",
                    field, value
                )));
            }
        }

        Ok(())
    }

    /// Sum of the supplied fixed costs, `None` when none was supplied.
    pub fn coste_fijo(&self) -> Option<Decimal> {
        if !self.has_fixed_costs() {
            return None;
        }
        Some(
            self.factura_impuesto.unwrap_or(Decimal::ZERO)
                + self.factura_alquiler.unwrap_or(Decimal::ZERO),
        )
    }
}

impl From<&InvoiceRecord> for ConsumptionInput {
    fn from(record: &InvoiceRecord) -> Self {
        ConsumptionInput::new(record.dias_factura, record.potencia, record.energia)
            .with_fixed_costs(record.factura_impuesto, record.factura_alquiler)
    }
}

/// Round a monetary amount to cents, always carrying two decimal places.
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(2);
    rounded
}
