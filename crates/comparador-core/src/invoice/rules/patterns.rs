//! Label patterns for Spanish electricity bills.
//!
//! Every pattern is case-insensitive and captures the value in group 1.
//! Tax lines quote the taxable base before the tax itself, so `IMPUESTO`
//! takes the amount closing the line.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Billing period
    pub static ref DIAS_FACTURADOS: Regex = Regex::new(
        r"(?i)D[IÍ]AS\s+FACTURADOS:\s*(\d+)"
    ).unwrap();

    // Contracted power (kW)
    pub static ref POTENCIA_PUNTA: Regex = Regex::new(
        r"(?i)Potencia\s+punta:\s*(\d+(?:[.,]\d+)*)"
    ).unwrap();

    pub static ref POTENCIA_VALLE: Regex = Regex::new(
        r"(?i)Potencia\s+valle:\s*(\d+(?:[.,]\d+)*)"
    ).unwrap();

    // Energy consumed (kWh)
    pub static ref ENERGIA_PUNTA: Regex = Regex::new(
        r"(?i)punta:\s*(\d+(?:[.,]\d+)*)\s*kWh"
    ).unwrap();

    pub static ref ENERGIA_LLANO: Regex = Regex::new(
        r"(?i)llano:\s*(\d+(?:[.,]\d+)*)\s*kWh"
    ).unwrap();

    pub static ref ENERGIA_VALLE: Regex = Regex::new(
        r"(?i)valle:?\s*(\d+(?:[.,]\d+)*)\s*kWh"
    ).unwrap();

    // Monetary amounts (1.234,56 €)
    pub static ref TOTAL_FACTURA: Regex = Regex::new(
        r"(?i)TOTAL\s+IMPORTE\s+FACTURA\s*(\d{1,3}(?:\.?\d{3})*,\d{2})\s*€"
    ).unwrap();

    pub static ref IMPUESTO: Regex = Regex::new(
        r"(?im)\bIVA\b[^\n]*?(\d{1,3}(?:\.?\d{3})*,\d{2})\s*€[^\S\n]*$"
    ).unwrap();

    pub static ref ALQUILER: Regex = Regex::new(
        r"(?i)Alquiler\s+(?:de\s+)?equipos?[^\n€]*?(\d{1,3}(?:\.?\d{3})*,\d{2})\s*€"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_patterns_skip_power_lines() {
        let text = "Potencia punta: 3,3 kW\nPotencia valle: 3,3 kW\nConsumo valle: 210 kWh";
        assert_eq!(&ENERGIA_VALLE.captures(text).unwrap()[1], "210");
        assert!(ENERGIA_PUNTA.captures(text).is_none());
    }

    #[test]
    fn test_tax_pattern_takes_last_amount_on_line() {
        let text = "IVA 21% s/ 66,19 €   13,90 €\nTOTAL IMPORTE FACTURA 80,09 €";
        assert_eq!(&IMPUESTO.captures(text).unwrap()[1], "13,90");
        assert_eq!(&TOTAL_FACTURA.captures(text).unwrap()[1], "80,09");
    }

    #[test]
    fn test_rental_pattern_variants() {
        assert!(ALQUILER.is_match("Alquiler de equipos de medida 0,81 €"));
        assert!(ALQUILER.is_match("ALQUILER EQUIPO 1,62 €"));
        assert!(!ALQUILER.is_match("Alquiler de equipos\n0,81 €"));
    }
}
