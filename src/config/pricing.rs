//! Pricing configuration loading from milheiro.toml
//!
//! This module provides the valuation parameters reports use when
//! estimating what the current miles inventory would liquidate for.
//! Defaults mirror the rates the desk trades at; a `[pricing]` table in
//! milheiro.toml overrides them.

use crate::entities::enums::ProgramType;
use serde::Deserialize;
use std::collections::HashMap;

/// Valuation parameters for inventory reports
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PricingConfig {
    /// Multiplier applied over the acquisition CPM when estimating the
    /// liquidation value of miles with purchase history
    pub markup_factor: f64,
    /// Fallback sale price per thousand miles for programs without
    /// purchase history
    pub default_price_per_thousand: f64,
    /// Per-program fallback overrides, keyed by stored program value
    /// (e.g., `LIVELO = 40.0`)
    pub program_rates: HashMap<String, f64>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let mut program_rates = HashMap::new();
        program_rates.insert("AZUL".to_string(), 25.0);
        program_rates.insert("LATAM".to_string(), 24.0);
        program_rates.insert("SMILES".to_string(), 22.0);
        program_rates.insert("LIVELO".to_string(), 40.0);

        Self {
            markup_factor: 1.3,
            default_price_per_thousand: 22.0,
            program_rates,
        }
    }
}

impl PricingConfig {
    /// Fallback sale price per thousand miles for the given program.
    #[must_use]
    pub fn rate_per_thousand(&self, program: ProgramType) -> f64 {
        self.program_rates
            .get(&program.to_string())
            .copied()
            .unwrap_or(self.default_price_per_thousand)
    }

    /// Fallback sale price per single mile.
    #[must_use]
    pub fn rate_per_mile(&self, program: ProgramType) -> f64 {
        self.rate_per_thousand(program) / 1000.0
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_default_pricing() {
        let pricing = PricingConfig::default();
        assert_eq!(pricing.markup_factor, 1.3);
        assert_eq!(pricing.rate_per_thousand(ProgramType::Livelo), 40.0);
        assert_eq!(pricing.rate_per_thousand(ProgramType::Azul), 25.0);
        // Programs without an override fall back to the default rate
        assert_eq!(pricing.rate_per_thousand(ProgramType::KmParceiros), 22.0);
        assert_eq!(pricing.rate_per_mile(ProgramType::KmParceiros), 0.022);
    }

    #[test]
    fn test_parse_pricing_config() {
        let toml_str = r#"
            markup_factor = 1.5
            default_price_per_thousand = 20.0

            [program_rates]
            LIVELO = 38.0
        "#;

        let pricing: PricingConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(pricing.markup_factor, 1.5);
        assert_eq!(pricing.rate_per_thousand(ProgramType::Livelo), 38.0);
        // Overriding the table replaces it entirely
        assert_eq!(pricing.rate_per_thousand(ProgramType::Azul), 20.0);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let pricing: PricingConfig = toml::from_str("markup_factor = 1.4").unwrap();
        assert_eq!(pricing.markup_factor, 1.4);
        assert_eq!(pricing.default_price_per_thousand, 22.0);
        assert_eq!(pricing.rate_per_thousand(ProgramType::Smiles), 22.0);
    }
}
