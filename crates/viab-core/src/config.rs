//! Engine configuration
//!
//! Loaded from TOML, every field defaulted, then patched from `VIAB_*`
//! environment variables.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use viab_calculator::EditPolicy;
use viab_types::parse_decimal;

use crate::error::{ViabError, ViabResult};

/// Inputs a project falls back to when its own value is missing.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DefaultsConfig {
    pub unit_cost_per_equivalent_m2: f64,
    pub sale_price_per_m2: f64,
    pub land_unit_cost: f64,
    pub duration_months: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            unit_cost_per_equivalent_m2: 4500.0,
            sale_price_per_m2: 10000.0,
            land_unit_cost: 0.0,
            duration_months: 12,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RedistributionConfig {
    pub edit_policy: EditPolicy,
}

/// Margin thresholds used to classify a project's health.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MarginConfig {
    pub healthy_percent: f64,
    pub marginal_percent: f64,
}

impl Default for MarginConfig {
    fn default() -> Self {
        Self { healthy_percent: 15.0, marginal_percent: 5.0 }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub defaults: DefaultsConfig,
    pub redistribution: RedistributionConfig,
    pub margin: MarginConfig,
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> ViabResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML file and applies environment overrides.
    pub fn load(path: impl AsRef<Path>) -> ViabResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ViabError::configuration("path", &path.display().to_string(), e.to_string())
        })?;
        info!(path = %path.display(), "Loaded engine configuration");
        Self::from_toml_str(&text)?.apply_env_overrides()
    }

    /// Applies `VIAB_*` overrides from the process environment.
    pub fn apply_env_overrides(self) -> ViabResult<Self> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> ViabResult<Self> {
        let number = |name: &str| -> ViabResult<Option<f64>> {
            match lookup(name) {
                Some(raw) => parse_decimal(&raw)
                    .map(Some)
                    .ok_or_else(|| ViabError::configuration(name, &raw, "expected a number")),
                None => Ok(None),
            }
        };

        if let Some(v) = number("VIAB_UNIT_COST")? {
            self.defaults.unit_cost_per_equivalent_m2 = v;
        }
        if let Some(v) = number("VIAB_SALE_PRICE")? {
            self.defaults.sale_price_per_m2 = v;
        }
        if let Some(v) = number("VIAB_LAND_UNIT_COST")? {
            self.defaults.land_unit_cost = v;
        }
        if let Some(raw) = lookup("VIAB_DURATION_MONTHS") {
            self.defaults.duration_months = raw.trim().parse::<u32>().map_err(|_| {
                ViabError::configuration("VIAB_DURATION_MONTHS", &raw, "expected a whole number of months")
            })?;
        }
        if let Some(raw) = lookup("VIAB_EDIT_POLICY") {
            self.redistribution.edit_policy = match raw.trim() {
                "first_change_wins" => EditPolicy::FirstChangeWins,
                "reject_multiple" => EditPolicy::RejectMultiple,
                other => {
                    warn!(value = other, "Unknown edit policy override");
                    return Err(ViabError::configuration(
                        "VIAB_EDIT_POLICY",
                        other,
                        "expected first_change_wins or reject_multiple",
                    ));
                }
            };
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> ViabResult<()> {
        if self.margin.marginal_percent > self.margin.healthy_percent {
            return Err(ViabError::configuration(
                "margin.marginal_percent",
                &self.margin.marginal_percent.to_string(),
                "marginal threshold must not exceed the healthy threshold",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.defaults.unit_cost_per_equivalent_m2, 4500.0);
        assert_eq!(config.defaults.duration_months, 12);
        assert_eq!(config.redistribution.edit_policy, EditPolicy::FirstChangeWins);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
[defaults]
sale_price_per_m2 = 8500.0

[redistribution]
edit_policy = "reject_multiple"
"#,
        )
        .unwrap();
        assert_eq!(config.defaults.sale_price_per_m2, 8500.0);
        assert_eq!(config.defaults.unit_cost_per_equivalent_m2, 4500.0);
        assert_eq!(config.redistribution.edit_policy, EditPolicy::RejectMultiple);
        assert_eq!(config.margin.healthy_percent, 15.0);
    }

    #[test]
    fn env_overrides_accept_brazilian_numbers() {
        let config = EngineConfig::default()
            .apply_overrides(env(&[
                ("VIAB_UNIT_COST", "5.200,50"),
                ("VIAB_DURATION_MONTHS", "18"),
                ("VIAB_EDIT_POLICY", "reject_multiple"),
            ]))
            .unwrap();
        assert_eq!(config.defaults.unit_cost_per_equivalent_m2, 5200.5);
        assert_eq!(config.defaults.duration_months, 18);
        assert_eq!(config.redistribution.edit_policy, EditPolicy::RejectMultiple);
    }

    #[test]
    fn malformed_override_is_a_configuration_error() {
        let err = EngineConfig::default()
            .apply_overrides(env(&[("VIAB_SALE_PRICE", "caro")]))
            .unwrap_err();
        assert_eq!(err.category(), "configuration");
    }

    #[test]
    fn inverted_margin_thresholds_are_rejected() {
        let err = EngineConfig::from_toml_str("[margin]\nhealthy_percent = 3.0\n").unwrap_err();
        assert_eq!(err.category(), "configuration");
    }
}
