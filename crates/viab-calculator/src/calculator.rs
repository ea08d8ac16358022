use std::collections::HashMap;

use anyhow::{Result, anyhow};
use tracing::debug;
use viab_types::FieldValue;

use crate::built_in::{
    bounds_check::BoundsCheckCalculator, equivalent_area::EquivalentAreaCalculator,
    fixed_budget::FixedBudgetCalculator, margin::MarginCalculator,
    percentage_of::PercentageOfCalculator, share_of_total::ShareOfTotalCalculator,
};
use crate::plugin::CalculationResult;
use crate::plugin_manager::PluginManager;

/// Registry of the built-in feasibility formulas.
pub struct FeasibilityCalculator {
    plugin_manager: PluginManager,
}

impl Default for FeasibilityCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl FeasibilityCalculator {
    pub fn new() -> Self {
        let mut plugin_manager = PluginManager::new();
        plugin_manager.register(Box::new(EquivalentAreaCalculator::default()));
        plugin_manager.register(Box::new(PercentageOfCalculator));
        plugin_manager.register(Box::new(FixedBudgetCalculator));
        plugin_manager.register(Box::new(ShareOfTotalCalculator));
        plugin_manager.register(Box::new(MarginCalculator));
        plugin_manager.register(Box::new(BoundsCheckCalculator));
        Self { plugin_manager }
    }

    pub fn calculate(
        &self,
        calculator_name: &str,
        args: &HashMap<String, &FieldValue>,
    ) -> CalculationResult {
        if let Some(plugin) = self.plugin_manager.get(calculator_name) {
            debug!(calculator = calculator_name, arg_count = args.len(), "Evaluating formula");
            plugin.calculate(args)
        } else {
            Err(format!("calculator '{calculator_name}' not found"))
        }
    }

    /// Evaluates a formula from owned `(name, value)` pairs.
    pub fn evaluate(&self, calculator_name: &str, args: &[(String, FieldValue)]) -> Result<FieldValue> {
        let refs: HashMap<String, &FieldValue> =
            args.iter().map(|(k, v)| (k.clone(), v)).collect();
        self.calculate(calculator_name, &refs)
            .map_err(|e| anyhow!("formula '{calculator_name}' failed: {e}"))
    }

    pub fn available(&self) -> Vec<&str> {
        self.plugin_manager.names().collect()
    }
}
