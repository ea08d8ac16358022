use std::collections::HashMap;

use viab_types::{FieldValue, ShareBounds};

use crate::plugin::{CalculationResult, CalculatorPlugin};

/// Whether `value` lies in `[min, max]`. Unlike the arithmetic formulas this one
/// refuses malformed input, since a silent 0 would make the answer meaningless.
pub struct BoundsCheckCalculator;

impl CalculatorPlugin for BoundsCheckCalculator {
    fn name(&self) -> &str {
        "bounds_check"
    }

    fn calculate(&self, args: &HashMap<String, &FieldValue>) -> CalculationResult {
        let read = |name: &str| match args.get(name) {
            Some(v) => v
                .as_f64()
                .ok_or_else(|| format!("Invalid argument '{name}': expected number")),
            None => Err(format!("Missing argument '{name}'")),
        };
        let value = read("value")?;
        let bounds = ShareBounds::new(read("min")?, value, read("max")?);
        Ok(FieldValue::Boolean(bounds.contains(value)))
    }
}
