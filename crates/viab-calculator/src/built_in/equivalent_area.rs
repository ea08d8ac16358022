//! Equivalent Area Calculator
//!
//! Weighted area of one floor row, for live previews of the floor table.
//! Inputs (aliases):
//!   * `raw_area` / `area`
//!   * `repeat_count` / `rep` (values below 1 read as 1)
//!   * `coefficient` / `coef`, or `kind` / `tipo` to resolve the coefficient
//!     from the floor-kind table
//!
use std::collections::HashMap;

use viab_types::{CoefficientTable, FieldValue};

use crate::floors::equivalent_area;
use crate::plugin::{CalculationResult, CalculatorPlugin, number_arg, optional_number_arg};

#[derive(Debug, Default)]
pub struct EquivalentAreaCalculator {
    table: CoefficientTable,
}

impl EquivalentAreaCalculator {
    pub fn with_table(table: CoefficientTable) -> Self {
        Self { table }
    }
}

impl CalculatorPlugin for EquivalentAreaCalculator {
    fn name(&self) -> &str {
        "equivalent_area"
    }

    fn calculate(&self, args: &HashMap<String, &FieldValue>) -> CalculationResult {
        let raw_area = number_arg(args, &["raw_area", "area"]);
        let repeat_count = optional_number_arg(args, &["repeat_count", "rep"])
            .map_or(1.0, |r| r.trunc().max(1.0));
        let coefficient = match optional_number_arg(args, &["coefficient", "coef"]) {
            Some(c) => c,
            None => {
                let kind = ["kind", "tipo"]
                    .iter()
                    .find_map(|&n| args.get(n).and_then(|v| v.as_str()))
                    .unwrap_or_default();
                self.table.range(kind).min
            }
        };
        Ok(FieldValue::Float(equivalent_area(raw_area, repeat_count, coefficient)))
    }
}
