//! Share Of Total Calculator
//!
//! Expresses `part` as a percentage of `total`.
//!
//! result = part / total × 100
//!
//! Returns 0 when `total` is not positive.

use std::collections::HashMap;

use viab_types::FieldValue;

use crate::costs::ratio_percent;
use crate::plugin::{CalculationResult, CalculatorPlugin, number_arg};

#[derive(Debug, Default)]
pub struct ShareOfTotalCalculator;

impl CalculatorPlugin for ShareOfTotalCalculator {
    fn name(&self) -> &str {
        "share_of_total"
    }

    fn calculate(&self, args: &HashMap<String, &FieldValue>) -> CalculationResult {
        let part = number_arg(args, &["part", "individual_value", "value"]);
        let total = number_arg(args, &["total", "total_value", "aggregate"]);
        Ok(FieldValue::Float(ratio_percent(part, total)))
    }
}
