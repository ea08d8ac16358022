//! Calculator for taking a percentage of a base amount
//!
//! Percentages are on the 0–100 scale: 5% of 200 is 10.

use std::collections::HashMap;

use viab_types::FieldValue;

use crate::costs::percentage_of;
use crate::plugin::{CalculationResult, CalculatorPlugin, number_arg};

/// # Arguments
/// * `base_amount` / `amount` / `base` - Amount the percentage applies to
/// * `percentage` / `percent` - Percentage on the 0–100 scale
///
/// # Returns
/// `base_amount × percentage / 100` as a FieldValue::Float
#[derive(Debug, Default)]
pub struct PercentageOfCalculator;

impl CalculatorPlugin for PercentageOfCalculator {
    fn name(&self) -> &str {
        "percentage_of"
    }

    fn calculate(&self, args: &HashMap<String, &FieldValue>) -> CalculationResult {
        let base = number_arg(args, &["base_amount", "amount", "base"]);
        let percentage = number_arg(args, &["percentage", "percent"]);
        Ok(FieldValue::Float(percentage_of(base, percentage)))
    }
}
