//! Fixed Budget Calculator
//!
//! Site-administration cost over the whole construction period.
//! Inputs:
//!   * `monthly_items`: array of amounts or object of `name → amount`;
//!     alternatively `monthly_total`
//!   * `duration_months` / `months` (negative reads as 0)
//!
use std::collections::HashMap;

use viab_types::{FieldValue, MonthlyBudget};

use crate::costs::indirect_from_fixed_budget;
use crate::plugin::{CalculationResult, CalculatorPlugin, number_arg};

#[derive(Debug, Default)]
pub struct FixedBudgetCalculator;

impl CalculatorPlugin for FixedBudgetCalculator {
    fn name(&self) -> &str {
        "fixed_budget"
    }

    fn calculate(&self, args: &HashMap<String, &FieldValue>) -> CalculationResult {
        let budget: MonthlyBudget = match args.get("monthly_items") {
            Some(FieldValue::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v.number_or_zero()))
                .collect(),
            Some(FieldValue::Object(entries)) => {
                entries.iter().map(|(k, v)| (k.clone(), v.number_or_zero())).collect()
            }
            Some(other) => {
                return Err(format!(
                    "Invalid argument 'monthly_items': expected array or object, got {}",
                    other.type_name()
                ));
            }
            None => [("total", number_arg(args, &["monthly_total"]))].into_iter().collect(),
        };

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let duration = number_arg(args, &["duration_months", "months"]).trunc().max(0.0) as u32;

        Ok(FieldValue::Float(indirect_from_fixed_budget(&budget, duration)))
    }
}
