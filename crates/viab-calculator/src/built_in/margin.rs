//! Margin Calculator
//!
//! Gross profit and margin from revenue and total expense.
//! Inputs (aliases):
//!   * `revenue_total` / `revenue` / `vgv`
//!   * `total_expense` / `expense`
//!
use std::collections::HashMap;

use viab_types::FieldValue;

use crate::costs::ratio_percent;
use crate::plugin::{CalculationResult, CalculatorPlugin, number_arg};

#[derive(Debug, Default)]
pub struct MarginCalculator;

impl CalculatorPlugin for MarginCalculator {
    fn name(&self) -> &str {
        "margin"
    }

    fn calculate(&self, args: &HashMap<String, &FieldValue>) -> CalculationResult {
        let revenue = number_arg(args, &["revenue_total", "revenue", "vgv"]);
        let expense = number_arg(args, &["total_expense", "expense"]);
        let gross_profit = revenue - expense;

        Ok(FieldValue::Object(vec![
            ("gross_profit".to_string(), FieldValue::Float(gross_profit)),
            ("margin_percent".to_string(), FieldValue::Float(ratio_percent(gross_profit, revenue))),
        ]))
    }
}
