use std::collections::HashMap;

use tracing::debug;
use viab_types::FieldValue;

pub type CalculationResult = Result<FieldValue, String>;

/// A named formula callable with a loosely typed payload.
pub trait CalculatorPlugin: Send + Sync {
    /// The name of the calculator.
    fn name(&self) -> &str;

    /// Performs the calculation.
    fn calculate(&self, args: &HashMap<String, &FieldValue>) -> CalculationResult;
}

/// Reads the first argument present among `names` as a number.
///
/// Missing or malformed values read as 0, the same degrade policy the engine
/// applies to project data.
pub fn number_arg(args: &HashMap<String, &FieldValue>, names: &[&str]) -> f64 {
    let Some((name, value)) = names.iter().find_map(|&n| args.get(n).map(|v| (n, *v))) else {
        return 0.0;
    };
    value.as_f64().unwrap_or_else(|| {
        debug!(argument = name, kind = value.type_name(), "Non-numeric argument read as 0");
        0.0
    })
}

/// Like [`number_arg`] but distinguishes an absent argument.
pub fn optional_number_arg(args: &HashMap<String, &FieldValue>, names: &[&str]) -> Option<f64> {
    names.iter().find_map(|&n| args.get(n)).map(|v| v.number_or_zero())
}
