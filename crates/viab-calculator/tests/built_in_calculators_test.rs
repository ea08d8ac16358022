use std::collections::HashMap;

use viab_calculator::FeasibilityCalculator;
use viab_calculator::FieldValue;
use viab_calculator::built_in::bounds_check::BoundsCheckCalculator;
use viab_calculator::built_in::equivalent_area::EquivalentAreaCalculator;
use viab_calculator::built_in::fixed_budget::FixedBudgetCalculator;
use viab_calculator::built_in::margin::MarginCalculator;
use viab_calculator::built_in::percentage_of::PercentageOfCalculator;
use viab_calculator::built_in::share_of_total::ShareOfTotalCalculator;
use viab_calculator::plugin::{CalculationResult, CalculatorPlugin};

fn calculate_with<C: CalculatorPlugin>(calculator: C, inputs: &[(&str, FieldValue)]) -> CalculationResult {
    let var_refs: HashMap<String, &FieldValue> =
        inputs.iter().map(|(k, v)| (k.to_string(), v)).collect();
    calculator.calculate(&var_refs)
}

fn float(result: CalculationResult) -> f64 {
    match result.unwrap() {
        FieldValue::Float(f) => f,
        other => panic!("expected float, got {other}"),
    }
}

#[test]
fn equivalent_area_uses_explicit_coefficient() {
    let result = calculate_with(
        EquivalentAreaCalculator::default(),
        &[
            ("area", FieldValue::Float(120.0)),
            ("rep", FieldValue::Integer(3)),
            ("coef", FieldValue::Float(0.75)),
        ],
    );
    assert_eq!(float(result), 270.0);
}

#[test]
fn equivalent_area_resolves_kind_and_reads_brazilian_text() {
    let result = calculate_with(
        EquivalentAreaCalculator::default(),
        &[
            ("raw_area", FieldValue::from("1.000,5")),
            ("repeat_count", FieldValue::Integer(0)),
            ("kind", FieldValue::from("Garagem (Subsolo)")),
        ],
    );
    assert_eq!(float(result), 500.25);
}

#[test]
fn percentage_of_uses_hundred_scale() {
    let result = calculate_with(
        PercentageOfCalculator,
        &[("amount", FieldValue::Float(200.0)), ("percentage", FieldValue::Float(5.0))],
    );
    assert_eq!(float(result), 10.0);
}

#[test]
fn percentage_of_degrades_malformed_input_to_zero() {
    let result = calculate_with(
        PercentageOfCalculator,
        &[("amount", FieldValue::from("muito")), ("percentage", FieldValue::Float(5.0))],
    );
    assert_eq!(float(result), 0.0);
}

#[test]
fn fixed_budget_from_object_and_total() {
    let items = FieldValue::Object(vec![
        ("Energia".to_string(), FieldValue::Float(1000.0)),
        ("Água".to_string(), FieldValue::from("500")),
    ]);
    let result = calculate_with(
        FixedBudgetCalculator,
        &[("monthly_items", items), ("duration_months", FieldValue::Integer(12))],
    );
    assert_eq!(float(result), 18_000.0);

    let result = calculate_with(
        FixedBudgetCalculator,
        &[("monthly_total", FieldValue::Float(34_300.0)), ("months", FieldValue::Integer(2))],
    );
    assert_eq!(float(result), 68_600.0);
}

#[test]
fn fixed_budget_rejects_scalar_items() {
    let result = calculate_with(
        FixedBudgetCalculator,
        &[("monthly_items", FieldValue::Float(10.0)), ("months", FieldValue::Integer(2))],
    );
    assert!(result.is_err());
}

#[test]
fn share_of_total_guards_zero_total() {
    let result = calculate_with(
        ShareOfTotalCalculator,
        &[("part", FieldValue::Float(25.0)), ("total", FieldValue::Float(200.0))],
    );
    assert_eq!(float(result), 12.5);

    let result = calculate_with(
        ShareOfTotalCalculator,
        &[("part", FieldValue::Float(25.0)), ("total", FieldValue::Float(0.0))],
    );
    assert_eq!(float(result), 0.0);
}

#[test]
fn margin_with_zero_revenue_is_zero() {
    let result = calculate_with(
        MarginCalculator,
        &[("revenue", FieldValue::Float(0.0)), ("expense", FieldValue::Float(1000.0))],
    )
    .unwrap();
    assert_eq!(result.get("gross_profit"), Some(&FieldValue::Float(-1000.0)));
    assert_eq!(result.get("margin_percent"), Some(&FieldValue::Float(0.0)));
}

#[test]
fn bounds_check_calculator_works() {
    let inside = calculate_with(
        BoundsCheckCalculator,
        &[
            ("value", FieldValue::Float(8.0)),
            ("min", FieldValue::Float(7.0)),
            ("max", FieldValue::Float(9.0)),
        ],
    );
    assert_eq!(inside.unwrap(), FieldValue::Boolean(true));

    let missing = calculate_with(BoundsCheckCalculator, &[("value", FieldValue::Float(8.0))]);
    assert!(missing.is_err());
}

#[test]
fn registry_dispatches_by_name() {
    let calculator = FeasibilityCalculator::new();
    assert_eq!(
        calculator.available(),
        vec![
            "bounds_check",
            "equivalent_area",
            "fixed_budget",
            "margin",
            "percentage_of",
            "share_of_total"
        ]
    );

    let value = calculator
        .evaluate(
            "percentage_of",
            &[
                ("base".to_string(), FieldValue::Float(1_000_000.0)),
                ("percent".to_string(), FieldValue::Float(3.5)),
            ],
        )
        .unwrap();
    assert_eq!(value, FieldValue::Float(35_000.0));

    assert!(calculator.evaluate("unknown", &[]).is_err());
}
