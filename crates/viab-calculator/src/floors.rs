//! Floor aggregation: raw, equivalent and built areas per floor and in total.

use serde::Serialize;
use tracing::{debug, instrument};
use viab_types::{CoefficientTable, FloorSpec};

/// A floor together with the areas derived from it. The input spec is copied,
/// never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedFloor {
    pub spec: FloorSpec,
    /// Coefficient actually applied (explicit or resolved from the kind).
    pub coefficient: f64,
    /// `raw_area × repeat_count`
    pub area_total: f64,
    /// `area_total × coefficient`
    pub area_equivalent: f64,
    /// `area_total` when the floor counts as built, otherwise 0.
    pub area_built: f64,
}

/// Elementwise sums over every aggregated floor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FloorTotals {
    pub total_raw_area: f64,
    pub total_equivalent_area: f64,
    pub total_built_area: f64,
    /// Sum of `area_total` over private-area floors.
    pub total_private_area: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FloorAggregation {
    pub floors: Vec<AggregatedFloor>,
    pub totals: FloorTotals,
}

/// Coefficient of a floor: the explicit one when set, otherwise the lower
/// bound of its kind (1.0 for unknown kinds).
pub fn resolve_coefficient(floor: &FloorSpec, table: &CoefficientTable) -> f64 {
    floor
        .coefficient
        .filter(|c| c.is_finite())
        .unwrap_or_else(|| table.range(&floor.kind).min)
}

/// Clamps a proposed coefficient into the admissible range of `kind`.
pub fn clamp_coefficient(kind: &str, value: f64, table: &CoefficientTable) -> f64 {
    table.range(kind).clamp(value)
}

/// `raw_area × repeat_count × coefficient`, the weighted area of one floor row.
pub fn equivalent_area(raw_area: f64, repeat_count: f64, coefficient: f64) -> f64 {
    raw_area * repeat_count * coefficient
}

/// Derives per-floor areas and their totals.
///
/// An empty input yields an empty sequence and all-zero totals.
#[instrument(skip(floors, table), fields(floor_count = floors.len()))]
pub fn aggregate(floors: &[FloorSpec], table: &CoefficientTable) -> FloorAggregation {
    let mut totals = FloorTotals::default();

    let floors: Vec<AggregatedFloor> = floors
        .iter()
        .map(|spec| {
            let coefficient = resolve_coefficient(spec, table);
            let area_total = spec.raw_area * f64::from(spec.repeat_count.max(1));
            let area_equivalent = area_total * coefficient;
            let area_built = if spec.counts_as_built { area_total } else { 0.0 };

            totals.total_raw_area += area_total;
            totals.total_equivalent_area += area_equivalent;
            totals.total_built_area += area_built;
            if spec.is_private_area() {
                totals.total_private_area += area_total;
            }

            AggregatedFloor { spec: spec.clone(), coefficient, area_total, area_equivalent, area_built }
        })
        .collect();

    debug!(
        total_raw_area = totals.total_raw_area,
        total_equivalent_area = totals.total_equivalent_area,
        total_built_area = totals.total_built_area,
        "Aggregated floors"
    );

    FloorAggregation { floors, totals }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viab_types::reference::PRIVATE_AREA_KIND;

    fn table() -> CoefficientTable {
        CoefficientTable::standard()
    }

    #[test]
    fn empty_input_yields_zero_totals() {
        let result = aggregate(&[], &table());
        assert!(result.floors.is_empty());
        assert_eq!(result.totals, FloorTotals::default());
    }

    #[test]
    fn built_area_only_counts_constructive_floors() {
        let floors = vec![
            FloorSpec::new("Tipo", PRIVATE_AREA_KIND, 100.0).with_repeat_count(4),
            FloorSpec::new("Projeção", "Projeção Terreno sem Benfeitoria", 300.0)
                .with_counts_as_built(false),
            FloorSpec::new("Garagem", "Garagem (Subsolo)", 200.0),
        ];
        let result = aggregate(&floors, &table());

        assert_eq!(result.totals.total_raw_area, 400.0 + 300.0 + 200.0);
        assert_eq!(result.totals.total_built_area, 400.0 + 200.0);
        // Projection resolves to 0.0, garage to its lower bound 0.5.
        assert_eq!(result.totals.total_equivalent_area, 400.0 + 0.0 + 100.0);
        assert_eq!(result.totals.total_private_area, 400.0);
        assert_eq!(result.floors[1].area_built, 0.0);
    }

    #[test]
    fn explicit_coefficient_wins_over_kind() {
        let floor = FloorSpec::new("Lazer", "Áreas de lazer ambientadas", 50.0).with_coefficient(3.0);
        assert_eq!(resolve_coefficient(&floor, &table()), 3.0);
        let floor = FloorSpec::new("Lazer", "Áreas de lazer ambientadas", 50.0);
        assert_eq!(resolve_coefficient(&floor, &table()), 2.0);
    }

    #[test]
    fn unknown_kind_without_coefficient_resolves_to_one() {
        let floor = FloorSpec::new("Heliponto", "Heliponto", 80.0);
        let result = aggregate(&[floor], &table());
        assert_eq!(result.floors[0].coefficient, 1.0);
        assert_eq!(result.totals.total_equivalent_area, 80.0);
    }

    #[test]
    fn coefficient_is_clamped_to_kind_range() {
        assert_eq!(clamp_coefficient("Varandas", 1.4, &table()), 1.0);
        assert_eq!(clamp_coefficient("Varandas", 0.1, &table()), 0.75);
        assert_eq!(clamp_coefficient("Desconhecido", 7.0, &table()), 1.0);
    }
}
