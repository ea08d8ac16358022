use proptest::prelude::*;
use viab_calculator::{EditPolicy, ShareSnapshot, aggregate, redistribute};
use viab_types::{BoundsTable, CoefficientTable, FloorSpec, ShareItem, ShareSet};

fn floor_strategy() -> impl Strategy<Value = FloorSpec> {
    (
        prop::sample::select(vec![
            "Área Privativa (Autônoma)",
            "Varandas",
            "Garagem (Subsolo)",
            "Piscinas",
            "Tipo Desconhecido",
        ]),
        1u32..20,
        prop::option::of(0.05f64..4.0),
        0.0f64..2_000.0,
        any::<bool>(),
    )
        .prop_map(|(kind, repeat_count, coefficient, raw_area, counts_as_built)| FloorSpec {
            name: "Pavimento".to_string(),
            kind: kind.to_string(),
            repeat_count,
            coefficient,
            raw_area,
            counts_as_built,
        })
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * (1.0 + a.abs().max(b.abs()))
}

proptest! {
    #[test]
    fn aggregation_is_additive(floors in prop::collection::vec(floor_strategy(), 0..12)) {
        let table = CoefficientTable::standard();
        let result = aggregate(&floors, &table);

        let built: f64 = floors
            .iter()
            .filter(|f| f.counts_as_built)
            .map(|f| f.raw_area * f64::from(f.repeat_count))
            .sum();
        let equivalent: f64 = result.floors.iter().map(|f| f.area_total * f.coefficient).sum();

        prop_assert!(close(result.totals.total_built_area, built));
        prop_assert!(close(result.totals.total_equivalent_area, equivalent));
        prop_assert_eq!(result.floors.len(), floors.len());
    }

    #[test]
    fn redistribution_respects_bounds(
        values in prop::collection::vec(0.0f64..30.0, 2..8),
        edit_index in 0usize..8,
        new_value in -10.0f64..120.0,
    ) {
        let keys: Vec<String> = (0..values.len()).map(|i| format!("item{i}")).collect();
        let bounds = BoundsTable::from_entries(keys.iter().map(|k| (k.clone(), 2.0, 10.0, 25.0)));
        let previous: ShareSet = keys
            .iter()
            .zip(&values)
            .map(|(k, v)| ShareItem::manual(k.clone(), bounds.bounds(k).clamp(*v)))
            .collect();
        let mut current = previous.clone();
        let edited = &keys[edit_index % keys.len()];
        current.set_percentage(edited, new_value);

        let outcome = redistribute(
            &current,
            &ShareSnapshot::capture(&previous),
            &bounds,
            EditPolicy::RejectMultiple,
        )
        .unwrap();

        for item in outcome.shares.iter() {
            prop_assert!(bounds.bounds(&item.key).contains(item.percentage));
        }
        prop_assert_eq!(outcome.snapshot.shares(), &outcome.shares);
    }

    #[test]
    fn redistribution_is_idempotent_on_unchanged_input(
        values in prop::collection::vec(0.0f64..50.0, 1..8),
    ) {
        let shares: ShareSet = values
            .iter()
            .enumerate()
            .map(|(i, v)| ShareItem::manual(format!("item{i}"), *v))
            .collect();
        let snapshot = ShareSnapshot::capture(&shares);
        let bounds = BoundsTable::from_entries(Vec::<(String, f64, f64, f64)>::new());

        let first = redistribute(&shares, &snapshot, &bounds, EditPolicy::default()).unwrap();
        let second =
            redistribute(&first.shares, &first.snapshot, &bounds, EditPolicy::default()).unwrap();

        prop_assert!(first.is_noop());
        prop_assert!(second.is_noop());
        prop_assert_eq!(second.shares, shares);
    }
}
