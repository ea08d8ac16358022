//! Ingestion-boundary normalization of stored project documents.
//!
//! Stored data predates the current shapes: share sets arrive as maps, as
//! lists of pairs or as bare numbers, and floors use either the current field
//! names or the historical ones (`nome`, `tipo`, `rep`, `coef`, `area`,
//! `constr`). Everything is converted once here so the engine only ever sees
//! typed values. Nothing in this module fails; unrecoverable shapes fall back
//! to the reference defaults.

use tracing::{debug, warn};
use viab_types::reference::{PRIVATE_AREA_KIND, default_monthly_budget};
use viab_types::{BoundsTable, FieldValue, FloorSpec, MonthlyBudget, ShareItem, ShareSet, ShareSource};

const SHARE_KEY_FIELDS: &[&str] = &["key", "item", "etapa", "name", "nome"];
const PERCENTAGE_FIELDS: &[&str] = &["percentage", "percentual"];
const SOURCE_FIELDS: &[&str] = &["source", "fonte"];
const AMOUNT_FIELDS: &[&str] = &["amount", "valor", "value"];

fn parse_source(text: &str) -> ShareSource {
    match text.trim().to_lowercase().as_str() {
        "derived" | "derivado" | "automatico" | "automático" => ShareSource::Derived,
        _ => ShareSource::Manual,
    }
}

/// One share from whatever shape its value was stored in.
fn share_entry(key: String, value: &FieldValue) -> ShareItem {
    match value {
        FieldValue::Object(_) => ShareItem {
            percentage: value.get_any(PERCENTAGE_FIELDS).map_or(0.0, FieldValue::number_or_zero),
            source: value
                .get_any(SOURCE_FIELDS)
                .and_then(FieldValue::as_str)
                .map_or(ShareSource::Manual, parse_source),
            key,
        },
        FieldValue::Array(pair) if pair.len() == 2 => ShareItem::manual(key, pair[1].number_or_zero()),
        FieldValue::Array(_) => {
            debug!(key = %key, "Share stored as an unexpected list, read as 0");
            ShareItem::manual(key, 0.0)
        }
        bare => ShareItem::manual(key, bare.number_or_zero()),
    }
}

/// Normalizes a stored share set.
///
/// * missing or `null` → the table defaults
/// * map of `key → {percentage, source}`, `key → number` or `key → [_, number]`
/// * list of `[key, value]` pairs or of `{key, percentage, source}` objects;
///   a pair whose key is not text is keyed by its position
/// * anything else, or a list with an element of neither shape → the table
///   defaults
pub fn normalize_shares(raw: Option<&FieldValue>, table: &BoundsTable) -> ShareSet {
    let entries = match raw {
        None | Some(FieldValue::Null) => return table.default_shares(),
        Some(FieldValue::Object(entries)) => entries,
        Some(FieldValue::Array(list)) => return shares_from_list(list, table),
        Some(other) => {
            warn!(kind = other.type_name(), "Share set has an unusable shape, using defaults");
            return table.default_shares();
        }
    };

    entries.iter().map(|(key, value)| share_entry(key.clone(), value)).collect()
}

fn shares_from_list(list: &[FieldValue], table: &BoundsTable) -> ShareSet {
    let mut shares = ShareSet::new();
    for (index, element) in list.iter().enumerate() {
        match element {
            FieldValue::Array(pair) if pair.len() == 2 => {
                let key = pair[0].as_str().map_or_else(|| index.to_string(), str::to_string);
                shares.insert(share_entry(key, &pair[1]));
            }
            FieldValue::Object(_) => {
                let Some(key) = element.get_any(SHARE_KEY_FIELDS).and_then(FieldValue::as_str) else {
                    warn!(index, "Share list entry has no key, using defaults");
                    return table.default_shares();
                };
                shares.insert(share_entry(key.to_string(), element));
            }
            other => {
                warn!(index, kind = other.type_name(), "Share list entry is not a pair, using defaults");
                return table.default_shares();
            }
        }
    }
    debug!(count = shares.len(), "Converted legacy share list");
    shares
}

/// Normalizes stored monthly site-administration items. Missing, `null` or
/// unusable shapes fall back to the default budget.
pub fn normalize_monthly_items(raw: Option<&FieldValue>) -> MonthlyBudget {
    match raw {
        None | Some(FieldValue::Null) => default_monthly_budget(),
        Some(FieldValue::Object(entries)) => {
            entries.iter().map(|(k, v)| (k.clone(), v.number_or_zero())).collect()
        }
        Some(FieldValue::Array(list)) => list
            .iter()
            .enumerate()
            .map(|(index, element)| match element {
                FieldValue::Array(pair) if pair.len() == 2 => (
                    pair[0].as_str().map_or_else(|| index.to_string(), str::to_string),
                    pair[1].number_or_zero(),
                ),
                FieldValue::Object(_) => (
                    element
                        .get_any(SHARE_KEY_FIELDS)
                        .and_then(FieldValue::as_str)
                        .map_or_else(|| index.to_string(), str::to_string),
                    element.get_any(AMOUNT_FIELDS).map_or(0.0, FieldValue::number_or_zero),
                ),
                bare => (index.to_string(), bare.number_or_zero()),
            })
            .collect(),
        Some(other) => {
            warn!(kind = other.type_name(), "Monthly items have an unusable shape, using defaults");
            default_monthly_budget()
        }
    }
}

/// Reads one stored floor. Returns `None` for non-object entries.
pub fn normalize_floor(value: &FieldValue) -> Option<FloorSpec> {
    if !matches!(value, FieldValue::Object(_)) {
        return None;
    }

    let text = |keys: &[&str], fallback: &str| {
        value.get_any(keys).and_then(FieldValue::as_str).unwrap_or(fallback).to_string()
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let repeat_count = value
        .get_any(&["repeat_count", "rep"])
        .and_then(FieldValue::as_f64)
        .map_or(1, |r| r.trunc().max(1.0) as u32);

    Some(FloorSpec {
        name: text(&["name", "nome"], "Pavimento"),
        kind: text(&["kind", "tipo"], PRIVATE_AREA_KIND),
        repeat_count,
        coefficient: value.get_any(&["coefficient", "coef"]).and_then(FieldValue::as_f64),
        raw_area: value.get_any(&["raw_area", "area"]).map_or(0.0, FieldValue::number_or_zero),
        counts_as_built: value
            .get_any(&["counts_as_built", "constr"])
            .and_then(FieldValue::as_bool)
            .unwrap_or(true),
    })
}

/// Reads a stored floor list, skipping entries that are not objects.
pub fn normalize_floors(raw: Option<&FieldValue>) -> Vec<FloorSpec> {
    let Some(FieldValue::Array(list)) = raw else {
        if raw.is_some_and(|v| !v.is_null()) {
            warn!("Floor list has an unusable shape, reading no floors");
        }
        return Vec::new();
    };

    list.iter()
        .enumerate()
        .filter_map(|(index, element)| {
            let floor = normalize_floor(element);
            if floor.is_none() {
                debug!(index, kind = element.type_name(), "Skipping floor entry");
            }
            floor
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(entries: Vec<(&str, FieldValue)>) -> FieldValue {
        FieldValue::Object(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    fn table() -> BoundsTable {
        BoundsTable::from_entries([("A", 0.0, 60.0, 100.0), ("B", 0.0, 40.0, 100.0)])
    }

    #[test]
    fn structured_map_is_read_in_document_order() {
        let raw = obj(vec![
            ("B", obj(vec![("percentual", FieldValue::Float(30.0)), ("fonte", FieldValue::from("Manual"))])),
            ("A", obj(vec![("percentage", FieldValue::from("70,5")), ("source", FieldValue::from("Derived"))])),
        ]);
        let shares = normalize_shares(Some(&raw), &table());
        assert_eq!(shares.keys().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(shares.percentage("A"), Some(70.5));
        assert_eq!(shares.get("A").map(|i| i.source), Some(ShareSource::Derived));
    }

    #[test]
    fn bare_numbers_and_pairs_become_manual_shares() {
        let raw = obj(vec![
            ("A", FieldValue::Integer(55)),
            ("B", FieldValue::Array(vec![FieldValue::from("B"), FieldValue::Float(45.0)])),
            ("C", FieldValue::Array(vec![FieldValue::Float(1.0)])),
            ("D", FieldValue::from("n/a")),
        ]);
        let shares = normalize_shares(Some(&raw), &table());
        assert_eq!(shares.percentage("A"), Some(55.0));
        assert_eq!(shares.percentage("B"), Some(45.0));
        assert_eq!(shares.percentage("C"), Some(0.0));
        assert_eq!(shares.percentage("D"), Some(0.0));
        assert!(shares.iter().all(|i| i.source == ShareSource::Manual));
    }

    #[test]
    fn list_of_pairs_is_converted() {
        let raw = FieldValue::Array(vec![
            FieldValue::Array(vec![FieldValue::from("A"), FieldValue::Float(10.0)]),
            FieldValue::Array(vec![FieldValue::Integer(9), FieldValue::Float(5.0)]),
        ]);
        let shares = normalize_shares(Some(&raw), &table());
        assert_eq!(shares.keys().collect::<Vec<_>>(), vec!["A", "1"]);
        assert_eq!(shares.percentage("1"), Some(5.0));
    }

    #[test]
    fn unusable_shapes_fall_back_to_defaults() {
        let defaults = table().default_shares();
        assert_eq!(normalize_shares(None, &table()), defaults);
        assert_eq!(normalize_shares(Some(&FieldValue::Float(3.0)), &table()), defaults);
        let mixed = FieldValue::Array(vec![FieldValue::Float(3.0)]);
        assert_eq!(normalize_shares(Some(&mixed), &table()), defaults);
    }

    #[test]
    fn legacy_floor_fields_are_understood() {
        let raw = obj(vec![
            ("nome", FieldValue::from("Subsolo")),
            ("tipo", FieldValue::from("Garagem (Subsolo)")),
            ("rep", FieldValue::from("0")),
            ("area", FieldValue::from("1.250,5")),
            ("constr", FieldValue::from("não")),
        ]);
        let floor = normalize_floor(&raw).unwrap();
        assert_eq!(floor.name, "Subsolo");
        assert_eq!(floor.repeat_count, 1);
        assert_eq!(floor.coefficient, None);
        assert_eq!(floor.raw_area, 1250.5);
        assert!(!floor.counts_as_built);
    }

    #[test]
    fn floor_list_skips_non_objects() {
        let raw = FieldValue::Array(vec![FieldValue::Float(1.0), obj(vec![("area", FieldValue::Float(80.0))])]);
        let floors = normalize_floors(Some(&raw));
        assert_eq!(floors.len(), 1);
        assert_eq!(floors[0].kind, PRIVATE_AREA_KIND);
        assert!(floors[0].counts_as_built);
        assert!(normalize_floors(Some(&FieldValue::from("x"))).is_empty());
    }

    #[test]
    fn monthly_items_accept_maps_and_lists() {
        let raw = obj(vec![("Energia", FieldValue::from("1.000,00")), ("Água", FieldValue::Null)]);
        let budget = normalize_monthly_items(Some(&raw));
        assert_eq!(budget.monthly_total(), 1000.0);

        let raw = FieldValue::Array(vec![obj(vec![("key", FieldValue::from("Energia")), ("amount", FieldValue::Float(700.0))])]);
        assert_eq!(normalize_monthly_items(Some(&raw)).get("Energia"), Some(700.0));

        assert_eq!(normalize_monthly_items(None).monthly_total(), 34_300.0);
    }
}
