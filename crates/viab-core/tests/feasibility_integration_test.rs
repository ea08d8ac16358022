use std::sync::Arc;
use std::thread;

use viab_calculator::MarginHealth;
use viab_core::report::CostComponent;
use viab_core::{
    FeasibilityEngine, FloorEdit, InMemoryProjectStore, ProjectStore, ShareHistory, Stage,
};
use viab_types::reference::PRIVATE_AREA_KIND;
use viab_types::{FieldValue, FloorSpec, ShareSetKind};

const LEGACY_DOCUMENT: &str = r#"{
    "id": 3,
    "nome": "Residencial Ipê",
    "area_terreno": 1000,
    "area_privativa": 1000,
    "num_unidades": 10,
    "etapa": "1",
    "custos_config": {"custo_area_privativa": 2000, "preco_medio_venda_m2": 6000, "custo_terreno_m2": 400},
    "etapas_percentuais": {
        "Serviços Preliminares e Fundações": {"percentual": 50, "fonte": "Manual"},
        "Estrutura (Supraestrutura)": {"percentual": 50, "fonte": "Manual"}
    },
    "custos_indiretos_percentuais": {"Corretagem": 5},
    "custos_indiretos_obra": {"Administração": 10000},
    "pavimentos": [
        {"nome": "Tipo", "tipo": "Área Privativa (Autônoma)", "rep": 10, "coef": 1.0, "area": 100, "constr": true},
        {"nome": "Projeção", "tipo": "Projeção Terreno sem Benfeitoria", "rep": 1, "area": 500, "constr": false}
    ],
    "duracao_obra": 10
}"#;

#[test]
fn test_legacy_document_end_to_end() {
    let engine = FeasibilityEngine::default();
    let project = engine.ingest_json(LEGACY_DOCUMENT).unwrap();
    let report = engine.evaluate(&project);

    let b = report.breakdown;
    assert_eq!(b.revenue_total, 6_000_000.0);
    assert_eq!(b.direct_cost_total, 2_000_000.0);
    assert_eq!(b.indirect_percentage_cost_total, 300_000.0);
    assert_eq!(b.indirect_fixed_monthly_cost_total, 100_000.0);
    assert_eq!(b.land_cost_total, 400_000.0);
    assert_eq!(b.total_expense, 2_800_000.0);
    assert_eq!(b.gross_profit, 3_200_000.0);
    assert!((b.margin_percent - 53.333_333_333_333_336).abs() < 1e-9);
    assert_eq!(report.margin_health, MarginHealth::Promising);

    assert_eq!(report.floors.totals.total_raw_area, 1_500.0);
    assert_eq!(report.floors.totals.total_built_area, 1_000.0);
    assert_eq!(report.floors.totals.total_private_area, 1_000.0);
    assert_eq!(report.floors.rows[1].direct_cost, 0.0);

    assert_eq!(report.stages.rows[0].cost, 1_000_000.0);
    assert_eq!(report.indirect_items.total_cost, 300_000.0);
    assert!((report.indirect_percent_of_revenue - 5.0).abs() < 1e-9);

    let direct = &report.composition[0];
    assert_eq!(direct.component, CostComponent::Direct);
    assert!((direct.share_of_total - 71.428_571_428_571_43).abs() < 1e-9);
    let shares: f64 = report.composition.iter().map(|r| r.share_of_total).sum();
    assert!((shares - 100.0).abs() < 1e-9);

    assert_eq!(report.indicators.direct_cost_per_private_m2, 2_000.0);
    assert_eq!(report.indicators.total_cost_per_private_m2, 2_800.0);
    assert_eq!(report.indicators.direct_cost_per_built_m2, 2_000.0);
}

#[test]
fn test_single_private_floor_scenario() {
    let engine = FeasibilityEngine::default();
    let mut project = engine.new_project("Referência");
    project.floors = vec![FloorSpec::new("Tipo", PRIVATE_AREA_KIND, 100.0).with_coefficient(1.0)];

    let report = engine.evaluate(&project);

    assert_eq!(report.breakdown.direct_cost_total, 450_000.0);
    assert_eq!(report.floors.totals.total_built_area, 100.0);
}

#[test]
fn test_empty_project_is_all_zero() {
    let engine = FeasibilityEngine::default();
    let project = engine.ingest(&FieldValue::Object(Vec::new()));
    let report = engine.evaluate(&project);

    assert!(report.floors.rows.is_empty());
    assert_eq!(report.breakdown.direct_cost_total, 0.0);
    assert_eq!(report.breakdown.margin_percent, 0.0);
    assert_eq!(report.indicators, Default::default());
    assert!(report.composition.iter().all(|r| r.share_of_total.is_finite()));
    assert_eq!(report.breakdown.indirect_fixed_monthly_cost_total, 34_300.0 * 12.0);
}

#[test]
fn test_edit_then_archive_then_store() {
    let engine = FeasibilityEngine::default();
    let store = InMemoryProjectStore::new();
    let history = ShareHistory::new();

    let mut project = store.create(engine.ingest_json(LEGACY_DOCUMENT).unwrap()).unwrap();
    assert_eq!(project.id, 1);

    let outcome = engine
        .edit_share(
            &mut project,
            ShareSetKind::DirectCostStages,
            "Serviços Preliminares e Fundações",
            60.0,
        )
        .unwrap();
    // Clamped to the stage's own maximum of 9%.
    assert_eq!(outcome.edited.as_ref().map(|e| e.percentage), Some(9.0));
    // 50 - (9 - 50) = 91, clamped to the structure maximum of 22%.
    assert_eq!(project.direct_cost_shares.percentage("Estrutura (Supraestrutura)"), Some(22.0));

    engine
        .edit_floor(
            &mut project,
            0,
            &FloorEdit { repeat_count: Some(FieldValue::from("12")), ..FloorEdit::default() },
        )
        .unwrap();
    project.stage = Stage::Obra;
    store.update(project.clone()).unwrap();

    let entry = history.archive_today(&project, ShareSetKind::DirectCostStages);
    assert_eq!(entry.project_name, "Residencial Ipê");
    assert_eq!(entry.percentages[0], ("Serviços Preliminares e Fundações".to_string(), 9.0));

    let stored = store.get(1).unwrap();
    assert_eq!(stored.floors[0].repeat_count, 12);
    assert_eq!(store.stage_counts()[&Stage::Obra], 1);
}

#[test]
fn test_concurrent_evaluation_of_distinct_projects() {
    let engine = Arc::new(FeasibilityEngine::default());
    let store = Arc::new(InMemoryProjectStore::new());

    let handles: Vec<_> = (0..8u32)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut project = engine.new_project(format!("Projeto {i}"));
                project.private_area = 100.0 * f64::from(i + 1);
                let project = store.create(project).unwrap();
                engine.evaluate(&project).breakdown.revenue_total
            })
        })
        .collect();

    let mut revenues: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    revenues.sort_by(f64::total_cmp);

    assert_eq!(revenues.first(), Some(&1_000_000.0));
    assert_eq!(revenues.last(), Some(&8_000_000.0));
    let mut ids: Vec<u64> = store.list().iter().map(|p| p.id).collect();
    ids.dedup();
    assert_eq!(ids, (1..=8).collect::<Vec<_>>());
}
