use tracing::{info, instrument, warn};
use viab_calculator::{
    CostInputs, FloorAggregation, Redistribution, ShareEditor, aggregate, compose,
};
use viab_types::{BoundsTable, CoefficientTable, FieldValue, FloorSpec, ShareSetKind};

use crate::config::EngineConfig;
use crate::error::{ViabError, ViabResult};
use crate::project::{FloorEdit, ProjectRecord};
use crate::report::{FeasibilityReport, build_report};

/// Orchestrates aggregation, cost composition, redistribution and report
/// assembly over project records.
///
/// The engine holds only configuration and reference tables; it is safe to
/// share across threads and to evaluate different projects concurrently.
#[derive(Debug, Clone)]
pub struct FeasibilityEngine {
    config: EngineConfig,
    coefficients: CoefficientTable,
    direct_bounds: BoundsTable,
    indirect_bounds: BoundsTable,
}

impl Default for FeasibilityEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl FeasibilityEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            coefficients: CoefficientTable::standard(),
            direct_bounds: BoundsTable::direct_cost_stages(),
            indirect_bounds: BoundsTable::indirect_cost_items(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn coefficients(&self) -> &CoefficientTable {
        &self.coefficients
    }

    pub fn bounds(&self, kind: ShareSetKind) -> &BoundsTable {
        match kind {
            ShareSetKind::DirectCostStages => &self.direct_bounds,
            ShareSetKind::IndirectCostItems => &self.indirect_bounds,
        }
    }

    pub fn new_project(&self, name: impl Into<String>) -> ProjectRecord {
        ProjectRecord::new(name, &self.config)
    }

    pub fn ingest(&self, document: &FieldValue) -> ProjectRecord {
        ProjectRecord::from_value(document, &self.config)
    }

    pub fn ingest_json(&self, text: &str) -> ViabResult<ProjectRecord> {
        ProjectRecord::from_json_str(text, &self.config)
    }

    pub fn aggregate_floors(&self, project: &ProjectRecord) -> FloorAggregation {
        aggregate(&project.floors, &self.coefficients)
    }

    /// Computes every derived value of a project and assembles the report.
    #[instrument(skip(self, project), fields(project_id = project.id, floor_count = project.floors.len()))]
    pub fn evaluate(&self, project: &ProjectRecord) -> FeasibilityReport {
        let aggregation = self.aggregate_floors(project);
        let breakdown = compose(&CostInputs {
            floors: &aggregation.floors,
            unit_cost_per_equivalent_m2: project.unit_cost_per_equivalent_m2,
            land_area: project.land_area,
            land_unit_cost: project.land_unit_cost,
            sale_price_per_m2: project.sale_price_per_m2,
            sale_area: project.private_area,
            percentage_shares: &project.indirect_percentage_shares,
            fixed_monthly_items: &project.indirect_fixed_monthly_items,
            duration_months: project.duration_months,
        });

        let report = build_report(project, &aggregation, &breakdown, &self.config.margin);
        info!(
            revenue_total = breakdown.revenue_total,
            total_expense = breakdown.total_expense,
            margin_percent = breakdown.margin_percent,
            margin_health = ?report.margin_health,
            "Evaluated project"
        );
        report
    }

    fn editor(&self, project: &ProjectRecord, kind: ShareSetKind) -> ShareEditor {
        ShareEditor::resume(
            project.shares(kind).clone(),
            project.snapshot(kind).clone(),
            self.bounds(kind).clone(),
            self.config.redistribution.edit_policy,
        )
    }

    /// Sets one share and redistributes the rest of its set. The other set is
    /// never touched. On error the project is unchanged.
    #[instrument(skip(self, project), fields(project_id = project.id, share_set = kind.label()))]
    pub fn edit_share(
        &self,
        project: &mut ProjectRecord,
        kind: ShareSetKind,
        key: &str,
        percentage: f64,
    ) -> ViabResult<Redistribution> {
        let mut editor = self.editor(project, kind);
        let outcome = editor.edit(key, percentage).map_err(|e| ViabError::redistribution(kind, e))?;
        if !outcome.overridden.is_empty() {
            warn!(overridden = ?outcome.overridden, "Pending share changes were overwritten");
        }
        let (shares, snapshot) = editor.into_parts();
        project.set_share_state(kind, shares, snapshot);
        Ok(outcome)
    }

    /// Reconciles a share set whose values were changed outside the engine
    /// since its last snapshot.
    #[instrument(skip(self, project), fields(project_id = project.id, share_set = kind.label()))]
    pub fn sync_shares(&self, project: &mut ProjectRecord, kind: ShareSetKind) -> ViabResult<Redistribution> {
        let mut editor = self.editor(project, kind);
        let outcome = editor.sync().map_err(|e| ViabError::redistribution(kind, e))?;
        let (shares, snapshot) = editor.into_parts();
        project.set_share_state(kind, shares, snapshot);
        Ok(outcome)
    }

    /// Resets a share set and its snapshot to the reference defaults.
    pub fn reset_shares(&self, project: &mut ProjectRecord, kind: ShareSetKind) {
        let shares = self.bounds(kind).default_shares();
        let snapshot = viab_calculator::ShareSnapshot::capture(&shares);
        project.set_share_state(kind, shares, snapshot);
    }

    /// Appends the template floor and returns its index.
    pub fn add_floor(&self, project: &mut ProjectRecord) -> usize {
        project.floors.push(FloorSpec::default());
        project.floors.len() - 1
    }

    /// Applies a sanitized edit to one floor, returning the refused fields.
    pub fn edit_floor(
        &self,
        project: &mut ProjectRecord,
        index: usize,
        edit: &FloorEdit,
    ) -> ViabResult<Vec<&'static str>> {
        let project_id = project.id;
        let floor = project.floors.get_mut(index).ok_or_else(|| ViabError::NotFound {
            message: format!("floor {index} does not exist in project {project_id}"),
            project_id: Some(project_id),
        })?;
        Ok(edit.apply(floor))
    }

    pub fn remove_floor(&self, project: &mut ProjectRecord, index: usize) -> ViabResult<FloorSpec> {
        if index >= project.floors.len() {
            return Err(ViabError::NotFound {
                message: format!("floor {index} does not exist in project {}", project.id),
                project_id: Some(project.id),
            });
        }
        Ok(project.floors.remove(index))
    }
}
