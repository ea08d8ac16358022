//! The project record: the single source of truth between engine calls.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use viab_calculator::ShareSnapshot;
use viab_types::{BoundsTable, FieldValue, FloorSpec, MonthlyBudget, ShareSet, ShareSetKind};

use crate::config::EngineConfig;
use crate::error::ViabResult;
use crate::normalize::{normalize_floors, normalize_monthly_items, normalize_shares};

/// Lifecycle stage of a development.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Viabilizar,
    PreExecucao,
    Obra,
    GestaoDeCustos,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Viabilizar, Stage::PreExecucao, Stage::Obra, Stage::GestaoDeCustos];

    /// Numeric code used by stored documents ("1" to "4").
    pub const fn code(self) -> u8 {
        match self {
            Stage::Viabilizar => 1,
            Stage::PreExecucao => 2,
            Stage::Obra => 3,
            Stage::GestaoDeCustos => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Stage::Viabilizar => "Viabilizar",
            Stage::PreExecucao => "Pré-execução",
            Stage::Obra => "Obra",
            Stage::GestaoDeCustos => "Gestão de Custos",
        }
    }

    /// Snake-case name used in serialized records.
    pub const fn slug(self) -> &'static str {
        match self {
            Stage::Viabilizar => "viabilizar",
            Stage::PreExecucao => "pre_execucao",
            Stage::Obra => "obra",
            Stage::GestaoDeCustos => "gestao_de_custos",
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| i64::from(s.code()) == code)
    }

    /// Reads a stage from a numeric code, a snake_case name or a label.
    pub fn parse(value: &FieldValue) -> Option<Self> {
        if let Some(text) = value.as_str().map(str::trim) {
            let by_name = Self::ALL
                .into_iter()
                .find(|s| s.slug() == text || s.label().eq_ignore_ascii_case(text));
            if by_name.is_some() {
                return by_name;
            }
        }
        value.as_i64().and_then(Self::from_code)
    }
}

/// One development under study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: u64,
    pub name: String,
    pub land_area: f64,
    /// Sellable private area, the sale area of the VGV.
    pub private_area: f64,
    pub unit_count: u32,
    pub stage: Stage,
    pub floors: Vec<FloorSpec>,
    pub unit_cost_per_equivalent_m2: f64,
    pub land_unit_cost: f64,
    pub sale_price_per_m2: f64,
    pub direct_cost_shares: ShareSet,
    pub direct_cost_snapshot: ShareSnapshot,
    pub indirect_percentage_shares: ShareSet,
    pub indirect_percentage_snapshot: ShareSnapshot,
    pub indirect_fixed_monthly_items: MonthlyBudget,
    pub duration_months: u32,
}

impl ProjectRecord {
    /// A fresh project: one template floor, default shares and budget, and the
    /// configured unit costs.
    pub fn new(name: impl Into<String>, config: &EngineConfig) -> Self {
        let direct = BoundsTable::direct_cost_stages().default_shares();
        let indirect = BoundsTable::indirect_cost_items().default_shares();
        Self {
            id: 0,
            name: name.into(),
            land_area: 0.0,
            private_area: 0.0,
            unit_count: 1,
            stage: Stage::default(),
            floors: vec![FloorSpec::default()],
            unit_cost_per_equivalent_m2: config.defaults.unit_cost_per_equivalent_m2,
            land_unit_cost: config.defaults.land_unit_cost,
            sale_price_per_m2: config.defaults.sale_price_per_m2,
            direct_cost_snapshot: ShareSnapshot::capture(&direct),
            direct_cost_shares: direct,
            indirect_percentage_snapshot: ShareSnapshot::capture(&indirect),
            indirect_percentage_shares: indirect,
            indirect_fixed_monthly_items: viab_types::reference::default_monthly_budget(),
            duration_months: config.defaults.duration_months,
        }
    }

    /// Builds a record from a stored document of any historical shape.
    ///
    /// Current field names and the historical ones are both accepted; unit
    /// costs may also sit under a `custos_config`/`costs` object. Missing
    /// numbers take the configured defaults, malformed ones read as 0.
    #[instrument(skip_all)]
    pub fn from_value(document: &FieldValue, config: &EngineConfig) -> Self {
        let field = |keys: &[&str]| {
            document
                .get_any(keys)
                .or_else(|| document.get_any(&["costs", "custos_config"]).and_then(|c| c.get_any(keys)))
                .filter(|v| !v.is_null())
        };
        let number = |keys: &[&str], default: f64| field(keys).map_or(default, FieldValue::number_or_zero);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let whole = |keys: &[&str], default: u32, min: u32| {
            field(keys).map_or(default, |v| v.number_or_zero().trunc().max(f64::from(min)) as u32)
        };

        let direct_bounds = BoundsTable::direct_cost_stages();
        let indirect_bounds = BoundsTable::indirect_cost_items();
        let direct = normalize_shares(field(&["direct_cost_shares", "etapas_percentuais"]), &direct_bounds);
        let indirect = normalize_shares(
            field(&["indirect_percentage_shares", "custos_indiretos_percentuais"]),
            &indirect_bounds,
        );
        let snapshot = |keys: &[&str], shares: &ShareSet, bounds: &BoundsTable| match field(keys) {
            Some(raw) => ShareSnapshot::capture(&normalize_shares(Some(raw), bounds)),
            None => ShareSnapshot::capture(shares),
        };

        #[allow(clippy::cast_sign_loss)]
        let record = Self {
            id: field(&["id"]).and_then(FieldValue::as_i64).map_or(0, |id| id.max(0) as u64),
            name: field(&["name", "nome"])
                .and_then(FieldValue::as_str)
                .unwrap_or("Novo Projeto")
                .to_string(),
            land_area: number(&["land_area", "area_terreno"], 0.0),
            private_area: number(&["private_area", "area_privativa"], 0.0),
            unit_count: whole(&["unit_count", "num_unidades"], 1, 1),
            stage: field(&["stage", "etapa"]).and_then(Stage::parse).unwrap_or_default(),
            floors: normalize_floors(field(&["floors", "pavimentos"])),
            unit_cost_per_equivalent_m2: number(
                &["unit_cost_per_equivalent_m2", "custo_area_privativa"],
                config.defaults.unit_cost_per_equivalent_m2,
            ),
            land_unit_cost: number(&["land_unit_cost", "custo_terreno_m2"], config.defaults.land_unit_cost),
            sale_price_per_m2: number(
                &["sale_price_per_m2", "preco_medio_venda_m2"],
                config.defaults.sale_price_per_m2,
            ),
            direct_cost_snapshot: snapshot(
                &["direct_cost_snapshot", "previous_etapas_percentuais"],
                &direct,
                &direct_bounds,
            ),
            direct_cost_shares: direct,
            indirect_percentage_snapshot: snapshot(
                &["indirect_percentage_snapshot", "previous_custos_indiretos_percentuais"],
                &indirect,
                &indirect_bounds,
            ),
            indirect_percentage_shares: indirect,
            indirect_fixed_monthly_items: normalize_monthly_items(
                field(&["indirect_fixed_monthly_items", "custos_indiretos_obra"]),
            ),
            duration_months: whole(&["duration_months", "duracao_obra"], config.defaults.duration_months, 0),
        };

        debug!(
            project_id = record.id,
            floor_count = record.floors.len(),
            "Normalized project document"
        );
        record
    }

    /// Parses a JSON document and normalizes it.
    pub fn from_json_str(text: &str, config: &EngineConfig) -> ViabResult<Self> {
        let document: FieldValue = serde_json::from_str(text)?;
        Ok(Self::from_value(&document, config))
    }

    pub fn to_json_pretty(&self) -> ViabResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn shares(&self, kind: ShareSetKind) -> &ShareSet {
        match kind {
            ShareSetKind::DirectCostStages => &self.direct_cost_shares,
            ShareSetKind::IndirectCostItems => &self.indirect_percentage_shares,
        }
    }

    pub fn snapshot(&self, kind: ShareSetKind) -> &ShareSnapshot {
        match kind {
            ShareSetKind::DirectCostStages => &self.direct_cost_snapshot,
            ShareSetKind::IndirectCostItems => &self.indirect_percentage_snapshot,
        }
    }

    /// Replaces one share set together with its snapshot.
    pub fn set_share_state(&mut self, kind: ShareSetKind, shares: ShareSet, snapshot: ShareSnapshot) {
        match kind {
            ShareSetKind::DirectCostStages => {
                self.direct_cost_shares = shares;
                self.direct_cost_snapshot = snapshot;
            }
            ShareSetKind::IndirectCostItems => {
                self.indirect_percentage_shares = shares;
                self.indirect_percentage_snapshot = snapshot;
            }
        }
    }
}

/// A partial update to one floor, with each value as typed by a person.
///
/// Sanitization follows the floor form: a repeat count below 1 becomes 1, a
/// negative area or a coefficient at or below 0 is refused and the previous
/// value kept, and text that is not a number is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorEdit {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub repeat_count: Option<FieldValue>,
    pub raw_area: Option<FieldValue>,
    pub coefficient: Option<FieldValue>,
    pub counts_as_built: Option<bool>,
}

impl FloorEdit {
    /// Applies the edit and returns the names of the fields that were refused.
    pub fn apply(&self, floor: &mut FloorSpec) -> Vec<&'static str> {
        let mut refused = Vec::new();

        if let Some(name) = &self.name {
            floor.name.clone_from(name);
        }
        if let Some(kind) = &self.kind {
            floor.kind.clone_from(kind);
        }
        if let Some(raw) = &self.repeat_count {
            match raw.as_f64() {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                Some(rep) => floor.repeat_count = rep.trunc().max(1.0) as u32,
                None => refused.push("repeat_count"),
            }
        }
        if let Some(raw) = &self.raw_area {
            match raw.as_f64() {
                Some(area) if area >= 0.0 => floor.raw_area = area,
                _ => refused.push("raw_area"),
            }
        }
        if let Some(raw) = &self.coefficient {
            match raw.as_f64() {
                Some(coefficient) if coefficient > 0.0 => floor.coefficient = Some(coefficient),
                _ => refused.push("coefficient"),
            }
        }
        if let Some(counts_as_built) = self.counts_as_built {
            floor.counts_as_built = counts_as_built;
        }

        if !refused.is_empty() {
            debug!(floor = %floor.name, fields = ?refused, "Kept previous values for refused floor fields");
        }
        refused
    }
}
