//! Report assembly: flat tables for renderers and exporters.
//!
//! A pure projection of one project snapshot. The only arithmetic here is
//! percentage-of-total and per-area ratios.

use std::fmt;

use serde::Serialize;
use viab_calculator::costs::{percentage_of, ratio_percent};
use viab_calculator::{CostBreakdown, FloorAggregation, FloorTotals, MarginHealth};
use viab_types::{MonthlyBudget, ShareSet, ShareSource};

use crate::config::MarginConfig;
use crate::format::{format_brl, format_percent};
use crate::project::{ProjectRecord, Stage};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloorRow {
    pub name: String,
    pub kind: String,
    pub repeat_count: u32,
    pub coefficient: f64,
    pub raw_area: f64,
    pub area_total: f64,
    pub area_equivalent: f64,
    pub area_built: f64,
    pub counts_as_built: bool,
    /// `area_equivalent × unit cost`
    pub direct_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloorTable {
    pub rows: Vec<FloorRow>,
    pub totals: FloorTotals,
    pub direct_cost_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareRow {
    pub key: String,
    pub percentage: f64,
    pub cost: f64,
    pub source: ShareSource,
}

/// One percentage set priced against its base amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareTable {
    pub base_amount: f64,
    pub rows: Vec<ShareRow>,
    pub total_percentage: f64,
    pub total_cost: f64,
}

impl ShareTable {
    pub fn price(shares: &ShareSet, base_amount: f64) -> Self {
        let rows: Vec<ShareRow> = shares
            .iter()
            .map(|item| ShareRow {
                key: item.key.clone(),
                percentage: item.percentage,
                cost: percentage_of(base_amount, item.percentage),
                source: item.source,
            })
            .collect();
        Self {
            base_amount,
            total_percentage: shares.total(),
            total_cost: rows.iter().map(|r| r.cost).sum(),
            rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRow {
    pub key: String,
    pub monthly_amount: f64,
    pub period_total: f64,
}

/// Site administration over the construction period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTable {
    pub rows: Vec<MonthlyRow>,
    pub monthly_total: f64,
    pub duration_months: u32,
    pub total: f64,
}

impl MonthlyTable {
    pub fn price(items: &MonthlyBudget, duration_months: u32) -> Self {
        let months = f64::from(duration_months);
        let rows: Vec<MonthlyRow> = items
            .iter()
            .map(|item| MonthlyRow {
                key: item.key.clone(),
                monthly_amount: item.amount,
                period_total: item.amount * months,
            })
            .collect();
        let monthly_total = items.monthly_total();
        Self { rows, monthly_total, duration_months, total: monthly_total * months }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CostComponent {
    Direct,
    /// Percentage-based indirect costs, charged on sales.
    IndirectSale,
    /// Site administration over the construction period.
    IndirectConstruction,
    Land,
}

impl CostComponent {
    pub const fn label(self) -> &'static str {
        match self {
            CostComponent::Direct => "Custo Direto",
            CostComponent::IndirectSale => "Custo Indireto de Venda",
            CostComponent::IndirectConstruction => "Custo Indireto de Obra",
            CostComponent::Land => "Custo do Terreno",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionRow {
    pub component: CostComponent,
    pub amount: f64,
    /// Share of the grand total, 0 when the total is 0.
    pub share_of_total: f64,
}

/// Costs per square meter of private area, and direct cost per built m².
/// Ratios over a zero area are 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AreaIndicators {
    pub private_area: f64,
    pub built_area: f64,
    pub equivalent_area: f64,
    pub direct_cost_per_private_m2: f64,
    pub indirect_cost_per_private_m2: f64,
    pub total_cost_per_private_m2: f64,
    pub direct_cost_per_built_m2: f64,
}

fn per_area(amount: f64, area: f64) -> f64 {
    if area > 0.0 { amount / area } else { 0.0 }
}

/// Everything renderers and exporters consume for one project snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeasibilityReport {
    pub project_id: u64,
    pub project_name: String,
    pub stage: Stage,
    pub floors: FloorTable,
    pub stages: ShareTable,
    pub indirect_items: ShareTable,
    /// Percentage-based indirect total over the VGV.
    pub indirect_percent_of_revenue: f64,
    pub site_administration: MonthlyTable,
    pub breakdown: CostBreakdown,
    pub composition: Vec<CompositionRow>,
    pub indicators: AreaIndicators,
    pub margin_health: MarginHealth,
}

/// Assembles the report from the aggregation and the cost breakdown.
pub fn build_report(
    project: &ProjectRecord,
    aggregation: &FloorAggregation,
    breakdown: &CostBreakdown,
    margin: &MarginConfig,
) -> FeasibilityReport {
    let unit_cost = project.unit_cost_per_equivalent_m2;
    let rows = aggregation
        .floors
        .iter()
        .map(|floor| FloorRow {
            name: floor.spec.name.clone(),
            kind: floor.spec.kind.clone(),
            repeat_count: floor.spec.repeat_count,
            coefficient: floor.coefficient,
            raw_area: floor.spec.raw_area,
            area_total: floor.area_total,
            area_equivalent: floor.area_equivalent,
            area_built: floor.area_built,
            counts_as_built: floor.spec.counts_as_built,
            direct_cost: floor.area_equivalent * unit_cost,
        })
        .collect();

    let components = [
        (CostComponent::Direct, breakdown.direct_cost_total),
        (CostComponent::IndirectSale, breakdown.indirect_percentage_cost_total),
        (CostComponent::IndirectConstruction, breakdown.indirect_fixed_monthly_cost_total),
        (CostComponent::Land, breakdown.land_cost_total),
    ];
    let grand_total: f64 = components.iter().map(|(_, amount)| amount).sum();
    let composition = components
        .into_iter()
        .map(|(component, amount)| CompositionRow {
            component,
            amount,
            share_of_total: ratio_percent(amount, grand_total),
        })
        .collect();

    let private_area = project.private_area;
    let indirect_total = breakdown.indirect_percentage_cost_total
        + breakdown.indirect_fixed_monthly_cost_total
        + breakdown.land_cost_total;
    let indicators = AreaIndicators {
        private_area,
        built_area: aggregation.totals.total_built_area,
        equivalent_area: aggregation.totals.total_equivalent_area,
        direct_cost_per_private_m2: per_area(breakdown.direct_cost_total, private_area),
        indirect_cost_per_private_m2: per_area(indirect_total, private_area),
        total_cost_per_private_m2: per_area(breakdown.total_expense, private_area),
        direct_cost_per_built_m2: per_area(
            breakdown.direct_cost_total,
            aggregation.totals.total_built_area,
        ),
    };

    FeasibilityReport {
        project_id: project.id,
        project_name: project.name.clone(),
        stage: project.stage,
        floors: FloorTable {
            rows,
            totals: aggregation.totals,
            direct_cost_total: breakdown.direct_cost_total,
        },
        stages: ShareTable::price(&project.direct_cost_shares, breakdown.direct_cost_total),
        indirect_items: ShareTable::price(&project.indirect_percentage_shares, breakdown.revenue_total),
        indirect_percent_of_revenue: ratio_percent(
            breakdown.indirect_percentage_cost_total,
            breakdown.revenue_total,
        ),
        site_administration: MonthlyTable::price(
            &project.indirect_fixed_monthly_items,
            project.duration_months,
        ),
        breakdown: *breakdown,
        composition,
        indicators,
        margin_health: MarginHealth::classify(
            breakdown.margin_percent,
            margin.healthy_percent,
            margin.marginal_percent,
        ),
    }
}

impl fmt::Display for FeasibilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.breakdown;
        writeln!(f, "{} (#{}, {})", self.project_name, self.project_id, self.stage.label())?;
        writeln!(f, "  VGV                 R$ {}", format_brl(b.revenue_total))?;
        for row in &self.composition {
            writeln!(
                f,
                "  {:<24}R$ {} ({})",
                row.component.label(),
                format_brl(row.amount),
                format_percent(row.share_of_total)
            )?;
        }
        writeln!(f, "  Total de despesas   R$ {}", format_brl(b.total_expense))?;
        writeln!(f, "  Lucro bruto         R$ {}", format_brl(b.gross_profit))?;
        writeln!(f, "  Margem              {} ({:?})", format_percent(b.margin_percent), self.margin_health)?;
        write!(
            f,
            "  Área construída     {} m², custo direto R$ {}/m²",
            format_brl(self.indicators.built_area),
            format_brl(self.indicators.direct_cost_per_built_m2)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viab_types::ShareItem;

    #[test]
    fn share_table_prices_each_row() {
        let shares: ShareSet =
            [ShareItem::manual("Pintura", 5.0), ShareItem::manual("Forro", 4.0)].into_iter().collect();
        let table = ShareTable::price(&shares, 200_000.0);
        assert_eq!(table.rows[0].cost, 10_000.0);
        assert_eq!(table.rows[1].cost, 8_000.0);
        assert_eq!(table.total_percentage, 9.0);
        assert_eq!(table.total_cost, 18_000.0);
    }

    #[test]
    fn monthly_table_scales_with_duration() {
        let items: MonthlyBudget = [("Energia", 1000.0), ("Água", 500.0)].into_iter().collect();
        let table = MonthlyTable::price(&items, 10);
        assert_eq!(table.rows[1].period_total, 5_000.0);
        assert_eq!(table.total, 15_000.0);
    }

    #[test]
    fn per_area_guards_zero() {
        assert_eq!(per_area(100.0, 0.0), 0.0);
        assert_eq!(per_area(100.0, 4.0), 25.0);
    }
}
