//! Cost composition: direct, indirect and land costs, revenue (VGV) and
//! profitability.
//!
//! Every function here produces a number for any input. Non-finite amounts are
//! read as zero and divisions by a non-positive base short-circuit to zero.

use serde::Serialize;
use tracing::{debug, instrument};
use viab_types::{MonthlyBudget, ShareSet};

use crate::floors::AggregatedFloor;

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// `base × percentage / 100`, percentages on the 0–100 scale.
pub fn percentage_of(base: f64, percentage: f64) -> f64 {
    finite_or_zero(base) * finite_or_zero(percentage) / 100.0
}

/// `part / whole × 100`, or 0 when `whole` is not positive.
pub fn ratio_percent(part: f64, whole: f64) -> f64 {
    let whole = finite_or_zero(whole);
    if whole > 0.0 { finite_or_zero(part) / whole * 100.0 } else { 0.0 }
}

/// Sum over floors of `area_equivalent × unit_cost`.
pub fn direct_cost(floors: &[AggregatedFloor], unit_cost: f64) -> f64 {
    let unit_cost = finite_or_zero(unit_cost);
    floors.iter().map(|f| finite_or_zero(f.area_equivalent) * unit_cost).sum()
}

/// Sum of `base_amount × percentage / 100` over the shares. Shares carrying a
/// non-finite percentage contribute zero.
pub fn indirect_from_percentages(base_amount: f64, shares: &ShareSet) -> f64 {
    shares
        .iter()
        .filter_map(|share| {
            if share.percentage.is_finite() {
                Some(percentage_of(base_amount, share.percentage))
            } else {
                debug!(key = %share.key, "Skipping share with malformed percentage");
                None
            }
        })
        .sum()
}

/// `sum(monthly items) × duration_months`.
pub fn indirect_from_fixed_budget(monthly_items: &MonthlyBudget, duration_months: u32) -> f64 {
    monthly_items.monthly_total() * f64::from(duration_months)
}

/// Everything the composer needs for one project snapshot.
#[derive(Debug, Clone, Copy)]
pub struct CostInputs<'a> {
    pub floors: &'a [AggregatedFloor],
    pub unit_cost_per_equivalent_m2: f64,
    pub land_area: f64,
    pub land_unit_cost: f64,
    pub sale_price_per_m2: f64,
    pub sale_area: f64,
    pub percentage_shares: &'a ShareSet,
    pub fixed_monthly_items: &'a MonthlyBudget,
    pub duration_months: u32,
}

/// Absolute currency values of one project snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CostBreakdown {
    pub direct_cost_total: f64,
    /// Percentage-based indirect costs, charged on the VGV.
    pub indirect_percentage_cost_total: f64,
    /// Site administration: monthly items × duration.
    pub indirect_fixed_monthly_cost_total: f64,
    pub land_cost_total: f64,
    /// VGV.
    pub revenue_total: f64,
    pub total_expense: f64,
    pub gross_profit: f64,
    /// `gross_profit / revenue_total × 100`, 0 when there is no revenue.
    pub margin_percent: f64,
}

impl CostBreakdown {
    /// Builds the derived totals from the four cost components and revenue.
    pub fn from_components(
        direct_cost_total: f64,
        indirect_percentage_cost_total: f64,
        indirect_fixed_monthly_cost_total: f64,
        land_cost_total: f64,
        revenue_total: f64,
    ) -> Self {
        let total_expense = direct_cost_total
            + indirect_percentage_cost_total
            + indirect_fixed_monthly_cost_total
            + land_cost_total;
        let gross_profit = revenue_total - total_expense;
        Self {
            direct_cost_total,
            indirect_percentage_cost_total,
            indirect_fixed_monthly_cost_total,
            land_cost_total,
            revenue_total,
            total_expense,
            gross_profit,
            margin_percent: ratio_percent(gross_profit, revenue_total),
        }
    }
}

/// Wires direct, indirect, land and revenue calculations together.
#[instrument(skip(inputs), fields(floor_count = inputs.floors.len()))]
pub fn compose(inputs: &CostInputs<'_>) -> CostBreakdown {
    let revenue_total = finite_or_zero(inputs.sale_area) * finite_or_zero(inputs.sale_price_per_m2);
    let land_cost_total = finite_or_zero(inputs.land_area) * finite_or_zero(inputs.land_unit_cost);
    let direct = direct_cost(inputs.floors, inputs.unit_cost_per_equivalent_m2);
    let indirect_percentage = indirect_from_percentages(revenue_total, inputs.percentage_shares);
    let indirect_fixed =
        indirect_from_fixed_budget(inputs.fixed_monthly_items, inputs.duration_months);

    let breakdown = CostBreakdown::from_components(
        direct,
        indirect_percentage,
        indirect_fixed,
        land_cost_total,
        revenue_total,
    );

    debug!(
        revenue_total = breakdown.revenue_total,
        total_expense = breakdown.total_expense,
        margin_percent = breakdown.margin_percent,
        "Composed cost breakdown"
    );

    breakdown
}

/// Coarse reading of a margin against the configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginHealth {
    /// At or above the healthy threshold.
    Promising,
    /// At or above the marginal threshold.
    Marginal,
    /// Below the marginal threshold.
    Concerning,
}

impl MarginHealth {
    pub fn classify(margin_percent: f64, healthy_percent: f64, marginal_percent: f64) -> Self {
        if margin_percent >= healthy_percent {
            Self::Promising
        } else if margin_percent >= marginal_percent {
            Self::Marginal
        } else {
            Self::Concerning
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::floors::aggregate;
    use viab_types::{CoefficientTable, FloorSpec, ShareItem, reference::PRIVATE_AREA_KIND};

    #[test]
    fn single_private_floor_direct_cost() {
        let floors = vec![FloorSpec::new("Tipo", PRIVATE_AREA_KIND, 100.0).with_coefficient(1.0)];
        let aggregation = aggregate(&floors, &CoefficientTable::standard());
        assert_eq!(direct_cost(&aggregation.floors, 4500.0), 450_000.0);
        assert_eq!(aggregation.totals.total_built_area, 100.0);
    }

    #[test]
    fn malformed_percentages_contribute_zero() {
        let shares: ShareSet = [
            ShareItem::manual("Corretagem", 4.0),
            ShareItem::manual("Legado", f64::NAN),
            ShareItem::manual("Publicidade", 1.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(indirect_from_percentages(1_000_000.0, &shares), 50_000.0);
    }

    #[test]
    fn fixed_budget_scales_with_duration() {
        let budget: MonthlyBudget = [("Energia", 1000.0), ("Água", 500.0)].into_iter().collect();
        assert_eq!(indirect_from_fixed_budget(&budget, 12), 18_000.0);
        assert_eq!(indirect_from_fixed_budget(&budget, 0), 0.0);
    }

    #[test]
    fn zero_revenue_never_divides() {
        let breakdown = CostBreakdown::from_components(100.0, 0.0, 50.0, 25.0, 0.0);
        assert_eq!(breakdown.total_expense, 175.0);
        assert_eq!(breakdown.gross_profit, -175.0);
        assert_eq!(breakdown.margin_percent, 0.0);
    }

    #[test]
    fn compose_wires_every_component() {
        let floors = vec![FloorSpec::new("Tipo", PRIVATE_AREA_KIND, 100.0).with_repeat_count(10)];
        let aggregation = aggregate(&floors, &CoefficientTable::standard());
        let shares: ShareSet = [ShareItem::manual("Corretagem", 5.0)].into_iter().collect();
        let budget: MonthlyBudget = [("Administração", 10_000.0)].into_iter().collect();

        let breakdown = compose(&CostInputs {
            floors: &aggregation.floors,
            unit_cost_per_equivalent_m2: 2000.0,
            land_area: 500.0,
            land_unit_cost: 400.0,
            sale_price_per_m2: 6000.0,
            sale_area: 1000.0,
            percentage_shares: &shares,
            fixed_monthly_items: &budget,
            duration_months: 10,
        });

        assert_eq!(breakdown.revenue_total, 6_000_000.0);
        assert_eq!(breakdown.direct_cost_total, 2_000_000.0);
        assert_eq!(breakdown.indirect_percentage_cost_total, 300_000.0);
        assert_eq!(breakdown.indirect_fixed_monthly_cost_total, 100_000.0);
        assert_eq!(breakdown.land_cost_total, 200_000.0);
        assert_eq!(breakdown.total_expense, 2_600_000.0);
        assert_eq!(breakdown.gross_profit, 3_400_000.0);
        assert!((breakdown.margin_percent - 56.666_666_666_666_664).abs() < 1e-9);
    }

    #[test]
    fn margin_health_thresholds() {
        assert_eq!(MarginHealth::classify(15.0, 15.0, 5.0), MarginHealth::Promising);
        assert_eq!(MarginHealth::classify(7.5, 15.0, 5.0), MarginHealth::Marginal);
        assert_eq!(MarginHealth::classify(-3.0, 15.0, 5.0), MarginHealth::Concerning);
    }
}
