// 🧮 Dashboard Views - everything one render pass needs, derived from scratch
//
// Nothing here is cached: callers derive again on every render/request.

use crate::analysis::{horizontal_analysis, vertical_analysis, HorizontalAnalysisRow, VerticalAnalysisRow};
use crate::chart::ChartPoint;
use crate::error::Result;
use crate::growth::{income_statement_yoy, IncomeStatementYoYRow};
use crate::ratios::{financial_ratios, RatioRow};
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// KEY METRICS
// ============================================================================

/// Headline figures from the latest row of each table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub revenue: f64,
    pub net_income: f64,
    pub total_assets: f64,
    pub free_cash_flow: f64,
}

pub fn key_metrics(snapshot: &Snapshot) -> KeyMetrics {
    let latest_income = snapshot.income_statement().last();

    KeyMetrics {
        revenue: latest_income.map_or(0.0, |r| r.revenue),
        net_income: latest_income.map_or(0.0, |r| r.net_income),
        total_assets: snapshot.balance_sheet().last().map_or(0.0, |r| r.total_assets),
        free_cash_flow: snapshot.cash_flow().last().map_or(0.0, |r| r.free_cash_flow),
    }
}

// ============================================================================
// DERIVED VIEWS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedViews {
    pub vertical: Vec<VerticalAnalysisRow>,
    pub horizontal: Vec<HorizontalAnalysisRow>,
    pub income_yoy: Vec<IncomeStatementYoYRow>,
    pub ratios: Vec<RatioRow>,
    pub chart_series: Vec<ChartPoint>,
    pub key_metrics: KeyMetrics,
}

impl DerivedViews {
    /// Run every derivation over the snapshot
    ///
    /// Fails if horizontal analysis or ratios hit missing reference data.
    pub fn compute(snapshot: &Snapshot) -> Result<Self> {
        Ok(DerivedViews {
            vertical: vertical_analysis(snapshot.balance_sheet()),
            horizontal: horizontal_analysis(snapshot.balance_sheet())?,
            income_yoy: income_statement_yoy(snapshot.income_statement()),
            ratios: financial_ratios(snapshot.income_statement(), snapshot.balance_sheet())?,
            chart_series: snapshot.chart_series.clone(),
            key_metrics: key_metrics(snapshot),
        })
    }
}

// ============================================================================
// VIEW SELECTION (CLI / API)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Vertical,
    Horizontal,
    IncomeYoY,
    Ratios,
    Chart,
    KeyMetrics,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Vertical,
        View::Horizontal,
        View::IncomeYoY,
        View::Ratios,
        View::Chart,
        View::KeyMetrics,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            View::Vertical => "vertical",
            View::Horizontal => "horizontal",
            View::IncomeYoY => "income-yoy",
            View::Ratios => "ratios",
            View::Chart => "chart",
            View::KeyMetrics => "key-metrics",
        }
    }

    /// Derive just this view as JSON
    pub fn render(&self, snapshot: &Snapshot) -> Result<serde_json::Value> {
        let value = match self {
            View::Vertical => serde_json::to_value(vertical_analysis(snapshot.balance_sheet())),
            View::Horizontal => serde_json::to_value(horizontal_analysis(snapshot.balance_sheet())?),
            View::IncomeYoY => serde_json::to_value(income_statement_yoy(snapshot.income_statement())),
            View::Ratios => serde_json::to_value(financial_ratios(
                snapshot.income_statement(),
                snapshot.balance_sheet(),
            )?),
            View::Chart => serde_json::to_value(&snapshot.chart_series),
            View::KeyMetrics => serde_json::to_value(key_metrics(snapshot)),
        };
        // Plain data structs always serialize
        Ok(value.unwrap_or(serde_json::Value::Null))
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        View::ALL
            .into_iter()
            .find(|v| v.slug() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = View::ALL.iter().map(|v| v.slug()).collect();
                format!("unknown view '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartAlignment;
    use crate::error::EngineError;
    use crate::model::{BalanceSheetRow, CashFlowRow, IncomeStatementRow};
    use crate::snapshot::FinancialTables;

    fn snapshot(with_base_year: bool) -> Snapshot {
        let first_year = if with_base_year { 0 } else { 1 };
        let tables = FinancialTables {
            balance_sheet: (first_year..=2)
                .map(|year| BalanceSheetRow {
                    year,
                    cash: 100.0 * (year + 1) as f64,
                    total_assets: 1000.0 + 100.0 * year as f64,
                    total_liabilities_and_equity: 1000.0 + 100.0 * year as f64,
                    ..Default::default()
                })
                .collect(),
            income_statement: vec![
                IncomeStatementRow { year: 1, revenue: 1000.0, net_income: 100.0, ..Default::default() },
                IncomeStatementRow { year: 2, revenue: 1200.0, net_income: 150.0, ..Default::default() },
            ],
            cash_flow: vec![
                CashFlowRow { year: 1, free_cash_flow: 70.0, ..Default::default() },
                CashFlowRow { year: 2, free_cash_flow: 95.0, ..Default::default() },
            ],
            ..Default::default()
        };
        Snapshot::new(tables, ChartAlignment::ByIndex).unwrap()
    }

    #[test]
    fn test_key_metrics_from_latest_rows() {
        let metrics = key_metrics(&snapshot(true));

        assert_eq!(metrics.revenue, 1200.0);
        assert_eq!(metrics.net_income, 150.0);
        assert_eq!(metrics.total_assets, 1200.0);
        assert_eq!(metrics.free_cash_flow, 95.0);
    }

    #[test]
    fn test_key_metrics_empty_snapshot() {
        let empty = Snapshot::new(FinancialTables::default(), ChartAlignment::ByIndex).unwrap();

        assert_eq!(key_metrics(&empty), KeyMetrics::default());
    }

    #[test]
    fn test_compute_all_views() {
        let views = DerivedViews::compute(&snapshot(true)).unwrap();

        assert_eq!(views.vertical.len(), 3);
        assert_eq!(views.horizontal.len(), 3);
        assert_eq!(views.income_yoy.len(), 2);
        assert_eq!(views.ratios.len(), 2);
        assert_eq!(views.chart_series.len(), 2);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let snap = snapshot(true);

        let first = DerivedViews::compute(&snap).unwrap();
        let second = DerivedViews::compute(&snap).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_compute_propagates_missing_base_year() {
        let err = DerivedViews::compute(&snapshot(false)).unwrap_err();

        assert!(matches!(err, EngineError::MissingBaseYear { .. }));
    }

    #[test]
    fn test_view_slugs_round_trip() {
        for view in View::ALL {
            assert_eq!(view.slug().parse::<View>().unwrap(), view);
        }
        assert!("balance".parse::<View>().is_err());
    }

    #[test]
    fn test_render_single_view() {
        let value = View::Ratios.render(&snapshot(true)).unwrap();

        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["year"], 1);
        assert_eq!(rows[0]["return_on_sales"], 0.1);
    }
}
