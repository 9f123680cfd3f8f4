// 📊 Chart Series - one denormalized point per income statement row
//
// Two ways to line the tables up:
//
//   ByIndex: positional. Cash flow and WACC at index i, balance sheet at
//            index i+1 (the balance sheet carries an extra year-0 row).
//            Whether the +1 is an intended end-of-period pairing or an
//            indexing slip is unconfirmed; it is kept as observed.
//   ByYear:  every table matched on the income statement row's year.
//
// Missing values are 0 in both modes.

use crate::model::{
    find_year, BalanceSheetRow, CashFlowRow, IncomeStatementRow, WaccRow, Year,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartAlignment {
    #[default]
    ByIndex,
    ByYear,
}

impl ChartAlignment {
    pub fn name(&self) -> &str {
        match self {
            ChartAlignment::ByIndex => "by_index",
            ChartAlignment::ByYear => "by_year",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub year: Year,
    pub revenue: f64,
    pub net_income: f64,
    pub free_cash_flow: f64,
    pub wacc: f64,
    pub total_assets: f64,
}

pub fn project_chart_series(
    income_statement: &[IncomeStatementRow],
    cash_flow: &[CashFlowRow],
    wacc: &[WaccRow],
    balance_sheet: &[BalanceSheetRow],
    alignment: ChartAlignment,
) -> Vec<ChartPoint> {
    income_statement
        .iter()
        .enumerate()
        .map(|(i, income)| {
            let (free_cash_flow, wacc_value, total_assets) = match alignment {
                ChartAlignment::ByIndex => (
                    cash_flow.get(i).map_or(0.0, |cf| cf.free_cash_flow),
                    wacc.get(i).map_or(0.0, |w| w.wacc),
                    balance_sheet.get(i + 1).map_or(0.0, |bs| bs.total_assets),
                ),
                ChartAlignment::ByYear => (
                    find_year(cash_flow, income.year).map_or(0.0, |cf| cf.free_cash_flow),
                    find_year(wacc, income.year).map_or(0.0, |w| w.wacc),
                    find_year(balance_sheet, income.year).map_or(0.0, |bs| bs.total_assets),
                ),
            };

            ChartPoint {
                year: income.year,
                revenue: income.revenue,
                net_income: income.net_income,
                free_cash_flow,
                wacc: wacc_value,
                total_assets,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (Vec<IncomeStatementRow>, Vec<CashFlowRow>, Vec<WaccRow>, Vec<BalanceSheetRow>) {
        let income_statement = vec![
            IncomeStatementRow { year: 1, revenue: 1000.0, net_income: 100.0, ..Default::default() },
            IncomeStatementRow { year: 2, revenue: 1200.0, net_income: 150.0, ..Default::default() },
        ];
        let cash_flow = vec![
            CashFlowRow { year: 1, free_cash_flow: 80.0, ..Default::default() },
            CashFlowRow { year: 2, free_cash_flow: 90.0, ..Default::default() },
        ];
        let wacc = vec![
            WaccRow { year: 1, wacc: 0.11, ..Default::default() },
            WaccRow { year: 2, wacc: 0.12, ..Default::default() },
        ];
        let balance_sheet = vec![
            BalanceSheetRow { year: 0, total_assets: 1000.0, ..Default::default() },
            BalanceSheetRow { year: 1, total_assets: 1100.0, ..Default::default() },
            BalanceSheetRow { year: 2, total_assets: 1250.0, ..Default::default() },
        ];
        (income_statement, cash_flow, wacc, balance_sheet)
    }

    #[test]
    fn test_by_index_offsets_balance_sheet_by_one() {
        let (is, cf, w, bs) = fixture();

        let series = project_chart_series(&is, &cf, &w, &bs, ChartAlignment::ByIndex);

        // Index 0 pairs with balance sheet index 1, not 0
        assert_eq!(series[0].total_assets, 1100.0);
        assert_eq!(series[1].total_assets, 1250.0);
        assert_eq!(series[0].free_cash_flow, 80.0);
        assert_eq!(series[1].wacc, 0.12);
        assert_eq!(series[1].revenue, 1200.0);
        assert_eq!(series[1].net_income, 150.0);
    }

    #[test]
    fn test_by_index_missing_positions_fill_zero() {
        let (is, _, _, bs) = fixture();

        let series = project_chart_series(&is, &[], &[], &bs[..2], ChartAlignment::ByIndex);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].free_cash_flow, 0.0);
        assert_eq!(series[0].wacc, 0.0);
        assert_eq!(series[0].total_assets, 1100.0);
        // bs index 2 does not exist
        assert_eq!(series[1].total_assets, 0.0);
    }

    #[test]
    fn test_by_year_joins_on_year() {
        let (is, cf, w, bs) = fixture();

        // Drop the first cash flow row: positional join would misalign
        let series = project_chart_series(&is, &cf[1..], &w, &bs, ChartAlignment::ByYear);

        assert_eq!(series[0].free_cash_flow, 0.0);
        assert_eq!(series[1].free_cash_flow, 90.0);
        assert_eq!(series[0].total_assets, 1100.0);
        assert_eq!(series[1].wacc, 0.12);
    }

    #[test]
    fn test_alignments_agree_on_contiguous_tables() {
        let (is, cf, w, bs) = fixture();

        let by_index = project_chart_series(&is, &cf, &w, &bs, ChartAlignment::ByIndex);
        let by_year = project_chart_series(&is, &cf, &w, &bs, ChartAlignment::ByYear);

        assert_eq!(by_index, by_year);
    }

    #[test]
    fn test_alignment_names() {
        assert_eq!(ChartAlignment::default(), ChartAlignment::ByIndex);
        assert_eq!(ChartAlignment::ByYear.name(), "by_year");

        let parsed: ChartAlignment = serde_json::from_str("\"by_year\"").unwrap();
        assert_eq!(parsed, ChartAlignment::ByYear);
    }
}
