// 📐 Common-Size Analysis - vertical and horizontal views of the balance sheet
//
// Vertical:   each line / the same year's total (assets or liabilities+equity)
// Horizontal: each line / the same line in the base year (year 0)

use crate::error::{EngineError, Result};
use crate::model::{find_year, BalanceSheetRow, Year};
use crate::policy::ratio_or_fill;
use serde::{Deserialize, Serialize};

/// Fiscal year all horizontal ratios are measured against
pub const BASE_YEAR: Year = 0;

// ============================================================================
// VERTICAL ANALYSIS
// ============================================================================

/// Balance sheet lines as fractions of the year's totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticalAnalysisRow {
    pub year: Year,

    // Share of total assets
    pub current_assets: f64,
    pub cash: f64,
    pub inventory: f64,
    pub receivables: f64,
    pub long_term_assets: f64,
    pub intangible_assets: f64,
    pub tangible_assets_net: f64,

    // Share of total liabilities and equity
    pub equity: f64,
    pub shareholder_capital: f64,
    pub paid_in_capital: f64,
    pub retained_earnings: f64,
    pub liabilities: f64,
    pub loans_payable: f64,
}

impl VerticalAnalysisRow {
    pub fn from_row(row: &BalanceSheetRow) -> Self {
        let assets = |value: f64| ratio_or_fill(value, row.total_assets);
        let funding = |value: f64| ratio_or_fill(value, row.total_liabilities_and_equity);

        VerticalAnalysisRow {
            year: row.year,
            current_assets: assets(row.current_assets),
            cash: assets(row.cash),
            inventory: assets(row.inventory),
            receivables: assets(row.receivables),
            long_term_assets: assets(row.long_term_assets),
            intangible_assets: assets(row.intangible_assets),
            tangible_assets_net: assets(row.tangible_assets_net),
            equity: funding(row.equity),
            shareholder_capital: funding(row.shareholder_capital),
            paid_in_capital: funding(row.paid_in_capital),
            retained_earnings: funding(row.retained_earnings),
            liabilities: funding(row.liabilities),
            loans_payable: funding(row.loans_payable),
        }
    }
}

/// One vertical row per balance sheet row, in input order
pub fn vertical_analysis(balance_sheet: &[BalanceSheetRow]) -> Vec<VerticalAnalysisRow> {
    balance_sheet.iter().map(VerticalAnalysisRow::from_row).collect()
}

// ============================================================================
// HORIZONTAL ANALYSIS
// ============================================================================

/// Balance sheet lines as multiples of their base-year value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizontalAnalysisRow {
    pub year: Year,
    pub cash: f64,
    pub long_term_assets: f64,
    pub intangible_assets: f64,
    pub tangible_assets_net: f64,
    pub total_assets: f64,
    pub equity: f64,
    pub shareholder_capital: f64,
    pub paid_in_capital: f64,
    pub liabilities: f64,
    pub loans_payable: f64,
}

impl HorizontalAnalysisRow {
    pub fn against_base(row: &BalanceSheetRow, base: &BalanceSheetRow) -> Self {
        HorizontalAnalysisRow {
            year: row.year,
            cash: ratio_or_fill(row.cash, base.cash),
            long_term_assets: ratio_or_fill(row.long_term_assets, base.long_term_assets),
            intangible_assets: ratio_or_fill(row.intangible_assets, base.intangible_assets),
            tangible_assets_net: ratio_or_fill(row.tangible_assets_net, base.tangible_assets_net),
            total_assets: ratio_or_fill(row.total_assets, base.total_assets),
            equity: ratio_or_fill(row.equity, base.equity),
            shareholder_capital: ratio_or_fill(row.shareholder_capital, base.shareholder_capital),
            paid_in_capital: ratio_or_fill(row.paid_in_capital, base.paid_in_capital),
            liabilities: ratio_or_fill(row.liabilities, base.liabilities),
            loans_payable: ratio_or_fill(row.loans_payable, base.loans_payable),
        }
    }
}

/// Every row measured against the base year row
///
/// Fails with `MissingBaseYear` when no row has `year == BASE_YEAR`.
pub fn horizontal_analysis(balance_sheet: &[BalanceSheetRow]) -> Result<Vec<HorizontalAnalysisRow>> {
    let base = find_year(balance_sheet, BASE_YEAR)
        .ok_or(EngineError::MissingBaseYear { year: BASE_YEAR })?;

    Ok(balance_sheet
        .iter()
        .map(|row| HorizontalAnalysisRow::against_base(row, base))
        .collect())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::DIVISION_BY_ZERO_FILL;

    fn bs_row(year: Year, cash: f64, total_assets: f64) -> BalanceSheetRow {
        BalanceSheetRow {
            year,
            cash,
            total_assets,
            ..Default::default()
        }
    }

    #[test]
    fn test_vertical_fraction_of_totals() {
        let row = BalanceSheetRow {
            year: 1,
            current_assets: 400.0,
            cash: 250.0,
            inventory: 100.0,
            receivables: 50.0,
            long_term_assets: 600.0,
            intangible_assets: 200.0,
            tangible_assets_net: 400.0,
            total_assets: 1000.0,
            equity: 700.0,
            shareholder_capital: 300.0,
            paid_in_capital: 300.0,
            retained_earnings: 100.0,
            liabilities: 300.0,
            loans_payable: 250.0,
            total_liabilities_and_equity: 1000.0,
        };

        let vertical = vertical_analysis(&[row.clone()]);
        let v = &vertical[0];

        assert_eq!(v.year, 1);
        assert_eq!(v.current_assets, 400.0 / 1000.0);
        assert_eq!(v.cash, 250.0 / 1000.0);
        assert_eq!(v.tangible_assets_net, 400.0 / 1000.0);
        assert_eq!(v.equity, 700.0 / 1000.0);
        assert_eq!(v.loans_payable, 250.0 / 1000.0);
    }

    #[test]
    fn test_vertical_sides_use_their_own_denominator() {
        let row = BalanceSheetRow {
            year: 2,
            cash: 100.0,
            total_assets: 400.0,
            equity: 100.0,
            total_liabilities_and_equity: 500.0,
            ..Default::default()
        };

        let v = VerticalAnalysisRow::from_row(&row);

        assert_eq!(v.cash, 0.25);
        assert_eq!(v.equity, 0.2);
    }

    #[test]
    fn test_vertical_zero_total_fills_zero() {
        let row = BalanceSheetRow {
            year: 0,
            cash: 500.0,
            equity: 300.0,
            total_assets: 0.0,
            total_liabilities_and_equity: 0.0,
            ..Default::default()
        };

        let v = VerticalAnalysisRow::from_row(&row);

        assert_eq!(v.cash, DIVISION_BY_ZERO_FILL);
        assert_eq!(v.equity, DIVISION_BY_ZERO_FILL);
    }

    #[test]
    fn test_vertical_preserves_order() {
        let rows = vec![bs_row(0, 1.0, 2.0), bs_row(1, 1.0, 4.0), bs_row(2, 1.0, 8.0)];

        let years: Vec<Year> = vertical_analysis(&rows).iter().map(|r| r.year).collect();

        assert_eq!(years, vec![0, 1, 2]);
    }

    #[test]
    fn test_horizontal_cash_ratio_against_base() {
        let rows = vec![bs_row(0, 500.0, 1000.0), bs_row(1, 600.0, 1100.0)];

        let horizontal = horizontal_analysis(&rows).unwrap();

        assert_eq!(horizontal.len(), 2);
        assert!((horizontal[1].cash - 1.2).abs() < 1e-12);
        assert!((horizontal[1].total_assets - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_horizontal_base_row_is_one_or_zero() {
        let rows = vec![bs_row(0, 500.0, 1000.0), bs_row(1, 600.0, 1100.0)];

        let base = &horizontal_analysis(&rows).unwrap()[0];

        assert_eq!(base.cash, 1.0);
        assert_eq!(base.total_assets, 1.0);
        // Zero in the base year: zero for every year
        assert_eq!(base.equity, DIVISION_BY_ZERO_FILL);
    }

    #[test]
    fn test_horizontal_zero_base_field_zero_for_all_years() {
        let rows = vec![bs_row(0, 0.0, 1000.0), bs_row(1, 600.0, 1100.0)];

        let horizontal = horizontal_analysis(&rows).unwrap();

        assert!(horizontal.iter().all(|r| r.cash == DIVISION_BY_ZERO_FILL));
    }

    #[test]
    fn test_horizontal_missing_base_year() {
        let rows = vec![bs_row(1, 600.0, 1100.0), bs_row(2, 700.0, 1200.0)];

        let err = horizontal_analysis(&rows).unwrap_err();

        assert_eq!(err, EngineError::MissingBaseYear { year: BASE_YEAR });
        assert!(err.is_missing_data());
    }

    #[test]
    fn test_horizontal_base_year_not_first() {
        // Lookup is by key, not position
        let rows = vec![bs_row(-1, 250.0, 500.0), bs_row(0, 500.0, 1000.0)];

        let horizontal = horizontal_analysis(&rows).unwrap();

        assert_eq!(horizontal[0].cash, 0.5);
        assert_eq!(horizontal[1].cash, 1.0);
    }
}
