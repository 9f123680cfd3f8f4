// 💹 Financial Ratios - profitability per income statement year
//
// ROA and ROE use the average of this year's and last year's balance when
// last year's balance sheet exists, otherwise this year's balance alone.

use crate::error::{EngineError, Result};
use crate::model::{find_year, BalanceSheetRow, IncomeStatementRow, Year};
use crate::policy::ratio_or_fill;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioRow {
    pub year: Year,

    /// Net income / revenue
    pub return_on_sales: f64,

    /// Net income / average total assets
    pub return_on_assets: f64,

    /// Net income / average equity
    pub return_on_equity: f64,

    /// Net income / (shareholder capital + paid-in capital)
    pub return_on_investment: f64,

    /// EBIT / revenue
    pub gross_margin: f64,
}

/// Mean of the two balances, or the current one when there is no prior year
pub fn average_balance(current: f64, prior: Option<f64>) -> f64 {
    match prior {
        Some(prior) => (current + prior) / 2.0,
        None => current,
    }
}

impl RatioRow {
    pub fn compute(
        income: &IncomeStatementRow,
        balance: &BalanceSheetRow,
        prior_balance: Option<&BalanceSheetRow>,
    ) -> Self {
        let net_income = income.net_income;

        let avg_assets = average_balance(balance.total_assets, prior_balance.map(|b| b.total_assets));
        let avg_equity = average_balance(balance.equity, prior_balance.map(|b| b.equity));
        let invested_capital = balance.shareholder_capital + balance.paid_in_capital;

        RatioRow {
            year: income.year,
            return_on_sales: ratio_or_fill(net_income, income.revenue),
            return_on_assets: ratio_or_fill(net_income, avg_assets),
            return_on_equity: ratio_or_fill(net_income, avg_equity),
            return_on_investment: ratio_or_fill(net_income, invested_capital),
            gross_margin: ratio_or_fill(income.ebit, income.revenue),
        }
    }
}

/// One ratio row per income statement year
///
/// Every income statement year needs a balance sheet row for the same year;
/// the first one missing fails the whole computation.
pub fn financial_ratios(
    income_statement: &[IncomeStatementRow],
    balance_sheet: &[BalanceSheetRow],
) -> Result<Vec<RatioRow>> {
    income_statement
        .iter()
        .map(|income| {
            let balance = find_year(balance_sheet, income.year)
                .ok_or(EngineError::MissingBalanceSheetYear { year: income.year })?;
            let prior = find_year(balance_sheet, income.year - 1);

            Ok(RatioRow::compute(income, balance, prior))
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
