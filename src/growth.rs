// 📈 Year-over-Year - income statement growth against the preceding row
//
// Rows are compared by POSITION: row i against row i-1. Contiguous years are
// assumed and not checked.

use crate::model::IncomeStatementRow;
use crate::policy::growth_or_fill;
use serde::Serialize;

/// Income statement row plus its growth over the previous row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeStatementYoYRow {
    #[serde(flatten)]
    pub row: IncomeStatementRow,

    /// Fractional change in units sold
    pub units_growth: f64,

    /// Fractional change in unit price
    pub unit_price_growth: f64,

    /// Fractional change in revenue
    pub revenue_growth: f64,
}

impl IncomeStatementYoYRow {
    /// First row of a series: nothing to compare against
    pub fn first(row: &IncomeStatementRow) -> Self {
        IncomeStatementYoYRow {
            row: row.clone(),
            units_growth: 0.0,
            unit_price_growth: 0.0,
            revenue_growth: 0.0,
        }
    }

    pub fn against(row: &IncomeStatementRow, previous: &IncomeStatementRow) -> Self {
        IncomeStatementYoYRow {
            row: row.clone(),
            units_growth: growth_or_fill(row.units, previous.units),
            unit_price_growth: growth_or_fill(row.unit_price, previous.unit_price),
            revenue_growth: growth_or_fill(row.revenue, previous.revenue),
        }
    }
}

pub fn income_statement_yoy(income_statement: &[IncomeStatementRow]) -> Vec<IncomeStatementYoYRow> {
    income_statement
        .iter()
        .enumerate()
        .map(|(i, row)| match i.checked_sub(1).map(|p| &income_statement[p]) {
            Some(previous) => IncomeStatementYoYRow::against(row, previous),
            None => IncomeStatementYoYRow::first(row),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_row(year: i64, units: f64, unit_price: f64, revenue: f64) -> IncomeStatementRow {
        IncomeStatementRow {
            year,
            units,
            unit_price,
            revenue,
            ..Default::default()
        }
    }

    #[test]
    fn test_revenue_growth() {
        let rows = vec![
            IncomeStatementRow { year: 1, revenue: 1000.0, net_income: 100.0, ..Default::default() },
            IncomeStatementRow { year: 2, revenue: 1200.0, net_income: 150.0, ..Default::default() },
        ];

        let yoy = income_statement_yoy(&rows);

        assert!((yoy[1].revenue_growth - 0.2).abs() < 1e-12);
        assert_eq!(yoy[1].row.net_income, 150.0);
    }

    #[test]
    fn test_first_row_is_zero() {
        let rows = vec![is_row(1, 50.0, 20.0, 1000.0), is_row(2, 60.0, 25.0, 1500.0)];

        let first = &income_statement_yoy(&rows)[0];

        assert_eq!(first.units_growth, 0.0);
        assert_eq!(first.unit_price_growth, 0.0);
        assert_eq!(first.revenue_growth, 0.0);
    }

    #[test]
    fn test_all_three_growth_fields() {
        let rows = vec![is_row(1, 50.0, 20.0, 1000.0), is_row(2, 60.0, 25.0, 1500.0)];

        let second = &income_statement_yoy(&rows)[1];

        assert!((second.units_growth - 0.2).abs() < 1e-12);
        assert!((second.unit_price_growth - 0.25).abs() < 1e-12);
        assert!((second.revenue_growth - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_previous_fills_zero() {
        let rows = vec![is_row(1, 0.0, 0.0, 0.0), is_row(2, 60.0, 25.0, 1500.0)];

        let second = &income_statement_yoy(&rows)[1];

        assert_eq!(second.units_growth, 0.0);
        assert_eq!(second.unit_price_growth, 0.0);
        assert_eq!(second.revenue_growth, 0.0);
    }

    #[test]
    fn test_decline_is_negative() {
        let rows = vec![is_row(1, 100.0, 10.0, 1000.0), is_row(2, 75.0, 10.0, 750.0)];

        let second = &income_statement_yoy(&rows)[1];

        assert!((second.units_growth + 0.25).abs() < 1e-12);
        assert_eq!(second.unit_price_growth, 0.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(income_statement_yoy(&[]).is_empty());
    }
}
