// 📸 Snapshot - the seven source tables as one consistent, immutable view
//
// A snapshot is built once per load and never mutated. An input update
// produces a NEW snapshot that replaces the old one wholesale.
//
// Invariant (checked on construction):
//   - year-indexed tables are strictly ascending by year (no duplicates)
//   - the depreciation schedule is strictly ascending by id

use crate::chart::{project_chart_series, ChartAlignment, ChartPoint};
use crate::error::{EngineError, Result};
use crate::model::{
    BalanceSheetRow, CashFlowRow, DepreciationAsset, IncomeStatementRow, LoanYearRecord,
    StoreCountRow, WaccRow, YearIndexed,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ============================================================================
// SOURCE TABLES
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialTables {
    pub balance_sheet: Vec<BalanceSheetRow>,
    pub income_statement: Vec<IncomeStatementRow>,
    pub cash_flow: Vec<CashFlowRow>,
    pub depreciation: Vec<DepreciationAsset>,
    pub loans: Vec<LoanYearRecord>,
    pub wacc: Vec<WaccRow>,
    pub store_count: Vec<StoreCountRow>,
}

impl FinancialTables {
    /// Check ordering of every table, reporting the first offending key
    pub fn validate(&self) -> Result<()> {
        check_ascending("balance_sheet", self.balance_sheet.iter().map(|r| r.year()))?;
        check_ascending("income_statement", self.income_statement.iter().map(|r| r.year()))?;
        check_ascending("cash_flow", self.cash_flow.iter().map(|r| r.year()))?;
        check_ascending("depreciation", self.depreciation.iter().map(|a| a.id))?;
        check_ascending("loans", self.loans.iter().map(|r| r.year()))?;
        check_ascending("wacc", self.wacc.iter().map(|r| r.year()))?;
        check_ascending("store_count", self.store_count.iter().map(|r| r.year()))?;
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.balance_sheet.len()
            + self.income_statement.len()
            + self.cash_flow.len()
            + self.depreciation.len()
            + self.loans.len()
            + self.wacc.len()
            + self.store_count.len()
    }
}

fn check_ascending(table: &'static str, keys: impl Iterator<Item = i64>) -> Result<()> {
    let mut previous: Option<i64> = None;
    for key in keys {
        if previous.is_some_and(|p| key <= p) {
            return Err(EngineError::UnsortedTable { table, key });
        }
        previous = Some(key);
    }
    Ok(())
}

// ============================================================================
// SNAPSHOT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    #[serde(flatten)]
    pub tables: FinancialTables,

    /// Derived once per snapshot, like the tables it projects
    pub chart_series: Vec<ChartPoint>,

    pub alignment: ChartAlignment,

    /// When the loader produced this snapshot
    pub loaded_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(tables: FinancialTables, alignment: ChartAlignment) -> Result<Self> {
        tables.validate()?;

        let chart_series = project_chart_series(
            &tables.income_statement,
            &tables.cash_flow,
            &tables.wacc,
            &tables.balance_sheet,
            alignment,
        );

        Ok(Snapshot {
            tables,
            chart_series,
            alignment,
            loaded_at: Utc::now(),
        })
    }

    pub fn balance_sheet(&self) -> &[BalanceSheetRow] {
        &self.tables.balance_sheet
    }

    pub fn income_statement(&self) -> &[IncomeStatementRow] {
        &self.tables.income_statement
    }

    pub fn cash_flow(&self) -> &[CashFlowRow] {
        &self.tables.cash_flow
    }

    pub fn depreciation(&self) -> &[DepreciationAsset] {
        &self.tables.depreciation
    }

    pub fn loans(&self) -> &[LoanYearRecord] {
        &self.tables.loans
    }

    pub fn wacc(&self) -> &[WaccRow] {
        &self.tables.wacc
    }

    pub fn store_count(&self) -> &[StoreCountRow] {
        &self.tables.store_count
    }

    /// SHA-256 over the source tables (hex)
    ///
    /// Equal table contents give equal fingerprints regardless of load time.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_vec(&self.tables).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        format!("{:x}", hasher.finalize())
    }
}

// ============================================================================
// TESTS
// ============================================================================
