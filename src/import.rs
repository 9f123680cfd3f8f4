// 📥 CSV Import - seed the store from one CSV file per table
//
// Each file carries the backend column names as its header row. Files are
// optional: a missing file is skipped with a warning. Keys that already
// exist are skipped and counted, so running an import twice is harmless.

use crate::db::{insert_event, insert_rows, Event, Table};
use crate::model::{
    BalanceSheetRow, CashFlowRow, DepreciationAsset, IncomeStatementRow, LoanYearRecord,
    StoreCountRow, WaccRow,
};
use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Outcome for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableImport {
    pub table: &'static str,
    pub file: &'static str,
    pub read: usize,
    pub inserted: usize,
    pub duplicates: usize,
    /// False when the file was not present
    pub found: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub tables: Vec<TableImport>,
}

impl ImportReport {
    pub fn inserted(&self) -> usize {
        self.tables.iter().map(|t| t.inserted).sum()
    }

    pub fn duplicates(&self) -> usize {
        self.tables.iter().map(|t| t.duplicates).sum()
    }
}

/// Read every row of a CSV file into a table type
pub fn load_csv<T: DeserializeOwned>(csv_path: &Path) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file: {}", csv_path.display()))?;

    let mut rows = Vec::new();
    for (line, result) in rdr.deserialize::<T>().enumerate() {
        let row = result.with_context(|| {
            format!("Failed to parse {} record {}", csv_path.display(), line + 1)
        })?;
        rows.push(row);
    }

    Ok(rows)
}

fn import_file<T: Table + DeserializeOwned>(
    conn: &Connection,
    dir: &Path,
    file: &'static str,
    actor: &str,
) -> Result<TableImport> {
    let path = dir.join(file);

    if !path.exists() {
        warn!(file, table = T::NAME, "CSV file not found, skipping");
        return Ok(TableImport {
            table: T::NAME,
            file,
            read: 0,
            inserted: 0,
            duplicates: 0,
            found: false,
        });
    }

    let rows: Vec<T> = load_csv(&path)?;
    let (inserted, duplicates) = insert_rows(conn, &rows)?;

    let event = Event::new(
        "table_imported",
        "table",
        T::NAME,
        serde_json::json!({
            "file": path.display().to_string(),
            "read": rows.len(),
            "inserted": inserted,
            "duplicates": duplicates,
        }),
        actor,
    );
    insert_event(conn, &event)?;

    info!(file, table = T::NAME, read = rows.len(), inserted, duplicates, "CSV imported");

    Ok(TableImport {
        table: T::NAME,
        file,
        read: rows.len(),
        inserted,
        duplicates,
        found: true,
    })
}

/// Import all seven tables from `dir`
///
/// Runs in one transaction: a malformed file leaves the store untouched.
pub fn import_directory(conn: &Connection, dir: &Path, actor: &str) -> Result<ImportReport> {
    let tx = conn.unchecked_transaction()?;

    let tables = vec![
        import_file::<BalanceSheetRow>(&tx, dir, "balance_sheet.csv", actor)?,
        import_file::<IncomeStatementRow>(&tx, dir, "income_statement.csv", actor)?,
        import_file::<CashFlowRow>(&tx, dir, "cash_flow.csv", actor)?,
        import_file::<DepreciationAsset>(&tx, dir, "depreciation.csv", actor)?,
        import_file::<LoanYearRecord>(&tx, dir, "loans.csv", actor)?,
        import_file::<WaccRow>(&tx, dir, "wacc.csv", actor)?,
        import_file::<StoreCountRow>(&tx, dir, "store_count.csv", actor)?,
    ];

    tx.commit()?;

    Ok(ImportReport { tables })
}
