use crate::analysis::BASE_YEAR;
use crate::chart::ChartAlignment;
use crate::model::{
    BalanceSheetRow, CashFlowRow, DepreciationAsset, EditableInputs, IncomeStatementRow,
    LoanYearRecord, StoreCountRow, WaccRow,
};
use crate::snapshot::{FinancialTables, Snapshot};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ============================================================================
// TABLE MAPPING (internal schema <-> backend columns)
// ============================================================================

/// A source table stored under its backend name and column names
///
/// `COLUMNS[0]` is the key the table is ordered by. `from_row` reads columns
/// in `COLUMNS` order and `values` writes them in the same order.
pub trait Table: Sized {
    const NAME: &'static str;
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
    fn values(&self) -> Vec<Value>;
}

/// NULL numeric columns read as 0
fn real(row: &Row<'_>, idx: usize) -> rusqlite::Result<f64> {
    Ok(row.get::<_, Option<f64>>(idx)?.unwrap_or(0.0))
}

fn integer(row: &Row<'_>, idx: usize) -> rusqlite::Result<i64> {
    Ok(row.get::<_, Option<i64>>(idx)?.unwrap_or(0))
}

impl Table for BalanceSheetRow {
    const NAME: &'static str = "bangcandoiketoan";
    const COLUMNS: &'static [&'static str] = &[
        "nam", "ts_nganhan", "tienmat", "hangtonkho", "khoanphaithu_cdkt", "ts_daihan",
        "ts_vohinh", "ts_huuhinh_giatriconlai", "tongtaisan", "voncsh", "codonggopvon",
        "vongopcsh", "loinhuansauthue_cdkt", "nophaitra", "khoanvayphaitra", "tongnguonvon",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(BalanceSheetRow {
            year: row.get(0)?,
            current_assets: real(row, 1)?,
            cash: real(row, 2)?,
            inventory: real(row, 3)?,
            receivables: real(row, 4)?,
            long_term_assets: real(row, 5)?,
            intangible_assets: real(row, 6)?,
            tangible_assets_net: real(row, 7)?,
            total_assets: real(row, 8)?,
            equity: real(row, 9)?,
            shareholder_capital: real(row, 10)?,
            paid_in_capital: real(row, 11)?,
            retained_earnings: real(row, 12)?,
            liabilities: real(row, 13)?,
            loans_payable: real(row, 14)?,
            total_liabilities_and_equity: real(row, 15)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.year),
            Value::Real(self.current_assets),
            Value::Real(self.cash),
            Value::Real(self.inventory),
            Value::Real(self.receivables),
            Value::Real(self.long_term_assets),
            Value::Real(self.intangible_assets),
            Value::Real(self.tangible_assets_net),
            Value::Real(self.total_assets),
            Value::Real(self.equity),
            Value::Real(self.shareholder_capital),
            Value::Real(self.paid_in_capital),
            Value::Real(self.retained_earnings),
            Value::Real(self.liabilities),
            Value::Real(self.loans_payable),
            Value::Real(self.total_liabilities_and_equity),
        ]
    }
}

impl Table for IncomeStatementRow {
    const NAME: &'static str = "baocaokqhdkd";
    const COLUMNS: &'static [&'static str] = &[
        "nam", "soluong", "giaban", "doanhthu", "nvl", "chiphikhauhao", "chiphiluong",
        "tongchiphi_giavon", "loinhuangop_ebit", "chiphilaivay", "loinhuantruocthue_ebt",
        "thuetndn", "loinhuansauthue",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(IncomeStatementRow {
            year: row.get(0)?,
            units: real(row, 1)?,
            unit_price: real(row, 2)?,
            revenue: real(row, 3)?,
            materials: real(row, 4)?,
            depreciation_expense: real(row, 5)?,
            payroll: real(row, 6)?,
            total_cost: real(row, 7)?,
            ebit: real(row, 8)?,
            interest_expense: real(row, 9)?,
            ebt: real(row, 10)?,
            income_tax: real(row, 11)?,
            net_income: real(row, 12)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.year),
            Value::Real(self.units),
            Value::Real(self.unit_price),
            Value::Real(self.revenue),
            Value::Real(self.materials),
            Value::Real(self.depreciation_expense),
            Value::Real(self.payroll),
            Value::Real(self.total_cost),
            Value::Real(self.ebit),
            Value::Real(self.interest_expense),
            Value::Real(self.ebt),
            Value::Real(self.income_tax),
            Value::Real(self.net_income),
        ]
    }
}

impl Table for CashFlowRow {
    const NAME: &'static str = "baocaoluuchuyentiente";
    const COLUMNS: &'static [&'static str] = &[
        "nam", "loinhuansauthue", "khauhao", "khoanphaithu", "nvldutru", "khoanphaitra_lc",
        "net_cfo", "cfi_capex", "net_cfi", "vay", "gopvon", "net_cff",
        "tienmatthaydoitrongky", "tienmatdauky", "tienmatcuoiky", "fcf",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(CashFlowRow {
            year: row.get(0)?,
            net_income: real(row, 1)?,
            depreciation: real(row, 2)?,
            receivables_change: real(row, 3)?,
            materials_reserve: real(row, 4)?,
            payables_change: real(row, 5)?,
            net_cfo: real(row, 6)?,
            capex: real(row, 7)?,
            net_cfi: real(row, 8)?,
            borrowing: real(row, 9)?,
            equity_contribution: real(row, 10)?,
            net_cff: real(row, 11)?,
            net_cash_change: real(row, 12)?,
            opening_cash: real(row, 13)?,
            closing_cash: real(row, 14)?,
            free_cash_flow: real(row, 15)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.year),
            Value::Real(self.net_income),
            Value::Real(self.depreciation),
            Value::Real(self.receivables_change),
            Value::Real(self.materials_reserve),
            Value::Real(self.payables_change),
            Value::Real(self.net_cfo),
            Value::Real(self.capex),
            Value::Real(self.net_cfi),
            Value::Real(self.borrowing),
            Value::Real(self.equity_contribution),
            Value::Real(self.net_cff),
            Value::Real(self.net_cash_change),
            Value::Real(self.opening_cash),
            Value::Real(self.closing_cash),
            Value::Real(self.free_cash_flow),
        ]
    }
}

impl Table for DepreciationAsset {
    const NAME: &'static str = "bangkhauhao";
    const COLUMNS: &'static [&'static str] = &["id", "tenmay", "nguyengia", "sonamsudung", "nambatdau"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(DepreciationAsset {
            id: row.get(0)?,
            asset_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            cost: real(row, 2)?,
            useful_life_years: integer(row, 3)?,
            start_year: integer(row, 4)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.id),
            Value::Text(self.asset_name.clone()),
            Value::Real(self.cost),
            Value::Integer(self.useful_life_years),
            Value::Integer(self.start_year),
        ]
    }
}

impl Table for LoanYearRecord {
    const NAME: &'static str = "bangvay";
    const COLUMNS: &'static [&'static str] =
        &["nam", "tienmatcuoiky", "nhucauchitieu", "khoanvay", "laisuat", "laivay", "du"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(LoanYearRecord {
            year: row.get(0)?,
            ending_cash: real(row, 1)?,
            funding_need: real(row, 2)?,
            loan_amount: real(row, 3)?,
            interest_rate: real(row, 4)?,
            interest_expense: real(row, 5)?,
            balance: real(row, 6)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.year),
            Value::Real(self.ending_cash),
            Value::Real(self.funding_need),
            Value::Real(self.loan_amount),
            Value::Real(self.interest_rate),
            Value::Real(self.interest_expense),
            Value::Real(self.balance),
        ]
    }
}

impl Table for WaccRow {
    const NAME: &'static str = "wacc";
    const COLUMNS: &'static [&'static str] = &["nam", "re", "rd", "tc", "e", "d", "v", "wacc_value"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(WaccRow {
            year: row.get(0)?,
            cost_of_equity: real(row, 1)?,
            cost_of_debt: real(row, 2)?,
            tax_rate: real(row, 3)?,
            equity_value: real(row, 4)?,
            debt_value: real(row, 5)?,
            total_value: real(row, 6)?,
            wacc: real(row, 7)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.year),
            Value::Real(self.cost_of_equity),
            Value::Real(self.cost_of_debt),
            Value::Real(self.tax_rate),
            Value::Real(self.equity_value),
            Value::Real(self.debt_value),
            Value::Real(self.total_value),
            Value::Real(self.wacc),
        ]
    }
}

impl Table for StoreCountRow {
    const NAME: &'static str = "socuahang";
    const COLUMNS: &'static [&'static str] = &["nam", "soluong"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(StoreCountRow {
            year: row.get(0)?,
            stores: integer(row, 1)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![Value::Integer(self.year), Value::Integer(self.stores)]
    }
}

// ============================================================================
// AUDIT TRAIL
// ============================================================================

/// Event for audit trail: every input edit is recorded
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

/// Entity the editable inputs are recorded under
pub const INPUTS_ENTITY_TYPE: &str = "inputs";
pub const INPUTS_ENTITY_ID: &str = "year_0";

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bangcandoiketoan (
            nam INTEGER PRIMARY KEY,
            ts_nganhan REAL,
            tienmat REAL,
            hangtonkho REAL,
            khoanphaithu_cdkt REAL,
            ts_daihan REAL,
            ts_vohinh REAL,
            ts_huuhinh_giatriconlai REAL,
            tongtaisan REAL,
            voncsh REAL,
            codonggopvon REAL,
            vongopcsh REAL,
            loinhuansauthue_cdkt REAL,
            nophaitra REAL,
            khoanvayphaitra REAL,
            tongnguonvon REAL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS baocaokqhdkd (
            nam INTEGER PRIMARY KEY,
            soluong REAL,
            giaban REAL,
            doanhthu REAL,
            nvl REAL,
            chiphikhauhao REAL,
            chiphiluong REAL,
            tongchiphi_giavon REAL,
            loinhuangop_ebit REAL,
            chiphilaivay REAL,
            loinhuantruocthue_ebt REAL,
            thuetndn REAL,
            loinhuansauthue REAL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS baocaoluuchuyentiente (
            nam INTEGER PRIMARY KEY,
            loinhuansauthue REAL,
            khauhao REAL,
            khoanphaithu REAL,
            nvldutru REAL,
            khoanphaitra_lc REAL,
            net_cfo REAL,
            cfi_capex REAL,
            net_cfi REAL,
            vay REAL,
            gopvon REAL,
            net_cff REAL,
            tienmatthaydoitrongky REAL,
            tienmatdauky REAL,
            tienmatcuoiky REAL,
            fcf REAL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bangkhauhao (
            id INTEGER PRIMARY KEY,
            tenmay TEXT NOT NULL,
            nguyengia REAL,
            sonamsudung INTEGER,
            nambatdau INTEGER
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bangvay (
            nam INTEGER PRIMARY KEY,
            tienmatcuoiky REAL,
            nhucauchitieu REAL,
            khoanvay REAL,
            laisuat REAL,
            laivay REAL,
            du REAL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS wacc (
            nam INTEGER PRIMARY KEY,
            re REAL,
            rd REAL,
            tc REAL,
            e REAL,
            d REAL,
            v REAL,
            wacc_value REAL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS socuahang (
            nam INTEGER PRIMARY KEY,
            soluong INTEGER
        )",
        [],
    )?;

    // ==========================================================================
    // Events Table (audit trail)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// WRITES
// ============================================================================

/// Insert rows, skipping keys that already exist
///
/// Returns (inserted, duplicates). Importing the same rows twice inserts
/// nothing the second time.
pub fn insert_rows<T: Table>(conn: &Connection, rows: &[T]) -> Result<(usize, usize)> {
    let placeholders: Vec<String> = (1..=T::COLUMNS.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        T::NAME,
        T::COLUMNS.join(", "),
        placeholders.join(", ")
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut inserted = 0;
    let mut duplicates = 0;

    for row in rows {
        match stmt.execute(params_from_iter(row.values())) {
            Ok(_) => inserted += 1,
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                duplicates += 1;
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to insert into {}", T::NAME)),
        }
    }

    debug!(table = T::NAME, inserted, duplicates, "rows written");
    Ok((inserted, duplicates))
}

/// Insert event into audit trail
pub fn insert_event(conn: &Connection, event: &Event) -> Result<()> {
    let data_json = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

/// Overwrite the three editable fields of the base-year row, then re-read
///
/// The update, the re-read and the audit event share one transaction. The
/// returned snapshot is a fresh read, never a patched copy of an older one.
pub fn update_inputs(
    conn: &Connection,
    inputs: &EditableInputs,
    actor: &str,
    alignment: ChartAlignment,
) -> Result<Snapshot> {
    let tx = conn.unchecked_transaction()?;

    let before = match read_inputs(&tx)? {
        Some(before) => before,
        None => bail!("Balance sheet has no year {} row to update", BASE_YEAR),
    };

    tx.execute(
        "UPDATE bangcandoiketoan
         SET ts_vohinh = ?1, codonggopvon = ?2, vongopcsh = ?3
         WHERE nam = ?4",
        params![
            inputs.intangible_assets,
            inputs.shareholder_capital,
            inputs.paid_in_capital,
            BASE_YEAR,
        ],
    )?;

    let snapshot = Snapshot::new(read_tables(&tx)?, alignment)
        .context("Snapshot failed validation")?;

    let event = Event::new(
        "inputs_updated",
        INPUTS_ENTITY_TYPE,
        INPUTS_ENTITY_ID,
        serde_json::json!({
            "before": before,
            "after": inputs,
            "fingerprint": snapshot.fingerprint(),
        }),
        actor,
    );
    insert_event(&tx, &event)?;
    tx.commit()?;

    info!(
        actor,
        intangible_assets = inputs.intangible_assets,
        shareholder_capital = inputs.shareholder_capital,
        paid_in_capital = inputs.paid_in_capital,
        "base year inputs updated"
    );

    Ok(snapshot)
}

// ============================================================================
// READS
// ============================================================================

/// All rows of a table, ascending by its key
pub fn load_table<T: Table>(conn: &Connection) -> Result<Vec<T>> {
    let sql = format!(
        "SELECT {} FROM {} ORDER BY {} ASC",
        T::COLUMNS.join(", "),
        T::NAME,
        T::COLUMNS[0]
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| T::from_row(row))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn read_tables(conn: &Connection) -> Result<FinancialTables> {
    Ok(FinancialTables {
        balance_sheet: load_table(conn).context("Failed to load balance sheet")?,
        income_statement: load_table(conn).context("Failed to load income statement")?,
        cash_flow: load_table(conn).context("Failed to load cash flow statement")?,
        depreciation: load_table(conn).context("Failed to load depreciation schedule")?,
        loans: load_table(conn).context("Failed to load loan schedule")?,
        wacc: load_table(conn).context("Failed to load WACC")?,
        store_count: load_table(conn).context("Failed to load store count")?,
    })
}

/// Read all seven tables as one snapshot
///
/// The reads share one transaction so they observe one state of the store.
/// If any table fails, no snapshot is produced.
pub fn load_snapshot(conn: &Connection, alignment: ChartAlignment) -> Result<Snapshot> {
    let tx = conn.unchecked_transaction()?;
    let tables = read_tables(&tx)?;
    tx.commit()?;

    let rows = tables.row_count();
    let snapshot = Snapshot::new(tables, alignment).context("Snapshot failed validation")?;

    info!(rows, alignment = alignment.name(), "snapshot loaded");
    Ok(snapshot)
}

/// The editable inputs as currently stored on the base-year row
pub fn read_inputs(conn: &Connection) -> Result<Option<EditableInputs>> {
    let inputs = conn
        .query_row(
            "SELECT ts_vohinh, codonggopvon, vongopcsh FROM bangcandoiketoan WHERE nam = ?1",
            [BASE_YEAR],
            |row| {
                Ok(EditableInputs {
                    intangible_assets: real(row, 0)?,
                    shareholder_capital: real(row, 1)?,
                    paid_in_capital: real(row, 2)?,
                })
            },
        )
        .optional()?;

    Ok(inputs)
}

pub fn count_rows<T: Table>(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", T::NAME), [], |row| {
        row.get(0)
    })?;

    Ok(count)
}

/// Get events for a specific entity, newest first
pub fn get_events_for_entity(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY timestamp DESC, id DESC",
    )?;

    let events = stmt
        .query_map(params![entity_type, entity_id], |row| {
            let timestamp_str: String = row.get(1)?;
            let data_json: String = row.get(5)?;

            Ok(Event {
                event_id: row.get(0)?,
                timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?
                    .with_timezone(&Utc),
                event_type: row.get(2)?,
                entity_type: row.get(3)?,
                entity_id: row.get(4)?,
                data: serde_json::from_str(&data_json)
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?,
                actor: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}

/// History of base-year input edits, newest first
pub fn input_history(conn: &Connection) -> Result<Vec<Event>> {
    get_events_for_entity(conn, INPUTS_ENTITY_TYPE, INPUTS_ENTITY_ID)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let balance_sheet = vec![
            BalanceSheetRow {
                year: 0,
                cash: 500.0,
                intangible_assets: 1000.0,
                shareholder_capital: 500.0,
                paid_in_capital: 1000.0,
                total_assets: 1000.0,
                ..Default::default()
            },
            BalanceSheetRow { year: 1, cash: 600.0, total_assets: 1100.0, ..Default::default() },
        ];
        insert_rows(&conn, &balance_sheet).unwrap();

        let income_statement = vec![IncomeStatementRow {
            year: 1,
            revenue: 1000.0,
            net_income: 100.0,
            ..Default::default()
        }];
        insert_rows(&conn, &income_statement).unwrap();

        conn
    }

    #[test]
    fn test_insert_is_idempotent() {
        let conn = seeded();

        let rows = vec![
            StoreCountRow { year: 1, stores: 3 },
            StoreCountRow { year: 2, stores: 5 },
        ];

        let first = insert_rows(&conn, &rows).unwrap();
        let second = insert_rows(&conn, &rows).unwrap();

        assert_eq!(first, (2, 0));
        assert_eq!(second, (0, 2));
        assert_eq!(count_rows::<StoreCountRow>(&conn).unwrap(), 2);
    }

    #[test]
    fn test_load_table_sorts_by_key() {
        let conn = seeded();
        insert_rows(&conn, &[WaccRow { year: 3, wacc: 0.12, ..Default::default() }]).unwrap();
        insert_rows(&conn, &[WaccRow { year: 1, wacc: 0.10, ..Default::default() }]).unwrap();

        let years: Vec<i64> = load_table::<WaccRow>(&conn).unwrap().iter().map(|r| r.year).collect();

        assert_eq!(years, vec![1, 3]);
    }

    #[test]
    fn test_null_columns_read_as_zero() {
        let conn = seeded();
        conn.execute("INSERT INTO baocaoluuchuyentiente (nam) VALUES (1)", []).unwrap();

        let rows = load_table::<CashFlowRow>(&conn).unwrap();

        assert_eq!(rows[0].free_cash_flow, 0.0);
        assert_eq!(rows[0].net_cfo, 0.0);
    }

    #[test]
    fn test_depreciation_round_trip() {
        let conn = seeded();
        let asset = DepreciationAsset {
            id: 7,
            asset_name: "Espresso machine".to_string(),
            cost: 12000.0,
            useful_life_years: 5,
            start_year: 1,
        };

        insert_rows(&conn, &[asset.clone()]).unwrap();

        assert_eq!(load_table::<DepreciationAsset>(&conn).unwrap(), vec![asset]);
    }

    #[test]
    fn test_load_snapshot() {
        let conn = seeded();

        let snapshot = load_snapshot(&conn, ChartAlignment::ByIndex).unwrap();

        assert_eq!(snapshot.balance_sheet().len(), 2);
        assert_eq!(snapshot.income_statement().len(), 1);
        assert_eq!(snapshot.chart_series[0].total_assets, 1100.0);
        assert!(snapshot.loans().is_empty());
    }

    #[test]
    fn test_update_inputs_rewrites_base_year_only() {
        let conn = seeded();
        let inputs = EditableInputs {
            intangible_assets: 2500.0,
            shareholder_capital: 750.0,
            paid_in_capital: 1250.0,
        };

        let snapshot = update_inputs(&conn, &inputs, "test_actor", ChartAlignment::ByIndex).unwrap();

        let base = &snapshot.balance_sheet()[0];
        assert_eq!(base.intangible_assets, 2500.0);
        assert_eq!(base.shareholder_capital, 750.0);
        assert_eq!(base.paid_in_capital, 1250.0);
        // Untouched fields keep their value
        assert_eq!(base.cash, 500.0);
        assert_eq!(snapshot.balance_sheet()[1].intangible_assets, 0.0);

        assert_eq!(read_inputs(&conn).unwrap(), Some(inputs));
    }

    #[test]
    fn test_update_inputs_records_event() {
        let conn = seeded();
        let inputs = EditableInputs { intangible_assets: 1.0, shareholder_capital: 2.0, paid_in_capital: 3.0 };

        update_inputs(&conn, &inputs, "alice", ChartAlignment::ByIndex).unwrap();

        let history = input_history(&conn).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].event_type, "inputs_updated");
        assert_eq!(history[0].actor, "alice");
        assert_eq!(history[0].data["before"]["intangible_assets"], 1000.0);
        assert_eq!(history[0].data["after"]["paid_in_capital"], 3.0);
        assert_eq!(history[0].data["fingerprint"].as_str().map(str::len), Some(64));
    }

    #[test]
    fn test_update_inputs_without_base_year_fails() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let result = update_inputs(&conn, &EditableInputs::default(), "bob", ChartAlignment::ByIndex);

        assert!(result.is_err());
        assert!(input_history(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_event_log() {
        let conn = seeded();

        let event = Event::new(
            "test_event",
            "inputs",
            "test_id_123",
            serde_json::json!({"test": "data"}),
            "test_actor",
        );

        insert_event(&conn, &event).unwrap();

        let events = get_events_for_entity(&conn, "inputs", "test_id_123").unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "test_event");
        assert_eq!(events[0].actor, "test_actor");
    }
}
