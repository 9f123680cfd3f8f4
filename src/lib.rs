// Financial Dashboard - Core Library
// Exposes all modules for use in CLI, TUI, API server, and tests

pub mod model;     // Source tables + backend column mapping
pub mod error;     // Engine errors
pub mod policy;    // Zero-fill policy
pub mod analysis;  // Vertical / horizontal analysis
pub mod growth;    // Income statement YoY
pub mod ratios;    // ROS, ROA, ROE, ROI, gross margin
pub mod chart;     // Chart-series projection
pub mod snapshot;  // Immutable snapshot of the seven tables
pub mod dashboard; // Key metrics + all derived views
pub mod db;        // SQLite loader + audit trail
pub mod import;    // CSV seeding
pub mod settings;  // Layered configuration
pub mod logging;   // tracing-subscriber setup

#[cfg(feature = "server")]
pub mod server;    // HTTP API

// Re-export commonly used types
pub use model::{
    BalanceSheetRow, IncomeStatementRow, CashFlowRow, DepreciationAsset,
    LoanYearRecord, WaccRow, StoreCountRow, EditableInputs, Year,
    find_year, parse_input,
};
pub use error::EngineError;
pub use policy::DIVISION_BY_ZERO_FILL;
pub use analysis::{
    vertical_analysis, horizontal_analysis, VerticalAnalysisRow, HorizontalAnalysisRow, BASE_YEAR,
};
pub use growth::{income_statement_yoy, IncomeStatementYoYRow};
pub use ratios::{financial_ratios, RatioRow};
pub use chart::{project_chart_series, ChartAlignment, ChartPoint};
pub use snapshot::{FinancialTables, Snapshot};
pub use dashboard::{key_metrics, DerivedViews, KeyMetrics, View};
pub use db::{
    Event, Table,
    setup_database, load_snapshot, update_inputs, read_inputs, input_history,
    insert_rows, load_table, count_rows, insert_event, get_events_for_entity,
};
pub use import::{import_directory, load_csv, ImportReport, TableImport};
pub use settings::{ConfigError, Settings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
