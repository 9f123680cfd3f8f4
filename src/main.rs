// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use std::path::PathBuf;

// Use library instead of local modules
use fin_dashboard::{
    import_directory, input_history, load_snapshot, logging, read_inputs,
    setup_database, update_inputs, DerivedViews, Settings, View,
};

#[derive(Parser, Debug)]
#[command(name = "fin-dashboard", version, about = "Financial statements dashboard")]
struct Cli {
    /// Settings file (defaults to ./dashboard.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the database path from settings
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed the database from a directory of CSV files
    Import {
        dir: PathBuf,
        #[arg(long, default_value = "cli")]
        actor: String,
    },
    /// Print a derived view as JSON (all views when omitted)
    Report { view: Option<View> },
    /// Overwrite the year-0 inputs; omitted fields keep their current value
    SetInputs {
        #[arg(long)]
        intangible_assets: Option<String>,
        #[arg(long)]
        shareholder_capital: Option<String>,
        #[arg(long)]
        paid_in_capital: Option<String>,
        #[arg(long, default_value = "cli")]
        actor: String,
    },
    /// Show the audit trail of input edits
    History,
    /// Interactive terminal dashboard (default)
    Ui,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        settings.database_path = database;
    }

    match cli.command.unwrap_or(Command::Ui) {
        Command::Ui => run_ui_mode(&settings),
        Command::Import { dir, actor } => run_import(&open_cli(&settings)?, &dir, &actor),
        Command::Report { view } => run_report(&open_cli(&settings)?, &settings, view),
        Command::SetInputs {
            intangible_assets,
            shareholder_capital,
            paid_in_capital,
            actor,
        } => run_set_inputs(
            &open_cli(&settings)?,
            &settings,
            [
                ("intangible_assets", intangible_assets),
                ("shareholder_capital", shareholder_capital),
                ("paid_in_capital", paid_in_capital),
            ],
            &actor,
        ),
        Command::History => run_history(&open_cli(&settings)?),
    }
}

/// Non-interactive commands log to stderr
fn open_cli(settings: &Settings) -> Result<Connection> {
    logging::init(&settings.log_level)?;
    open_database(settings)
}

fn open_database(settings: &Settings) -> Result<Connection> {
    let conn = Connection::open(&settings.database_path).with_context(|| {
        format!("Failed to open database: {}", settings.database_path.display())
    })?;
    setup_database(&conn)?;
    Ok(conn)
}

fn run_import(conn: &Connection, dir: &std::path::Path, actor: &str) -> Result<()> {
    println!("🗄️  Data Import - CSV → SQLite + WAL");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if !dir.is_dir() {
        bail!("Import directory not found: {}", dir.display());
    }

    let report = import_directory(conn, dir, actor)?;

    for table in &report.tables {
        if table.found {
            println!(
                "✓ {:<24} {:>4} read, {:>4} inserted, {:>4} duplicates",
                table.file, table.read, table.inserted, table.duplicates
            );
        } else {
            println!("- {:<24} not found, skipped", table.file);
        }
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "✅ {} rows inserted, {} duplicates skipped",
        report.inserted(),
        report.duplicates()
    );

    Ok(())
}

fn run_report(conn: &Connection, settings: &Settings, view: Option<View>) -> Result<()> {
    let snapshot = load_snapshot(conn, settings.chart_alignment)?;

    let value = match view {
        Some(view) => view.render(&snapshot)?,
        None => serde_json::to_value(DerivedViews::compute(&snapshot)?)?,
    };

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn run_set_inputs(
    conn: &Connection,
    settings: &Settings,
    fields: [(&str, Option<String>); 3],
    actor: &str,
) -> Result<()> {
    let Some(mut inputs) = read_inputs(conn)? else {
        bail!("No year 0 balance sheet row; run `fin-dashboard import <dir>` first");
    };

    for (name, raw) in fields {
        if let Some(raw) = raw {
            if raw.trim().parse::<f64>().is_err() {
                eprintln!("⚠️  '{}' is not a number; {} stored as 0", raw, name);
            }
            inputs.set_field(name, &raw);
        }
    }

    let snapshot = update_inputs(conn, &inputs, actor, settings.chart_alignment)?;

    println!("✓ Inputs updated");
    println!("  Intangible assets:    {:.2}", inputs.intangible_assets);
    println!("  Shareholder capital:  {:.2}", inputs.shareholder_capital);
    println!("  Paid-in capital:      {:.2}", inputs.paid_in_capital);
    println!("  Snapshot:             {}", snapshot.fingerprint());

    Ok(())
}

fn run_history(conn: &Connection) -> Result<()> {
    let events = input_history(conn)?;

    if events.is_empty() {
        println!("No input edits recorded");
        return Ok(());
    }

    for event in events {
        println!(
            "{}  {:<12} {}  {}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.actor,
            event.event_type,
            event.data["after"]
        );
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(settings: &Settings) -> Result<()> {
    let log_path = settings.database_path.with_extension("log");
    logging::init_to_file(&settings.log_level, &log_path)?;

    let conn = open_database(settings)?;

    let mut app = ui::App::new(conn, settings.chart_alignment, settings.default_inputs);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_settings: &Settings) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin fin-server --features server");
    std::process::exit(1);
}
