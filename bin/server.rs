// Financial Dashboard - Web Server

use anyhow::Result;
use clap::Parser;
use fin_dashboard::{logging, server, Settings};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fin-server", version, about = "JSON API over the financial dashboard")]
struct Args {
    /// Settings file (defaults to ./dashboard.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen address from settings
    #[arg(long)]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(addr) = args.addr {
        settings.server_addr = addr;
        settings.validate()?;
    }

    logging::init(&settings.log_level)?;

    server::serve(&settings).await
}
