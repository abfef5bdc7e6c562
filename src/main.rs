use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use decision_submit::orchestrator::watch_interrupts;
use decision_submit::utils::logging;
use decision_submit::{load_records_from_csv, App, Config, DecisionFilter};

#[derive(Parser, Debug)]
#[command(
    name = "decision_submit",
    about = "Apply accept/reject decisions from a spreadsheet to the student records portal",
    version
)]
struct Cli {
    /// CSV export of the decisions sheet
    #[arg(long)]
    records: PathBuf,
    /// Optional TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Process "Accept" rows
    #[arg(long)]
    accepts: bool,
    /// Process "Reject" rows (the default when neither flag is given)
    #[arg(long)]
    rejects: bool,
    /// Fill in the first eligible record only and leave the form open
    #[arg(long)]
    dry_run: bool,
    /// Run the browser without a window
    #[arg(long)]
    headless: bool,
}

impl Cli {
    fn filter(&self) -> DecisionFilter {
        if !self.accepts && !self.rejects {
            DecisionFilter::new(false, true)
        } else {
            DecisionFilter::new(self.accepts, self.rejects)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    config.dry_run |= cli.dry_run;
    config.headless |= cli.headless;

    logging::init(config.verbose_logging)?;

    let filter = cli.filter();
    if config.dry_run && filter.accepts {
        warn!("⚠️ Dry run does not hold back offers: an eligible Accept row will be submitted");
    }

    let records = load_records_from_csv(&cli.records).await?;
    if records.is_empty() {
        warn!("⚠️ No records found in {}", cli.records.display());
        return Ok(());
    }

    let dry_run = config.dry_run;
    let mut app = App::initialize(config).await?;

    let cancel = app.cancel_handle();
    tokio::spawn(async move {
        if watch_interrupts(cancel, tokio::signal::ctrl_c).await {
            std::process::exit(130);
        }
    });

    let result = app.run(records, filter).await;

    if dry_run && result.is_ok() {
        info!("🐛 Browser left open for inspection. Press Ctrl+C to close it.");
        while !app.cancel_handle().is_cancelled() {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        }
    }

    app.shutdown().await;

    let summary = result?;
    println!(
        "Complete: {} successful, {} failed, {} skipped, {} not processed",
        summary.success(),
        summary.failed(),
        summary.skipped(),
        summary.pending()
    );
    Ok(())
}
