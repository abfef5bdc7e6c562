//! Logging helpers
//!
//! Subscriber setup plus the banner lines printed around a run.

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{programme_codes, Decision, DecisionFilter, DecisionRecord};
use crate::orchestrator::BatchSummary;

/// Installs the global subscriber. `RUST_LOG` wins over `verbose`.
pub fn init(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)
            .with_context(|| format!("invalid log filter '{}'", default_level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("cannot install log subscriber: {}", e))
}

pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 Decision submission starting");
    info!("🌐 Portal: {}", config.portal_url);
    match config.browser_debug_port {
        Some(port) => info!("🔌 Attaching to browser on port {}", port),
        None => info!(
            "🧭 Headless: {} | reuse session: {}",
            config.headless, config.use_existing_session
        ),
    }
    if config.dry_run {
        info!("🐛 DRY RUN: only the first eligible record, reject form left unsubmitted");
    }
    info!("{}", "=".repeat(60));
}

pub fn log_records_loaded(records: &[DecisionRecord], filter: DecisionFilter) {
    let accepts = records
        .iter()
        .filter(|r| r.decision_kind() == Decision::Accept)
        .count();
    let rejects = records
        .iter()
        .filter(|r| r.decision_kind() == Decision::Reject)
        .count();

    info!("✓ Loaded {} records", records.len());
    info!(
        "📋 Accepts: {}{} | Rejects: {}{}",
        accepts,
        if filter.accepts { "" } else { " (not processed)" },
        rejects,
        if filter.rejects { "" } else { " (not processed)" }
    );

    let unknown = unknown_programmes(records);
    if !unknown.is_empty() {
        warn!(
            "⚠️ Programme codes not in the table, searched as written: {}",
            unknown.join(", ")
        );
    }
}

/// Non-empty programme codes that are neither a short nor a long table code
pub fn unknown_programmes(records: &[DecisionRecord]) -> Vec<String> {
    let mut unknown: Vec<String> = records
        .iter()
        .map(|r| r.programme_code.trim())
        .filter(|code| {
            !code.is_empty()
                && !programme_codes().any(|(short, long)| {
                    short.eq_ignore_ascii_case(code) || long.eq_ignore_ascii_case(code)
                })
        })
        .map(str::to_string)
        .collect();
    unknown.sort();
    unknown.dedup();
    unknown
}

pub fn print_final_stats(summary: &BatchSummary, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 Run finished");
    info!(
        "Finished at: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ Success: {}/{}", summary.success(), summary.records.len());
    info!("❌ Failed: {}", summary.failed());
    info!("⏭️ Skipped: {}", summary.skipped());
    if summary.pending() > 0 {
        info!("⏸️ Not processed: {}", summary.pending());
    }
    if summary.cancelled {
        info!("🛑 Cancelled by user");
    }
    info!("{}", "=".repeat(60));
    info!("\nLog saved to: {}", log_file_path);
}

/// Truncates long text for log lines
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_text("héllo wörld", 5), "héllo...");
        assert_eq!(truncate_text("short", 10), "short");
    }

    #[test]
    fn unknown_programmes_ignores_short_and_long_codes() {
        let records = vec![
            DecisionRecord::new("1", "Reject", "", "cs"),
            DecisionRecord::new("2", "Reject", "", "TMSCOMSING01"),
            DecisionRecord::new("3", "Reject", "", ""),
            DecisionRecord::new("4", "Reject", "", " XYZ01 "),
            DecisionRecord::new("5", "Accept", "", "XYZ01"),
        ];
        assert_eq!(unknown_programmes(&records), vec!["XYZ01".to_string()]);
    }
}
