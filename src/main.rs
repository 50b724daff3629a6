use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use log::error;
use std::path::PathBuf;
use std::time::Duration;

use sane_psh::config::Config;
use sane_psh::engine::Reconciler;
use sane_psh::logger;
use sane_psh::transport::HttpTransport;

#[derive(Parser)]
#[command(name = "sane-psh")]
#[command(about = "Delete every entry in a puush.me upload history", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config.json (default: the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the per-deletion rate-limit delay, in seconds
    #[arg(long)]
    delay: Option<f64>,

    /// Walk the history without issuing any deletion calls
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    if let Err(err) = run() {
        error!("run aborted: {err:#}");
        logger::log_to_log_file(&format!("Run aborted: {err:#}")).ok();
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    logger::init_logger(config.log_to_file)?;

    // No network activity happens before this check.
    let api_key = config.require_api_key()?.to_string();

    let delay = cli
        .delay
        .map(|seconds| Duration::from_secs_f64(seconds.max(0.0)))
        .unwrap_or_else(|| config.rate_limit_delay());

    let transport = HttpTransport::new()?;
    let mut reconciler = Reconciler::new(transport, api_key, delay).dry_run(cli.dry_run);

    println!("{}", "Fetching upload history...".bold());
    reconciler.run()?;

    if cli.dry_run {
        println!(
            "{}",
            format!(
                "Dry run complete: {} entries would have been deleted",
                reconciler.ledger().len()
            )
            .green()
        );
    } else {
        println!(
            "{}",
            format!("History drained: {} deletions issued", reconciler.deletions())
                .green()
                .bold()
        );
    }
    logger::log_to_log_file(&format!(
        "Run complete: {} deletions issued",
        reconciler.deletions()
    ))?;

    Ok(())
}
