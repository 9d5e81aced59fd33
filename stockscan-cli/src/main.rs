//! StockScan CLI — scan a watch-list and print targets.
//!
//! Commands:
//! - `scan` — fetch, evaluate and rank the watch-list
//! - `watchlist` — print the effective watch-list
//! - `config` — print the default configuration as TOML
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); tables go to stdout.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use stockscan_core::data::{CircuitBreaker, SyntheticProvider, YahooProvider};
use stockscan_core::domain::TrendLabel;
use stockscan_runner::scan::{LogProgress, ScanReport, Scanner};
use stockscan_runner::table::{ResultTable, SortKey, SortOrder};
use stockscan_runner::{brief_or_diagnostic, write_csv, write_json, FileBrief, ScanConfig};
use tracing_subscriber::EnvFilter;

const DISCLAIMER: &str =
    "Targets are mechanical projections from price history and trailing earnings. Not investment advice.";

#[derive(Parser)]
#[command(
    name = "stockscan",
    about = "StockScan CLI — breakout screening with short- and long-term targets"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the watch-list and print accepted symbols with targets.
    Scan(ScanArgs),
    /// Print the watch-list that a scan would use.
    Watchlist {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the default configuration as TOML.
    Config,
}

#[derive(Args, Debug, Default)]
struct ScanArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum latest-session volume in lots (1 lot = 1000 shares).
    #[arg(long)]
    min_lots: Option<u64>,

    /// Symbols to scan instead of the configured watch-list.
    #[arg(long, num_args = 1..)]
    symbols: Vec<String>,

    /// Sort key: symbol, name, price, short, long, volume, trend, upside.
    /// Defaults to expected upside, highest first.
    #[arg(long)]
    sort: Option<SortKey>,

    /// Sort ascending.
    #[arg(long, conflicts_with = "desc")]
    asc: bool,

    /// Sort descending (the default).
    #[arg(long)]
    desc: bool,

    /// Only show rows with this trend: breakout, bull_aligned, consolidating.
    #[arg(long)]
    trend: Option<TrendLabel>,

    /// Decimal places for prices.
    #[arg(long)]
    decimals: Option<u32>,

    /// Use deterministic synthetic data instead of Yahoo Finance.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Evaluate symbols in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Write the result table as CSV.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the unrounded results as JSON.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Text file with market headlines, one per line.
    #[arg(long)]
    brief_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => run_scan(args),
        Commands::Watchlist { config } => run_watchlist(config),
        Commands::Config => {
            print!("{}", ScanConfig::default().to_toml()?);
            Ok(())
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<ScanConfig> {
    match path {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ScanConfig::default()),
    }
}

/// Command-line flags win over file values.
fn apply_overrides(config: &mut ScanConfig, args: &ScanArgs) {
    if let Some(min_lots) = args.min_lots {
        config.min_volume_lots = min_lots;
    }
    if !args.symbols.is_empty() {
        config.watchlist = args.symbols.clone();
    }
    if let Some(decimals) = args.decimals {
        config.decimals = decimals;
    }
    if args.parallel {
        config.parallel = true;
    }
}

fn run_scan(args: ScanArgs) -> Result<()> {
    let mut config = load_config(args.config.as_ref())?;
    apply_overrides(&mut config, &args);
    config.validate().context("invalid scan configuration")?;

    let report = if args.synthetic {
        let provider = SyntheticProvider::today();
        Scanner::new(config.clone(), &provider, &provider)?.run(&LogProgress)
    } else {
        let breaker = Arc::new(CircuitBreaker::default());
        let provider = YahooProvider::new(breaker, config.fetch_timeout())?;
        Scanner::new(config.clone(), &provider, &provider)?.run(&LogProgress)
    };

    println!(
        "Scan date: {} | minimum volume: {} lots | source: {}",
        chrono::Local::now().date_naive(),
        config.min_volume_lots,
        if args.synthetic { "synthetic" } else { "Yahoo Finance" }
    );
    println!();

    print_results(&report, &args, config.decimals);

    let table = report.table();
    if let Some(path) = &args.csv {
        write_csv(path, &table, config.decimals)?;
        tracing::info!("CSV written to {}", path.display());
    }
    if let Some(path) = &args.json {
        write_json(path, &table, config.min_volume_lots)?;
        tracing::info!("JSON written to {}", path.display());
    }

    if let Some(path) = &args.brief_file {
        println!();
        println!("Market brief");
        println!("{}", brief_or_diagnostic(&FileBrief::new(path)));
    }

    println!();
    println!("{DISCLAIMER}");
    Ok(())
}

fn print_results(report: &ScanReport, args: &ScanArgs, decimals: u32) {
    if let Some(msg) = report.empty_message() {
        println!("{msg}");
        println!("{}", report.summary);
        return;
    }

    let table = report.table();
    let breakouts = table.breakout_candidates().ranked_by_upside();
    println!("Breakout candidates ({})", breakouts.len());
    if breakouts.is_empty() {
        println!("(none today)");
    } else {
        print!("{}", breakouts.render_text(decimals));
    }
    println!();

    let view = full_view(&table, args);
    println!("All results ({})", view.len());
    print!("{}", view.render_text(decimals));
    println!();
    println!("{}", report.summary);
}

fn full_view(table: &ResultTable, args: &ScanArgs) -> ResultTable {
    let filtered = match args.trend {
        Some(label) => table.filter_trend(label),
        None => table.clone(),
    };
    let order = if args.asc && !args.desc { SortOrder::Asc } else { SortOrder::Desc };
    filtered.sorted_by(args.sort.unwrap_or(SortKey::ExpectedUpside), order)
}

fn run_watchlist(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_ref())?;
    for symbol in &config.watchlist {
        println!("{symbol}");
    }
    Ok(())
}
