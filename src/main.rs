use anyhow::Context;
use backtester::{BacktestResult, Backtester};
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets};
use configuration::{Config, SizingMode};
use data_feed::{CsvDataSource, load_bars};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// The main entry point for the Retrotrade backtester.
fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may already be set.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = configuration::load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let _log_guard = configuration::init_tracing(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Run(args) => handle_run(args, config),
        Commands::Batch(args) => handle_batch(args, config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Replays a trading strategy over historical bars and reports its performance.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file (defaults to ./config.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest a single CSV file of bars.
    Run(RunArgs),
    /// Backtest every CSV file of a directory in parallel.
    Batch(BatchArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// CSV file with timestamp/open/high/low/close[/volume] columns.
    #[arg(long)]
    data: PathBuf,

    /// Print the full result as JSON instead of tables.
    #[arg(long)]
    json: bool,

    /// Close a position still open at the last bar at its close price.
    #[arg(long)]
    close_open: bool,

    /// Allow short entries on sell signals.
    #[arg(long)]
    allow_short: bool,

    /// Override the position sizing mode.
    #[arg(long, value_enum)]
    sizing: Option<SizingMode>,
}

#[derive(Parser)]
struct BatchArgs {
    /// Directory containing the CSV files to backtest.
    #[arg(long)]
    dir: PathBuf,

    /// Directory that receives one JSON report per input file.
    #[arg(long, default_value = "reports")]
    out: PathBuf,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_run(args: RunArgs, mut config: Config) -> anyhow::Result<()> {
    if args.close_open {
        config.backtest.close_open_position_at_end = true;
    }
    if args.allow_short {
        config.backtest.allow_short = true;
    }
    if let Some(sizing) = args.sizing {
        config.risk_management.sizing = sizing;
    }

    let result = backtest_file(&Backtester::new(config), &args.data)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result);
    }
    Ok(())
}

fn handle_batch(args: BatchArgs, config: Config) -> anyhow::Result<()> {
    let files = csv_files(&args.dir)?;
    if files.is_empty() {
        anyhow::bail!("No CSV files found in {}", args.dir.display());
    }
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("Failed to create output directory {}", args.out.display()))?;

    let progress_bar = ProgressBar::new(files.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    let backtester = Backtester::new(config);
    let outcomes: Vec<(PathBuf, anyhow::Result<BacktestResult>)> = files
        .par_iter()
        .map(|path| {
            let result = backtest_file(&backtester, path).and_then(|result| {
                write_json_report(&args.out, path, &result)?;
                Ok(result)
            });
            progress_bar.inc(1);
            (path.clone(), result)
        })
        .collect();
    progress_bar.finish_with_message("Batch complete!");

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_header(vec!["File", "Trades", "Net Profit", "Return", "Sharpe", "Max DD"]);
    let mut failures = 0;
    for (path, outcome) in &outcomes {
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        match outcome {
            Ok(result) => {
                let report = &result.report;
                table.add_row(vec![
                    name,
                    report.total_trades.to_string(),
                    report.total_net_profit.round_dp(2).to_string(),
                    pct(report.total_return),
                    ratio(report.sharpe_ratio),
                    pct(report.max_drawdown),
                ]);
            }
            Err(e) => {
                failures += 1;
                table.add_row(vec![name, format!("error: {e:#}"), String::new(), String::new(), String::new(), String::new()]);
            }
        }
    }
    println!("{table}");

    tracing::info!(files = outcomes.len(), failures, out = %args.out.display(), "Batch complete");
    if failures > 0 {
        eprintln!("{failures} of {} files failed", outcomes.len());
    }
    Ok(())
}

fn backtest_file(backtester: &Backtester, path: &Path) -> anyhow::Result<BacktestResult> {
    let bars = load_bars(&mut CsvDataSource::new(path))
        .with_context(|| format!("Failed to load bars from {}", path.display()))?;
    backtester
        .run(bars)
        .with_context(|| format!("Backtest failed for {}", path.display()))
}

fn csv_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn write_json_report(out_dir: &Path, input: &Path, result: &BacktestResult) -> anyhow::Result<()> {
    let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| "report".to_string());
    let target = out_dir.join(format!("{stem}.json"));
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(&target, json).with_context(|| format!("Failed to write {}", target.display()))?;
    Ok(())
}

// ==============================================================================
// Report Rendering
// ==============================================================================

fn pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn ratio(value: f64) -> String {
    if value.is_infinite() { "inf".to_string() } else { format!("{value:.4}") }
}

fn print_report(result: &BacktestResult) {
    let report = &result.report;
    let outcome = &result.outcome;

    let mut summary = Table::new();
    summary.load_preset(presets::UTF8_FULL).set_header(vec!["Metric", "Value"]);
    let rows: Vec<(&str, String)> = vec![
        ("Initial Capital", outcome.initial_capital.round_dp(2).to_string()),
        ("Final Capital", outcome.final_capital.round_dp(2).to_string()),
        ("Total Net Profit", report.total_net_profit.round_dp(2).to_string()),
        ("Total Return", pct(report.total_return)),
        ("Sharpe Ratio", ratio(report.sharpe_ratio)),
        ("Sortino Ratio", ratio(report.sortino_ratio)),
        ("Max Drawdown", pct(report.max_drawdown)),
        ("Profit Factor", ratio(report.profit_factor)),
        ("Expectancy", report.expectancy.round_dp(2).to_string()),
        ("Trades", report.total_trades.to_string()),
        ("Win Rate", format!("{:.2}%", report.win_rate_pct)),
        ("Average Win", report.average_win.round_dp(2).to_string()),
        ("Average Loss", report.average_loss.round_dp(2).to_string()),
        ("Avg Holding Period", days_hours(report.average_holding_period)),
        ("Signals Emitted", result.signals_emitted.to_string()),
        ("Vetoed Entries", outcome.vetoed_entries.to_string()),
        ("Skipped Bars", outcome.skipped_bars.to_string()),
    ];
    for (label, value) in rows {
        summary.add_row(vec![label.to_string(), value]);
    }
    if let Some(mc) = &report.monte_carlo {
        summary.add_row(vec![format!("Monte Carlo p5/p50/p95 ({} paths)", mc.iterations), format!(
            "{} / {} / {}",
            pct(mc.p05_return),
            pct(mc.median_return),
            pct(mc.p95_return)
        )]);
        summary.add_row(vec!["Probability of Loss".to_string(), pct(mc.probability_of_loss)]);
    }
    if let Some(risk) = &result.final_risk {
        summary.add_row(vec!["Current Risk Level".to_string(), format!("{} (score {:.3})", risk.risk_level, risk.score)]);
        summary.add_row(vec!["VaR / CVaR".to_string(), format!("{} / {}", pct(risk.var), pct(risk.cvar))]);
    }
    println!("{summary}");

    if outcome.trades.is_empty() {
        println!("No trades were executed.");
    } else {
        let mut trades = Table::new();
        trades
            .load_preset(presets::UTF8_FULL)
            .set_header(vec!["Side", "Entry", "Exit", "Entry Px", "Exit Px", "Size", "Profit", "Reason"]);
        for t in &outcome.trades {
            trades.add_row(vec![
                format!("{:?}", t.side),
                t.entry_time.format("%Y-%m-%d %H:%M").to_string(),
                t.exit_time.format("%Y-%m-%d %H:%M").to_string(),
                t.entry_price.to_string(),
                t.exit_price.to_string(),
                t.size.round_dp(6).to_string(),
                t.profit.round_dp(2).to_string(),
                format!("{:?}", t.exit_reason),
            ]);
        }
        println!("{trades}");
    }

    if let Some(position) = &outcome.open_position {
        println!(
            "Open {:?} position since {} at {} (size {}) left unrealized.",
            position.side,
            position.entry_time.format("%Y-%m-%d %H:%M"),
            position.entry_price,
            position.size.round_dp(6)
        );
    }
}

fn days_hours(duration: std::time::Duration) -> String {
    let hours = duration.as_secs() / 3600;
    format!("{}d {}h", hours / 24, hours % 24)
}
