//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::config_validation::{parse_balance, validate_config};
use crate::domain::error::StockbotError;
use crate::domain::metrics::Summary;
use crate::domain::session::Session;
use crate::domain::strategy::StrategyKind;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "stockbot", about = "Backtest trading strategies on daily price history")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a price history, compute indicators and optionally export them
    Load {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
    /// Run one strategy against a price history
    Run {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long, value_enum)]
        strategy: Option<StrategyKind>,
        #[arg(short, long)]
        balance: Option<f64>,
        #[arg(long)]
        log_dir: Option<PathBuf>,
        #[arg(short, long)]
        export: Option<PathBuf>,
        /// Skip writing the activity log
        #[arg(long)]
        no_log: bool,
    },
    /// Run every strategy on the same data and compare results
    Compare {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        balance: Option<f64>,
    },
    /// Show record count and date range of a price history
    Info {
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Install the stderr log subscriber. Honors `RUST_LOG`, defaults to `warn`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Load { input, export } => run_load(&input, export.as_deref()),
        Command::Run {
            input,
            config,
            strategy,
            balance,
            log_dir,
            export,
            no_log,
        } => load_optional_config(config.as_deref()).and_then(|adapter| {
            let overrides = Overrides {
                strategy,
                balance,
                log_dir,
                export,
                no_log,
            };
            let settings = build_run_settings(&adapter, overrides)?;
            run_single(&input, &settings)
        }),
        Command::Compare {
            input,
            config,
            balance,
        } => load_optional_config(config.as_deref()).and_then(|adapter| {
            let bt_config = build_backtest_config(&adapter, balance)?;
            run_compare(&input, &bt_config)
        }),
        Command::Info { input } => run_info(&input),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StockbotError> {
    FileConfigAdapter::from_file(path).map_err(|e| StockbotError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn load_optional_config(path: Option<&Path>) -> Result<FileConfigAdapter, StockbotError> {
    let adapter = match path {
        Some(p) => {
            eprintln!("Loading config from {}", p.display());
            load_config(p)?
        }
        None => FileConfigAdapter::empty(),
    };
    validate_config(&adapter)?;
    Ok(adapter)
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub strategy: Option<StrategyKind>,
    pub balance: Option<f64>,
    pub log_dir: Option<PathBuf>,
    pub export: Option<PathBuf>,
    pub no_log: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub strategy: StrategyKind,
    pub backtest: BacktestConfig,
    pub log_dir: PathBuf,
    pub export_path: Option<PathBuf>,
    pub write_log: bool,
}

pub fn build_backtest_config(
    adapter: &dyn ConfigPort,
    balance_override: Option<f64>,
) -> Result<BacktestConfig, StockbotError> {
    let initial_balance = match balance_override {
        Some(b) => parse_balance(&b.to_string(), "cli", "balance")?,
        None => match adapter.get_trimmed("backtest", "initial_balance") {
            Some(raw) => parse_balance(&raw, "backtest", "initial_balance")?,
            None => BacktestConfig::default().initial_balance,
        },
    };
    Ok(BacktestConfig { initial_balance })
}

pub fn build_run_settings(
    adapter: &dyn ConfigPort,
    overrides: Overrides,
) -> Result<RunSettings, StockbotError> {
    let strategy = match overrides.strategy {
        Some(s) => s,
        None => match adapter.get_trimmed("backtest", "strategy") {
            Some(raw) => raw
                .parse::<StrategyKind>()
                .map_err(|reason| StockbotError::ConfigInvalid {
                    section: "backtest".into(),
                    key: "strategy".into(),
                    reason,
                })?,
            None => StrategyKind::LongGame,
        },
    };

    let backtest = build_backtest_config(adapter, overrides.balance)?;

    let log_dir = overrides
        .log_dir
        .or_else(|| adapter.get_trimmed("output", "activity_log_dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    let export_path = overrides
        .export
        .or_else(|| adapter.get_trimmed("output", "export_path").map(PathBuf::from));

    let write_log = !overrides.no_log && adapter.get_bool("output", "write_activity_log", true);

    Ok(RunSettings {
        strategy,
        backtest,
        log_dir,
        export_path,
        write_log,
    })
}

/// Load, export, run and log. Export and log failures are reported as
/// warnings; they never change the returned result.
pub fn run_strategy_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    settings: &RunSettings,
) -> Result<BacktestResult, StockbotError> {
    let series = data_port.fetch_series()?;
    let session = Session::new(series).with_balance(settings.backtest.initial_balance);

    if let Some(path) = &settings.export_path {
        if let Err(e) = report_port.write_indicators(session.series(), session.indicators(), path) {
            warn!(path = %path.display(), error = %e, "indicator export failed");
            eprintln!("warning: failed to write indicator export {}: {e}", path.display());
        }
    }

    let result = session.run(settings.strategy)?;

    if settings.write_log {
        match report_port.write_activity_log(&result) {
            Ok(path) => eprintln!("Activity log written to: {}", path.display()),
            Err(e) => {
                warn!(strategy = settings.strategy.key(), error = %e, "activity log failed");
                eprintln!("warning: failed to write activity log: {e}");
            }
        }
    }

    Ok(result)
}

/// Human-readable summary of one run, one line per entry.
pub fn summary_lines(result: &BacktestResult) -> Vec<String> {
    let summary = Summary::compute(result);
    let mut lines = vec![
        format!("=== {} ===", result.strategy),
        format!("Initial balance:  ${:.2}", summary.initial_balance),
        format!("Final balance:    ${:.2}", summary.final_worth),
        format!(
            "Profit/Loss:      ${:.2} ({:.2}%)",
            summary.profit_loss, summary.return_pct
        ),
        format!(
            "Max Drawdown:     -{:.1}% ({} days below peak)",
            summary.max_drawdown * 100.0,
            summary.max_drawdown_duration
        ),
        format!("Trades:           {}", summary.trades),
    ];
    if let Some(date) = result.stopped_on {
        lines.push(format!("Stopped trading:  {}", date));
    }
    for cp in &result.checkpoints {
        lines.push(match cp.observed {
            Some((date, open)) => {
                format!("Checkpoint {}:  open {:.2} on {}", cp.anniversary, open, date)
            }
            None => format!("Checkpoint {}:  not reached", cp.anniversary),
        });
    }
    lines
}

fn print_summary(result: &BacktestResult) {
    eprintln!();
    for line in summary_lines(result) {
        eprintln!("{line}");
    }
}

fn run_single(input: &Path, settings: &RunSettings) -> Result<(), StockbotError> {
    eprintln!("Loading prices from {}", input.display());
    let data_port = CsvAdapter::new(input);
    let report_port = CsvReportAdapter::new(&settings.log_dir);

    eprintln!(
        "Running {} with initial balance: ${:.2}",
        settings.strategy, settings.backtest.initial_balance
    );
    let result = run_strategy_pipeline(&data_port, &report_port, settings)?;
    print_summary(&result);
    Ok(())
}

fn run_compare(input: &Path, config: &BacktestConfig) -> Result<(), StockbotError> {
    let series = CsvAdapter::new(input).fetch_series()?;
    let session = Session::new(series).with_balance(config.initial_balance);

    eprintln!(
        "Comparing strategies over {} records, initial balance ${:.2}",
        session.len(),
        config.initial_balance
    );
    for kind in StrategyKind::ALL {
        let result = session.run(kind)?;
        let summary = Summary::compute(&result);
        println!(
            "{:<30} final ${:>12.2}  P/L ${:>11.2} ({:>7.2}%)  max DD -{:>5.1}% / {:>4}d  trades {:>4}",
            kind.display_name(),
            summary.final_worth,
            summary.profit_loss,
            summary.return_pct,
            summary.max_drawdown * 100.0,
            summary.max_drawdown_duration,
            summary.trades
        );
    }
    Ok(())
}

fn run_load(input: &Path, export: Option<&Path>) -> Result<(), StockbotError> {
    let series = CsvAdapter::new(input).fetch_series()?;
    let session = Session::new(series);

    match (session.first_date(), session.last_date()) {
        (Some(first), Some(last)) => eprintln!(
            "Loaded {} records from {} to {}",
            session.len(),
            first.format("%m/%d/%Y"),
            last.format("%m/%d/%Y")
        ),
        _ => eprintln!("Loaded 0 records"),
    }

    if let Some(path) = export {
        let reports = CsvReportAdapter::new(".");
        reports.write_indicators(session.series(), session.indicators(), path)?;
        eprintln!("Indicators written to: {}", path.display());
    }
    Ok(())
}

fn run_info(input: &Path) -> Result<(), StockbotError> {
    let adapter = CsvAdapter::new(input);
    match adapter.get_data_range()? {
        Some((first, last, count)) => {
            println!("{}: {} records, {} to {}", input.display(), count, first, last)
        }
        None => eprintln!("{}: no data found", input.display()),
    }
    Ok(())
}
