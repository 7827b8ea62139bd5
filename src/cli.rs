//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::report_for_path;
use crate::domain::analysis::{
    run_analysis, AnalysisConfig, AnalysisReport, DEFAULT_BENCHMARK, DEFAULT_CAPITAL,
};
use crate::domain::config_validation::{parse_date, validate_config};
use crate::domain::error::SharpefolioError;
use crate::domain::execution_plan::DEFAULT_MIN_WEIGHT;
use crate::domain::optimizer::{ConvergencePolicy, OptimizerConfig};
use crate::domain::universe::parse_tickers;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;

pub const DEFAULT_OUTPUT: &str = "cumulative_returns.svg";

#[derive(Parser, Debug)]
#[command(name = "sharpefolio", about = "Maximum-Sharpe portfolio optimizer")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Optimize weights, evaluate against the benchmark and write a report
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Report path; `.csv` writes the series, anything else an SVG chart
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Comma-separated tickers, overriding [data] tickers
        #[arg(long)]
        tickers: Option<String>,
        #[arg(long)]
        benchmark: Option<String>,
        /// Fail when the optimizer does not converge
        #[arg(long)]
        strict: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show stored data ranges; every stored asset when no tickers are configured
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);

    match cli.command {
        Command::Run {
            config,
            output,
            tickers,
            benchmark,
            strict,
        } => run_command(
            &config,
            output.as_deref(),
            tickers.as_deref(),
            benchmark.as_deref(),
            strict,
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, ticker } => run_info(&config, ticker.as_deref()),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when `run` is called repeatedly.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: SharpefolioError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

fn run_command(
    config_path: &Path,
    output_path: Option<&Path>,
    tickers_override: Option<&str>,
    benchmark_override: Option<&str>,
    strict: bool,
) -> ExitCode {
    // Stage 1: Load and validate config
    info!(path = %config_path.display(), "loading config");
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_config(&adapter) {
        return fail(e);
    }

    // Stage 2: Build run parameters, applying overrides
    let mut config = match build_analysis_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    if let Some(t) = tickers_override {
        config.tickers = match parse_tickers(t) {
            Ok(t) => t,
            Err(e) => {
                return fail(SharpefolioError::invalid_input(format!("--tickers: {e}")));
            }
        };
    }
    if let Some(b) = benchmark_override {
        config.benchmark = b.trim().to_uppercase();
    }
    if strict {
        config.convergence = ConvergencePolicy::Strict;
    }

    let output = output_path
        .map(Path::to_path_buf)
        .or_else(|| adapter.get_string("report", "output").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    // Stage 3: Data port
    let data_dir = adapter.get_string("data", "dir").unwrap_or_default();
    let data_port = CsvPriceAdapter::new(PathBuf::from(data_dir));

    run_pipeline(&data_port, &config, &output)
}

pub fn build_analysis_config(adapter: &dyn ConfigPort) -> Result<AnalysisConfig, SharpefolioError> {
    let tickers_str =
        adapter
            .get_string("data", "tickers")
            .ok_or_else(|| SharpefolioError::ConfigMissing {
                section: "data".into(),
                key: "tickers".into(),
            })?;
    let tickers = parse_tickers(&tickers_str).map_err(|e| SharpefolioError::ConfigInvalid {
        section: "data".into(),
        key: "tickers".into(),
        reason: e.to_string(),
    })?;

    let start_date = parse_date(adapter.get_string("data", "start_date").as_deref(), "start_date")?;
    let end_date = parse_date(adapter.get_string("data", "end_date").as_deref(), "end_date")?;

    let benchmark = adapter
        .get_string("portfolio", "benchmark")
        .map(|b| b.trim().to_uppercase())
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| DEFAULT_BENCHMARK.to_string());

    let defaults = OptimizerConfig::default();
    let optimizer = OptimizerConfig {
        trading_days: adapter.get_double("portfolio", "trading_days", defaults.trading_days),
        max_iterations: adapter
            .get_int("optimizer", "max_iterations", defaults.max_iterations as i64)
            .max(1) as usize,
        tolerance: adapter.get_double("optimizer", "tolerance", defaults.tolerance),
    };

    let convergence = if adapter.get_bool("optimizer", "strict", false) {
        ConvergencePolicy::Strict
    } else {
        ConvergencePolicy::Warn
    };

    Ok(AnalysisConfig {
        tickers,
        benchmark,
        start_date,
        end_date,
        capital: adapter.get_double("portfolio", "capital", DEFAULT_CAPITAL),
        min_weight: adapter.get_double("portfolio", "min_weight", DEFAULT_MIN_WEIGHT),
        optimizer,
        convergence,
    })
}

pub fn run_pipeline(
    data_port: &dyn PriceDataPort,
    config: &AnalysisConfig,
    output: &Path,
) -> ExitCode {
    info!(
        assets = config.tickers.len(),
        benchmark = %config.benchmark,
        start = %config.start_date,
        end = %config.end_date,
        "running analysis"
    );

    let report = match run_analysis(data_port, config) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    print_summary(&report);

    let writer = report_for_path(output);
    match writer.write(&report, output) {
        Ok(()) => {
            eprintln!("\nReport written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn print_summary(report: &AnalysisReport) {
    let opt = &report.optimization;

    eprintln!("\n=== Optimal Weights ===");
    for (asset, weight) in opt.weights.iter() {
        println!("{}\t{:.6}", asset, weight);
    }
    eprintln!(
        "Expected Return:  {:.2}%  Volatility: {:.2}%  Sharpe: {}",
        opt.annual_return * 100.0,
        opt.annual_volatility * 100.0,
        opt.sharpe_ratio
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "unbounded".to_string())
    );
    if !opt.converged {
        eprintln!(
            "warning: optimizer stopped after {} iterations without converging",
            opt.iterations
        );
    }

    eprintln!("\n=== Execution Plan ===");
    for order in &report.plan.orders {
        if order.is_skipped() {
            eprintln!("  {:<8} skip (weight {:.4})", order.asset_id, order.weight);
        } else {
            eprintln!(
                "  {:<8} buy {:>8} @ {:>10.2}  = {:>12.2}",
                order.asset_id,
                order.quantity,
                order.price,
                order.cost()
            );
        }
    }
    eprintln!("  Cash remainder: {:.2}", report.plan.cash_remainder());

    let (p, b) = (&report.portfolio_summary, &report.benchmark_summary);
    eprintln!("\n=== Performance ===");
    eprintln!("                  {:>12} {:>12}", "Portfolio", report.config.benchmark);
    eprintln!(
        "Net Return:       {:>11.2}% {:>11.2}%",
        report.evaluation.portfolio_net_return_pct, report.evaluation.benchmark_net_return_pct
    );
    eprintln!(
        "Annualized:       {:>11.2}% {:>11.2}%",
        p.annualized_return * 100.0,
        b.annualized_return * 100.0
    );
    eprintln!(
        "Volatility:       {:>11.2}% {:>11.2}%",
        p.annualized_volatility * 100.0,
        b.annualized_volatility * 100.0
    );
    eprintln!("Sharpe Ratio:     {:>12.2} {:>12.2}", p.sharpe_ratio, b.sharpe_ratio);
    eprintln!(
        "Max Drawdown:     {:>11.1}% {:>11.1}%",
        -p.max_drawdown * 100.0,
        -b.max_drawdown * 100.0
    );
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_config(&adapter) {
        return fail(e);
    }
    let config = match build_analysis_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    eprintln!("  tickers:   {}", config.tickers.join(", "));
    eprintln!("  benchmark: {}", config.benchmark);
    eprintln!("  period:    {} to {}", config.start_date, config.end_date);
    eprintln!("  capital:   {:.2}", config.capital);
    eprintln!(
        "  optimizer: {} iterations, tolerance {:e}, {:?} on non-convergence",
        config.optimizer.max_iterations, config.optimizer.tolerance, config.convergence
    );
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_info(config_path: &Path, ticker: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let Some(data_dir) = adapter.get_string("data", "dir") else {
        return fail(SharpefolioError::ConfigMissing {
            section: "data".into(),
            key: "dir".into(),
        });
    };
    let data_port = CsvPriceAdapter::new(PathBuf::from(data_dir));

    let symbols = match info_symbols(&data_port, &adapter, ticker) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    print_data_ranges(&data_port, &symbols)
}

/// Symbols `info` reports on: the `--ticker` argument, else the configured
/// tickers plus the benchmark, else every asset the data port holds.
pub fn info_symbols(
    data_port: &dyn PriceDataPort,
    adapter: &dyn ConfigPort,
    ticker: Option<&str>,
) -> Result<Vec<String>, SharpefolioError> {
    if let Some(t) = ticker {
        return Ok(vec![t.trim().to_uppercase()]);
    }

    let mut symbols: Vec<String> = adapter
        .get_list("data", "tickers")
        .iter()
        .map(|s| s.to_uppercase())
        .collect();
    if symbols.is_empty() {
        return data_port.list_assets();
    }

    let benchmark = adapter
        .get_string("portfolio", "benchmark")
        .map(|b| b.trim().to_uppercase())
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| DEFAULT_BENCHMARK.to_string());
    if !symbols.contains(&benchmark) {
        symbols.push(benchmark);
    }
    Ok(symbols)
}

pub fn print_data_ranges(data_port: &dyn PriceDataPort, symbols: &[String]) -> ExitCode {
    for symbol in symbols {
        match data_port.get_data_range(symbol) {
            Ok(Some((first, last, count))) => {
                println!("{}: {} prices, {} to {}", symbol, count, first, last);
            }
            Ok(None) => eprintln!("{}: no data found", symbol),
            Err(e) => eprintln!("error querying {}: {}", symbol, e),
        }
    }
    ExitCode::SUCCESS
}
