//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResults};
use crate::domain::config_validation::build_backtest_config;
use crate::domain::error::PortsimError;
use crate::domain::strategy::StrategyKind;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "portsim", about = "Multi-asset portfolio backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Results file, `-` for stdout
        #[arg(short, long, default_value = "results.json")]
        output: String,
        /// Directory of <SYMBOL>.csv price files; overrides [data] dir
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a backtest configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List strategy types and their default parameters
    Strategies,
    /// Show the latest price for a symbol
    Quote {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            data_dir,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest(&config, &output, data_dir.as_deref())
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::Strategies => run_strategies(),
        Command::Quote {
            symbol,
            config,
            data_dir,
        } => run_quote(&symbol, config.as_deref(), data_dir.as_deref()),
    }
}

fn fail(err: &PortsimError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

fn load_backtest_config(path: &Path) -> Result<(FileConfigAdapter, BacktestConfig), ExitCode> {
    eprintln!("Loading config from {}", path.display());
    let adapter = load_config(path)?;
    let config = build_backtest_config(&adapter).map_err(|e| fail(&e))?;
    Ok((adapter, config))
}

/// `--data-dir` wins over `[data] dir`.
pub fn resolve_data_dir(
    data_dir: Option<&Path>,
    config: Option<&dyn ConfigPort>,
) -> Result<PathBuf, PortsimError> {
    if let Some(dir) = data_dir {
        return Ok(dir.to_path_buf());
    }
    config
        .and_then(|c| c.get_string("data", "dir"))
        .filter(|s| !s.trim().is_empty())
        .map(|s| PathBuf::from(s.trim()))
        .ok_or_else(|| PortsimError::ConfigMissing {
            section: "data".to_string(),
            key: "dir".to_string(),
        })
}

fn run_backtest(config_path: &Path, output: &str, data_dir: Option<&Path>) -> ExitCode {
    let (adapter, config) = match load_backtest_config(config_path) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let data_dir = match resolve_data_dir(data_dir, Some(&adapter as &dyn ConfigPort)) {
        Ok(dir) => dir,
        Err(e) => return fail(&e),
    };

    eprintln!(
        "Running backtest: {} holdings, {} to {}, strategy {}",
        config.portfolio.holdings.len(),
        config.start_date,
        config.end_date,
        config.strategy.kind,
    );
    let data_port = CsvAdapter::new(data_dir);
    let results = match backtest_engine::run_with_data_port(&config, &data_port) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    print_summary(&config, &results);

    if let Err(e) = JsonReportAdapter::new().write(&results, &config.strategy, output) {
        return fail(&e);
    }
    if output != "-" {
        eprintln!("\nResults written to: {}", output);
    }
    ExitCode::SUCCESS
}

fn print_summary(config: &BacktestConfig, results: &BacktestResults) {
    let m = &results.metrics;
    eprintln!("\n=== Portfolio Results ===");
    eprintln!("Periods:          {}", results.dates.len());
    eprintln!(
        "Final Value:      {:.2}",
        results.final_value().unwrap_or(config.initial_capital)
    );
    eprintln!("Total Return:     {:.2}%", m.total_return * 100.0);
    eprintln!("Annualized:       {:.2}%", m.annualized_return * 100.0);
    eprintln!("Volatility:       {:.2}%", m.volatility * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", m.sharpe_ratio);
    eprintln!("Sortino Ratio:    {:.2}", m.sortino_ratio);
    eprintln!("Max Drawdown:     {:.1}%", m.max_drawdown * 100.0);
    eprintln!("Win Rate:         {:.1}%", m.win_rate * 100.0);
    eprintln!("Profit Factor:    {:.2}", m.profit_factor);

    if let Some(b) = &results.benchmark_comparison {
        eprintln!("\n=== Benchmark ({}) ===", b.benchmark_symbol);
        eprintln!("Benchmark Return: {:.2}%", b.benchmark_return * 100.0);
        eprintln!("Alpha:            {:.2}%", b.alpha * 100.0);
        eprintln!("Beta:             {:.2}", b.beta);
        eprintln!("Correlation:      {:.2}", b.correlation);
        eprintln!("Tracking Error:   {:.2}%", b.tracking_error * 100.0);
    }

    if !results.asset_performance.is_empty() {
        eprintln!("\n=== Per-Asset Summary ===");
        for a in &results.asset_performance {
            eprintln!(
                "  {}:  avg weight {:.1}%, return {:.2}%, contribution {:.2}%",
                a.symbol,
                a.avg_weight * 100.0,
                a.total_return * 100.0,
                a.contribution * 100.0,
            );
        }
    }

    if !results.diagnostics.is_empty() {
        eprintln!("\n=== Warnings ===");
        for d in &results.diagnostics {
            eprintln!("  {}", d);
        }
    }
}

pub fn run_dry_run(config_path: &Path) -> ExitCode {
    let (adapter, config) = match load_backtest_config(config_path) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    eprintln!("Config validated successfully");

    eprintln!("\nHoldings:");
    for h in &config.portfolio.holdings {
        eprintln!("  {}: {:.2}%", h.symbol, h.allocation * 100.0);
    }

    eprintln!("\nStrategy:");
    eprintln!("  id:         {}", config.strategy.id);
    eprintln!("  type:       {}", config.strategy.kind.type_name());
    eprintln!("  parameters: {}", config.strategy.kind.describe_params());
    eprintln!("  rebalance:  {}", config.effective_frequency());

    eprintln!("\nBacktest:");
    eprintln!("  period:          {} to {}", config.start_date, config.end_date);
    eprintln!("  initial capital: {:.2}", config.initial_capital);
    eprintln!("  risk-free rate:  {}", config.risk_free_rate);
    if let Some(symbol) = &config.benchmark_symbol {
        eprintln!("  benchmark:       {}", symbol);
    }
    match resolve_data_dir(None, Some(&adapter as &dyn ConfigPort)) {
        Ok(dir) => eprintln!("  data dir:        {}", dir.display()),
        Err(_) => eprintln!("  data dir:        (pass --data-dir)"),
    }

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    let config = match load_backtest_config(config_path) {
        Ok((_, config)) => config,
        Err(code) => return code,
    };
    eprintln!(
        "{} holdings, strategy {}, {} rebalancing",
        config.portfolio.holdings.len(),
        config.strategy.kind,
        config.effective_frequency(),
    );
    eprintln!("Configuration is valid.");
    ExitCode::SUCCESS
}

fn run_strategies() -> ExitCode {
    for name in StrategyKind::TYPE_NAMES {
        if let Some(kind) = StrategyKind::with_defaults(name) {
            println!("{:<20} {}", name, kind.describe_params());
        }
    }
    ExitCode::SUCCESS
}

fn run_quote(symbol: &str, config_path: Option<&Path>, data_dir: Option<&Path>) -> ExitCode {
    let adapter = match config_path.map(load_config).transpose() {
        Ok(a) => a,
        Err(code) => return code,
    };
    let dir = match resolve_data_dir(data_dir, adapter.as_ref().map(|a| a as &dyn ConfigPort)) {
        Ok(dir) => dir,
        Err(e) => return fail(&e),
    };

    let symbol = symbol.trim().to_uppercase();
    match CsvAdapter::new(dir).current_price(&symbol) {
        Ok(quote) => {
            println!(
                "{} {:.2} {:+.2} ({:+.2}%)",
                symbol, quote.price, quote.change, quote.change_percent
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backtest_defaults() {
        let cli = Cli::parse_from(["portsim", "backtest", "--config", "run.ini"]);
        match cli.command {
            Command::Backtest {
                config,
                output,
                data_dir,
                dry_run,
            } => {
                assert_eq!(config, PathBuf::from("run.ini"));
                assert_eq!(output, "results.json");
                assert!(data_dir.is_none());
                assert!(!dry_run);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn parses_quote() {
        let cli = Cli::parse_from(["portsim", "quote", "--symbol", "spy", "--data-dir", "/tmp"]);
        assert!(matches!(
            cli.command,
            Command::Quote { symbol, config: None, data_dir: Some(_) } if symbol == "spy"
        ));
    }

    #[test]
    fn data_dir_flag_overrides_config() {
        let adapter = FileConfigAdapter::from_string("[data]\ndir = /from/config\n").unwrap();
        let config: &dyn ConfigPort = &adapter;
        let dir = resolve_data_dir(Some(Path::new("/from/flag")), Some(config)).unwrap();
        assert_eq!(dir, PathBuf::from("/from/flag"));

        let dir = resolve_data_dir(None, Some(config)).unwrap();
        assert_eq!(dir, PathBuf::from("/from/config"));
    }

    #[test]
    fn missing_data_dir_is_a_config_error() {
        let err = resolve_data_dir(None, None).unwrap_err();
        assert!(matches!(
            err,
            PortsimError::ConfigMissing { section, key } if section == "data" && key == "dir"
        ));
    }
}
