//! Backtest orchestration.
//!
//! Pipeline: align prices -> returns -> schedule -> strategy weights ->
//! simulate -> metrics -> benchmark comparison -> per-asset breakdown.
//! [`run_backtest`] is pure; [`run_with_data_port`] fetches every history
//! first and only then hands the joined data to it.

use crate::domain::alignment::align_prices;
use crate::domain::asset_performance::{AssetPerformance, calculate_asset_performance};
use crate::domain::benchmark::{self, BenchmarkComparison};
use crate::domain::error::{Diagnostic, PortsimError};
use crate::domain::metrics::PerformanceMetrics;
use crate::domain::portfolio::Portfolio;
use crate::domain::price::SymbolHistory;
use crate::domain::returns::ReturnMatrix;
use crate::domain::schedule::{RebalanceFrequency, RebalanceSchedule};
use crate::domain::simulation::simulate;
use crate::domain::strategy::{Strategy, StrategyInput};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub portfolio: Portfolio,
    pub strategy: Strategy,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub rebalancing_frequency: RebalanceFrequency,
    pub risk_free_rate: f64,
    pub benchmark_symbol: Option<String>,
}

impl BacktestConfig {
    /// The strategy's own frequency wins over the backtest-wide one.
    pub fn effective_frequency(&self) -> RebalanceFrequency {
        self.strategy
            .rebalance_frequency
            .unwrap_or(self.rebalancing_frequency)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResults {
    pub portfolio_values: Vec<f64>,
    pub returns: Vec<f64>,
    /// ISO `YYYY-MM-DD`, index-aligned with every other series.
    pub dates: Vec<String>,
    pub weights: BTreeMap<String, Vec<f64>>,
    pub metrics: PerformanceMetrics,
    pub drawdown: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_comparison: Option<BenchmarkComparison>,
    pub asset_performance: Vec<AssetPerformance>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BacktestResults {
    pub fn final_value(&self) -> Option<f64> {
        self.portfolio_values.last().copied()
    }
}

/// Histories that were fetched, plus the symbols that were skipped.
#[derive(Debug, Clone)]
pub struct FetchedHistories {
    pub histories: Vec<SymbolHistory>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Fetch every symbol, warning on and skipping failures. Fails with
/// `NoData` only when nothing at all could be fetched.
pub fn fetch_histories(
    data_port: &dyn DataPort,
    symbols: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<FetchedHistories, PortsimError> {
    let mut histories = Vec::with_capacity(symbols.len());
    let mut diagnostics = Vec::new();

    for symbol in symbols {
        let reason = match data_port.fetch_history(symbol, start_date, end_date) {
            Ok(points) if !points.is_empty() => {
                debug!("{}: fetched {} price points", symbol, points.len());
                histories.push(SymbolHistory::new(symbol.clone(), points));
                continue;
            }
            Ok(_) => "no price data in range".to_string(),
            Err(e) => e.to_string(),
        };
        warn!("skipping {} ({})", symbol, reason);
        diagnostics.push(Diagnostic::SymbolSkipped {
            symbol: symbol.clone(),
            reason,
        });
    }

    if histories.is_empty() {
        return Err(PortsimError::NoData {
            symbols: symbols.to_vec(),
            start: start_date,
            end: end_date,
        });
    }

    Ok(FetchedHistories {
        histories,
        diagnostics,
    })
}

/// Run the full pipeline over already-fetched data.
pub fn run_backtest(
    config: &BacktestConfig,
    histories: &[SymbolHistory],
    benchmark_history: Option<&SymbolHistory>,
) -> Result<BacktestResults, PortsimError> {
    let alignment = align_prices(histories, config.start_date, config.end_date)?;
    let prices = alignment.matrix;
    let mut diagnostics = alignment.diagnostics;
    info!(
        "aligned {} symbols over {} periods ({} to {})",
        prices.symbol_count(),
        prices.period_count(),
        prices.dates.first().map_or_else(String::new, |d| d.to_string()),
        prices.dates.last().map_or_else(String::new, |d| d.to_string()),
    );

    let returns = ReturnMatrix::from_prices(&prices);
    let frequency = config.effective_frequency();
    let schedule = RebalanceSchedule::build(&prices.dates, frequency);
    debug!("{} rebalance dates ({})", schedule.len(), frequency);

    let targets: Vec<f64> = prices
        .symbols
        .iter()
        .map(|s| config.portfolio.allocation_of(s))
        .collect();

    let input = StrategyInput {
        prices: &prices,
        returns: &returns,
        schedule: &schedule,
        targets: &targets,
    };
    let weights = config.strategy.generate(&input);
    info!("generated weights with {}", config.strategy.kind);

    let trajectory = simulate(&weights, &returns, &prices.dates, config.initial_capital);
    let metrics = PerformanceMetrics::compute(
        &trajectory.returns,
        &trajectory.drawdown,
        config.risk_free_rate,
    );

    let benchmark_comparison = match (&config.benchmark_symbol, benchmark_history) {
        (Some(symbol), Some(history)) => {
            let comparison = match (prices.dates.first(), prices.dates.last()) {
                (Some(&first), Some(&last)) => {
                    let bench = benchmark::benchmark_returns(history, first, last);
                    benchmark::compare(symbol, &trajectory.returns, &bench, config.risk_free_rate)
                }
                _ => None,
            };
            if comparison.is_none() {
                warn!("benchmark {} has no data inside the backtest window", symbol);
                diagnostics.push(Diagnostic::BenchmarkUnavailable {
                    symbol: symbol.clone(),
                    reason: "no overlapping benchmark data".to_string(),
                });
            }
            comparison
        }
        _ => None,
    };

    let asset_performance =
        calculate_asset_performance(&prices, &weights, &targets, config.risk_free_rate);

    Ok(BacktestResults {
        portfolio_values: trajectory.values,
        returns: trajectory.returns,
        dates: trajectory
            .dates
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect(),
        weights: weights.to_columns(),
        metrics,
        drawdown: trajectory.drawdown,
        benchmark_comparison,
        asset_performance,
        diagnostics,
    })
}

/// Fetch holdings and benchmark through `data_port`, then run the pipeline.
pub fn run_with_data_port(
    config: &BacktestConfig,
    data_port: &dyn DataPort,
) -> Result<BacktestResults, PortsimError> {
    let symbols = config.portfolio.symbols();
    info!(
        "fetching {} symbols from {} to {}",
        symbols.len(),
        config.start_date,
        config.end_date
    );
    let fetched = fetch_histories(data_port, &symbols, config.start_date, config.end_date)?;

    let mut diagnostics = fetched.diagnostics;
    let benchmark_history = match &config.benchmark_symbol {
        Some(symbol) => {
            match data_port.fetch_history(symbol, config.start_date, config.end_date) {
                Ok(points) if !points.is_empty() => Some(SymbolHistory::new(symbol.clone(), points)),
                Ok(_) => {
                    warn!("benchmark {} unavailable (no price data in range)", symbol);
                    diagnostics.push(Diagnostic::BenchmarkUnavailable {
                        symbol: symbol.clone(),
                        reason: "no price data in range".to_string(),
                    });
                    None
                }
                Err(e) => {
                    warn!("benchmark {} unavailable ({})", symbol, e);
                    diagnostics.push(Diagnostic::BenchmarkUnavailable {
                        symbol: symbol.clone(),
                        reason: e.to_string(),
                    });
                    None
                }
            }
        }
        None => None,
    };

    let mut results = run_backtest(config, &fetched.histories, benchmark_history.as_ref())?;
    diagnostics.append(&mut results.diagnostics);
    results.diagnostics = diagnostics;
    Ok(results)
}
