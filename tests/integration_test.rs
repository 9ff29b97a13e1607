//! End-to-end backtests through `run_with_data_port` with an in-memory data port.

mod common;

use approx::assert_abs_diff_eq;
use common::*;
use portsim::domain::backtest::{fetch_histories, run_backtest, run_with_data_port};
use portsim::domain::error::{Diagnostic, PortsimError};
use portsim::domain::strategy::{MeanReversionParams, MomentumParams, StrategyKind};

fn zigzag(periods: usize) -> Vec<f64> {
    (0..periods)
        .map(|i| if i % 2 == 0 { 100.0 + i as f64 } else { 98.0 + i as f64 })
        .collect()
}

#[test]
fn buy_and_hold_compounds_with_lagged_weights() {
    let port = MockDataPort::new()
        .with_history("A", daily_points("2024-01-01", &[100.0, 110.0, 121.0]))
        .with_history("B", daily_points("2024-01-01", &[50.0, 50.0, 55.0]));
    let config = make_config("A:0.5, B:0.5", StrategyKind::BuyHold);

    let results = run_with_data_port(&config, &port).unwrap();

    assert_eq!(results.portfolio_values.len(), 3);
    assert_abs_diff_eq!(results.portfolio_values[0], 10_000.0, epsilon = 1e-9);
    assert_abs_diff_eq!(results.portfolio_values[1], 10_500.0, epsilon = 1e-9);
    assert_abs_diff_eq!(results.portfolio_values[2], 11_550.0, epsilon = 1e-9);
    assert_eq!(results.returns[0], 0.0);
    assert!(results.drawdown.iter().all(|d| *d == 0.0));
    assert_abs_diff_eq!(results.metrics.total_return, 0.155, epsilon = 1e-9);
    assert!(results.diagnostics.is_empty());
}

#[test]
fn single_symbol_momentum_holds_everything() {
    let port = MockDataPort::new().with_history("A", daily_points("2024-01-01", &compounding(40, 0.01)));
    let config = make_config(
        "A:1.0",
        StrategyKind::Momentum(MomentumParams {
            lookback_period: 5,
            top_n: 3,
            positive_returns_only: false,
        }),
    );

    let results = run_with_data_port(&config, &port).unwrap();

    assert_eq!(results.weights.len(), 1);
    assert!(results.weights["A"].iter().all(|w| *w == 1.0));
    assert!(results.metrics.total_return > 0.0);
}

#[test]
fn mean_reversion_without_oversold_symbols_is_equal_weight() {
    let port = MockDataPort::new()
        .with_history("A", daily_points("2024-01-01", &compounding(30, 0.01)))
        .with_history("B", daily_points("2024-01-01", &compounding(30, 0.02)));
    let config = make_config(
        "A:0.5, B:0.5",
        StrategyKind::MeanReversion(MeanReversionParams {
            ma_period: 10,
            deviation_threshold: 0.1,
        }),
    );

    let results = run_with_data_port(&config, &port).unwrap();

    for symbol in ["A", "B"] {
        assert!(results.weights[symbol].iter().all(|w| *w == 0.5));
    }
}

#[test]
fn every_symbol_failing_is_no_data() {
    let port = MockDataPort::new()
        .with_error("A", "connection refused")
        .with_error("B", "connection refused");
    let config = make_config("A:0.5, B:0.5", StrategyKind::BuyHold);

    let err = run_with_data_port(&config, &port).unwrap_err();
    assert!(matches!(err, PortsimError::NoData { symbols, .. } if symbols == ["A", "B"]));
}

#[test]
fn failing_symbol_is_skipped_with_a_diagnostic() {
    let port = MockDataPort::new()
        .with_history("A", daily_points("2024-01-01", &compounding(20, 0.01)))
        .with_error("B", "file not found");
    let config = make_config(
        "A:0.5, B:0.5",
        StrategyKind::Momentum(MomentumParams::default()),
    );

    let results = run_with_data_port(&config, &port).unwrap();

    assert!(results.weights.contains_key("A"));
    assert!(!results.weights.contains_key("B"));
    assert!(matches!(
        &results.diagnostics[..],
        [Diagnostic::SymbolSkipped { symbol, .. }] if symbol == "B"
    ));
}

#[test]
fn fetch_histories_reports_empty_ranges() {
    let port = MockDataPort::new()
        .with_history("A", daily_points("2024-01-01", &[100.0, 101.0]))
        .with_history("B", daily_points("2023-01-01", &[100.0, 101.0]));

    let fetched = fetch_histories(
        &port,
        &["A".to_string(), "B".to_string()],
        date("2024-01-01"),
        date("2024-12-31"),
    )
    .unwrap();

    assert_eq!(fetched.histories.len(), 1);
    assert_eq!(fetched.histories[0].symbol, "A");
    assert_eq!(fetched.diagnostics.len(), 1);
}

#[test]
fn missing_benchmark_is_a_diagnostic_not_an_error() {
    let port = MockDataPort::new().with_history("A", daily_points("2024-01-01", &zigzag(30)));
    let mut config = make_config("A:1.0", StrategyKind::BuyHold);
    config.benchmark_symbol = Some("QQQ".to_string());

    let results = run_with_data_port(&config, &port).unwrap();

    assert!(results.benchmark_comparison.is_none());
    assert!(matches!(
        &results.diagnostics[..],
        [Diagnostic::BenchmarkUnavailable { symbol, .. }] if symbol == "QQQ"
    ));
}

#[test]
fn benchmark_identical_to_portfolio() {
    let closes = zigzag(30);
    let port = MockDataPort::new()
        .with_history("A", daily_points("2024-01-01", &closes))
        .with_history("SPY", daily_points("2024-01-01", &closes));
    let mut config = make_config("A:1.0", StrategyKind::BuyHold);
    config.benchmark_symbol = Some("SPY".to_string());

    let results = run_with_data_port(&config, &port).unwrap();
    let cmp = results.benchmark_comparison.unwrap();

    assert_abs_diff_eq!(cmp.beta, 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(cmp.correlation, 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(cmp.tracking_error, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(cmp.benchmark_return, results.metrics.total_return, epsilon = 1e-9);
}

#[test]
fn runs_are_deterministic() {
    let port = MockDataPort::new()
        .with_history("A", daily_points("2024-01-01", &zigzag(90)))
        .with_history("B", daily_points("2024-01-01", &compounding(90, 0.003)))
        .with_history("C", daily_points("2024-01-01", &compounding(90, -0.002)));
    let config = make_config(
        "A:0.4, B:0.3, C:0.3",
        StrategyKind::Momentum(MomentumParams {
            lookback_period: 10,
            top_n: 2,
            positive_returns_only: false,
        }),
    );

    let first = run_with_data_port(&config, &port).unwrap();
    let second = run_with_data_port(&config, &port).unwrap();
    assert_eq!(first, second);
}

#[test]
fn gaps_are_forward_filled() {
    let mut b = daily_points("2024-01-01", &[50.0, 51.0, 52.0, 53.0]);
    b.remove(2);
    let histories = [
        SymbolHistory::new("A", daily_points("2024-01-01", &[100.0, 101.0, 102.0, 103.0])),
        SymbolHistory::new("B", b),
    ];
    let config = make_config("A:0.5, B:0.5", StrategyKind::BuyHold);

    let results = run_backtest(&config, &histories, None).unwrap();

    assert_eq!(results.dates.len(), 4);
    assert!(matches!(
        &results.diagnostics[..],
        [Diagnostic::PartialData { symbol, filled: 1 }] if symbol == "B"
    ));
}
