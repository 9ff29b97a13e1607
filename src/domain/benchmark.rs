//! Benchmark comparison.
//!
//! Both series are right-aligned to their common length so the most recent
//! periods are compared. Every ratio goes through `safe_ratio`.

use crate::domain::price::SymbolHistory;
use crate::domain::returns::simple_returns;
use crate::domain::stats::{
    TRADING_DAYS_PER_YEAR, annualize_return, annualized_volatility, compound_return, covariance,
    mean, safe_ratio, std_dev,
};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComparison {
    pub benchmark_symbol: String,
    pub benchmark_return: f64,
    pub benchmark_annualized_return: f64,
    pub benchmark_volatility: f64,
    pub benchmark_sharpe: f64,
    pub beta: f64,
    pub alpha: f64,
    pub correlation: f64,
    pub tracking_error: f64,
    pub information_ratio: f64,
    pub treynor_ratio: f64,
    pub up_capture: f64,
    pub down_capture: f64,
}

/// Keep the trailing `min(a, b)` periods of both series.
pub fn right_align<'a>(a: &'a [f64], b: &'a [f64]) -> (&'a [f64], &'a [f64]) {
    let n = a.len().min(b.len());
    (&a[a.len() - n..], &b[b.len() - n..])
}

/// Simple returns of a benchmark history restricted to `[first, last]`.
pub fn benchmark_returns(history: &SymbolHistory, first: NaiveDate, last: NaiveDate) -> Vec<f64> {
    let mut points: Vec<(NaiveDate, f64)> = history
        .points
        .iter()
        .filter(|p| p.date >= first && p.date <= last)
        .filter_map(|p| p.reference_price().map(|price| (p.date, price)))
        .collect();
    points.sort_by_key(|(date, _)| *date);
    points.dedup_by_key(|(date, _)| *date);
    let prices: Vec<f64> = points.into_iter().map(|(_, price)| price).collect();
    simple_returns(&prices)
}

pub fn compare(
    benchmark_symbol: &str,
    portfolio_returns: &[f64],
    benchmark_returns: &[f64],
    risk_free_rate: f64,
) -> Option<BenchmarkComparison> {
    let (portfolio, benchmark) = right_align(portfolio_returns, benchmark_returns);
    if portfolio.is_empty() {
        return None;
    }
    let periods = portfolio.len();

    let benchmark_return = compound_return(benchmark);
    let benchmark_annualized_return = annualize_return(benchmark_return, periods);
    let benchmark_volatility = annualized_volatility(benchmark);
    let benchmark_sharpe = safe_ratio(
        benchmark_annualized_return - risk_free_rate,
        benchmark_volatility,
    );

    let portfolio_annualized = annualize_return(compound_return(portfolio), periods);

    let cov = covariance(portfolio, benchmark);
    let beta = safe_ratio(cov, std_dev(benchmark).powi(2));
    let alpha = portfolio_annualized - beta * benchmark_annualized_return;
    let correlation = safe_ratio(cov, std_dev(portfolio) * std_dev(benchmark));

    let active: Vec<f64> = portfolio
        .iter()
        .zip(benchmark)
        .map(|(p, b)| p - b)
        .collect();
    let tracking_error = annualized_volatility(&active);
    let information_ratio = safe_ratio(mean(&active) * TRADING_DAYS_PER_YEAR, tracking_error);
    let treynor_ratio = safe_ratio(portfolio_annualized - risk_free_rate, beta);

    Some(BenchmarkComparison {
        benchmark_symbol: benchmark_symbol.to_string(),
        benchmark_return,
        benchmark_annualized_return,
        benchmark_volatility,
        benchmark_sharpe,
        beta,
        alpha,
        correlation,
        tracking_error,
        information_ratio,
        treynor_ratio,
        up_capture: capture(portfolio, benchmark, |b| b > 0.0),
        down_capture: capture(portfolio, benchmark, |b| b < 0.0),
    })
}

/// Mean portfolio return over mean benchmark return, on periods selected by
/// the benchmark's sign.
fn capture(portfolio: &[f64], benchmark: &[f64], select: impl Fn(f64) -> bool) -> f64 {
    let (p, b): (Vec<f64>, Vec<f64>) = portfolio
        .iter()
        .zip(benchmark)
        .filter(|(_, b)| select(**b))
        .map(|(p, b)| (*p, *b))
        .unzip();
    if b.is_empty() {
        return 0.0;
    }
    safe_ratio(mean(&p), mean(&b))
}
