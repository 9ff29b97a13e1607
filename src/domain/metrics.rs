//! Performance metrics of a simulated return series.
//!
//! All annualisation uses 252 periods per year. An empty or zero-variance
//! return series yields all-zero metrics.

use crate::domain::stats::{
    TRADING_DAYS_PER_YEAR, annualize_return, annualized_volatility, compound_return, mean,
    quantile, safe_ratio, std_dev,
};
use serde::Serialize;

/// Profit factor reported when there are gains but no losses.
pub const PROFIT_FACTOR_CAP: f64 = 1000.0;

const VAR_QUANTILE: f64 = 0.05;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
    pub var95: f64,
    pub cvar95: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
}

impl PerformanceMetrics {
    pub fn compute(returns: &[f64], drawdown: &[f64], risk_free_rate: f64) -> Self {
        if is_degenerate(returns) {
            return PerformanceMetrics::default();
        }

        let total_return = compound_return(returns);
        let annualized_return = annualize_return(total_return, returns.len());
        let volatility = annualized_volatility(returns);
        let sharpe_ratio = safe_ratio(annualized_return - risk_free_rate, volatility);

        let max_drawdown = drawdown.iter().copied().fold(0.0_f64, f64::min);
        let max_drawdown_duration = max_drawdown_duration(drawdown);

        let sortino_ratio = sortino(returns, annualized_return, risk_free_rate);
        let calmar_ratio = safe_ratio(annualized_return, max_drawdown.abs());

        let var95 = quantile(returns, VAR_QUANTILE);
        let tail: Vec<f64> = returns.iter().copied().filter(|r| *r <= var95).collect();
        let cvar95 = if tail.is_empty() { var95 } else { mean(&tail) };

        let wins = returns.iter().filter(|r| **r > 0.0).count();
        let win_rate = wins as f64 / returns.len() as f64;

        PerformanceMetrics {
            total_return,
            annualized_return,
            volatility,
            sharpe_ratio,
            max_drawdown,
            max_drawdown_duration,
            sortino_ratio,
            calmar_ratio,
            var95,
            cvar95,
            win_rate,
            profit_factor: profit_factor(returns),
        }
    }
}

/// Empty, constant, or zero sample deviation.
pub(crate) fn is_degenerate(returns: &[f64]) -> bool {
    match returns.first() {
        None => true,
        Some(&first) => returns.iter().all(|r| *r == first) || std_dev(returns) == 0.0,
    }
}

/// Excess annual return over annualised downside deviation.
fn sortino(returns: &[f64], annualized_return: f64, risk_free_rate: f64) -> f64 {
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    if downside.is_empty() {
        return 0.0;
    }
    let downside_deviation = std_dev(&downside) * TRADING_DAYS_PER_YEAR.sqrt();
    safe_ratio(annualized_return - risk_free_rate, downside_deviation)
}

/// Gross gains over gross losses, capped at [`PROFIT_FACTOR_CAP`].
pub fn profit_factor(returns: &[f64]) -> f64 {
    let gains: f64 = returns.iter().filter(|r| **r > 0.0).sum();
    let losses: f64 = returns.iter().filter(|r| **r < 0.0).map(|r| r.abs()).sum();
    if losses == 0.0 {
        return if gains > 0.0 { PROFIT_FACTOR_CAP } else { 0.0 };
    }
    safe_ratio(gains, losses).min(PROFIT_FACTOR_CAP)
}

/// Longest run of consecutive periods spent below a prior peak.
pub fn max_drawdown_duration(drawdown: &[f64]) -> usize {
    let mut longest = 0usize;
    let mut current = 0usize;
    for &d in drawdown {
        if d < 0.0 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
