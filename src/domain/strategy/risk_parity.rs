//! Risk parity: inverse annualized volatility weights.
//!
//! vol[s](i) = stddev(r[s][i - window .. i]) * sqrt(252)
//! A symbol with zero volatility keeps the equal-weight share 1/n; the rest of
//! the book is split by inverse volatility among the others.

use crate::domain::rolling::trailing_window;
use crate::domain::stats::annualized_volatility;
use crate::domain::strategy::{RiskParityParams, StrategyInput};
use crate::domain::weights::{WeightMatrix, equal_weights, fold_rebalances};

pub fn calculate_risk_parity(input: &StrategyInput<'_>, params: &RiskParityParams) -> WeightMatrix {
    let n = input.symbol_count();
    let window = params.volatility_window;

    fold_rebalances(
        input.symbols(),
        &input.prices.dates,
        window,
        input.schedule,
        |i| {
            let vols: Vec<f64> = input
                .returns
                .returns
                .iter()
                .map(|column| {
                    trailing_window(column, i, window)
                        .map(annualized_volatility)
                        .unwrap_or(0.0)
                })
                .collect();
            inverse_volatility(&vols, n)
        },
    )
}

fn inverse_volatility(vols: &[f64], n: usize) -> Vec<f64> {
    let has_risk = |v: f64| v.is_finite() && v > 0.0;
    let riskless = vols.iter().filter(|&&v| !has_risk(v)).count();
    if riskless == n {
        return equal_weights(n);
    }

    let equal_share = 1.0 / n as f64;
    let remaining = 1.0 - riskless as f64 * equal_share;
    let inverse_total: f64 = vols.iter().filter(|&&v| has_risk(v)).map(|v| 1.0 / v).sum();

    vols.iter()
        .map(|&v| {
            if has_risk(v) {
                remaining * (1.0 / v) / inverse_total
            } else {
                equal_share
            }
        })
        .collect()
}
