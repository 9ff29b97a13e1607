//! Per-asset breakdown of a finished backtest.

use crate::domain::alignment::PriceMatrix;
use crate::domain::returns::simple_returns;
use crate::domain::stats::{
    annualize_return, annualized_volatility, compound_return, drawdown_series, mean, safe_ratio,
};
use crate::domain::weights::WeightMatrix;
use serde::Serialize;

/// Weights at or below this count as not invested.
const INVESTED_THRESHOLD: f64 = 0.001;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPerformance {
    pub symbol: String,
    pub allocation: f64,
    pub initial_weight: f64,
    pub final_weight: f64,
    pub avg_weight: f64,
    pub percentage_time_invested: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    /// `avg_weight * total_return`
    pub contribution: f64,
}

/// One entry per symbol, in matrix order. `targets` follows the same order.
pub fn calculate_asset_performance(
    prices: &PriceMatrix,
    weights: &WeightMatrix,
    targets: &[f64],
    risk_free_rate: f64,
) -> Vec<AssetPerformance> {
    prices
        .symbols
        .iter()
        .enumerate()
        .map(|(s, symbol)| {
            let column = &prices.prices[s];
            let weight_column = weights.column(s);

            // The leading zero return is an artefact of the axis, not an observation.
            let returns: Vec<f64> = simple_returns(column).into_iter().skip(1).collect();
            let total_return = compound_return(&returns);
            let annualized_return = annualize_return(total_return, returns.len());
            let volatility = annualized_volatility(&returns);
            let avg_weight = mean(&weight_column);

            let invested = weight_column
                .iter()
                .filter(|w| **w > INVESTED_THRESHOLD)
                .count();

            AssetPerformance {
                symbol: symbol.clone(),
                allocation: targets.get(s).copied().unwrap_or(0.0),
                initial_weight: weight_column.first().copied().unwrap_or(0.0),
                final_weight: weight_column.last().copied().unwrap_or(0.0),
                avg_weight,
                percentage_time_invested: safe_ratio(invested as f64, weight_column.len() as f64),
                total_return,
                annualized_return,
                volatility,
                sharpe_ratio: safe_ratio(annualized_return - risk_free_rate, volatility),
                max_drawdown: drawdown_series(column)
                    .into_iter()
                    .fold(0.0_f64, f64::min),
                contribution: avg_weight * total_return,
            }
        })
        .collect()
}
