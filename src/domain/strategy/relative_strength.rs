//! Relative strength: momentum ranked on excess trailing return.
//!
//! When `benchmark_symbol` is part of the portfolio, only symbols whose
//! trailing return beats the benchmark's are candidates, and the benchmark
//! itself is held when nothing beats it. Otherwise every symbol is ranked
//! against the cross-sectional mean of the traded symbols.

use crate::domain::stats::mean;
use crate::domain::strategy::momentum::{select_top_n, trailing_returns};
use crate::domain::strategy::{RelativeStrengthParams, StrategyInput, fully_invested_single};
use crate::domain::weights::{WeightMatrix, fold_rebalances};

pub fn calculate_relative_strength(
    input: &StrategyInput<'_>,
    params: &RelativeStrengthParams,
) -> WeightMatrix {
    if input.symbol_count() == 1 {
        return fully_invested_single(input);
    }
    let benchmark_index = input
        .symbols()
        .iter()
        .position(|s| *s == params.benchmark_symbol);
    let lookback = params.lookback_period;

    fold_rebalances(
        input.symbols(),
        &input.prices.dates,
        lookback,
        input.schedule,
        |i| {
            let raw = trailing_returns(input, i, lookback);
            let positive = |s: usize| !params.positive_returns_only || raw[s] > 0.0;
            match benchmark_index {
                Some(b) => {
                    let scores: Vec<f64> = raw.iter().map(|r| r - raw[b]).collect();
                    let eligible: Vec<bool> = (0..raw.len())
                        .map(|s| scores[s] > 0.0 && positive(s))
                        .collect();
                    if eligible.iter().any(|e| *e) {
                        return select_top_n(&scores, &eligible, params.top_n);
                    }
                    let mut weights = vec![0.0; raw.len()];
                    if raw[b].is_finite() && positive(b) {
                        weights[b] = 1.0;
                    }
                    weights
                }
                None => {
                    let finite: Vec<f64> = raw.iter().copied().filter(|r| r.is_finite()).collect();
                    let reference = mean(&finite);
                    let scores: Vec<f64> = raw.iter().map(|r| r - reference).collect();
                    let eligible: Vec<bool> = (0..raw.len()).map(positive).collect();
                    select_top_n(&scores, &eligible, params.top_n)
                }
            }
        },
    )
}
