//! Momentum: hold the top-N symbols by trailing compounded return.
//!
//! score[s](i) = Π(1 + r[s][k]) - 1 for k in [i - lookback, i)
//! Ties keep input order. Non-finite scores are never selected.

use crate::domain::rolling::trailing_window;
use crate::domain::stats::compound_return;
use crate::domain::strategy::{MomentumParams, StrategyInput, fully_invested_single};
use crate::domain::weights::{WeightMatrix, fold_rebalances};

pub fn calculate_momentum(input: &StrategyInput<'_>, params: &MomentumParams) -> WeightMatrix {
    if input.symbol_count() == 1 {
        return fully_invested_single(input);
    }
    let lookback = params.lookback_period;
    fold_rebalances(
        input.symbols(),
        &input.prices.dates,
        lookback,
        input.schedule,
        |i| {
            let scores = trailing_returns(input, i, lookback);
            let eligible: Vec<bool> = scores
                .iter()
                .map(|s| !params.positive_returns_only || *s > 0.0)
                .collect();
            select_top_n(&scores, &eligible, params.top_n)
        },
    )
}

/// Compounded return of each symbol over the `lookback` periods before `i`.
/// NaN when the window is not available.
pub(crate) fn trailing_returns(input: &StrategyInput<'_>, i: usize, lookback: usize) -> Vec<f64> {
    input
        .returns
        .returns
        .iter()
        .map(|column| {
            trailing_window(column, i, lookback)
                .map(compound_return)
                .unwrap_or(f64::NAN)
        })
        .collect()
}

/// Equal weight across the `top_n` highest finite, eligible scores.
/// Nothing eligible means an all-cash row.
pub(crate) fn select_top_n(scores: &[f64], eligible: &[bool], top_n: usize) -> Vec<f64> {
    let mut ranked: Vec<usize> = (0..scores.len())
        .filter(|&s| scores[s].is_finite() && eligible.get(s).copied().unwrap_or(false))
        .collect();
    // Stable sort: equal scores keep input order.
    ranked.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(top_n);

    let mut weights = vec![0.0; scores.len()];
    if ranked.is_empty() {
        return weights;
    }
    let each = 1.0 / ranked.len() as f64;
    for s in ranked {
        weights[s] = each;
    }
    weights
}
