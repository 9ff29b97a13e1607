//! Tactical allocation: growth/defensive split switched by a market regime.
//!
//! The first symbol is the regime proxy. Risk-on when its price is above its
//! `ma_period` moving average. The first `n / 2` symbols form the growth
//! group, the rest the defensive group. Each group's allocation is split
//! evenly inside the group; an empty group's allocation stays in cash.

use crate::domain::rolling::rolling_mean;
use crate::domain::strategy::{StrategyInput, TacticalParams};
use crate::domain::weights::{WeightMatrix, fold_rebalances};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    RiskOn,
    RiskOff,
}

pub fn calculate_tactical(input: &StrategyInput<'_>, params: &TacticalParams) -> WeightMatrix {
    let n = input.symbol_count();
    let Some(market) = input.prices.prices.first() else {
        return WeightMatrix::zeros(Vec::new(), input.prices.period_count());
    };
    let market_ma = rolling_mean(market, params.ma_period);

    fold_rebalances(
        input.symbols(),
        &input.prices.dates,
        params.ma_period,
        input.schedule,
        |i| {
            let regime = match market_ma[i] {
                Some(ma) if market[i] > ma => Regime::RiskOn,
                _ => Regime::RiskOff,
            };
            split_by_regime(n, regime, params)
        },
    )
}

pub fn split_by_regime(n: usize, regime: Regime, params: &TacticalParams) -> Vec<f64> {
    let n_growth = n / 2;
    let n_defensive = n - n_growth;
    let (growth_total, defensive_total) = match regime {
        Regime::RiskOn => (params.risk_on_allocation, params.risk_off_allocation),
        Regime::RiskOff => (params.risk_off_allocation, params.risk_on_allocation),
    };
    let per = |total: f64, count: usize| if count > 0 { total / count as f64 } else { 0.0 };
    let growth = per(growth_total, n_growth);
    let defensive = per(defensive_total, n_defensive);

    (0..n)
        .map(|s| if s < n_growth { growth } else { defensive })
        .collect()
}
