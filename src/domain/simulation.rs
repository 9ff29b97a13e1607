//! Portfolio simulation.
//!
//! r_p[0] = 0
//! r_p[i] = Σ_s w[s][i-1] * r[s][i]     (weights lag returns by one period)
//! V[0]   = initial_capital
//! V[i]   = V[i-1] * (1 + r_p[i])

use crate::domain::returns::ReturnMatrix;
use crate::domain::stats::drawdown_series;
use crate::domain::weights::WeightMatrix;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioTrajectory {
    pub values: Vec<f64>,
    pub returns: Vec<f64>,
    pub drawdown: Vec<f64>,
    pub dates: Vec<NaiveDate>,
}

impl PortfolioTrajectory {
    pub fn final_value(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

pub fn simulate(
    weights: &WeightMatrix,
    returns: &ReturnMatrix,
    dates: &[NaiveDate],
    initial_capital: f64,
) -> PortfolioTrajectory {
    let periods = dates.len();
    let mut values = Vec::with_capacity(periods);
    let mut portfolio_returns = Vec::with_capacity(periods);

    if periods > 0 {
        values.push(initial_capital);
        portfolio_returns.push(0.0);
    }

    for i in 1..periods {
        let previous = weights.row(i - 1);
        let period_return: f64 = previous
            .iter()
            .zip(&returns.returns)
            .map(|(w, column)| w * column[i])
            .sum();
        portfolio_returns.push(period_return);
        values.push(values[i - 1] * (1.0 + period_return));
    }

    let drawdown = drawdown_series(&values);
    PortfolioTrajectory {
        values,
        returns: portfolio_returns,
        drawdown,
        dates: dates.to_vec(),
    }
}
