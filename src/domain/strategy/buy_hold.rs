//! Buy-and-hold: the target allocation on every period, never rescheduled.
//!
//! Allocations are used as given. If the targets sum to less than one the
//! remainder is held as cash; they are never renormalised.

use crate::domain::strategy::StrategyInput;
use crate::domain::weights::WeightMatrix;

pub fn calculate_buy_hold(input: &StrategyInput<'_>) -> WeightMatrix {
    let n = input.symbol_count();
    let periods = input.prices.period_count();
    let mut matrix = WeightMatrix::zeros(input.symbols().to_vec(), periods);
    if n == 0 {
        return matrix;
    }

    let row: Vec<f64> = (0..n)
        .map(|i| {
            input
                .targets
                .get(i)
                .copied()
                .filter(|w| w.is_finite() && *w > 0.0)
                .unwrap_or(0.0)
        })
        .collect();
    for i in 0..periods {
        matrix.set_row(i, &row);
    }
    matrix
}
