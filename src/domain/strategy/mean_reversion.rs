//! Mean reversion: overweight symbols trading well below their moving average.
//!
//! deviation[s](i) = (P[s][i] - SMA[s](i)) / SMA[s](i)
//! Symbols with deviation < -threshold share the book in proportion to
//! |deviation|. If none qualify, equal weight.

use crate::domain::rolling::rolling_mean;
use crate::domain::stats::safe_ratio;
use crate::domain::strategy::{MeanReversionParams, StrategyInput};
use crate::domain::weights::{WeightMatrix, equal_weights, fold_rebalances};

pub fn calculate_mean_reversion(
    input: &StrategyInput<'_>,
    params: &MeanReversionParams,
) -> WeightMatrix {
    let n = input.symbol_count();
    let moving_averages: Vec<Vec<Option<f64>>> = input
        .prices
        .prices
        .iter()
        .map(|column| rolling_mean(column, params.ma_period))
        .collect();

    fold_rebalances(
        input.symbols(),
        &input.prices.dates,
        params.ma_period,
        input.schedule,
        |i| {
            let deviations: Vec<f64> = (0..n)
                .map(|s| match moving_averages[s][i] {
                    Some(ma) if ma > 0.0 => safe_ratio(input.prices.prices[s][i] - ma, ma),
                    _ => 0.0,
                })
                .collect();

            let oversold: Vec<usize> = (0..n)
                .filter(|&s| deviations[s] < -params.deviation_threshold)
                .collect();
            if oversold.is_empty() {
                return equal_weights(n);
            }

            let total: f64 = oversold.iter().map(|&s| deviations[s].abs()).sum();
            let mut weights = vec![0.0; n];
            for s in oversold {
                weights[s] = safe_ratio(deviations[s].abs(), total);
            }
            weights
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schedule::RebalanceFrequency;
    use crate::domain::strategy::test_support::{Fixture, assert_rows_bounded};

    fn params(ma_period: usize, threshold: f64) -> MeanReversionParams {
        MeanReversionParams {
            ma_period,
            deviation_threshold: threshold,
        }
    }

    #[test]
    fn no_oversold_symbols_means_equal_weight() {
        // Both symbols drift slightly above their averages.
        let a: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.1).collect();
        let b: Vec<f64> = (0..60).map(|i| 50.0 + i as f64 * 0.05).collect();
        let fixture = Fixture::new(&[("A", a), ("B", b)], RebalanceFrequency::Weekly);
        let m = calculate_mean_reversion(&fixture.input(), &params(5, 0.1));
        for i in 0..60 {
            assert_eq!(m.row(i), &[0.5, 0.5]);
        }
    }

    #[test]
    fn weights_oversold_by_deviation_magnitude() {
        let mut a = vec![100.0; 10];
        a.push(60.0);
        let mut b = vec![100.0; 10];
        b.push(80.0);
        let c = vec![100.0; 11];
        let fixture = Fixture::new(&[("A", a), ("B", b), ("C", c)], RebalanceFrequency::Daily);
        let m = calculate_mean_reversion(&fixture.input(), &params(4, 0.1));

        // SMA(4) at index 10: A = 90, B = 95
        let dev_a = (60.0_f64 - 90.0) / 90.0;
        let dev_b = (80.0_f64 - 95.0) / 95.0;
        let total = dev_a.abs() + dev_b.abs();
        let row = m.row(10);
        assert!((row[0] - dev_a.abs() / total).abs() < 1e-12);
        assert!((row[1] - dev_b.abs() / total).abs() < 1e-12);
        assert_eq!(row[2], 0.0);
        assert!(row[0] > row[1]);
        assert_rows_bounded(&m);
    }

    #[test]
    fn mild_dip_does_not_trigger() {
        let mut a = vec![100.0; 10];
        a.push(95.0);
        let b = vec![100.0; 11];
        let fixture = Fixture::new(&[("A", a), ("B", b)], RebalanceFrequency::Daily);
        let m = calculate_mean_reversion(&fixture.input(), &params(4, 0.1));
        assert_eq!(m.row(10), &[0.5, 0.5]);
    }
}
