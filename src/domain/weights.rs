//! Per-period target weights.
//!
//! Storage is one preallocated period-major buffer (`periods * symbols`),
//! owned by a single backtest run.

use crate::domain::schedule::RebalanceSchedule;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix {
    symbols: Vec<String>,
    periods: usize,
    data: Vec<f64>,
}

impl WeightMatrix {
    pub fn zeros(symbols: Vec<String>, periods: usize) -> Self {
        let data = vec![0.0; symbols.len() * periods];
        WeightMatrix {
            symbols,
            periods,
            data,
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn period_count(&self) -> usize {
        self.periods
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() || self.periods == 0
    }

    pub fn row(&self, period: usize) -> &[f64] {
        let n = self.symbols.len();
        &self.data[period * n..(period + 1) * n]
    }

    pub fn set_row(&mut self, period: usize, weights: &[f64]) {
        let n = self.symbols.len();
        self.data[period * n..(period + 1) * n].copy_from_slice(weights);
    }

    pub fn get(&self, period: usize, symbol_index: usize) -> f64 {
        self.data[period * self.symbols.len() + symbol_index]
    }

    pub fn column(&self, symbol_index: usize) -> Vec<f64> {
        (0..self.periods)
            .map(|p| self.get(p, symbol_index))
            .collect()
    }

    pub fn row_sum(&self, period: usize) -> f64 {
        self.row(period).iter().sum()
    }

    /// Symbol-keyed columns, the shape written to the results file.
    pub fn to_columns(&self) -> BTreeMap<String, Vec<f64>> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), self.column(i)))
            .collect()
    }
}

pub fn equal_weights(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

/// Fold a `{last_weight}` state left to right over the date axis.
///
/// Before `warmup` every row is equal weight. At `warmup` itself and on every
/// scheduled date after it, `target(i)` is evaluated and becomes the new
/// state; every other row repeats the state unchanged.
pub fn fold_rebalances<F>(
    symbols: &[String],
    dates: &[NaiveDate],
    warmup: usize,
    schedule: &RebalanceSchedule,
    mut target: F,
) -> WeightMatrix
where
    F: FnMut(usize) -> Vec<f64>,
{
    let n = symbols.len();
    let mut matrix = WeightMatrix::zeros(symbols.to_vec(), dates.len());
    if n == 0 {
        return matrix;
    }

    let equal = equal_weights(n);
    let mut last_weight = equal.clone();
    for (i, date) in dates.iter().enumerate() {
        if i < warmup {
            matrix.set_row(i, &equal);
            continue;
        }
        if i == warmup || schedule.contains(*date) {
            last_weight = sanitize(target(i), n);
        }
        matrix.set_row(i, &last_weight);
    }
    matrix
}

/// Clamp a candidate row into the feasible set: finite, non-negative, summing
/// to at most one. A malformed row degrades to all cash.
fn sanitize(mut weights: Vec<f64>, n: usize) -> Vec<f64> {
    if weights.len() != n {
        return vec![0.0; n];
    }
    for w in weights.iter_mut() {
        if !w.is_finite() || *w < 0.0 {
            *w = 0.0;
        }
    }
    let total: f64 = weights.iter().sum();
    if total > 1.0 {
        for w in weights.iter_mut() {
            *w /= total;
        }
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schedule::RebalanceFrequency;

    fn axis(n: i64) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n).map(|i| start + chrono::Duration::days(i)).collect()
    }

    fn symbols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rows_and_columns() {
        let mut m = WeightMatrix::zeros(symbols(&["A", "B"]), 3);
        m.set_row(1, &[0.25, 0.75]);
        assert_eq!(m.row(0), &[0.0, 0.0]);
        assert_eq!(m.row(1), &[0.25, 0.75]);
        assert_eq!(m.column(1), vec![0.0, 0.75, 0.0]);
        assert!((m.row_sum(1) - 1.0).abs() < f64::EPSILON);
        assert_eq!(m.to_columns()["A"], vec![0.0, 0.25, 0.0]);
    }

    #[test]
    fn warmup_rows_are_equal_weight() {
        let dates = axis(10);
        let schedule = RebalanceSchedule::build(&dates, RebalanceFrequency::Daily);
        let m = fold_rebalances(&symbols(&["A", "B", "C", "D"]), &dates, 4, &schedule, |_| {
            vec![1.0, 0.0, 0.0, 0.0]
        });
        for i in 0..4 {
            assert_eq!(m.row(i), &[0.25; 4]);
        }
        assert_eq!(m.row(4), &[1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn carries_forward_between_rebalances() {
        let dates = axis(40);
        let schedule = RebalanceSchedule::build(&dates, RebalanceFrequency::Monthly);
        let mut calls = Vec::new();
        let m = fold_rebalances(&symbols(&["A", "B"]), &dates, 3, &schedule, |i| {
            calls.push(i);
            vec![i as f64 / 100.0, 0.0]
        });
        // 2024-02-05 is the first Monday of February, index 35.
        assert_eq!(calls, vec![3, 35]);
        for i in 3..35 {
            assert_eq!(m.row(i), m.row(3));
        }
        assert_eq!(m.get(35, 0), 0.35);
    }

    #[test]
    fn infeasible_targets_are_clamped() {
        let dates = axis(2);
        let schedule = RebalanceSchedule::build(&dates, RebalanceFrequency::Daily);
        let m = fold_rebalances(&symbols(&["A", "B"]), &dates, 0, &schedule, |i| {
            if i == 0 {
                vec![f64::NAN, -1.0]
            } else {
                vec![1.5, 0.5]
            }
        });
        assert_eq!(m.row(0), &[0.0, 0.0]);
        assert!((m.row_sum(1) - 1.0).abs() < 1e-12);
        assert!((m.get(1, 0) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn empty_symbol_set() {
        let dates = axis(5);
        let schedule = RebalanceSchedule::build(&dates, RebalanceFrequency::Daily);
        let m = fold_rebalances(&[], &dates, 0, &schedule, |_| Vec::new());
        assert!(m.is_empty());
    }
}
