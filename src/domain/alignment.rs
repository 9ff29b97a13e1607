//! Price alignment onto a shared trading calendar.
//!
//! Every symbol's history is reduced to its reference price (adjusted close,
//! else close), the union of all dates inside the window becomes the axis,
//! gaps are forward-filled and leading dates are dropped until every symbol
//! has a valid price.

use crate::domain::error::{Diagnostic, PortsimError};
use crate::domain::price::SymbolHistory;
use chrono::NaiveDate;
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

/// Per-symbol price columns on one strictly increasing date axis.
///
/// Invariant: every column has `dates.len()` entries, all strictly positive.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceMatrix {
    pub symbols: Vec<String>,
    pub dates: Vec<NaiveDate>,
    pub prices: Vec<Vec<f64>>,
}

impl PriceMatrix {
    pub fn period_count(&self) -> usize {
        self.dates.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn column(&self, symbol: &str) -> Option<&[f64]> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.prices[i].as_slice())
    }
}

/// Aligned prices plus the forward-fill diagnostics raised on the way.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub matrix: PriceMatrix,
    pub diagnostics: Vec<Diagnostic>,
}

/// Build the unified date axis from every history, restricted to the window.
pub fn build_date_axis(
    histories: &[SymbolHistory],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<NaiveDate> {
    let unique: BTreeSet<NaiveDate> = histories
        .iter()
        .flat_map(|h| h.points.iter().map(|p| p.date))
        .filter(|d| *d >= start && *d <= end)
        .collect();
    unique.into_iter().collect()
}

pub fn align_prices(
    histories: &[SymbolHistory],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Alignment, PortsimError> {
    let no_data = || PortsimError::NoData {
        symbols: histories.iter().map(|h| h.symbol.clone()).collect(),
        start,
        end,
    };

    if histories.is_empty() {
        return Err(no_data());
    }

    let mut lookups: Vec<BTreeMap<NaiveDate, f64>> = Vec::with_capacity(histories.len());
    for history in histories {
        let lookup: BTreeMap<NaiveDate, f64> = history
            .points
            .iter()
            .filter(|p| p.date >= start && p.date <= end)
            .filter_map(|p| p.reference_price().map(|price| (p.date, price)))
            .collect();
        if lookup.is_empty() {
            return Err(PortsimError::NoData {
                symbols: vec![history.symbol.clone()],
                start,
                end,
            });
        }
        lookups.push(lookup);
    }

    let axis = build_date_axis(histories, start, end);

    // Zero marks "no valid price yet".
    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(histories.len());
    let mut fill_indices: Vec<Vec<usize>> = Vec::with_capacity(histories.len());
    for lookup in &lookups {
        let mut column = Vec::with_capacity(axis.len());
        let mut last_valid = 0.0_f64;
        let mut fills = Vec::new();
        for (i, date) in axis.iter().enumerate() {
            match lookup.get(date) {
                Some(&price) => last_valid = price,
                None if last_valid > 0.0 => fills.push(i),
                None => {}
            }
            column.push(last_valid);
        }
        columns.push(column);
        fill_indices.push(fills);
    }

    let first_complete = (0..axis.len()).find(|&i| columns.iter().all(|c| c[i] > 0.0));
    let Some(first) = first_complete else {
        return Err(no_data());
    };

    if first > 0 {
        debug!("dropping {} leading dates without full coverage", first);
    }

    let dates = axis[first..].to_vec();
    let prices: Vec<Vec<f64>> = columns.into_iter().map(|c| c[first..].to_vec()).collect();

    let mut diagnostics = Vec::new();
    // Fills on trimmed leading dates never reach the matrix.
    for (history, fills) in histories.iter().zip(&fill_indices) {
        let filled = fills.iter().filter(|&&i| i >= first).count();
        if filled > 0 {
            warn!("{}: forward-filled {} missing dates", history.symbol, filled);
            diagnostics.push(Diagnostic::PartialData {
                symbol: history.symbol.clone(),
                filled,
            });
        }
    }

    Ok(Alignment {
        matrix: PriceMatrix {
            symbols: histories.iter().map(|h| h.symbol.clone()).collect(),
            dates,
            prices,
        },
        diagnostics,
    })
}
