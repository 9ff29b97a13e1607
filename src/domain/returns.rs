//! Simple period-over-period returns.

use crate::domain::alignment::PriceMatrix;

/// Per-symbol return columns sharing the price axis. Period 0 is always 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnMatrix {
    pub symbols: Vec<String>,
    pub returns: Vec<Vec<f64>>,
}

impl ReturnMatrix {
    pub fn from_prices(prices: &PriceMatrix) -> Self {
        ReturnMatrix {
            symbols: prices.symbols.clone(),
            returns: prices.prices.iter().map(|c| simple_returns(c)).collect(),
        }
    }

    pub fn period_count(&self) -> usize {
        self.returns.first().map_or(0, Vec::len)
    }
}

/// `r[0] = 0`, `r[i] = p[i] / p[i-1] - 1`.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(prices.len());
    if prices.is_empty() {
        return out;
    }
    out.push(0.0);
    out.extend(prices.windows(2).map(|w| {
        if w[0] > 0.0 {
            w[1] / w[0] - 1.0
        } else {
            0.0
        }
    }));
    out
}
