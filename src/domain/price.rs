//! Historical price points as delivered by a data source.

use chrono::NaiveDate;

/// One day of trading data. Any numeric field may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adjusted_close: Option<f64>,
    pub volume: Option<i64>,
}

impl PricePoint {
    /// Close-only point, the common case for adjusted series.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        PricePoint {
            date,
            open: None,
            high: None,
            low: None,
            close: Some(close),
            adjusted_close: None,
            volume: None,
        }
    }

    /// Adjusted close, falling back to close. Zero, negative and non-finite
    /// values count as missing.
    pub fn reference_price(&self) -> Option<f64> {
        let valid = |v: &f64| v.is_finite() && *v > 0.0;
        self.adjusted_close
            .filter(valid)
            .or_else(|| self.close.filter(valid))
    }
}

/// Full history for one symbol, in whatever order the source returned it.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolHistory {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl SymbolHistory {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Self {
        SymbolHistory {
            symbol: symbol.into(),
            points,
        }
    }
}

/// Live quote, only used outside the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}
