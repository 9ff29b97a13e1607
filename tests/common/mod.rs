#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use portsim::domain::backtest::{
    BacktestConfig, DEFAULT_INITIAL_CAPITAL, DEFAULT_RISK_FREE_RATE,
};
use portsim::domain::error::PortsimError;
use portsim::domain::portfolio::Portfolio;
pub use portsim::domain::price::{PricePoint, Quote, SymbolHistory};
use portsim::domain::schedule::RebalanceFrequency;
use portsim::domain::strategy::{Strategy, StrategyKind};
use portsim::ports::data_port::DataPort;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_history(mut self, symbol: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), points);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_history(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, PortsimError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(PortsimError::DataSource {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.date >= start_date && p.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn current_price(&self, symbol: &str) -> Result<Quote, PortsimError> {
        let last = self
            .data
            .get(symbol)
            .and_then(|points| points.last())
            .and_then(PricePoint::reference_price)
            .ok_or_else(|| PortsimError::DataSource {
                symbol: symbol.to_string(),
                reason: "no data".to_string(),
            })?;
        Ok(Quote {
            price: last,
            change: 0.0,
            change_percent: 0.0,
        })
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// One close-only point per consecutive calendar day from `start`.
pub fn daily_points(start: &str, closes: &[f64]) -> Vec<PricePoint> {
    let start = date(start);
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| PricePoint::from_close(start + Duration::days(i as i64), *close))
        .collect()
}

/// `periods` closes compounding at `rate` per period from 100.
pub fn compounding(periods: usize, rate: f64) -> Vec<f64> {
    (0..periods).map(|i| 100.0 * (1.0 + rate).powi(i as i32)).collect()
}

pub fn make_config(holdings: &str, kind: StrategyKind) -> BacktestConfig {
    BacktestConfig {
        portfolio: Portfolio::parse(holdings).unwrap(),
        strategy: Strategy::new(kind),
        start_date: date("2024-01-01"),
        end_date: date("2024-12-31"),
        initial_capital: DEFAULT_INITIAL_CAPITAL,
        rebalancing_frequency: RebalanceFrequency::Monthly,
        risk_free_rate: DEFAULT_RISK_FREE_RATE,
        benchmark_symbol: None,
    }
}

/// Write `<dir>/<symbol>.csv` with a `date,close` header.
pub fn write_price_csv(dir: &Path, symbol: &str, points: &[PricePoint]) {
    let mut file = std::fs::File::create(dir.join(format!("{}.csv", symbol))).unwrap();
    writeln!(file, "date,close").unwrap();
    for p in points {
        writeln!(file, "{},{}", p.date.format("%Y-%m-%d"), p.close.unwrap()).unwrap();
    }
}
