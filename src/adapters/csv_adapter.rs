//! CSV file data adapter.
//!
//! One file per symbol, `<base>/<SYMBOL>.csv`, with a header row. Columns are
//! located by name: `date` and `close` are required; `open`, `high`, `low`,
//! `adj_close` (or `adjusted_close`) and `volume` are optional. Empty cells
//! are missing values.

use crate::domain::error::PortsimError;
use crate::domain::price::{PricePoint, Quote};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use log::debug;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: usize,
    adjusted_close: Option<usize>,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(symbol: &str, headers: &csv::StringRecord) -> Result<Self, PortsimError> {
        let required = |name: &str| {
            column_index(headers, &[name]).ok_or_else(|| PortsimError::DataSource {
                symbol: symbol.to_string(),
                reason: format!("missing {} column", name),
            })
        };
        Ok(Columns {
            date: required("date")?,
            open: column_index(headers, &["open"]),
            high: column_index(headers, &["high"]),
            low: column_index(headers, &["low"]),
            close: required("close")?,
            adjusted_close: column_index(headers, &["adj_close", "adjusted_close", "adj close"]),
            volume: column_index(headers, &["volume"]),
        })
    }
}

fn column_index(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.trim().to_lowercase();
        names.iter().any(|n| *n == h)
    })
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// Every row of the symbol's file, sorted by date.
    fn read_all(&self, symbol: &str) -> Result<Vec<PricePoint>, PortsimError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| PortsimError::DataSource {
            symbol: symbol.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| PortsimError::DataSource {
            symbol: symbol.to_string(),
            reason: format!("CSV header error: {}", e),
        })?;
        let columns = Columns::from_headers(symbol, headers)?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| PortsimError::DataSource {
                symbol: symbol.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;
            points.push(parse_record(symbol, &record, &columns)?);
        }
        points.sort_by_key(|p| p.date);
        debug!("{}: read {} rows from {}", symbol, points.len(), path.display());
        Ok(points)
    }
}

fn parse_record(
    symbol: &str,
    record: &csv::StringRecord,
    columns: &Columns,
) -> Result<PricePoint, PortsimError> {
    let bad = |what: &str, value: &str| PortsimError::DataSource {
        symbol: symbol.to_string(),
        reason: format!("invalid {} value '{}'", what, value),
    };

    let date_str = record.get(columns.date).unwrap_or("").trim();
    let date =
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| bad("date", date_str))?;

    let number = |index: Option<usize>, what: &str| -> Result<Option<f64>, PortsimError> {
        match index.and_then(|i| record.get(i)).map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s.parse::<f64>().map(Some).map_err(|_| bad(what, s)),
        }
    };

    let volume = match columns.volume.and_then(|i| record.get(i)).map(str::trim) {
        None | Some("") => None,
        // Some sources write volume as a float.
        Some(s) => Some(
            s.parse::<i64>()
                .or_else(|_| s.parse::<f64>().map(|v| v as i64))
                .map_err(|_| bad("volume", s))?,
        ),
    };

    Ok(PricePoint {
        date,
        open: number(columns.open, "open")?,
        high: number(columns.high, "high")?,
        low: number(columns.low, "low")?,
        close: number(Some(columns.close), "close")?,
        adjusted_close: number(columns.adjusted_close, "adj_close")?,
        volume,
    })
}

impl DataPort for CsvAdapter {
    fn fetch_history(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, PortsimError> {
        Ok(self
            .read_all(symbol)?
            .into_iter()
            .filter(|p| p.date >= start_date && p.date <= end_date)
            .collect())
    }

    fn current_price(&self, symbol: &str) -> Result<Quote, PortsimError> {
        let prices: Vec<f64> = self
            .read_all(symbol)?
            .iter()
            .filter_map(PricePoint::reference_price)
            .collect();
        let (price, previous) = match prices.as_slice() {
            [] => {
                return Err(PortsimError::DataSource {
                    symbol: symbol.to_string(),
                    reason: "no valid prices".to_string(),
                });
            }
            [only] => (*only, *only),
            [.., previous, last] => (*last, *previous),
        };
        let change = price - previous;
        Ok(Quote {
            price,
            change,
            change_percent: change / previous * 100.0,
        })
    }
}
