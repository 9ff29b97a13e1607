//! Domain error types and non-fatal backtest diagnostics.

use chrono::NaiveDate;
use serde::Serialize;

/// Top-level error type for portsim.
#[derive(Debug, thiserror::Error)]
pub enum PortsimError {
    #[error("data source error for {symbol}: {reason}")]
    DataSource { symbol: String, reason: String },

    #[error(
        "no overlapping price data for {} between {start} and {end}",
        .symbols.join(",")
    )]
    NoData {
        symbols: Vec<String>,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PortsimError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        PortsimError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&PortsimError> for std::process::ExitCode {
    fn from(err: &PortsimError) -> Self {
        let code: u8 = match err {
            PortsimError::Io(_) | PortsimError::Json(_) | PortsimError::Report { .. } => 1,
            PortsimError::ConfigParse { .. }
            | PortsimError::ConfigMissing { .. }
            | PortsimError::ConfigInvalid { .. } => 2,
            PortsimError::DataSource { .. } => 3,
            PortsimError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

/// Conditions a backtest recovers from. Surfaced alongside the results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Gaps in a symbol's history were forward-filled.
    PartialData { symbol: String, filled: usize },
    /// A symbol could not be fetched and was left out of the run.
    SymbolSkipped { symbol: String, reason: String },
    /// No benchmark comparison could be produced.
    BenchmarkUnavailable { symbol: String, reason: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::PartialData { symbol, filled } => {
                write!(f, "{symbol}: forward-filled {filled} missing dates")
            }
            Diagnostic::SymbolSkipped { symbol, reason } => {
                write!(f, "{symbol}: skipped ({reason})")
            }
            Diagnostic::BenchmarkUnavailable { symbol, reason } => {
                write!(f, "benchmark {symbol} unavailable ({reason})")
            }
        }
    }
}
