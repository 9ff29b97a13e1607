//! JSON report adapter implementing ReportPort.
//!
//! Writes one pretty-printed document: the strategy that produced the run and
//! the full `BacktestResults`. An output path of `-` writes to stdout.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::domain::backtest::BacktestResults;
use crate::domain::error::PortsimError;
use crate::domain::strategy::Strategy;
use crate::ports::report_port::ReportPort;
use log::info;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StrategySummary<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    parameters: String,
    rebalance_frequency: Option<String>,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    strategy: StrategySummary<'a>,
    #[serde(flatten)]
    results: &'a BacktestResults,
}

pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }

    fn document<'a>(results: &'a BacktestResults, strategy: &'a Strategy) -> ReportDocument<'a> {
        ReportDocument {
            strategy: StrategySummary {
                id: &strategy.id,
                kind: strategy.kind.type_name(),
                parameters: strategy.kind.describe_params(),
                rebalance_frequency: strategy.rebalance_frequency.map(|f| f.to_string()),
            },
            results,
        }
    }

    pub fn to_writer<W: Write>(
        &self,
        writer: W,
        results: &BacktestResults,
        strategy: &Strategy,
    ) -> Result<(), PortsimError> {
        let mut writer = writer;
        serde_json::to_writer_pretty(&mut writer, &Self::document(results, strategy))?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl Default for JsonReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        results: &BacktestResults,
        strategy: &Strategy,
        output_path: &str,
    ) -> Result<(), PortsimError> {
        if output_path == "-" {
            return self.to_writer(io::stdout().lock(), results, strategy);
        }
        let file = File::create(output_path).map_err(|e| PortsimError::Report {
            reason: format!("failed to create {}: {}", output_path, e),
        })?;
        self.to_writer(BufWriter::new(file), results, strategy)?;
        info!("results written to {}", output_path);
        Ok(())
    }
}
