//! Report output port.

use crate::domain::backtest::BacktestResults;
use crate::domain::error::PortsimError;
use crate::domain::strategy::Strategy;

/// Port for writing backtest results.
pub trait ReportPort {
    fn write(
        &self,
        results: &BacktestResults,
        strategy: &Strategy,
        output_path: &str,
    ) -> Result<(), PortsimError>;
}
