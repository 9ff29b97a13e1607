//! Historical price access port.

use crate::domain::error::PortsimError;
use crate::domain::price::{PricePoint, Quote};
use chrono::NaiveDate;

pub trait DataPort {
    /// Price points for `symbol` between the two dates, inclusive. Order is
    /// not guaranteed; the aligner sorts.
    fn fetch_history(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, PortsimError>;

    /// Latest price and its change from the previous observation.
    fn current_price(&self, symbol: &str) -> Result<Quote, PortsimError>;
}
