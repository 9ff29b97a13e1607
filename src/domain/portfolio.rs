//! Portfolio holdings and their target allocations.
//!
//! Holdings are written `SYMBOL:allocation` separated by commas, for example
//! `SPY:0.6, TLT:0.4`. Allocations must sum to one within
//! [`ALLOCATION_TOLERANCE`]; they are never renormalised.

use std::collections::HashSet;

pub const ALLOCATION_TOLERANCE: f64 = 0.0001;

#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub symbol: String,
    pub allocation: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub holdings: Vec<Holding>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortfolioError {
    #[error("no holdings given")]
    Empty,

    #[error("empty token in holdings list")]
    EmptyToken,

    #[error("malformed holding '{0}', expected SYMBOL:allocation")]
    Malformed(String),

    #[error("invalid allocation for {symbol}: '{value}'")]
    InvalidAllocation { symbol: String, value: String },

    #[error("allocation for {symbol} must be in (0, 1], got {allocation}")]
    AllocationOutOfRange { symbol: String, allocation: f64 },

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("allocations sum to {0}, expected 1.0")]
    SumMismatch(f64),
}

impl Portfolio {
    /// Parse and validate a holdings list.
    pub fn parse(input: &str) -> Result<Self, PortfolioError> {
        let holdings = parse_holdings(input)?;
        let portfolio = Portfolio { holdings };
        portfolio.validate()?;
        Ok(portfolio)
    }

    pub fn validate(&self) -> Result<(), PortfolioError> {
        if self.holdings.is_empty() {
            return Err(PortfolioError::Empty);
        }
        let mut seen = HashSet::new();
        for h in &self.holdings {
            if !seen.insert(h.symbol.as_str()) {
                return Err(PortfolioError::DuplicateSymbol(h.symbol.clone()));
            }
            if !(h.allocation > 0.0 && h.allocation <= 1.0) {
                return Err(PortfolioError::AllocationOutOfRange {
                    symbol: h.symbol.clone(),
                    allocation: h.allocation,
                });
            }
        }
        let total = self.total_allocation();
        if (total - 1.0).abs() > ALLOCATION_TOLERANCE {
            return Err(PortfolioError::SumMismatch(total));
        }
        Ok(())
    }

    pub fn symbols(&self) -> Vec<String> {
        self.holdings.iter().map(|h| h.symbol.clone()).collect()
    }

    pub fn total_allocation(&self) -> f64 {
        self.holdings.iter().map(|h| h.allocation).sum()
    }

    /// Target allocation of `symbol`, zero when it is not held.
    pub fn allocation_of(&self, symbol: &str) -> f64 {
        self.holdings
            .iter()
            .find(|h| h.symbol == symbol)
            .map_or(0.0, |h| h.allocation)
    }
}

/// Split `SYM:alloc, SYM:alloc` into holdings. Symbols are upper-cased.
pub fn parse_holdings(input: &str) -> Result<Vec<Holding>, PortfolioError> {
    if input.trim().is_empty() {
        return Err(PortfolioError::Empty);
    }
    let mut holdings = Vec::new();
    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(PortfolioError::EmptyToken);
        }
        let Some((symbol, value)) = trimmed.split_once(':') else {
            return Err(PortfolioError::Malformed(trimmed.to_string()));
        };
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(PortfolioError::Malformed(trimmed.to_string()));
        }
        let allocation: f64 =
            value
                .trim()
                .parse()
                .map_err(|_| PortfolioError::InvalidAllocation {
                    symbol: symbol.clone(),
                    value: value.trim().to_string(),
                })?;
        holdings.push(Holding { symbol, allocation });
    }
    Ok(holdings)
}
