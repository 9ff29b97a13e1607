//! Configuration loading and validation.
//!
//! Every field is checked before any data is fetched. Errors name the
//! offending `[section] key`.

use crate::domain::backtest::{BacktestConfig, DEFAULT_INITIAL_CAPITAL, DEFAULT_RISK_FREE_RATE};
use crate::domain::error::PortsimError;
use crate::domain::portfolio::Portfolio;
use crate::domain::schedule::RebalanceFrequency;
use crate::domain::strategy::{Strategy, StrategyKind};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use log::warn;
use std::str::FromStr;

/// Keys understood in `[strategy]` besides `id` and `type`.
pub const STRATEGY_PARAMETERS: [&str; 11] = [
    "lookback_period",
    "top_n",
    "ma_period",
    "deviation_threshold",
    "volatility_window",
    "risk_on_allocation",
    "risk_off_allocation",
    "number_of_sectors",
    "benchmark_symbol",
    "rebalance_frequency",
    "positive_returns_only",
];

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), PortsimError> {
    build_backtest_config(config).map(|_| ())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), PortsimError> {
    build_strategy(config).map(|_| ())
}

/// Resolve and validate the full backtest configuration.
pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, PortsimError> {
    let initial_capital = validate_initial_capital(config)?;
    let risk_free_rate = validate_risk_free_rate(config)?;
    let (start_date, end_date) = validate_dates(config)?;
    let rebalancing_frequency = match non_empty(config, "backtest", "rebalancing_frequency") {
        Some(s) => parse_frequency("backtest", "rebalancing_frequency", &s)?,
        None => RebalanceFrequency::default(),
    };
    let portfolio = build_portfolio(config)?;
    let strategy = build_strategy(config)?;

    Ok(BacktestConfig {
        portfolio,
        strategy,
        start_date,
        end_date,
        initial_capital,
        rebalancing_frequency,
        risk_free_rate,
        benchmark_symbol: non_empty(config, "backtest", "benchmark_symbol")
            .map(|s| s.to_uppercase()),
    })
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<f64, PortsimError> {
    let value = optional_number(config, "backtest", "initial_capital")?
        .unwrap_or(DEFAULT_INITIAL_CAPITAL);
    if !(value > 0.0 && value.is_finite()) {
        return Err(PortsimError::invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(value)
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<f64, PortsimError> {
    let value =
        optional_number(config, "backtest", "risk_free_rate")?.unwrap_or(DEFAULT_RISK_FREE_RATE);
    if !(0.0..1.0).contains(&value) {
        return Err(PortsimError::invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(value)
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), PortsimError> {
    let start_str = config.get_string("backtest", "start_date");
    let end_str = config.get_string("backtest", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(PortsimError::invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok((start_date, end_date))
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, PortsimError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => Err(PortsimError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            PortsimError::invalid(
                "backtest",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

pub fn build_portfolio(config: &dyn ConfigPort) -> Result<Portfolio, PortsimError> {
    let holdings =
        non_empty(config, "portfolio", "holdings").ok_or_else(|| PortsimError::ConfigMissing {
            section: "portfolio".to_string(),
            key: "holdings".to_string(),
        })?;
    Portfolio::parse(&holdings)
        .map_err(|e| PortsimError::invalid("portfolio", "holdings", e.to_string()))
}

/// Build the strategy from `[strategy]`, applying defaults for every
/// parameter that is not given.
pub fn build_strategy(config: &dyn ConfigPort) -> Result<Strategy, PortsimError> {
    let type_name =
        non_empty(config, "strategy", "type").ok_or_else(|| PortsimError::ConfigMissing {
            section: "strategy".to_string(),
            key: "type".to_string(),
        })?;
    let mut kind = StrategyKind::with_defaults(&type_name).ok_or_else(|| {
        PortsimError::invalid(
            "strategy",
            "type",
            format!(
                "unknown strategy type '{}' (expected one of {})",
                type_name,
                StrategyKind::TYPE_NAMES.join(", ")
            ),
        )
    })?;

    for key in config.keys("strategy") {
        if key != "id" && key != "type" && !STRATEGY_PARAMETERS.contains(&key.as_str()) {
            warn!("ignoring unknown strategy parameter '{}'", key);
        }
    }

    match &mut kind {
        StrategyKind::BuyHold => {}
        StrategyKind::Momentum(p) => {
            override_param(config, "lookback_period", &mut p.lookback_period)?;
            override_param(config, "top_n", &mut p.top_n)?;
            override_bool(config, "positive_returns_only", &mut p.positive_returns_only)?;
        }
        StrategyKind::RelativeStrength(p) => {
            override_param(config, "lookback_period", &mut p.lookback_period)?;
            override_param(config, "top_n", &mut p.top_n)?;
            override_bool(config, "positive_returns_only", &mut p.positive_returns_only)?;
            if let Some(symbol) = non_empty(config, "strategy", "benchmark_symbol") {
                p.benchmark_symbol = symbol.to_uppercase();
            }
        }
        StrategyKind::MeanReversion(p) => {
            override_param(config, "ma_period", &mut p.ma_period)?;
            override_param(config, "deviation_threshold", &mut p.deviation_threshold)?;
        }
        StrategyKind::RiskParity(p) => {
            override_param(config, "volatility_window", &mut p.volatility_window)?;
        }
        StrategyKind::TacticalAllocation(p) => {
            override_param(config, "ma_period", &mut p.ma_period)?;
            override_param(config, "risk_on_allocation", &mut p.risk_on_allocation)?;
            override_param(config, "risk_off_allocation", &mut p.risk_off_allocation)?;
        }
        StrategyKind::Rotation(p) => {
            override_param(config, "number_of_sectors", &mut p.number_of_sectors)?;
            override_bool(config, "positive_returns_only", &mut p.positive_returns_only)?;
        }
    }
    kind.validate()?;

    let rebalance_frequency = match non_empty(config, "strategy", "rebalance_frequency") {
        Some(s) => Some(parse_frequency("strategy", "rebalance_frequency", &s)?),
        None => None,
    };
    let id = non_empty(config, "strategy", "id").unwrap_or_else(|| kind.type_name().to_string());

    Ok(Strategy {
        id,
        kind,
        rebalance_frequency,
    })
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn optional_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, PortsimError> {
    match non_empty(config, section, key) {
        None => Ok(None),
        Some(s) => s
            .parse::<f64>()
            .map(Some)
            .map_err(|_| PortsimError::invalid(section, key, format!("'{s}' is not a number"))),
    }
}

fn override_param<T: FromStr>(
    config: &dyn ConfigPort,
    key: &str,
    target: &mut T,
) -> Result<(), PortsimError> {
    if let Some(s) = non_empty(config, "strategy", key) {
        *target = s.parse().map_err(|_| {
            PortsimError::invalid("strategy", key, format!("'{s}' is not a valid {key}"))
        })?;
    }
    Ok(())
}

fn override_bool(config: &dyn ConfigPort, key: &str, target: &mut bool) -> Result<(), PortsimError> {
    if let Some(s) = non_empty(config, "strategy", key) {
        *target = match s.to_lowercase().as_str() {
            "true" | "yes" | "1" => true,
            "false" | "no" | "0" => false,
            _ => {
                return Err(PortsimError::invalid(
                    "strategy",
                    key,
                    format!("'{s}' is not a boolean"),
                ));
            }
        };
    }
    Ok(())
}

fn parse_frequency(
    section: &str,
    key: &str,
    value: &str,
) -> Result<RebalanceFrequency, PortsimError> {
    value
        .parse()
        .map_err(|reason: String| PortsimError::invalid(section, key, reason))
}
