//! Strategy weight generators.
//!
//! A `Strategy` is a closed sum over the seven allocation algorithms. Every
//! variant produces a [`WeightMatrix`] on the aligned date axis:
//! - `buy_hold`: constant caller-supplied allocations
//! - `momentum`, `relative_strength`, `rotation`: top-N ranking on trailing returns
//! - `mean_reversion`: overweight symbols trading below their moving average
//! - `risk_parity`: inverse-volatility weights
//! - `tactical_allocation`: growth/defensive split driven by a market regime
//!
//! All variants except buy-and-hold hold equal weight during warm-up and then
//! recompute only on schedule dates (and at the index where warm-up ends).

pub mod buy_hold;
pub mod mean_reversion;
pub mod momentum;
pub mod relative_strength;
pub mod risk_parity;
pub mod rotation;
pub mod tactical;

use crate::domain::alignment::PriceMatrix;
use crate::domain::error::PortsimError;
use crate::domain::returns::ReturnMatrix;
use crate::domain::schedule::{RebalanceFrequency, RebalanceSchedule};
use crate::domain::weights::WeightMatrix;
use std::fmt;

/// Everything a generator may read for one backtest run.
#[derive(Debug, Clone, Copy)]
pub struct StrategyInput<'a> {
    pub prices: &'a PriceMatrix,
    pub returns: &'a ReturnMatrix,
    pub schedule: &'a RebalanceSchedule,
    /// Target allocation per symbol, in `prices.symbols` order.
    pub targets: &'a [f64],
}

impl StrategyInput<'_> {
    pub fn symbols(&self) -> &[String] {
        &self.prices.symbols
    }

    pub fn symbol_count(&self) -> usize {
        self.prices.symbols.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MomentumParams {
    pub lookback_period: usize,
    pub top_n: usize,
    pub positive_returns_only: bool,
}

impl Default for MomentumParams {
    fn default() -> Self {
        MomentumParams {
            lookback_period: 60,
            top_n: 3,
            positive_returns_only: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelativeStrengthParams {
    pub lookback_period: usize,
    pub top_n: usize,
    pub benchmark_symbol: String,
    pub positive_returns_only: bool,
}

impl Default for RelativeStrengthParams {
    fn default() -> Self {
        RelativeStrengthParams {
            lookback_period: 126,
            top_n: 2,
            benchmark_symbol: "SPY".to_string(),
            positive_returns_only: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeanReversionParams {
    pub ma_period: usize,
    pub deviation_threshold: f64,
}

impl Default for MeanReversionParams {
    fn default() -> Self {
        MeanReversionParams {
            ma_period: 50,
            deviation_threshold: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskParityParams {
    pub volatility_window: usize,
}

impl Default for RiskParityParams {
    fn default() -> Self {
        RiskParityParams {
            volatility_window: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TacticalParams {
    pub ma_period: usize,
    pub risk_on_allocation: f64,
    pub risk_off_allocation: f64,
}

impl Default for TacticalParams {
    fn default() -> Self {
        TacticalParams {
            ma_period: 200,
            risk_on_allocation: 0.8,
            risk_off_allocation: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotationParams {
    pub number_of_sectors: usize,
    pub positive_returns_only: bool,
}

impl Default for RotationParams {
    fn default() -> Self {
        RotationParams {
            number_of_sectors: 3,
            positive_returns_only: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyKind {
    BuyHold,
    Momentum(MomentumParams),
    RelativeStrength(RelativeStrengthParams),
    MeanReversion(MeanReversionParams),
    RiskParity(RiskParityParams),
    TacticalAllocation(TacticalParams),
    Rotation(RotationParams),
}

impl StrategyKind {
    pub const TYPE_NAMES: [&'static str; 7] = [
        "buy_hold",
        "momentum",
        "relative_strength",
        "mean_reversion",
        "risk_parity",
        "tactical_allocation",
        "rotation",
    ];

    /// The variant for `type_name` with every parameter at its default.
    pub fn with_defaults(type_name: &str) -> Option<StrategyKind> {
        let kind = match type_name.trim().to_lowercase().as_str() {
            "buy_hold" => StrategyKind::BuyHold,
            "momentum" => StrategyKind::Momentum(MomentumParams::default()),
            "relative_strength" => StrategyKind::RelativeStrength(RelativeStrengthParams::default()),
            "mean_reversion" => StrategyKind::MeanReversion(MeanReversionParams::default()),
            "risk_parity" => StrategyKind::RiskParity(RiskParityParams::default()),
            "tactical_allocation" => StrategyKind::TacticalAllocation(TacticalParams::default()),
            "rotation" => StrategyKind::Rotation(RotationParams::default()),
            _ => return None,
        };
        Some(kind)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            StrategyKind::BuyHold => "buy_hold",
            StrategyKind::Momentum(_) => "momentum",
            StrategyKind::RelativeStrength(_) => "relative_strength",
            StrategyKind::MeanReversion(_) => "mean_reversion",
            StrategyKind::RiskParity(_) => "risk_parity",
            StrategyKind::TacticalAllocation(_) => "tactical_allocation",
            StrategyKind::Rotation(_) => "rotation",
        }
    }

    /// Number of leading periods held at equal weight.
    pub fn warmup(&self) -> usize {
        match self {
            StrategyKind::BuyHold => 0,
            StrategyKind::Momentum(p) => p.lookback_period,
            StrategyKind::RelativeStrength(p) => p.lookback_period,
            StrategyKind::MeanReversion(p) => p.ma_period,
            StrategyKind::RiskParity(p) => p.volatility_window,
            StrategyKind::TacticalAllocation(p) => p.ma_period,
            StrategyKind::Rotation(_) => rotation::ROTATION_LOOKBACK,
        }
    }

    /// Human-readable parameter list, e.g. `lookback_period=60, top_n=3`.
    pub fn describe_params(&self) -> String {
        match self {
            StrategyKind::BuyHold => "target allocations from [portfolio] holdings".to_string(),
            StrategyKind::Momentum(p) => format!(
                "lookback_period={}, top_n={}, positive_returns_only={}",
                p.lookback_period, p.top_n, p.positive_returns_only
            ),
            StrategyKind::RelativeStrength(p) => format!(
                "lookback_period={}, top_n={}, benchmark_symbol={}, positive_returns_only={}",
                p.lookback_period, p.top_n, p.benchmark_symbol, p.positive_returns_only
            ),
            StrategyKind::MeanReversion(p) => format!(
                "ma_period={}, deviation_threshold={}",
                p.ma_period, p.deviation_threshold
            ),
            StrategyKind::RiskParity(p) => format!("volatility_window={}", p.volatility_window),
            StrategyKind::TacticalAllocation(p) => format!(
                "ma_period={}, risk_on_allocation={}, risk_off_allocation={}",
                p.ma_period, p.risk_on_allocation, p.risk_off_allocation
            ),
            StrategyKind::Rotation(p) => format!(
                "number_of_sectors={}, positive_returns_only={}",
                p.number_of_sectors, p.positive_returns_only
            ),
        }
    }

    /// Range checks on parameters. Errors name the offending `[strategy]` key.
    pub fn validate(&self) -> Result<(), PortsimError> {
        let positive = |key: &str, value: usize| {
            if value == 0 {
                Err(PortsimError::invalid("strategy", key, format!("{key} must be positive")))
            } else {
                Ok(())
            }
        };
        match self {
            StrategyKind::BuyHold => Ok(()),
            StrategyKind::Momentum(p) => {
                positive("lookback_period", p.lookback_period)?;
                positive("top_n", p.top_n)
            }
            StrategyKind::RelativeStrength(p) => {
                positive("lookback_period", p.lookback_period)?;
                positive("top_n", p.top_n)
            }
            StrategyKind::MeanReversion(p) => {
                positive("ma_period", p.ma_period)?;
                if !(p.deviation_threshold >= 0.0 && p.deviation_threshold < 1.0) {
                    return Err(PortsimError::invalid(
                        "strategy",
                        "deviation_threshold",
                        "deviation_threshold must be between 0 and 1",
                    ));
                }
                Ok(())
            }
            StrategyKind::RiskParity(p) => {
                if p.volatility_window < 2 {
                    return Err(PortsimError::invalid(
                        "strategy",
                        "volatility_window",
                        "volatility_window must be at least 2",
                    ));
                }
                Ok(())
            }
            StrategyKind::TacticalAllocation(p) => {
                positive("ma_period", p.ma_period)?;
                for (key, value) in [
                    ("risk_on_allocation", p.risk_on_allocation),
                    ("risk_off_allocation", p.risk_off_allocation),
                ] {
                    if !(0.0..=1.0).contains(&value) {
                        return Err(PortsimError::invalid(
                            "strategy",
                            key,
                            format!("{key} must be between 0 and 1"),
                        ));
                    }
                }
                if p.risk_on_allocation + p.risk_off_allocation > 1.0 + 1e-9 {
                    return Err(PortsimError::invalid(
                        "strategy",
                        "risk_off_allocation",
                        "risk_on_allocation + risk_off_allocation must not exceed 1",
                    ));
                }
                Ok(())
            }
            StrategyKind::Rotation(p) => positive("number_of_sectors", p.number_of_sectors),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.type_name(), self.describe_params())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub id: String,
    pub kind: StrategyKind,
    /// Overrides the backtest-wide frequency when set.
    pub rebalance_frequency: Option<RebalanceFrequency>,
}

impl Strategy {
    pub fn new(kind: StrategyKind) -> Self {
        Strategy {
            id: kind.type_name().to_string(),
            kind,
            rebalance_frequency: None,
        }
    }

    pub fn generate(&self, input: &StrategyInput<'_>) -> WeightMatrix {
        match &self.kind {
            StrategyKind::BuyHold => buy_hold::calculate_buy_hold(input),
            StrategyKind::Momentum(p) => momentum::calculate_momentum(input, p),
            StrategyKind::RelativeStrength(p) => {
                relative_strength::calculate_relative_strength(input, p)
            }
            StrategyKind::MeanReversion(p) => mean_reversion::calculate_mean_reversion(input, p),
            StrategyKind::RiskParity(p) => risk_parity::calculate_risk_parity(input, p),
            StrategyKind::TacticalAllocation(p) => tactical::calculate_tactical(input, p),
            StrategyKind::Rotation(p) => rotation::calculate_rotation(input, p),
        }
    }
}

/// Every period at weight 1.0 for a one-symbol portfolio.
pub(crate) fn fully_invested_single(input: &StrategyInput<'_>) -> WeightMatrix {
    let periods = input.prices.period_count();
    let mut matrix = WeightMatrix::zeros(input.symbols().to_vec(), periods);
    for i in 0..periods {
        matrix.set_row(i, &[1.0]);
    }
    matrix
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn type_names_round_trip() {
        for name in StrategyKind::TYPE_NAMES {
            let kind = StrategyKind::with_defaults(name).unwrap();
            assert_eq!(kind.type_name(), name);
        }
        assert!(StrategyKind::with_defaults("martingale").is_none());
    }

    #[test]
    fn defaults_match_catalogue() {
        assert_eq!(StrategyKind::with_defaults("momentum").unwrap().warmup(), 60);
        assert_eq!(
            StrategyKind::with_defaults("relative_strength").unwrap().warmup(),
            126
        );
        assert_eq!(
            StrategyKind::with_defaults("tactical_allocation").unwrap().warmup(),
            200
        );
        assert_eq!(StrategyKind::with_defaults("rotation").unwrap().warmup(), 90);
        assert_eq!(StrategyKind::BuyHold.warmup(), 0);
    }

    #[test]
    fn tactical_allocations_may_not_exceed_one() {
        let kind = StrategyKind::TacticalAllocation(TacticalParams {
            risk_on_allocation: 0.9,
            risk_off_allocation: 0.2,
            ..TacticalParams::default()
        });
        let err = kind.validate().unwrap_err();
        assert!(err.to_string().contains("must not exceed 1"));
    }

    #[test]
    fn zero_lookback_is_rejected() {
        let kind = StrategyKind::Momentum(MomentumParams {
            lookback_period: 0,
            ..MomentumParams::default()
        });
        assert!(matches!(
            kind.validate(),
            Err(PortsimError::ConfigInvalid { key, .. }) if key == "lookback_period"
        ));
    }

    #[test]
    fn defaults_are_valid() {
        for name in StrategyKind::TYPE_NAMES {
            StrategyKind::with_defaults(name).unwrap().validate().unwrap();
        }
    }

    #[test]
    fn every_variant_handles_empty_symbol_set() {
        let fixture = Fixture::new(&[], RebalanceFrequency::Monthly);
        for name in StrategyKind::TYPE_NAMES {
            let strategy = Strategy::new(StrategyKind::with_defaults(name).unwrap());
            let m = strategy.generate(&fixture.input());
            assert!(m.is_empty(), "{name}");
        }
    }

    #[test]
    fn every_variant_stays_within_weight_bounds() {
        let fixture = Fixture::new(
            &[
                ("A", trend(300, 0.002)),
                ("B", trend(300, -0.001)),
                ("C", trend(300, 0.0005)),
                ("D", trend(300, 0.001)),
            ],
            RebalanceFrequency::Weekly,
        );
        for name in StrategyKind::TYPE_NAMES {
            let strategy = Strategy::new(StrategyKind::with_defaults(name).unwrap());
            let m = strategy.generate(&fixture.input());
            assert_eq!(m.period_count(), 300);
            assert_rows_bounded(&m);
        }
    }

    #[test]
    fn every_variant_is_equal_weight_during_warmup() {
        let fixture = Fixture::new(
            &[
                ("A", trend(250, 0.003)),
                ("B", trend(250, -0.002)),
                ("C", trend(250, 0.001)),
            ],
            RebalanceFrequency::Monthly,
        );
        for name in StrategyKind::TYPE_NAMES {
            let kind = StrategyKind::with_defaults(name).unwrap();
            if kind == StrategyKind::BuyHold {
                continue;
            }
            let warmup = kind.warmup();
            let m = Strategy::new(kind).generate(&fixture.input());
            for i in 0..warmup.min(250) {
                for w in m.row(i) {
                    assert!((w - 1.0 / 3.0).abs() < 1e-12, "{name} row {i}");
                }
            }
        }
    }

    #[test]
    fn display_includes_parameters() {
        let kind = StrategyKind::with_defaults("momentum").unwrap();
        assert_eq!(
            kind.to_string(),
            "momentum(lookback_period=60, top_n=3, positive_returns_only=false)"
        );
    }
}
