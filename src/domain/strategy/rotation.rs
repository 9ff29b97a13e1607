//! Sector rotation: momentum over a fixed 90-period lookback, holding the
//! strongest `number_of_sectors` symbols.

use crate::domain::strategy::momentum::calculate_momentum;
use crate::domain::strategy::{MomentumParams, RotationParams, StrategyInput};
use crate::domain::weights::WeightMatrix;

pub const ROTATION_LOOKBACK: usize = 90;

pub fn calculate_rotation(input: &StrategyInput<'_>, params: &RotationParams) -> WeightMatrix {
    let momentum = MomentumParams {
        lookback_period: ROTATION_LOOKBACK,
        top_n: params.number_of_sectors,
        positive_returns_only: params.positive_returns_only,
    };
    calculate_momentum(input, &momentum)
}
