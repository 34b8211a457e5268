use inspiral::constants::PC;
use inspiral::{RateShape, SolverParams};

/// The fiducial shape used across the integration tests: characteristic
/// radius 100 pc, inner slope -1.0, outer slope +2.5.
pub fn fiducial_shape() -> RateShape {
    RateShape::new(100.0 * PC, -1.0, 2.5)
}

/// Solver configuration with a coarser radial grid, to keep the batched
/// integration tests fast. Accuracy of the round-trip identities does not
/// depend on the grid density because the same integrator is used on both
/// sides.
pub fn fast_params() -> SolverParams {
    SolverParams::builder().num_rads(60).build().unwrap()
}
