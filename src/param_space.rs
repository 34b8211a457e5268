//! Parameter-space sweeps over hardening-model shapes.
//!
//! A sweep draws (target time, inner slope, outer slope, characteristic
//! radius) combinations from configurable distributions, resolves the rate
//! normalization for a fixed set of binaries under each draw – exactly, or
//! through a freshly built interpolant – and reports one outcome per draw.
//! Failures are isolated per draw: one bad combination never aborts the rest
//! of the sweep.

use rand::Rng;
use rand_distr::StandardNormal;

use crate::constants::{Cm, Gram, MassRatio, Sec, GYR, PC};
use crate::hardening::fixed_time::{NormQuery, RateShape};
use crate::hardening::interpolant::{NormInterpolant, SampleRanges};
use crate::hardening::SolverParams;
use crate::inspiral_errors::InspiralError;

/// Scalar distribution over a physical parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDist {
    /// Uniform in linear space over `[lo, hi)`.
    Uniform { lo: f64, hi: f64 },
    /// Uniform in `log10` space over `[lo, hi)`.
    LogUniform { lo: f64, hi: f64 },
    /// Log-normal in base 10: `10^(log10(center) + dex * z)` with standard
    /// normal `z`, so `dex` is the width in decades.
    LogNormal { center: f64, dex: f64 },
}

impl ParamDist {
    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        match *self {
            ParamDist::Uniform { lo, hi } => rng.random_range(lo..hi),
            ParamDist::LogUniform { lo, hi } => {
                10.0_f64.powf(rng.random_range(lo.log10()..hi.log10()))
            }
            ParamDist::LogNormal { center, dex } => {
                let z: f64 = rng.sample(StandardNormal);
                10.0_f64.powf(center.log10() + dex * z)
            }
        }
    }
}

/// Distributions for the four swept hardening parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardeningSpace {
    /// Target total inspiral time [s].
    pub time: ParamDist,
    pub gamma_inner: ParamDist,
    pub gamma_outer: ParamDist,
    /// Characteristic radius [cm].
    pub rchar: ParamDist,
}

impl Default for HardeningSpace {
    /// Sweep ranges of the fiducial calibration runs: time log-uniform over
    /// 0.1–10 Gyr, inner slope uniform over [-1.5, -0.5], outer slope uniform
    /// over [+2, +3], characteristic radius log-uniform over 10–1000 pc.
    fn default() -> Self {
        HardeningSpace {
            time: ParamDist::LogUniform {
                lo: 0.1 * GYR,
                hi: 10.0 * GYR,
            },
            gamma_inner: ParamDist::Uniform { lo: -1.5, hi: -0.5 },
            gamma_outer: ParamDist::Uniform { lo: 2.0, hi: 3.0 },
            rchar: ParamDist::LogUniform {
                lo: 10.0 * PC,
                hi: 1.0e3 * PC,
            },
        }
    }
}

/// One drawn parameter combination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardeningDraw {
    pub time: Sec,
    pub gamma_inner: f64,
    pub gamma_outer: f64,
    pub rchar: Cm,
}

impl HardeningDraw {
    pub fn shape(&self) -> RateShape {
        RateShape::new(self.rchar, self.gamma_inner, self.gamma_outer)
    }
}

impl HardeningSpace {
    pub fn draw(&self, rng: &mut impl Rng) -> HardeningDraw {
        HardeningDraw {
            time: self.time.sample(rng),
            gamma_inner: self.gamma_inner.sample(rng),
            gamma_outer: self.gamma_outer.sample(rng),
            rchar: self.rchar.sample(rng),
        }
    }
}

/// How a sweep resolves normalizations for each draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NormMethod {
    /// Root-find every binary row (slow, exact).
    Exact,
    /// Build a [`NormInterpolant`] per draw over the given sampling box and
    /// query it (amortized; pays off when the binary population is large).
    Interpolated(SampleRanges),
}

/// One binary of the swept population: (total mass, mass ratio, outer
/// separation cutoff).
pub type SweepBinary = (Gram, MassRatio, Cm);

/// Outcome of one draw: the drawn parameters and one normalization [cm/s] per
/// binary (`NaN` rows mark per-binary solver failures).
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSample {
    pub draw: HardeningDraw,
    pub norms: Vec<f64>,
}

/// Run a sweep of `num_draws` parameter combinations over a binary population.
///
/// Each draw is resolved independently and reported as its own `Result`;
/// draw-level failures (interpolant construction or exhaustion) do not abort
/// the remaining draws. With [`NormMethod::Exact`], per-binary failures show
/// up as `NaN` norms rather than errors.
pub fn sweep(
    space: &HardeningSpace,
    binaries: &[SweepBinary],
    num_draws: usize,
    method: &NormMethod,
    params: &SolverParams,
    rng: &mut impl Rng,
) -> Vec<Result<SweepSample, InspiralError>> {
    let mut outcomes = Vec::with_capacity(num_draws);
    for _ in 0..num_draws {
        let draw = space.draw(rng);
        let shape = draw.shape();
        let queries: Vec<NormQuery> = binaries
            .iter()
            .map(|&(mtot, mrat, sepa_init)| NormQuery {
                mtot,
                mrat,
                time: draw.time,
                sepa_init,
            })
            .collect();

        let norms = match method {
            NormMethod::Exact => Ok(shape.norm_for_time_batch(&queries, params)),
            NormMethod::Interpolated(ranges) => {
                NormInterpolant::build(&shape, ranges, params, rng)
                    .and_then(|interp| interp.norms(&queries))
            }
        };
        outcomes.push(norms.map(|norms| SweepSample { draw, norms }));
    }
    outcomes
}
