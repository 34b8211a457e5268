//! # Binary hardening models and solver configuration
//!
//! This module defines the [`Hardening`] capability trait, the configuration
//! struct [`SolverParams`] and its validated builder, and the pure
//! gravitational-wave hardening model [`GwOnly`].
//!
//! ## Purpose
//!
//! A *hardening model* prescribes the rate `da/dt < 0` at which a binary's
//! orbital separation shrinks. Everything downstream – the total-lifetime
//! integral, the fixed-lifetime normalization solver, the parameter-sweep
//! driver – is written against the [`Hardening`] trait rather than a concrete
//! model, so models can be exchanged without touching the drivers.
//!
//! ## Pipeline overview
//!
//! 1. **Rate evaluation** – a model reports `da/dt` for given component masses
//!    and separation ([`Hardening::dadt`]).
//!
//! 2. **Lifetime integration** – the total inspiral time from an initial
//!    separation down to the ISCO is the integral of `-1 / (da/dt)` over a
//!    log-spaced separation grid, evaluated with the log-log trapezoid rule
//!    ([`Hardening::lifetime`], provided for every model).
//!
//! 3. **Normalization solving** – the fixed-lifetime model
//!    ([`FixedTime`](fixed_time::FixedTime)) inverts step 2: it finds the rate
//!    normalization that makes the lifetime match a target
//!    ([`RateShape::norm_for_time`](fixed_time::RateShape::norm_for_time)).
//!
//! 4. **Interpolation** – large sweeps replace repeated solves with a
//!    pre-computed two-tier lookup
//!    ([`NormInterpolant`](interpolant::NormInterpolant)).
//!
//! ## Example
//!
//! ```rust
//! use inspiral::constants::{MSOL, PC};
//! use inspiral::hardening::{GwOnly, Hardening, SolverParams};
//!
//! let params = SolverParams::builder()
//!     .num_rads(200)
//!     .brent_eps(1e-12)
//!     .build()
//!     .unwrap();
//!
//! // Lifetime of a GW-only binary from 0.1 pc
//! let t = GwOnly.lifetime(1.0e9 * MSOL, 2.0e8 * MSOL, 0.1 * PC, &params);
//! assert!(t.is_finite() && t > 0.0);
//! ```
//!
//! ## See also
//!
//! * [`fixed_time::RateShape`] – double-power-law rate shape and normalization solver.
//! * [`interpolant::NormInterpolant`] – two-tier normalization lookup.
use crate::binary::rad_isco;
use crate::constants::{Cm, CmPerSec, Gram, Sec, PC};
use crate::gw;
use crate::inspiral_errors::InspiralError;
use crate::integrate::{log_space, trapz_loglog};
use std::cmp::Ordering::Greater;

pub mod fixed_time;
pub mod interpolant;

/// Capability contract for binary hardening models.
///
/// Implementors report the (negative) separation hardening rate; the trait
/// provides the numerical total-lifetime integral on top of it.
pub trait Hardening {
    /// Hardening rate `da/dt` [cm/s] at the given separation; negative while
    /// the binary is shrinking.
    fn dadt(&self, m1: Gram, m2: Gram, sepa: Cm) -> CmPerSec;

    /// Total inspiral time [s] from `sepa_init` down to the ISCO.
    ///
    /// Integrates `-1 / (da/dt)` over a log-spaced separation grid
    /// (`params.num_rads` points, inner edge floored at `params.rmin_floor`)
    /// with the log-log trapezoid rule.
    ///
    /// Return
    /// -----------------
    /// * The lifetime, or `NaN` when the inputs are non-physical or the rate
    ///   is non-negative anywhere on the grid (a stalled binary never merges
    ///   in this model).
    fn lifetime(&self, m1: Gram, m2: Gram, sepa_init: Cm, params: &SolverParams) -> Sec {
        if !(m1 > 0.0 && m2 > 0.0 && sepa_init > 0.0) {
            return f64::NAN;
        }
        let rmin = rad_isco(m1, m2).max(params.rmin_floor);
        if !(sepa_init > rmin) {
            return f64::NAN;
        }
        let rads = log_space(rmin, sepa_init, params.num_rads);
        let mut integrand = Vec::with_capacity(rads.len());
        for &rr in &rads {
            let dadt = self.dadt(m1, m2, rr);
            if !(dadt < 0.0) {
                return f64::NAN;
            }
            integrand.push(-1.0 / dadt);
        }
        trapz_loglog(&integrand, &rads, params.lntol)
    }
}

/// Purely GW-driven hardening (circular), the floor below every other model.
#[derive(Debug, Clone, Copy, Default)]
pub struct GwOnly;

impl Hardening for GwOnly {
    fn dadt(&self, m1: Gram, m2: Gram, sepa: Cm) -> CmPerSec {
        gw::hardening_rate_dadt(m1, m2, sepa, None)
    }
}

/// Configuration parameters for the lifetime integral, the normalization
/// root-find, and the interpolant builder.
///
/// Fields
/// -----------------
/// **Lifetime integral**
/// * `num_rads` – number of log-spaced separation grid points.
/// * `rmin_floor` – lower floor [cm] on the integration range; the actual inner
///   edge is `max(ISCO, rmin_floor)`.
/// * `lntol` – tolerance around a local power-law index of `-1` where the
///   log-log trapezoid rule switches to its logarithmic branch.
///
/// **Normalization root-find**
/// * `norm_guess` – initial normalization guess [cm/s] before target scaling.
/// * `bracket_width` – half-width [decades of normalization] of the initial
///   Brent bracket around the scaled guess.
/// * `bracket_max_expand` – how many times the bracket may be widened (by
///   `bracket_width` per step) while hunting for a sign change.
/// * `brent_eps` – convergence tolerance of the Brent iteration (in log10
///   normalization).
/// * `brent_max_iter` – iteration cap of the Brent iteration.
///
/// **Batching / interpolation**
/// * `chunk_size` – rows per chunk in batched solves (bounds peak memory and
///   sets the progress-reporting granularity).
/// * `interp_points` – number of random samples drawn when building a
///   normalization interpolant.
/// * `interp_neighbors` – points used for the local hyperplane fit of the
///   primary interpolant tier (must be at least 6 = dimension + 2).
///
/// Defaults
/// -----------------
/// * `num_rads`: 100
/// * `rmin_floor`: 1e-5 pc
/// * `lntol`: 1e-2
/// * `norm_guess`: 1e5 cm/s
/// * `bracket_width`: 2.0 decades
/// * `bracket_max_expand`: 4
/// * `brent_eps`: 1e-10
/// * `brent_max_iter`: 80
/// * `chunk_size`: 1000
/// * `interp_points`: 10_000
/// * `interp_neighbors`: 8
#[derive(Debug, Clone)]
pub struct SolverParams {
    pub num_rads: usize,
    pub rmin_floor: Cm,
    pub lntol: f64,
    pub norm_guess: CmPerSec,
    pub bracket_width: f64,
    pub bracket_max_expand: usize,
    pub brent_eps: f64,
    pub brent_max_iter: usize,
    pub chunk_size: usize,
    pub interp_points: usize,
    pub interp_neighbors: usize,
}

impl SolverParams {
    /// Construct a new [`SolverParams`] with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new [`SolverParamsBuilder`] to configure custom parameters.
    pub fn builder() -> SolverParamsBuilder {
        SolverParamsBuilder::new()
    }
}

impl Default for SolverParams {
    fn default() -> Self {
        SolverParams {
            num_rads: 100,
            rmin_floor: 1.0e-5 * PC,
            lntol: 1.0e-2,
            norm_guess: 1.0e5,
            bracket_width: 2.0,
            bracket_max_expand: 4,
            brent_eps: 1.0e-10,
            brent_max_iter: 80,
            chunk_size: 1000,
            interp_points: 10_000,
            interp_neighbors: 8,
        }
    }
}

/// Builder for [`SolverParams`], with validation.
#[derive(Debug, Clone)]
pub struct SolverParamsBuilder {
    params: SolverParams,
}

impl Default for SolverParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverParamsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            params: SolverParams::default(),
        }
    }

    // --- Lifetime integral ---
    pub fn num_rads(mut self, v: usize) -> Self {
        self.params.num_rads = v;
        self
    }
    pub fn rmin_floor(mut self, v: Cm) -> Self {
        self.params.rmin_floor = v;
        self
    }
    pub fn lntol(mut self, v: f64) -> Self {
        self.params.lntol = v;
        self
    }

    // --- Root-find ---
    pub fn norm_guess(mut self, v: CmPerSec) -> Self {
        self.params.norm_guess = v;
        self
    }
    pub fn bracket_width(mut self, v: f64) -> Self {
        self.params.bracket_width = v;
        self
    }
    pub fn bracket_max_expand(mut self, v: usize) -> Self {
        self.params.bracket_max_expand = v;
        self
    }
    pub fn brent_eps(mut self, v: f64) -> Self {
        self.params.brent_eps = v;
        self
    }
    pub fn brent_max_iter(mut self, v: usize) -> Self {
        self.params.brent_max_iter = v;
        self
    }

    // --- Batching / interpolation ---
    pub fn chunk_size(mut self, v: usize) -> Self {
        self.params.chunk_size = v;
        self
    }
    pub fn interp_points(mut self, v: usize) -> Self {
        self.params.interp_points = v;
        self
    }
    pub fn interp_neighbors(mut self, v: usize) -> Self {
        self.params.interp_neighbors = v;
        self
    }

    // ---- Numeric helpers for PartialOrd (handle NaN as invalid) ----

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Finalize the builder and produce a [`SolverParams`] instance.
    ///
    /// Validation rules
    /// -----------------
    /// * `num_rads >= 3` – the lifetime integral needs at least two intervals.
    /// * `rmin_floor > 0.0`, `lntol > 0.0`.
    /// * `norm_guess > 0.0`, `bracket_width > 0.0`, `brent_eps > 0.0`.
    /// * `brent_max_iter >= 1`, `chunk_size >= 1`.
    /// * `interp_neighbors >= 6` and `interp_points >= interp_neighbors`.
    ///
    /// Returns
    /// -----------------
    /// * `Ok(SolverParams)` if all values are valid.
    /// * `Err(InspiralError::InvalidSolverParams)` otherwise.
    pub fn build(self) -> Result<SolverParams, InspiralError> {
        let p = &self.params;
        if p.num_rads < 3 {
            return Err(InspiralError::InvalidSolverParams(
                "num_rads must be >= 3".into(),
            ));
        }
        if !Self::gt0(p.rmin_floor) {
            return Err(InspiralError::InvalidSolverParams(
                "rmin_floor must be > 0".into(),
            ));
        }
        if !Self::gt0(p.lntol) {
            return Err(InspiralError::InvalidSolverParams("lntol must be > 0".into()));
        }
        if !Self::gt0(p.norm_guess) {
            return Err(InspiralError::InvalidSolverParams(
                "norm_guess must be > 0".into(),
            ));
        }
        if !Self::gt0(p.bracket_width) {
            return Err(InspiralError::InvalidSolverParams(
                "bracket_width must be > 0".into(),
            ));
        }
        if !Self::gt0(p.brent_eps) {
            return Err(InspiralError::InvalidSolverParams(
                "brent_eps must be > 0".into(),
            ));
        }
        if p.brent_max_iter < 1 {
            return Err(InspiralError::InvalidSolverParams(
                "brent_max_iter must be >= 1".into(),
            ));
        }
        if p.chunk_size < 1 {
            return Err(InspiralError::InvalidSolverParams(
                "chunk_size must be >= 1".into(),
            ));
        }
        if p.interp_neighbors < 6 {
            return Err(InspiralError::InvalidSolverParams(
                "interp_neighbors must be >= 6 (parameter dimension + 2)".into(),
            ));
        }
        if p.interp_points < p.interp_neighbors {
            return Err(InspiralError::InvalidSolverParams(
                "interp_points must be >= interp_neighbors".into(),
            ));
        }
        Ok(self.params)
    }
}
