//! # Fixed-lifetime double-power-law hardening
//!
//! The phenomenological hardening model whose total inspiral time is pinned to
//! a target value. The rate is a broken power law in separation,
//!
//! ```text
//! da/dt = -A * x^g_in * (1 + x)^(g_out - g_in) + da/dt|GW,    x = a / r_char
//! ```
//!
//! so the slope is `g_in` well inside the characteristic radius and `g_out`
//! well outside it, with GW emission always added on top. The normalization
//! `A` [cm/s] is not a free input: it is *solved* so that the time to inspiral
//! from an outer separation cutoff down to the ISCO equals a requested total
//! lifetime.
//!
//! ## Main functionalities
//!
//! - **Rate shape** – [`RateShape`] fixes the (characteristic radius, inner
//!   slope, outer slope) triple; all solves and interpolants are built per
//!   shape.
//! - **Forward integral** – [`RateShape::time_total`] evaluates the lifetime
//!   for a trial normalization.
//! - **Scalar solve** – [`RateShape::norm_for_time`] inverts the forward
//!   integral with a bracketed Brent iteration in `log10 A`; failures come
//!   back as `NaN`, never as panics or errors.
//! - **Batched solve** – [`RateShape::norm_for_time_batch`] processes many
//!   parameter rows independently (chunked, rows in parallel), one
//!   normalization per row.
//! - **Explicit solve** – [`RateShape::solve`] is the non-hot-path variant
//!   returning a full [`FixedTime`] model or a descriptive error.
//!
//! ## Failure semantics
//!
//! The lifetime is strictly decreasing in `A` and tends to the GW-only
//! lifetime as `A -> 0`, so a target longer than the GW-only lifetime has no
//! positive solution. The bracket hunt then never finds a sign change and the
//! row is reported as `NaN`; callers check finiteness and positivity after
//! the fact rather than pre-validating every row.
use rayon::prelude::*;
use roots::{find_root_brent, SimpleConvergency};

use crate::binary::m1m2_from_mtmr;
use crate::constants::{Cm, CmPerSec, Gram, MassRatio, Sec};
use crate::gw;
use crate::hardening::{Hardening, SolverParams};
use crate::inspiral_errors::InspiralError;

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

/// The fixed (characteristic radius, inner slope, outer slope) triple of the
/// double-power-law rate. Normalization solves and interpolants are built per
/// shape and reused across many (mass, ratio, time, cutoff) queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateShape {
    /// Characteristic radius [cm] where the power law breaks.
    pub rchar: Cm,
    /// Logarithmic slope of the rate for `a << rchar`.
    pub gamma_inner: f64,
    /// Logarithmic slope of the rate for `a >> rchar`.
    pub gamma_outer: f64,
}

/// One row of a normalization solve: the quantities that vary per binary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormQuery {
    /// Total binary mass [g].
    pub mtot: Gram,
    /// Mass ratio in (0, 1].
    pub mrat: MassRatio,
    /// Target total inspiral time [s].
    pub time: Sec,
    /// Outer separation cutoff [cm] where the inspiral clock starts.
    pub sepa_init: Cm,
}

/// A hardening model with a resolved normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTime {
    /// Rate normalization [cm/s].
    pub norm: CmPerSec,
    pub shape: RateShape,
}

impl Hardening for FixedTime {
    fn dadt(&self, m1: Gram, m2: Gram, sepa: Cm) -> CmPerSec {
        self.shape.rate_function(self.norm, sepa) + gw::hardening_rate_dadt(m1, m2, sepa, None)
    }
}

impl RateShape {
    pub fn new(rchar: Cm, gamma_inner: f64, gamma_outer: f64) -> Self {
        Self {
            rchar,
            gamma_inner,
            gamma_outer,
        }
    }

    /// Phenomenological part of the hardening rate [cm/s]; negative for `norm > 0`.
    pub fn rate_function(&self, norm: CmPerSec, sepa: Cm) -> CmPerSec {
        let xx = sepa / self.rchar;
        -norm * xx.powf(self.gamma_inner) * (1.0 + xx).powf(self.gamma_outer - self.gamma_inner)
    }

    /// Forward total-lifetime integral [s] for a trial normalization.
    ///
    /// `NaN` when the inputs are non-physical (see [`Hardening::lifetime`]).
    pub fn time_total(
        &self,
        norm: CmPerSec,
        mtot: Gram,
        mrat: MassRatio,
        sepa_init: Cm,
        params: &SolverParams,
    ) -> Sec {
        let (m1, m2) = m1m2_from_mtmr(mtot, mrat);
        FixedTime { norm, shape: *self }.lifetime(m1, m2, sepa_init, params)
    }

    /// Solve for the normalization that gives the queried total lifetime.
    ///
    /// This is the hot-path entry point: any failure (non-physical row, no
    /// bracketing interval, Brent non-convergence) is reported as `NaN`.
    /// Callers must check finiteness and positivity explicitly.
    pub fn norm_for_time(&self, query: &NormQuery, params: &SolverParams) -> CmPerSec {
        if !(query.mtot > 0.0
            && query.mrat > 0.0
            && query.mrat <= 1.0
            && query.time > 0.0
            && query.sepa_init > 0.0)
        {
            return f64::NAN;
        }
        self.solve_log_norm(query, params)
            .map(|log_norm| 10.0_f64.powf(log_norm))
            .unwrap_or(f64::NAN)
    }

    /// Batched variant of [`RateShape::norm_for_time`].
    ///
    /// Rows are independent (no cross-row coupling) and are processed in
    /// parallel within chunks of `params.chunk_size`; one normalization per
    /// input row, `NaN` for rows that fail. With the `progress` feature a
    /// progress bar advances per chunk.
    pub fn norm_for_time_batch(&self, queries: &[NormQuery], params: &SolverParams) -> Vec<f64> {
        let mut norms = vec![f64::NAN; queries.len()];

        #[cfg(feature = "progress")]
        let pb = {
            let nchunks = queries.len().div_ceil(params.chunk_size).max(1) as u64;
            let pb = ProgressBar::new(nchunks);
            pb.set_style(
                ProgressStyle::with_template(
                    "{bar:40.cyan/blue} {pos}/{len} chunks ({percent:>3}%) | {per_sec} | ETA {eta_precise}",
                )
                .expect("indicatif template"),
            );
            pb
        };

        for (qchunk, nchunk) in queries
            .chunks(params.chunk_size)
            .zip(norms.chunks_mut(params.chunk_size))
        {
            qchunk
                .par_iter()
                .zip(nchunk.par_iter_mut())
                .for_each(|(query, out)| *out = self.norm_for_time(query, params));

            #[cfg(feature = "progress")]
            pb.inc(1);
        }

        #[cfg(feature = "progress")]
        pb.finish_and_clear();

        norms
    }

    /// Explicit single-point solve returning a ready [`FixedTime`] model.
    ///
    /// Unlike [`RateShape::norm_for_time`], this surfaces the failure cause:
    /// input validation, bracket search, and Brent convergence each map to a
    /// distinct [`InspiralError`] variant.
    pub fn solve(&self, query: &NormQuery, params: &SolverParams) -> Result<FixedTime, InspiralError> {
        if !(query.mtot > 0.0) {
            return Err(InspiralError::InvalidParameter(format!(
                "total mass must be > 0, got {}",
                query.mtot
            )));
        }
        if !(query.mrat > 0.0 && query.mrat <= 1.0) {
            return Err(InspiralError::InvalidParameter(format!(
                "mass ratio must be in (0, 1], got {}",
                query.mrat
            )));
        }
        if !(query.time > 0.0) {
            return Err(InspiralError::InvalidParameter(format!(
                "target time must be > 0, got {}",
                query.time
            )));
        }
        if !(query.sepa_init > 0.0) {
            return Err(InspiralError::InvalidParameter(format!(
                "outer separation cutoff must be > 0, got {}",
                query.sepa_init
            )));
        }
        let log_norm = self.solve_log_norm(query, params)?;
        Ok(FixedTime {
            norm: 10.0_f64.powf(log_norm),
            shape: *self,
        })
    }

    /// Bracketed Brent solve in `log10` normalization.
    ///
    /// The residual is `ln(time_total(A) / target)`, strictly decreasing in
    /// `log10 A`. The initial guess exploits the near-`1/A` scaling of the
    /// lifetime where the phenomenological term dominates: one probe integral
    /// rescales `params.norm_guess` onto the target, and the bracket is grown
    /// around that point until the residual changes sign.
    fn solve_log_norm(&self, query: &NormQuery, params: &SolverParams) -> Result<f64, InspiralError> {
        let residual = |log_norm: f64| {
            let tt = self.time_total(
                10.0_f64.powf(log_norm),
                query.mtot,
                query.mrat,
                query.sepa_init,
                params,
            );
            if tt > 0.0 {
                (tt / query.time).ln()
            } else {
                f64::NAN
            }
        };

        let mut guess = params.norm_guess.log10();
        let probe = residual(guess);
        if probe.is_finite() {
            // lifetime ~ 1/A  =>  shift the guess by the decades of mismatch
            guess += probe / std::f64::consts::LN_10;
        }

        let mut lo = guess - params.bracket_width;
        let mut hi = guess + params.bracket_width;
        let mut f_lo = residual(lo);
        let mut f_hi = residual(hi);
        let mut expand = 0;
        while f_lo.is_finite()
            && f_hi.is_finite()
            && f_lo * f_hi > 0.0
            && expand < params.bracket_max_expand
        {
            if f_lo < 0.0 {
                // even the weakest probed hardening undershoots the target time
                lo -= params.bracket_width;
                f_lo = residual(lo);
            } else {
                hi += params.bracket_width;
                f_hi = residual(hi);
            }
            expand += 1;
        }
        if !(f_lo.is_finite() && f_hi.is_finite()) || f_lo * f_hi > 0.0 {
            return Err(InspiralError::NoBracketingInterval { lo, hi });
        }

        let mut convergency = SimpleConvergency {
            eps: params.brent_eps,
            max_iter: params.brent_max_iter,
        };
        Ok(find_root_brent(lo, hi, &residual, &mut convergency)?)
    }
}

#[cfg(test)]
mod fixed_time_test {
    use super::*;
    use crate::constants::{GYR, MSOL, PC};
    use approx::assert_relative_eq;

    fn fiducial_shape() -> RateShape {
        RateShape::new(100.0 * PC, -1.0, 2.5)
    }

    #[test]
    fn test_rate_function_limiting_slopes() {
        let shape = fiducial_shape();
        let norm = 1.0e4;

        // deep inside rchar the local slope is gamma_inner
        let (a0, a1) = (1.0e-4 * shape.rchar, 2.0e-4 * shape.rchar);
        let slope = (shape.rate_function(norm, a1) / shape.rate_function(norm, a0)).ln()
            / (a1 / a0).ln();
        assert_relative_eq!(slope, shape.gamma_inner, epsilon = 1e-3);

        // far outside rchar the local slope is gamma_outer
        let (a0, a1) = (1.0e4 * shape.rchar, 2.0e4 * shape.rchar);
        let slope = (shape.rate_function(norm, a1) / shape.rate_function(norm, a0)).ln()
            / (a1 / a0).ln();
        assert_relative_eq!(slope, shape.gamma_outer, epsilon = 1e-3);
    }

    #[test]
    fn test_time_total_decreases_with_norm() {
        let shape = fiducial_shape();
        let params = SolverParams::default();
        let t1 = shape.time_total(1.0e3, 1.0e9 * MSOL, 0.2, 1.0e4 * PC, &params);
        let t2 = shape.time_total(1.0e4, 1.0e9 * MSOL, 0.2, 1.0e4 * PC, &params);
        let t3 = shape.time_total(1.0e5, 1.0e9 * MSOL, 0.2, 1.0e4 * PC, &params);
        assert!(t1 > t2 && t2 > t3, "t1={t1} t2={t2} t3={t3}");
    }

    #[test]
    fn test_norm_round_trip_fiducial_scenario() {
        let shape = fiducial_shape();
        let params = SolverParams::default();
        let query = NormQuery {
            mtot: 1.0e9 * MSOL,
            mrat: 0.2,
            time: 2.5 * GYR,
            sepa_init: 1.0e4 * PC,
        };
        let norm = shape.norm_for_time(&query, &params);
        assert!(norm.is_finite() && norm > 0.0, "norm = {norm}");

        let recovered = shape.time_total(norm, query.mtot, query.mrat, query.sepa_init, &params);
        assert_relative_eq!(recovered, query.time, max_relative = 1e-6);
    }

    #[test]
    fn test_unreachable_target_is_nan() {
        // A target longer than the GW-only lifetime has no positive solution.
        let shape = fiducial_shape();
        let params = SolverParams::default();
        let query = NormQuery {
            mtot: 1.0e9 * MSOL,
            mrat: 0.2,
            time: 1.0e40,
            sepa_init: 1.0e4 * PC,
        };
        assert!(shape.norm_for_time(&query, &params).is_nan());
        assert!(matches!(
            shape.solve(&query, &params),
            Err(InspiralError::NoBracketingInterval { .. })
        ));
    }

    #[test]
    fn test_solve_rejects_non_physical_query() {
        let shape = fiducial_shape();
        let params = SolverParams::default();
        let query = NormQuery {
            mtot: 1.0e9 * MSOL,
            mrat: 1.5,
            time: GYR,
            sepa_init: 1.0e4 * PC,
        };
        assert!(matches!(
            shape.solve(&query, &params),
            Err(InspiralError::InvalidParameter(_))
        ));
        // the hot path reports the same condition as NaN
        assert!(shape.norm_for_time(&query, &params).is_nan());
    }

    #[test]
    fn test_batch_matches_scalar() {
        let shape = fiducial_shape();
        let params = SolverParams::default();
        let queries = [
            NormQuery {
                mtot: 1.0e9 * MSOL,
                mrat: 0.2,
                time: 2.5 * GYR,
                sepa_init: 1.0e4 * PC,
            },
            NormQuery {
                mtot: 3.0e8 * MSOL,
                mrat: 0.5,
                time: 0.5 * GYR,
                sepa_init: 5.0e3 * PC,
            },
            NormQuery {
                mtot: 1.0e9 * MSOL,
                mrat: 0.2,
                time: 1.0e40, // unreachable row, must not poison the others
                sepa_init: 1.0e4 * PC,
            },
        ];
        let norms = shape.norm_for_time_batch(&queries, &params);
        assert_eq!(norms.len(), queries.len());
        for (query, norm) in queries.iter().zip(&norms).take(2) {
            assert_relative_eq!(
                *norm,
                shape.norm_for_time(query, &params),
                max_relative = 1e-12
            );
        }
        assert!(norms[2].is_nan());
    }
}
