//! # Two-tier normalization lookup
//!
//! Root-finding the rate normalization is expensive when called per-query
//! across a large parameter sweep (a likelihood or calibration loop touches
//! the same shape millions of times). This module pre-computes a lookup
//! surface over the four per-binary query dimensions – total mass, mass
//! ratio, target time, outer separation cutoff – for one fixed [`RateShape`],
//! and answers queries through an explicit two-tier strategy:
//!
//! 1. **Primary tier** – piecewise-linear scattered-data interpolation: a
//!    local hyperplane is fit (SVD least squares) through the `k` nearest
//!    sampled points in normalized `log10` parameter space. A query outside
//!    its neighbors' support, or one whose local fit is degenerate, yields a
//!    non-finite value.
//! 2. **Fallback tier** – nearest-neighbor over the same points; finite for
//!    every finite query as long as one valid sample exists.
//!
//! ## Exhaustion policy
//!
//! The fallback is re-queried at exactly the points the primary tier missed.
//! If any result is *still* non-finite – a query with non-finite `log10`
//! coordinates, or a table built from too few valid samples – the batch fails
//! hard with [`InspiralError::InterpolantExhausted`]. A silent `NaN` here
//! would poison a downstream sweep, so the miss is an error, not a value.
//!
//! ## Accuracy / density trade-off
//!
//! The builder's point count (`SolverParams::interp_points`) is the explicit
//! accuracy knob: more samples tighten the interpolated-to-recomputed ratio
//! around 1 and shrink the share of queries that fall through to the fallback
//! tier. [`NormInterpolant::valid_fraction`] reports how many drawn samples
//! survived the finite-and-positive filter, a useful regression baseline.
use itertools::izip;
use nalgebra::{DMatrix, DVector};
use ordered_float::OrderedFloat;
use rand::Rng;

use crate::constants::{Cm, Gram, MassRatio, Sec, GYR, MSOL, PC};
use crate::hardening::fixed_time::{NormQuery, RateShape};
use crate::hardening::SolverParams;
use crate::inspiral_errors::InspiralError;

/// Number of query dimensions: (mtot, mrat, time, sepa_init).
const DIM: usize = 4;

/// Log-uniform sampling ranges for the interpolant builder, in linear units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRanges {
    /// Total mass range [g].
    pub mtot: (Gram, Gram),
    /// Mass ratio range, within (0, 1].
    pub mrat: (MassRatio, MassRatio),
    /// Target lifetime range [s].
    pub time: (Sec, Sec),
    /// Outer separation cutoff range [cm].
    pub sepa_init: (Cm, Cm),
}

impl Default for SampleRanges {
    fn default() -> Self {
        SampleRanges {
            mtot: (1.0e5 * MSOL, 1.0e11 * MSOL),
            mrat: (1.0e-5, 1.0),
            time: (1.0e-2 * GYR, 2.0e1 * GYR),
            sepa_init: (1.0e3 * PC, 1.0e5 * PC),
        }
    }
}

impl SampleRanges {
    fn log_bounds(&self) -> [(f64, f64); DIM] {
        [
            (self.mtot.0.log10(), self.mtot.1.log10()),
            (self.mrat.0.log10(), self.mrat.1.log10()),
            (self.time.0.log10(), self.time.1.log10()),
            (self.sepa_init.0.log10(), self.sepa_init.1.log10()),
        ]
    }

    fn validate(&self) -> Result<(), InspiralError> {
        let ok = |(lo, hi): (f64, f64)| lo > 0.0 && hi > lo && lo.is_finite() && hi.is_finite();
        if !(ok(self.mtot) && ok(self.mrat) && ok(self.time) && ok(self.sepa_init)) {
            return Err(InspiralError::InvalidParameter(
                "sample ranges must be finite, positive and ordered".into(),
            ));
        }
        if self.mrat.1 > 1.0 {
            return Err(InspiralError::InvalidParameter(
                "mass-ratio range must stay within (0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// Pre-computed mapping from `log10` query parameters to `log10` normalization
/// for one fixed [`RateShape`]. See the module docs for the two-tier query
/// contract.
#[derive(Debug, Clone)]
pub struct NormInterpolant {
    shape: RateShape,
    /// `log10` of the valid sampled parameter rows.
    points: Vec<[f64; DIM]>,
    /// `log10` of the corresponding normalizations.
    values: Vec<f64>,
    /// Per-dimension offset/scale mapping `log10` coordinates onto [0, 1].
    lo: [f64; DIM],
    inv_span: [f64; DIM],
    neighbors: usize,
    num_sampled: usize,
}

impl NormInterpolant {
    /// Draw `params.interp_points` log-uniform samples, solve their
    /// normalizations with the batched solver, and build the lookup table from
    /// the finite, positive survivors.
    ///
    /// Arguments
    /// -----------------
    /// * `shape`: the fixed (rchar, gamma_inner, gamma_outer) triple.
    /// * `ranges`: sampling box in linear units.
    /// * `params`: solver configuration; also supplies point and neighbor counts.
    /// * `rng`: caller-provided random source, seedable for reproducibility.
    ///
    /// Return
    /// -----------------
    /// * `Err(InspiralError::NoValidSamples)` when not a single drawn row
    ///   produced a finite, positive normalization.
    pub fn build(
        shape: &RateShape,
        ranges: &SampleRanges,
        params: &SolverParams,
        rng: &mut impl Rng,
    ) -> Result<Self, InspiralError> {
        ranges.validate()?;
        let bounds = ranges.log_bounds();

        let mut logs: Vec<[f64; DIM]> = Vec::with_capacity(params.interp_points);
        let mut queries: Vec<NormQuery> = Vec::with_capacity(params.interp_points);
        for _ in 0..params.interp_points {
            let mut row = [0.0; DIM];
            for (value, (lo, hi)) in row.iter_mut().zip(&bounds) {
                *value = rng.random_range(*lo..*hi);
            }
            logs.push(row);
            queries.push(NormQuery {
                mtot: 10.0_f64.powf(row[0]),
                mrat: 10.0_f64.powf(row[1]),
                time: 10.0_f64.powf(row[2]),
                sepa_init: 10.0_f64.powf(row[3]),
            });
        }

        let norms = shape.norm_for_time_batch(&queries, params);

        let mut points = Vec::new();
        let mut values = Vec::new();
        for (row, norm) in izip!(&logs, &norms) {
            if norm.is_finite() && *norm > 0.0 {
                points.push(*row);
                values.push(norm.log10());
            }
        }
        if points.is_empty() {
            return Err(InspiralError::NoValidSamples {
                requested: params.interp_points,
            });
        }

        let mut lo = [0.0; DIM];
        let mut inv_span = [0.0; DIM];
        for (dd, (blo, bhi)) in bounds.iter().enumerate() {
            lo[dd] = *blo;
            inv_span[dd] = 1.0 / (bhi - blo);
        }

        Ok(NormInterpolant {
            shape: *shape,
            points,
            values,
            lo,
            inv_span,
            neighbors: params.interp_neighbors,
            num_sampled: params.interp_points,
        })
    }

    /// The shape this table was built for.
    pub fn shape(&self) -> &RateShape {
        &self.shape
    }

    /// Number of valid stored samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fraction of drawn samples that produced a finite, positive
    /// normalization. Track this as a regression baseline for a given shape
    /// and sampling box.
    pub fn valid_fraction(&self) -> f64 {
        self.points.len() as f64 / self.num_sampled as f64
    }

    /// Interpolated normalizations [cm/s], one per query row.
    ///
    /// Applies the two-tier contract: primary local-linear interpolation,
    /// nearest-neighbor fallback at exactly the non-finite results, hard
    /// [`InspiralError::InterpolantExhausted`] if any row remains non-finite.
    pub fn norms(&self, queries: &[NormQuery]) -> Result<Vec<f64>, InspiralError> {
        let mut out = Vec::with_capacity(queries.len());
        let mut num_bad = 0;
        for query in queries {
            let pp = [
                query.mtot.log10(),
                query.mrat.log10(),
                query.time.log10(),
                query.sepa_init.log10(),
            ];
            let mut log_norm = self.linear_at(&pp);
            if !log_norm.is_finite() {
                log_norm = self.nearest_at(&pp);
            }
            if !log_norm.is_finite() {
                num_bad += 1;
            }
            out.push(10.0_f64.powf(log_norm));
        }
        if num_bad > 0 {
            return Err(InspiralError::InterpolantExhausted {
                num_bad,
                num_queried: queries.len(),
            });
        }
        Ok(out)
    }

    /// Single-query convenience wrapper around [`NormInterpolant::norms`].
    pub fn norm(&self, query: &NormQuery) -> Result<f64, InspiralError> {
        Ok(self.norms(std::slice::from_ref(query))?[0])
    }

    /// Map a `log10` row onto the unit box used by the distance metric.
    fn normalize(&self, pp: &[f64; DIM]) -> [f64; DIM] {
        let mut nn = [0.0; DIM];
        for dd in 0..DIM {
            nn[dd] = (pp[dd] - self.lo[dd]) * self.inv_span[dd];
        }
        nn
    }

    /// Indices of the `k` nearest stored points to the normalized query.
    fn nearest_indices(&self, qn: &[f64; DIM], k: usize) -> Vec<usize> {
        let mut dists: Vec<(f64, usize)> = self
            .points
            .iter()
            .enumerate()
            .map(|(ii, pt)| {
                let pn = self.normalize(pt);
                let d2: f64 = qn
                    .iter()
                    .zip(&pn)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                (d2, ii)
            })
            .collect();
        let k = k.min(dists.len());
        if k < dists.len() {
            dists.select_nth_unstable_by_key(k - 1, |(d2, _)| OrderedFloat(*d2));
        }
        dists.truncate(k);
        dists.into_iter().map(|(_, ii)| ii).collect()
    }

    /// Primary tier: local hyperplane through the `k` nearest points.
    ///
    /// `NaN` when the query has non-finite coordinates, lies outside its
    /// neighbors' axis-aligned support (extrapolation), there are too few
    /// points for a stable fit, or the least-squares solve is degenerate.
    fn linear_at(&self, pp: &[f64; DIM]) -> f64 {
        if pp.iter().any(|v| !v.is_finite()) {
            return f64::NAN;
        }
        if self.points.len() < DIM + 2 {
            return f64::NAN;
        }
        let qn = self.normalize(pp);
        let idx = self.nearest_indices(&qn, self.neighbors);

        // extrapolation guard: the query must be interior to the neighbor cloud
        for dd in 0..DIM {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for &ii in &idx {
                let v = self.normalize(&self.points[ii])[dd];
                min = min.min(v);
                max = max.max(v);
            }
            if qn[dd] < min || qn[dd] > max {
                return f64::NAN;
            }
        }

        // fit value + gradient, centered on the query so the intercept is the answer
        let kk = idx.len();
        let mut design = DMatrix::zeros(kk, DIM + 1);
        let mut rhs = DVector::zeros(kk);
        for (row, &ii) in idx.iter().enumerate() {
            let pn = self.normalize(&self.points[ii]);
            design[(row, 0)] = 1.0;
            for dd in 0..DIM {
                design[(row, dd + 1)] = pn[dd] - qn[dd];
            }
            rhs[row] = self.values[ii];
        }

        let svd = design.svd(true, true);
        for &tol in &[1e-10, 1e-8, 1e-6] {
            if let Ok(beta) = svd.solve(&rhs, tol) {
                if beta.iter().all(|v| v.is_finite()) {
                    return beta[0];
                }
            }
        }
        f64::NAN
    }

    /// Fallback tier: value of the nearest stored point.
    fn nearest_at(&self, pp: &[f64; DIM]) -> f64 {
        if pp.iter().any(|v| !v.is_finite()) {
            return f64::NAN;
        }
        let qn = self.normalize(pp);
        let mut best = f64::NAN;
        let mut best_d2 = f64::INFINITY;
        for (pt, value) in self.points.iter().zip(&self.values) {
            let pn = self.normalize(pt);
            let d2: f64 = qn.iter().zip(&pn).map(|(a, b)| (a - b) * (a - b)).sum();
            if d2 < best_d2 {
                best_d2 = d2;
                best = *value;
            }
        }
        best
    }
}
