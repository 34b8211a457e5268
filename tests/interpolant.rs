mod common;

use inspiral::constants::{GYR, MSOL, PC};
use inspiral::{InspiralError, NormInterpolant, NormQuery, SampleRanges, SolverParams};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::{fast_params, fiducial_shape};

/// Sampling box for the interpolant tests: narrower than the library default
/// so that moderate point counts give a usable density in four dimensions.
fn test_ranges() -> SampleRanges {
    SampleRanges {
        mtot: (1.0e7 * MSOL, 1.0e10 * MSOL),
        mrat: (1.0e-2, 1.0),
        time: (0.1 * GYR, 10.0 * GYR),
        sepa_init: (5.0e3 * PC, 5.0e4 * PC),
    }
}

fn build_params(points: usize) -> SolverParams {
    SolverParams::builder()
        .num_rads(60)
        .interp_points(points)
        .build()
        .unwrap()
}

/// Draw a query comfortably interior to the sampling box (20% inset per
/// dimension in log space), away from the support edges.
fn interior_query(ranges: &SampleRanges, rng: &mut StdRng) -> NormQuery {
    let draw = |rng: &mut StdRng, (lo, hi): (f64, f64)| -> f64 {
        let (llo, lhi) = (lo.log10(), hi.log10());
        let inset = 0.2 * (lhi - llo);
        10.0_f64.powf(rng.random_range((llo + inset)..(lhi - inset)))
    };
    NormQuery {
        mtot: draw(rng, ranges.mtot),
        mrat: draw(rng, ranges.mrat),
        time: draw(rng, ranges.time),
        sepa_init: draw(rng, ranges.sepa_init),
    }
}

#[test]
fn test_interpolant_covers_interior_queries() {
    let shape = fiducial_shape();
    let ranges = test_ranges();
    let params = build_params(1500);
    let mut rng = StdRng::seed_from_u64(3);

    let interp = NormInterpolant::build(&shape, &ranges, &params, &mut rng).unwrap();
    assert!(interp.len() > 0);
    let frac = interp.valid_fraction();
    assert!(frac > 0.0 && frac <= 1.0);
    // the fiducial shape solves essentially everywhere on this box
    assert!(frac > 0.5, "valid fraction = {frac}");

    let queries: Vec<NormQuery> = (0..50).map(|_| interior_query(&ranges, &mut rng)).collect();
    let norms = interp.norms(&queries).unwrap();
    assert_eq!(norms.len(), queries.len());
    assert!(norms.iter().all(|n| n.is_finite() && *n > 0.0));
}

#[test]
fn test_interpolant_tracks_recomputed_norms() {
    let shape = fiducial_shape();
    let ranges = test_ranges();
    let solver_params = fast_params();
    let mut rng = StdRng::seed_from_u64(17);

    let coarse = NormInterpolant::build(&shape, &ranges, &build_params(600), &mut rng).unwrap();
    let fine = NormInterpolant::build(&shape, &ranges, &build_params(4000), &mut rng).unwrap();

    let queries: Vec<NormQuery> = (0..40).map(|_| interior_query(&ranges, &mut rng)).collect();
    let exact = shape.norm_for_time_batch(&queries, &solver_params);

    let mean_abs_log_ratio = |interp: &NormInterpolant| -> f64 {
        let approx = interp.norms(&queries).unwrap();
        let mut sum = 0.0;
        let mut count = 0;
        for (a, e) in approx.iter().zip(&exact) {
            if e.is_finite() {
                sum += (a / e).log10().abs();
                count += 1;
            }
        }
        assert!(count > queries.len() / 2);
        sum / count as f64
    };

    let err_coarse = mean_abs_log_ratio(&coarse);
    let err_fine = mean_abs_log_ratio(&fine);

    // a local-linear surface over a smooth log-space function stays within a
    // fraction of a decade at this density
    assert!(err_fine < 0.3, "fine-grid mean |log10 ratio| = {err_fine}");
    // denser sampling tightens the ratio distribution (generous slack; the
    // improvement is an expectation, not a per-seed guarantee)
    assert!(
        err_fine <= err_coarse + 0.1,
        "coarse = {err_coarse}, fine = {err_fine}"
    );
}

#[test]
fn test_out_of_box_query_falls_back_to_nearest() {
    let shape = fiducial_shape();
    let ranges = test_ranges();
    let params = build_params(800);
    let mut rng = StdRng::seed_from_u64(5);

    let interp = NormInterpolant::build(&shape, &ranges, &params, &mut rng).unwrap();

    // below the sampled mass range: the primary tier must refuse to
    // extrapolate and the nearest-neighbor tier must still answer
    let query = NormQuery {
        mtot: 0.3 * ranges.mtot.0,
        mrat: 0.5,
        time: GYR,
        sepa_init: 1.0e4 * PC,
    };
    let norm = interp.norm(&query).unwrap();
    assert!(norm.is_finite() && norm > 0.0);
}

#[test]
fn test_non_finite_query_exhausts_both_tiers() {
    let shape = fiducial_shape();
    let ranges = test_ranges();
    let params = build_params(400);
    let mut rng = StdRng::seed_from_u64(9);

    let interp = NormInterpolant::build(&shape, &ranges, &params, &mut rng).unwrap();

    let query = NormQuery {
        mtot: -1.0, // log10 of a negative mass is NaN in both tiers
        mrat: 0.5,
        time: GYR,
        sepa_init: 1.0e4 * PC,
    };
    match interp.norm(&query) {
        Err(InspiralError::InterpolantExhausted {
            num_bad,
            num_queried,
        }) => {
            assert_eq!(num_bad, 1);
            assert_eq!(num_queried, 1);
        }
        other => panic!("expected InterpolantExhausted, got {other:?}"),
    }
}
