//! Trapezoid quadrature over sampled integrands.
//!
//! The lifetime integral of the hardening solver spans many decades in both
//! separation and rate, so a plain trapezoid rule over a log-spaced grid would
//! systematically overestimate the steep segments. [`trapz_loglog`] instead
//! treats each interval as an exact power law `y = a x^gamma`, which integrates
//! power-law integrands (like the pure-GW hardening rate) to rounding error.

/// Trapezoid rule over `(xx, yy)` samples.
///
/// `xx` must be strictly increasing and the slices must have equal length >= 2.
pub fn trapz(yy: &[f64], xx: &[f64]) -> f64 {
    debug_assert_eq!(yy.len(), xx.len());
    debug_assert!(xx.len() >= 2);
    xx.windows(2)
        .zip(yy.windows(2))
        .map(|(x, y)| 0.5 * (y[0] + y[1]) * (x[1] - x[0]))
        .sum()
}

/// Trapezoid rule in log-log space.
///
/// For each interval, `y` is assumed to follow the local power law
/// `y = a x^gamma` with `gamma` measured from the endpoint values, and the
/// segment integral `(x1 y1 - x0 y0) / (gamma + 1)` is used. When the local
/// index is within `lntol` of `-1` that expression degenerates and the
/// logarithmic form `mean(x0 y0, x1 y1) * ln(x1 / x0)` is used instead.
///
/// Arguments
/// -----------------
/// * `yy`: integrand samples, strictly positive.
/// * `xx`: sample locations, strictly positive and strictly increasing.
/// * `lntol`: absolute tolerance around `gamma = -1` for the logarithmic form.
///
/// Return
/// -----------------
/// * The total integral; `NaN` if any sample is non-finite or non-positive.
pub fn trapz_loglog(yy: &[f64], xx: &[f64], lntol: f64) -> f64 {
    debug_assert_eq!(yy.len(), xx.len());
    debug_assert!(xx.len() >= 2);

    let mut total = 0.0;
    for (x, y) in xx.windows(2).zip(yy.windows(2)) {
        if !(x[0] > 0.0 && x[1] > x[0] && y[0] > 0.0 && y[1] > 0.0)
            || !(y[0].is_finite() && y[1].is_finite())
        {
            return f64::NAN;
        }
        let dlogx = (x[1] / x[0]).ln();
        let gamma = (y[1] / y[0]).ln() / dlogx;
        let seg = if (gamma + 1.0).abs() < lntol {
            0.5 * (x[0] * y[0] + x[1] * y[1]) * dlogx
        } else {
            (x[1] * y[1] - x[0] * y[0]) / (gamma + 1.0)
        };
        total += seg;
    }
    total
}

/// Log-spaced grid of `num` points from `lo` to `hi` (inclusive).
pub fn log_space(lo: f64, hi: f64, num: usize) -> Vec<f64> {
    debug_assert!(lo > 0.0 && hi > lo && num >= 2);
    let (llo, lhi) = (lo.log10(), hi.log10());
    let step = (lhi - llo) / (num - 1) as f64;
    (0..num).map(|i| 10.0_f64.powf(llo + step * i as f64)).collect()
}
