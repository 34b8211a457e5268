//! Gravitational-wave driven binary hardening.
//!
//! Circular and eccentric hardening rates from Peters (1964, PhRv 136, 1224),
//! together with the closed-form lifetime of a GW-only binary. The closed
//! forms are the analytic reference for the numerical lifetime integral used
//! by the fixed-lifetime solver.

use crate::binary::rad_isco;
use crate::constants::{Cm, CmPerSec, Gram, Sec, GW_DADT_SEP_CONST, NWTG, SPLC};

/// GW hardening rate in separation, `da/dt` [cm/s].
///
/// Peters (1964) Eq. 5.6; the returned value is negative. Eccentricity is treated
/// as zero when `None`.
pub fn hardening_rate_dadt(m1: Gram, m2: Gram, sepa: Cm, eccen: Option<f64>) -> CmPerSec {
    let mut dadt = GW_DADT_SEP_CONST * m1 * m2 * (m1 + m2) / sepa.powi(3);
    if let Some(ecc) = eccen {
        dadt *= ecc_func(ecc);
    }
    dadt
}

/// Eccentricity enhancement `F(e)` of the GW hardening rate (Peters 1964, Eq. 5.6).
///
/// `F(0) = 1` and `F(e) -> inf` as `e -> 1`.
pub fn ecc_func(eccen: f64) -> f64 {
    let e2 = eccen * eccen;
    let num = 1.0 + (73.0 / 24.0) * e2 + (37.0 / 96.0) * e2 * e2;
    let den = (1.0 - e2).powf(7.0 / 2.0);
    num / den
}

/// Peters hardening strength `beta = 64 G^3 m1 m2 (m1 + m2) / (5 c^5)` [cm^4/s],
/// so that the circular rate is `da/dt = -beta / a^3`.
fn peters_beta(m1: Gram, m2: Gram) -> f64 {
    64.0 * NWTG.powi(3) * m1 * m2 * (m1 + m2) / (5.0 * SPLC.powi(5))
}

/// Time [s] for a circular GW-only binary to coalesce from the given separation.
///
/// Integrating `da / |da/dt| = a^3 da / beta` from the ISCO to `sepa` gives
/// `(a^4 - a_isco^4) / (4 beta)`.
pub fn time_to_merge_at_sep(m1: Gram, m2: Gram, sepa: Cm) -> Sec {
    let a_isco = rad_isco(m1, m2);
    (sepa.powi(4) - a_isco.powi(4)) / (4.0 * peters_beta(m1, m2))
}

/// Initial separation [cm] from which a circular GW-only binary merges in the given time.
///
/// Inverse of [`time_to_merge_at_sep`].
pub fn sep_to_merge_in_time(m1: Gram, m2: Gram, time: Sec) -> Cm {
    let a_isco = rad_isco(m1, m2);
    (4.0 * peters_beta(m1, m2) * time + a_isco.powi(4)).powf(0.25)
}
