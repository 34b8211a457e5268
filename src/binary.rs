//! Conversions between the parameterizations of a compact binary.
//!
//! All quantities are CGS: masses in grams, separations in centimeters,
//! frequencies in 1/s. The mass-ratio convention is `q = m_small / m_big`,
//! so `q` is always in (0, 1].

use crate::constants::{Cm, Gram, MassRatio, NWTG, SCHW};
use std::f64::consts::PI;

/// Convert component masses into (total mass, mass ratio).
///
/// The ordering of `m1` and `m2` does not matter.
pub fn mtmr_from_m1m2(m1: Gram, m2: Gram) -> (Gram, MassRatio) {
    let mtot = m1 + m2;
    let mrat = m1.min(m2) / m1.max(m2);
    (mtot, mrat)
}

/// Convert (total mass, mass ratio) into component masses, primary first.
pub fn m1m2_from_mtmr(mtot: Gram, mrat: MassRatio) -> (Gram, Gram) {
    let m1 = mtot / (1.0 + mrat);
    (m1, mtot - m1)
}

/// Binary orbital frequency [1/s] from Kepler's third law.
pub fn kepler_freq_from_sepa(mtot: Gram, sepa: Cm) -> f64 {
    (NWTG * mtot).sqrt() / (2.0 * PI * sepa.powf(1.5))
}

/// Binary separation [cm] from Kepler's third law.
pub fn kepler_sepa_from_freq(mtot: Gram, freq: f64) -> Cm {
    (NWTG * mtot / (2.0 * PI * freq).powi(2)).powf(1.0 / 3.0)
}

/// Schwarzschild radius [cm] of the given mass.
pub fn schwarzschild_radius(mass: Gram) -> Cm {
    SCHW * mass
}

/// Innermost stable circular orbit [cm], where the binary is considered merged.
///
/// `3 R_s` of the combined mass, valid for non-spinning holes.
pub fn rad_isco(m1: Gram, m2: Gram) -> Cm {
    3.0 * schwarzschild_radius(m1 + m2)
}

/// Chirp mass [g] of the binary.
pub fn chirp_mass(m1: Gram, m2: Gram) -> Gram {
    (m1 * m2).powf(3.0 / 5.0) / (m1 + m2).powf(1.0 / 5.0)
}

#[cfg(test)]
mod binary_test {
    use super::*;
    use crate::constants::MSOL;
    use approx::assert_relative_eq;

    #[test]
    fn test_mtmr_round_trip() {
        let (m1, m2) = (3.0e9 * MSOL, 7.5e8 * MSOL);
        let (mtot, mrat) = mtmr_from_m1m2(m1, m2);
        assert_relative_eq!(mtot, 3.75e9 * MSOL, max_relative = 1e-15);
        assert_relative_eq!(mrat, 0.25, max_relative = 1e-15);

        let (p, s) = m1m2_from_mtmr(mtot, mrat);
        assert_relative_eq!(p, m1, max_relative = 1e-14);
        assert_relative_eq!(s, m2, max_relative = 1e-14);

        // component order must not matter
        let (mtot_swap, mrat_swap) = mtmr_from_m1m2(m2, m1);
        assert_eq!(mtot, mtot_swap);
        assert_eq!(mrat, mrat_swap);
    }

    #[test]
    fn test_kepler_round_trip() {
        let mtot = 1.0e9 * MSOL;
        let sepa = 1.0e18;
        let freq = kepler_freq_from_sepa(mtot, sepa);
        assert_relative_eq!(kepler_sepa_from_freq(mtot, freq), sepa, max_relative = 1e-12);
    }

    #[test]
    fn test_isco_scale() {
        // ISCO of a 1e9 Msol (total) binary is ~9e14 cm, well below a parsec.
        let (m1, m2) = m1m2_from_mtmr(1.0e9 * MSOL, 0.2);
        let isco = rad_isco(m1, m2);
        assert!(isco > 5.0e14 && isco < 2.0e15, "isco = {isco}");
    }

    #[test]
    fn test_chirp_mass_equal_masses() {
        let m = 1.0e8 * MSOL;
        let expected = m * 2.0_f64.powf(-1.0 / 5.0);
        assert_relative_eq!(chirp_mass(m, m), expected, max_relative = 1e-14);
    }
}
