use thiserror::Error;

/// Errors produced by the `inspiral` library.
///
/// Hot-path numerical failures (a single parameter row that fails to converge during a
/// batched solve) are *not* reported through this enum: the batched solver signals them
/// as non-finite output values so one bad row cannot abort a sweep. This enum covers
/// configuration validation, explicit single-point solves, and the interpolant
/// exhaustion policy.
#[derive(Error, Debug, PartialEq)]
pub enum InspiralError {
    #[error("Invalid solver parameter: {0}")]
    InvalidSolverParams(String),

    #[error("Invalid physical parameter: {0}")]
    InvalidParameter(String),

    #[error("Root finding error: {0}")]
    RootFindingError(#[from] roots::SearchError),

    #[error(
        "No sign change for the lifetime residual over log10-normalization bracket \
         [{lo}, {hi}]; the target time may exceed the GW-only lifetime"
    )]
    NoBracketingInterval { lo: f64, hi: f64 },

    #[error("No finite, positive normalization among {requested} interpolant samples")]
    NoValidSamples { requested: usize },

    #[error(
        "Interpolant exhausted: {num_bad} of {num_queried} queries non-finite after \
         nearest-neighbor fallback (sample density or domain coverage is insufficient)"
    )]
    InterpolantExhausted { num_bad: usize, num_queried: usize },
}
