pub mod binary;
pub mod constants;
pub mod gw;
pub mod hardening;
pub mod inspiral_errors;
pub mod integrate;
pub mod param_space;

pub use crate::hardening::fixed_time::{FixedTime, NormQuery, RateShape};
pub use crate::hardening::interpolant::{NormInterpolant, SampleRanges};
pub use crate::hardening::{GwOnly, Hardening, SolverParams};
pub use crate::inspiral_errors::InspiralError;
