//! Derivative-free local minimization with the Nelder-Mead simplex method,
//! and a Weibull fit of score distributions built on top of it.
//!
//! The optimizer lives in [`routines::optimization::nelder_mead`]; any
//! [`argmin::core::CostFunction`] over `Vec<f64>` can be minimized, and plain
//! closures through [`routines::optimization::nelder_mead::minimize_fn`].

pub mod routines;
pub mod weibull;

pub mod prelude {
    pub use crate::routines::datafile::read_scores;
    pub use crate::routines::logger::setup_log;
    pub use crate::routines::optimization::nelder_mead::{
        minimize, minimize_fn, minimize_with_tolerance, FnCost, MinimizeError, NelderMead,
        NelderMeadResult, Simplex, Step, DEFAULT_TOLERANCE,
    };
    pub use crate::routines::settings::{read_settings, Method, Settings};
    pub use crate::weibull::{solve_weibull, solve_weibull_file, Weibull};
    pub use argmin::core::CostFunction;
}
