//! Weibull fit of a score distribution
//!
//! Fits the shape `k` and scale `lambda` of a two-parameter Weibull
//! distribution to a set of scores by minimizing the negative log-likelihood,
//! then derives recommended high scores from the fitted upper tail.
//!
//! The starting point is the moment-based guess `[mean² / variance, mean]`.
//! Minimization uses Nelder-Mead by default; the coarse grid search in
//! [`grid`] is available through [`Method::Grid`].

pub mod cost;
pub mod grid;

use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use eyre::{bail, eyre, Result, WrapErr};
use ndarray::ArrayView1;
use serde_derive::Serialize;

use crate::routines::datafile::read_scores;
use crate::routines::optimization::nelder_mead::NelderMead;
use crate::routines::output::OutputFile;
use crate::routines::settings::{Method, Settings};

use cost::WeibullLoss;
use grid::grid_search;

/// A fitted Weibull distribution and the targets derived from it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Weibull {
    pub k: f64,
    pub lambda: f64,
    /// Negative log-likelihood at `[k, lambda]`
    pub loss: f64,
    /// Score above which 1% of the distribution lies, divided by 0.95
    pub hhf1: f64,
    /// Score above which 5% of the distribution lies, divided by 0.85
    pub hhf5: f64,
    /// Score above which 15% of the distribution lies, divided by 0.75
    pub hhf15: f64,
    #[serde(skip)]
    fitted: bool,
}

impl Weibull {
    pub fn from_params(k: f64, lambda: f64, loss: f64) -> Self {
        let mut weibull = Weibull {
            k,
            lambda,
            loss,
            hhf1: 0.0,
            hhf5: 0.0,
            hhf15: 0.0,
            fitted: true,
        };
        weibull.hhf1 = weibull.reverse_cdf(1.0) / 0.95;
        weibull.hhf5 = weibull.reverse_cdf(5.0) / 0.85;
        weibull.hhf15 = weibull.reverse_cdf(15.0) / 0.75;
        weibull
    }

    /// Placeholder for a dataset with no scores: `k = lambda = 1`, and every
    /// derived value is zero
    pub fn empty() -> Self {
        Weibull {
            k: 1.0,
            lambda: 1.0,
            loss: 0.0,
            hhf1: 0.0,
            hhf5: 0.0,
            hhf15: 0.0,
            fitted: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.fitted
    }

    /// Percentage of the distribution above `x`
    pub fn cdf(&self, x: f64) -> f64 {
        if !self.fitted {
            return 0.0;
        }
        100.0 - 100.0 * (1.0 - (-(x / self.lambda).powf(self.k)).exp())
    }

    /// Score above which `y` percent of the distribution lies
    pub fn reverse_cdf(&self, y: f64) -> f64 {
        if !self.fitted {
            return 0.0;
        }
        self.lambda * (100.0 / y).ln().powf(1.0 / self.k)
    }

    /// Write the fit to `weibull.csv` in `folder`
    pub fn write(&self, folder: &str) -> Result<PathBuf> {
        let outputfile = OutputFile::new(folder, "weibull.csv")
            .wrap_err("Failed to create output file for the Weibull fit")?;
        let mut writer = WriterBuilder::new()
            .has_headers(true)
            .from_writer(outputfile.file());

        writer.write_record(["k", "lambda", "loss", "hhf1", "hhf5", "hhf15"])?;
        writer.write_record(
            [
                self.k,
                self.lambda,
                self.loss,
                self.hhf1,
                self.hhf5,
                self.hhf15,
            ]
            .iter()
            .map(|v| v.to_string()),
        )?;
        writer.flush()?;

        tracing::debug!("Weibull fit written to {:?}", outputfile.relative_path());
        Ok(outputfile.relative_path().to_path_buf())
    }
}

/// Moment-based starting point `[mean² / variance, mean]`, using the
/// population variance
pub fn initial_guess(data: &[f64]) -> Result<[f64; 2]> {
    if let Some(x) = data.iter().find(|x| !x.is_finite()) {
        bail!("scores must be finite, found {}", x);
    }
    let scores = ArrayView1::from(data);
    let mean = scores
        .mean()
        .ok_or_else(|| eyre!("cannot estimate a starting point without scores"))?;
    let variance = scores.var(0.0);
    if variance == 0.0 {
        bail!(
            "all {} scores are equal to {}, the distribution has no spread to fit",
            data.len(),
            mean
        );
    }
    Ok([mean.powi(2) / variance, mean])
}

/// Fit a Weibull distribution to `data`.
///
/// An empty dataset yields [`Weibull::empty`]. When `settings.output.write`
/// is set, the fit is also written to the output folder.
pub fn solve_weibull(data: &[f64], settings: &Settings) -> Result<Weibull> {
    settings.validate()?;
    if data.is_empty() {
        tracing::warn!("No scores to fit, returning an empty distribution");
        return Ok(Weibull::empty());
    }

    let start = initial_guess(data)?;
    let loss = WeibullLoss::new(data);
    tracing::debug!(
        "Fitting {} scores with {:?}, starting at k = {:.4}, lambda = {:.4}",
        data.len(),
        settings.weibull.method,
        start[0],
        start[1]
    );

    let (params, cost) = match settings.weibull.method {
        Method::NelderMead => {
            let result = NelderMead::new()
                .with_sd_tolerance(settings.optimizer.tolerance)?
                .run(&loss, &start)?;
            (
                [result.best_param[0], result.best_param[1]],
                result.best_cost,
            )
        }
        Method::Grid => grid_search(&loss, start, settings.weibull.precision)?,
    };

    let fit = Weibull::from_params(params[0], params[1], cost);
    tracing::info!(
        "Weibull fit: k = {:.4}, lambda = {:.4}, loss = {:.4}, hhf1 = {:.4}, hhf5 = {:.4}, hhf15 = {:.4}",
        fit.k,
        fit.lambda,
        fit.loss,
        fit.hhf1,
        fit.hhf5,
        fit.hhf15
    );

    if settings.output.write {
        fit.write(&settings.output.path)?;
    }
    Ok(fit)
}

/// Read scores from a CSV file and fit them
pub fn solve_weibull_file(path: impl AsRef<Path>, settings: &Settings) -> Result<Weibull> {
    let scores = read_scores(path)?;
    solve_weibull(&scores, settings)
}
