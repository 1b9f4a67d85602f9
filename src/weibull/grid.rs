//! Coarse grid search over `[k, lambda]`
//!
//! Scans `(2p + 1)²` offsets of `0.5 / p` around the running best point and
//! keeps any improvement immediately, so later offsets are taken relative to
//! the most recent improvement.

use argmin::core::CostFunction;
use eyre::{bail, eyre, Result};

/// Returns the best `[k, lambda]` found and its cost
pub fn grid_search<C>(cost: &C, start: [f64; 2], precision: usize) -> Result<([f64; 2], f64)>
where
    C: CostFunction<Param = Vec<f64>, Output = f64>,
{
    if precision == 0 {
        bail!("grid search precision must be at least 1");
    }
    let evaluate = |point: [f64; 2]| -> Result<f64> {
        cost.cost(&point.to_vec())
            .map_err(|e| eyre!("cost function failed at {:?}: {}", point, e))
    };

    let mut best = start;
    let mut best_cost = evaluate(start)?;
    let step = 0.5 / precision as f64;
    let p = precision as i64;

    for i in -p..=p {
        for j in -p..=p {
            let candidate = [best[0] + i as f64 * step, best[1] + j as f64 * step];
            let candidate_cost = evaluate(candidate)?;
            if candidate_cost < best_cost {
                best = candidate;
                best_cost = candidate_cost;
            }
        }
    }

    tracing::debug!(
        "Grid search ({} steps of {}) finished at {:?}, cost = {:.6}",
        2 * p + 1,
        step,
        best,
        best_cost
    );
    Ok((best, best_cost))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routines::optimization::nelder_mead::FnCost;

    #[test]
    fn follows_improvements() {
        // Each improvement moves the base point for the offsets that follow
        let cost = FnCost(|x: &[f64]| (x[0] - 1.2).powi(2));
        let (best, best_cost) = grid_search(&cost, [1.0, 1.0], 10).unwrap();
        assert!((best[0] - 1.2).abs() < 1e-9, "best = {:?}", best);
        assert!(best_cost < 1e-12);
        assert!(best_cost < cost.cost(&vec![1.0, 1.0]).unwrap());
    }

    #[test]
    fn start_is_kept_when_nothing_improves() {
        let cost = FnCost(|x: &[f64]| x[0].abs() + x[1].abs());
        let (best, best_cost) = grid_search(&cost, [0.0, 0.0], 3).unwrap();
        assert_eq!(best, [0.0, 0.0]);
        assert_eq!(best_cost, 0.0);
    }

    #[test]
    fn zero_precision_is_rejected() {
        let cost = FnCost(|x: &[f64]| x[0]);
        assert!(grid_search(&cost, [0.0, 0.0], 0).is_err());
    }
}
