//! Nelder-Mead simplex minimization
//!
//! A derivative-free local minimizer. Starting from an initial point `x0` of
//! dimension `n`, an initial simplex of `n + 1` vertices is built by stepping
//! `x0` along each unit vector. The simplex is then sorted by cost and
//! transformed by reflection, expansion, contraction or shrinking until the
//! population standard deviation of the vertex costs drops below the
//! tolerance.
//!
//! # Coefficients
//!
//! - Reflection: α = 1
//! - Expansion: γ = 2
//! - Contraction: ρ = 0.5
//! - Shrink: σ = 0.5
//!
//! There is no iteration cap. A cost function that is unbounded below, or one
//! whose vertex costs never settle, will keep the loop running; callers that
//! need bounded execution must impose their own limit around the call.

use argmin::core::CostFunction;
use ndarray::{s, Array1, Array2, ArrayView1, Axis};
use std::cmp::Ordering;
use thiserror::Error;

/// Default convergence tolerance on the standard deviation of the vertex costs
pub const DEFAULT_TOLERANCE: f64 = 1e-15;

const ALPHA: f64 = 1.0;
const GAMMA: f64 = 2.0;
const RHO: f64 = 0.5;
const SIGMA: f64 = 0.5;

/// Initial step along a dimension whose starting value is exactly zero
pub const ZERO_STEP: f64 = 0.00025;
/// Initial step along every other dimension (absolute, not scaled)
pub const STEP: f64 = 0.05;

#[derive(Debug, Error)]
pub enum MinimizeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("cost function returned a non-finite value ({value}) at {point:?}")]
    NonFiniteCost { value: f64, point: Vec<f64> },
    #[error("cost function failed: {0}")]
    Cost(argmin::core::Error),
}

/// Outcome of a single Nelder-Mead iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The cost spread fell below the tolerance, vertex 0 is the answer
    Converged,
    /// The worst vertex was replaced by its reflection through the centroid
    Reflect,
    /// The reflection beat the best vertex, the worst vertex was replaced by
    /// the better of the expanded and reflected points
    Expand,
    /// Contraction towards the reflected point (reflection beat the worst vertex)
    ContractReflected,
    /// Contraction towards the worst vertex (reflection did not beat it)
    ContractWorst,
    /// Every vertex but the best was pulled halfway towards the best
    Shrink,
}

/// Result of a complete Nelder-Mead run
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    pub best_param: Vec<f64>,
    pub best_cost: f64,
    pub iterations: usize,
    pub evaluations: usize,
}

/// The simplex: `n + 1` vertices stored as rows, with their costs alongside.
///
/// Costs are `NaN` until the simplex has been evaluated. After each sort,
/// row 0 is the lowest-cost vertex and row `n` the highest.
#[derive(Debug, Clone)]
pub struct Simplex {
    vertices: Array2<f64>,
    costs: Array1<f64>,
    evaluations: usize,
}

impl Simplex {
    /// Build the initial simplex around `x0`.
    ///
    /// Vertex 0 is `x0`; vertex `j + 1` is `x0` with component `j` increased
    /// by [`ZERO_STEP`] if that component is zero, else by [`STEP`].
    pub fn from_initial_point(x0: &[f64]) -> Result<Self, MinimizeError> {
        if x0.is_empty() {
            return Err(MinimizeError::InvalidInput(
                "initial point must have at least one dimension".to_string(),
            ));
        }
        let n = x0.len();
        let origin = ArrayView1::from(x0);

        let mut vertices = Array2::zeros((n + 1, n));
        for mut row in vertices.rows_mut() {
            row.assign(&origin);
        }
        for (j, &xj) in x0.iter().enumerate() {
            let step = if xj == 0.0 { ZERO_STEP } else { STEP };
            vertices[[j + 1, j]] += step;
        }

        Self::from_vertices(vertices)
    }

    /// Use the rows of `vertices` as the simplex. An `n`-dimensional simplex
    /// needs exactly `n + 1` rows. Costs are evaluated on the first iteration.
    pub fn from_vertices(vertices: Array2<f64>) -> Result<Self, MinimizeError> {
        let (rows, n) = vertices.dim();
        if n == 0 {
            return Err(MinimizeError::InvalidInput(
                "vertices must have at least one dimension".to_string(),
            ));
        }
        if rows != n + 1 {
            return Err(MinimizeError::InvalidInput(format!(
                "a simplex in {} dimensions needs {} vertices, got {}",
                n,
                n + 1,
                rows
            )));
        }

        Ok(Simplex {
            vertices,
            costs: Array1::from_elem(rows, f64::NAN),
            evaluations: 0,
        })
    }

    /// Number of parameters per vertex
    pub fn dimensions(&self) -> usize {
        self.vertices.ncols()
    }

    pub fn vertices(&self) -> &Array2<f64> {
        &self.vertices
    }

    pub fn vertex(&self, i: usize) -> ArrayView1<'_, f64> {
        self.vertices.row(i)
    }

    pub fn costs(&self) -> &Array1<f64> {
        &self.costs
    }

    /// Vertex 0, the lowest-cost vertex as of the last sort
    pub fn best(&self) -> ArrayView1<'_, f64> {
        self.vertices.row(0)
    }

    pub fn best_cost(&self) -> f64 {
        self.costs[0]
    }

    /// Number of cost function evaluations spent on this simplex so far
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Population standard deviation of the vertex costs
    pub fn cost_std(&self) -> f64 {
        self.costs.std(0.0)
    }

    fn evaluate_point<C>(
        &mut self,
        cost: &C,
        point: ArrayView1<'_, f64>,
    ) -> Result<f64, MinimizeError>
    where
        C: CostFunction<Param = Vec<f64>, Output = f64>,
    {
        self.evaluations += 1;
        let param = point.to_vec();
        let value = cost.cost(&param).map_err(MinimizeError::Cost)?;
        if !value.is_finite() {
            return Err(MinimizeError::NonFiniteCost {
                value,
                point: param,
            });
        }
        Ok(value)
    }

    /// Evaluate the cost of every vertex from `first` onwards
    fn evaluate_from<C>(&mut self, cost: &C, first: usize) -> Result<(), MinimizeError>
    where
        C: CostFunction<Param = Vec<f64>, Output = f64>,
    {
        for i in first..self.vertices.nrows() {
            let vertex = self.vertices.row(i).to_owned();
            self.costs[i] = self.evaluate_point(cost, vertex.view())?;
        }
        Ok(())
    }

    /// Evaluate every vertex that has no cost yet
    fn evaluate_pending<C>(&mut self, cost: &C) -> Result<(), MinimizeError>
    where
        C: CostFunction<Param = Vec<f64>, Output = f64>,
    {
        for i in 0..self.vertices.nrows() {
            if self.costs[i].is_nan() {
                let vertex = self.vertices.row(i).to_owned();
                self.costs[i] = self.evaluate_point(cost, vertex.view())?;
            }
        }
        Ok(())
    }

    /// Sort vertices and costs together by ascending cost. Equal costs keep
    /// their relative order.
    pub fn sort(&mut self) {
        let mut order: Vec<usize> = (0..self.costs.len()).collect();
        order.sort_by(|&a, &b| {
            self.costs[a]
                .partial_cmp(&self.costs[b])
                .unwrap_or(Ordering::Equal)
        });
        self.vertices = self.vertices.select(Axis(0), &order);
        self.costs = self.costs.select(Axis(0), &order);
    }

    /// Mean of every vertex except the last (worst) one
    fn centroid(&self) -> Array1<f64> {
        let n = self.dimensions();
        self.vertices.slice(s![..n, ..]).sum_axis(Axis(0)) / n as f64
    }

    fn replace_worst(&mut self, vertex: Array1<f64>, cost: f64) {
        let n = self.dimensions();
        self.vertices.row_mut(n).assign(&vertex);
        self.costs[n] = cost;
    }

    fn shrink(&mut self) {
        let best = self.vertices.row(0).to_owned();
        for mut vertex in self.vertices.rows_mut().into_iter().skip(1) {
            let shrunk = &best + &((&vertex - &best) * SIGMA);
            vertex.assign(&shrunk);
        }
    }
}

/// Nelder-Mead solver
#[derive(Debug, Clone, Copy)]
pub struct NelderMead {
    sd_tolerance: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        NelderMead {
            sd_tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl NelderMead {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tolerance on the standard deviation of the vertex costs.
    /// Must be strictly positive.
    pub fn with_sd_tolerance(mut self, tolerance: f64) -> Result<Self, MinimizeError> {
        if !(tolerance > 0.0) {
            return Err(MinimizeError::InvalidInput(format!(
                "tolerance must be positive, got {}",
                tolerance
            )));
        }
        self.sd_tolerance = tolerance;
        Ok(self)
    }

    pub fn sd_tolerance(&self) -> f64 {
        self.sd_tolerance
    }

    /// Build the initial simplex around `x0` and evaluate every vertex
    pub fn initialize<C>(&self, cost: &C, x0: &[f64]) -> Result<Simplex, MinimizeError>
    where
        C: CostFunction<Param = Vec<f64>, Output = f64>,
    {
        let mut simplex = Simplex::from_initial_point(x0)?;
        simplex.evaluate_pending(cost)?;
        Ok(simplex)
    }

    /// Perform one iteration on a simplex.
    ///
    /// Vertices without a cost are evaluated, then the simplex is sorted. If
    /// the spread of the costs is below the tolerance the simplex is left
    /// sorted and [`Step::Converged`] is returned; otherwise exactly one of the
    /// remaining moves is applied.
    pub fn iterate<C>(&self, cost: &C, simplex: &mut Simplex) -> Result<Step, MinimizeError>
    where
        C: CostFunction<Param = Vec<f64>, Output = f64>,
    {
        simplex.evaluate_pending(cost)?;
        simplex.sort();
        if simplex.cost_std() < self.sd_tolerance {
            return Ok(Step::Converged);
        }

        let n = simplex.dimensions();
        let best_cost = simplex.costs[0];
        let second_worst_cost = simplex.costs[n - 1];
        let worst_cost = simplex.costs[n];
        let worst = simplex.vertices.row(n).to_owned();
        let centroid = simplex.centroid();

        let reflected = &centroid + &((&centroid - &worst) * ALPHA);
        let reflected_cost = simplex.evaluate_point(cost, reflected.view())?;

        if best_cost <= reflected_cost && reflected_cost < second_worst_cost {
            simplex.replace_worst(reflected, reflected_cost);
            return Ok(Step::Reflect);
        }

        if reflected_cost < best_cost {
            let expanded = &centroid + &((&reflected - &centroid) * GAMMA);
            let expanded_cost = simplex.evaluate_point(cost, expanded.view())?;
            if expanded_cost < reflected_cost {
                simplex.replace_worst(expanded, expanded_cost);
            } else {
                simplex.replace_worst(reflected, reflected_cost);
            }
            return Ok(Step::Expand);
        }

        if reflected_cost < worst_cost {
            let contracted = &centroid + &((&reflected - &centroid) * RHO);
            let contracted_cost = simplex.evaluate_point(cost, contracted.view())?;
            if contracted_cost < reflected_cost {
                simplex.replace_worst(contracted, contracted_cost);
                return Ok(Step::ContractReflected);
            }
        } else {
            let contracted = &centroid + &((&worst - &centroid) * RHO);
            let contracted_cost = simplex.evaluate_point(cost, contracted.view())?;
            if contracted_cost < worst_cost {
                simplex.replace_worst(contracted, contracted_cost);
                return Ok(Step::ContractWorst);
            }
        }

        simplex.shrink();
        simplex.evaluate_from(cost, 1)?;
        Ok(Step::Shrink)
    }

    /// Run the solver from `x0` until the simplex converges
    pub fn run<C>(&self, cost: &C, x0: &[f64]) -> Result<NelderMeadResult, MinimizeError>
    where
        C: CostFunction<Param = Vec<f64>, Output = f64>,
    {
        let mut simplex = self.initialize(cost, x0)?;
        let mut iterations = 0;

        loop {
            let step = self.iterate(cost, &mut simplex)?;
            if step == Step::Converged {
                break;
            }
            iterations += 1;
            tracing::trace!(
                "Iteration {}: {:?}, best cost {:.6e}, cost sd {:.3e}",
                iterations,
                step,
                simplex.best_cost(),
                simplex.cost_std()
            );
        }

        tracing::debug!(
            "Nelder-Mead converged after {} iterations ({} evaluations), cost = {:.6e}",
            iterations,
            simplex.evaluations(),
            simplex.best_cost()
        );

        Ok(NelderMeadResult {
            best_param: simplex.best().to_vec(),
            best_cost: simplex.best_cost(),
            iterations,
            evaluations: simplex.evaluations(),
        })
    }
}

/// Adapts a plain closure over the parameter slice into a [`CostFunction`]
pub struct FnCost<F>(pub F);

impl<F> CostFunction for FnCost<F>
where
    F: Fn(&[f64]) -> f64,
{
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        Ok((self.0)(param))
    }
}

/// Minimize `cost` from `x0` with the default tolerance of [`DEFAULT_TOLERANCE`]
pub fn minimize<C>(cost: &C, x0: &[f64]) -> Result<Vec<f64>, MinimizeError>
where
    C: CostFunction<Param = Vec<f64>, Output = f64>,
{
    minimize_with_tolerance(cost, x0, DEFAULT_TOLERANCE)
}

pub fn minimize_with_tolerance<C>(
    cost: &C,
    x0: &[f64],
    tolerance: f64,
) -> Result<Vec<f64>, MinimizeError>
where
    C: CostFunction<Param = Vec<f64>, Output = f64>,
{
    let solver = NelderMead::new().with_sd_tolerance(tolerance)?;
    Ok(solver.run(cost, x0)?.best_param)
}

/// Minimize a closure taking the parameter vector as a slice
pub fn minimize_fn<F>(f: F, x0: &[f64], tolerance: f64) -> Result<Vec<f64>, MinimizeError>
where
    F: Fn(&[f64]) -> f64,
{
    minimize_with_tolerance(&FnCost(f), x0, tolerance)
}
