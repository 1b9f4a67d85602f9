//! Negative log-likelihood of a two-parameter Weibull distribution

use argmin::core::CostFunction;

/// Density substituted where the Weibull density is zero or undefined
pub const DENSITY_FLOOR: f64 = 1e-10;

/// Weibull probability density with shape `k` and scale `lambda`.
///
/// f(x) = (k/λ) (x/λ)^(k-1) exp(-(x/λ)^k)
pub fn pdf(x: f64, k: f64, lambda: f64) -> f64 {
    let z = x / lambda;
    (k / lambda) * z.powf(k - 1.0) * (-z.powf(k)).exp()
}

/// Cost of a `[k, lambda]` pair against a set of scores
#[derive(Debug, Clone)]
pub struct WeibullLoss<'a> {
    data: &'a [f64],
}

impl<'a> WeibullLoss<'a> {
    pub fn new(data: &'a [f64]) -> Self {
        Self { data }
    }

    /// Σ -ln f(x_i), with [`DENSITY_FLOOR`] standing in for any density that
    /// is not a positive finite number
    pub fn loss(&self, k: f64, lambda: f64) -> f64 {
        self.data
            .iter()
            .map(|&x| {
                let density = pdf(x, k, lambda);
                if density > 0.0 && density.is_finite() {
                    -density.ln()
                } else {
                    -DENSITY_FLOOR.ln()
                }
            })
            .sum()
    }
}

impl CostFunction for WeibullLoss<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        match param.as_slice() {
            [k, lambda] => Ok(self.loss(*k, *lambda)),
            _ => Err(argmin::core::Error::msg(format!(
                "expected [k, lambda], got {} parameters",
                param.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_special_case() {
        // k = 1 reduces to the exponential distribution
        let lambda: f64 = 2.0;
        for x in [0.5, 1.0, 3.0] {
            let expected = (-x / lambda).exp() / lambda;
            assert!((pdf(x, 1.0, lambda) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn loss_is_sum_of_negative_log_densities() {
        let data = [1.0, 2.0, 4.0];
        let loss = WeibullLoss::new(&data).loss(1.5, 2.5);
        let expected: f64 = data.iter().map(|&x| -pdf(x, 1.5, 2.5).ln()).sum();
        assert!((loss - expected).abs() < 1e-12);
    }

    #[test]
    fn undefined_density_uses_floor() {
        let data = [1.0, 2.0];
        let floor = -DENSITY_FLOOR.ln();
        // A negative scale makes the density NaN, a shape below one at a
        // zero score makes it infinite
        assert_eq!(WeibullLoss::new(&data).loss(1.5, -1.0), 2.0 * floor);
        assert_eq!(WeibullLoss::new(&[0.0]).loss(0.5, 1.0), floor);
    }

    #[test]
    fn cost_requires_two_parameters() {
        let data = [1.0];
        let loss = WeibullLoss::new(&data);
        assert!(loss.cost(&vec![1.0]).is_err());
        assert!(loss.cost(&vec![1.0, 1.0]).is_ok());
    }
}
