use std::convert::Infallible;

use crate::core::vector::AoD;
use crate::traits::Function;

/// The `n`-dimensional Rosenbrock function, global minimum `f(1,..,1) = 0`.
pub struct Rosenbrock {
    pub n: usize,
}

impl Function for Rosenbrock {
    type Error = Infallible;

    fn evaluate(&self, x: &AoD) -> Result<AoD, Infallible> {
        let f = (0..self.n - 1)
            .map(|i| {
                let xi = x[i].to_f64();
                let xi1 = x[i + 1].to_f64();
                100.0 * (xi1 - xi.powi(2)).powi(2) + (1.0 - xi).powi(2)
            })
            .sum();
        Ok(AoD::defined(vec![f]))
    }
}
