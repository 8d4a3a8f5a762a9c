use std::convert::Infallible;

use crate::core::vector::AoD;
use crate::traits::Function;

/// Constrained quadratic, n=5: `f(x) = x_4`, two `PB`
/// constraints `c_1 = sum(x_i-1)^2 - 25`, `c_2 = 25 - sum(x_i+1)^2`.
pub struct ConstrainedQuadratic;

impl Function for ConstrainedQuadratic {
    type Error = Infallible;

    fn evaluate(&self, x: &AoD) -> Result<AoD, Infallible> {
        let f = x[4].to_f64();
        let c1: f64 = (0..5).map(|i| (x[i].to_f64() - 1.0).powi(2)).sum::<f64>() - 25.0;
        let c2: f64 = 25.0 - (0..5).map(|i| (x[i].to_f64() + 1.0).powi(2)).sum::<f64>();
        Ok(AoD::defined(vec![f, c1, c2]))
    }
}

/// Integer packing, n=2: `f(x) = (x0-3)^2 + (x1+2)^2`, global
/// integer minimum at `(3,-2)` with `f=0`.
pub struct IntegerPacking;

impl Function for IntegerPacking {
    type Error = Infallible;

    fn evaluate(&self, x: &AoD) -> Result<AoD, Infallible> {
        let f = (x[0].to_f64() - 3.0).powi(2) + (x[1].to_f64() + 2.0).powi(2);
        Ok(AoD::defined(vec![f]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_packing_minimum() {
        let p = IntegerPacking;
        let x = AoD::defined(vec![3.0, -2.0]);
        assert_eq!(p.evaluate(&x).unwrap()[0].to_f64(), 0.0);
    }

    #[test]
    fn constrained_quadratic_feasible_origin_shift() {
        let p = ConstrainedQuadratic;
        let x = AoD::defined(vec![0.0, 0.0, 0.0, 0.0, -5.0]);
        let out = p.evaluate(&x).unwrap();
        assert_eq!(out[0].to_f64(), -5.0);
    }
}
