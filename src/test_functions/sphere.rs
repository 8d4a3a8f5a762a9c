use std::convert::Infallible;

use crate::core::vector::AoD;
use crate::traits::Function;

/// `f(x) = sum x_i^2`, global minimum `f(0,..,0) = 0`. Used by the
/// "Sphere, n=3" end-to-end scenario.
pub struct Sphere {
    pub n: usize,
}

impl Function for Sphere {
    type Error = Infallible;

    fn evaluate(&self, x: &AoD) -> Result<AoD, Infallible> {
        let f: f64 = (0..self.n).map(|i| x[i].to_f64().powi(2)).sum();
        Ok(AoD::defined(vec![f]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_at_origin() {
        let s = Sphere { n: 3 };
        let x = AoD::defined(vec![0.0, 0.0, 0.0]);
        assert_eq!(s.evaluate(&x).unwrap()[0].to_f64(), 0.0);
    }
}
