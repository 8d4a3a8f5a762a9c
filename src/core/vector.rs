use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use super::scalar::D;

/// Norm used to compute the infeasibility measure `h` and generic vector
/// norms elsewhere (mesh direction scaling, simplex diameter checks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HNorm {
    L1,
    L2,
    LInf,
}

/// A fixed-length ordered sequence of [`D`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AoD(pub Vec<D>);

impl AoD {
    pub fn new(values: Vec<D>) -> Self {
        AoD(values)
    }

    pub fn defined(values: Vec<f64>) -> Self {
        AoD(values.into_iter().map(D::Value).collect())
    }

    pub fn undefined(n: usize) -> Self {
        AoD(vec![D::Undefined; n])
    }

    pub fn zeros(n: usize) -> Self {
        AoD(vec![D::ZERO; n])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, D> {
        self.0.iter()
    }

    pub fn all_defined(&self) -> bool {
        self.0.iter().all(D::is_defined)
    }

    pub fn set(&mut self, i: usize, v: D) {
        self.0[i] = v;
    }

    /// `b - a`: the displacement vector from `self` to `other`.
    pub fn vectorize(&self, other: &AoD) -> AoD {
        assert_eq!(self.len(), other.len());
        AoD(self.0.iter().zip(&other.0).map(|(a, b)| *b - *a).collect())
    }

    pub fn add(&self, other: &AoD) -> AoD {
        assert_eq!(self.len(), other.len());
        AoD(self.0.iter().zip(&other.0).map(|(a, b)| *a + *b).collect())
    }

    pub fn sub(&self, other: &AoD) -> AoD {
        assert_eq!(self.len(), other.len());
        AoD(self.0.iter().zip(&other.0).map(|(a, b)| *a - *b).collect())
    }

    pub fn scale(&self, s: f64) -> AoD {
        AoD(self
            .0
            .iter()
            .map(|a| *a * D::Value(s))
            .collect())
    }

    pub fn norm(&self, kind: HNorm) -> D {
        if !self.all_defined() {
            return D::Undefined;
        }
        let vals: Vec<f64> = self.0.iter().map(|d| d.to_f64()).collect();
        let n = match kind {
            HNorm::L1 => vals.iter().map(|v| v.abs()).sum::<f64>(),
            HNorm::L2 => vals.iter().map(|v| v * v).sum::<f64>().sqrt(),
            HNorm::LInf => vals.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())),
        };
        D::Value(n)
    }

    /// Sum of positive parts under the given norm — the infeasibility
    /// measure `h`, computed over inequality-constraint outputs.
    pub fn positive_part_norm(&self, kind: HNorm) -> D {
        if !self.all_defined() {
            return D::Undefined;
        }
        let pos: Vec<f64> = self.0.iter().map(|d| d.to_f64().max(0.0)).collect();
        let n = match kind {
            HNorm::L1 => pos.iter().sum::<f64>(),
            HNorm::L2 => pos.iter().map(|v| v * v).sum::<f64>().sqrt(),
            HNorm::LInf => pos.iter().fold(0.0_f64, |acc, v| acc.max(*v)),
        };
        D::Value(n)
    }

    /// Snap every coordinate into `[lb, ub]` (component bounds, either side
    /// may be undefined meaning unbounded).
    pub fn snap_to_bounds(&self, lb: &AoD, ub: &AoD) -> AoD {
        assert_eq!(self.len(), lb.len());
        assert_eq!(self.len(), ub.len());
        let mut out = self.clone();
        for i in 0..out.len() {
            if let (D::Value(v), D::Value(l)) = (out.0[i], lb.0[i]) {
                if v < l {
                    out.0[i] = D::Value(l);
                }
            }
            if let (D::Value(v), D::Value(u)) = (out.0[i], ub.0[i]) {
                if v > u {
                    out.0[i] = D::Value(u);
                }
            }
        }
        out
    }
}

impl Index<usize> for AoD {
    type Output = D;
    fn index(&self, i: usize) -> &D {
        &self.0[i]
    }
}

impl IndexMut<usize> for AoD {
    fn index_mut(&mut self, i: usize) -> &mut D {
        &mut self.0[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectorize_is_displacement() {
        let a = AoD::defined(vec![1.0, 2.0]);
        let b = AoD::defined(vec![3.0, 1.0]);
        let d = a.vectorize(&b);
        assert_eq!(d, AoD::defined(vec![2.0, -1.0]));
    }

    #[test]
    fn positive_part_norm_zero_iff_feasible() {
        let feas = AoD::defined(vec![-1.0, -2.0]);
        assert_eq!(feas.positive_part_norm(HNorm::L2), D::ZERO);
        let infeas = AoD::defined(vec![1.0, -2.0]);
        assert_eq!(infeas.positive_part_norm(HNorm::L2), D::Value(1.0));
    }

    #[test]
    fn snap_to_bounds_clamps() {
        let p = AoD::defined(vec![-5.0, 10.0]);
        let lb = AoD::defined(vec![0.0, 0.0]);
        let ub = AoD::defined(vec![1.0, 1.0]);
        assert_eq!(p.snap_to_bounds(&lb, &ub), AoD::defined(vec![0.0, 1.0]));
    }
}
