//! The simplex `Y`: an ordered `(n+1)`-point set, with the `Y0`/`Y_n`
//! dominance decomposition and the rank-of-`DZ` non-degeneracy certificate.

use nalgebra::DMatrix;
use tracing::warn;

use crate::core::eval_point::{dominates, EvalPoint};

/// An ordered simplex of `n+1` evaluated points, ordered by `(f,h)`.
#[derive(Debug, Clone)]
pub struct Simplex {
    points: Vec<EvalPoint>,
}

/// Feasible-first, then `f`, then `h` as a tie-break — the order used both
/// to rank simplex members and to pick the better of two NM candidates.
pub(crate) fn cmp_fh(a: &EvalPoint, b: &EvalPoint) -> std::cmp::Ordering {
    let a_feas = a.is_feasible();
    let b_feas = b.is_feasible();
    match (a_feas, b_feas) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a
            .f
            .partial_cmp(&b.f)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.h.partial_cmp(&b.h).unwrap_or(std::cmp::Ordering::Equal)),
    }
}

impl Simplex {
    pub fn new(mut points: Vec<EvalPoint>) -> Self {
        points.sort_by(cmp_fh);
        Simplex { points }
    }

    pub fn n_plus_1(&self) -> usize {
        self.points.len()
    }

    pub fn dimension(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn points(&self) -> &[EvalPoint] {
        &self.points
    }

    /// The best point, `y_0`.
    pub fn best(&self) -> &EvalPoint {
        &self.points[0]
    }

    /// The worst point under the order, `y_n`.
    pub fn worst(&self) -> &EvalPoint {
        &self.points[self.points.len() - 1]
    }

    /// `Y0`: the undominated members of `Y`.
    pub fn y0_indices(&self) -> Vec<usize> {
        (0..self.points.len())
            .filter(|&i| {
                !self
                    .points
                    .iter()
                    .enumerate()
                    .any(|(j, o)| j != i && dominates(o.f, o.h, self.points[i].f, self.points[i].h))
            })
            .collect()
    }

    /// `Y_n`: the dominated members of `Y`.
    pub fn yn_indices(&self) -> Vec<usize> {
        let y0 = self.y0_indices();
        (0..self.points.len()).filter(|i| !y0.contains(i)).collect()
    }

    /// Centroid of every member except the worst, `y_n`.
    pub fn centroid_excluding_worst(&self) -> crate::core::vector::AoD {
        let m = self.points.len() - 1;
        let n = self.points[0].x.coords().len();
        let mut sum = vec![0.0_f64; n];
        for p in &self.points[..m] {
            for i in 0..n {
                sum[i] += p.x.coords()[i].to_f64();
            }
        }
        crate::core::vector::AoD::defined(sum.into_iter().map(|v| v / m as f64).collect())
    }

    /// `a` dominates every member of `b_indices`.
    pub fn dominates_all(&self, a: &EvalPoint, indices: &[usize]) -> bool {
        indices
            .iter()
            .all(|&i| dominates(a.f, a.h, self.points[i].f, self.points[i].h))
    }

    /// `a` is dominated by at least one member of `indices`.
    pub fn dominated_by_any(&self, a: &EvalPoint, indices: &[usize]) -> bool {
        indices.iter().any(|&i| dominates(self.points[i].f, self.points[i].h, a.f, a.h))
    }

    /// Number of current simplex members that `a` dominates.
    pub fn count_dominated_by(&self, a: &EvalPoint) -> usize {
        self.points.iter().filter(|o| dominates(a.f, a.h, o.f, o.h)).count()
    }

    /// Rank of `DZ = [y_1-y_0, .., y_n-y_0]`, the numerical non-degeneracy
    /// certificate. `full_rank()` is `rank(DZ) == n`.
    pub fn rank(&self) -> usize {
        let n = self.dimension();
        if n == 0 {
            return 0;
        }
        let y0 = self.points[0].x.coords();
        let mut mat = DMatrix::<f64>::zeros(n, n);
        for (col, p) in self.points[1..].iter().enumerate() {
            for row in 0..n {
                mat[(row, col)] = p.x.coords()[row].to_f64() - y0[row].to_f64();
            }
        }
        mat.rank(1e-10)
    }

    pub fn is_full_rank(&self) -> bool {
        self.rank() == self.dimension()
    }

    /// Replace the worst point and re-sort, rolling back (returning the
    /// previous simplex) if the insertion would drop the rank below `n`
    /// or would not leave the candidate strictly better than the old
    /// worst.
    pub fn try_insert(&self, candidate: EvalPoint) -> Option<Simplex> {
        let old_worst = self.worst();
        if !dominates(candidate.f, candidate.h, old_worst.f, old_worst.h) {
            return None;
        }
        let mut new_points = self.points.clone();
        let last = new_points.len() - 1;
        new_points[last] = candidate;
        let candidate_simplex = Simplex::new(new_points);
        if !candidate_simplex.is_full_rank() {
            warn!("simplex insertion would drop rank(DZ) below n, rolling back");
            return None;
        }
        Some(candidate_simplex)
    }

    /// Shrink every point toward `y_0` by factor `gamma`: `y_i = y_0 +
    /// gamma*(y_i - y_0)`. Caller re-evaluates the shrunk points.
    pub fn shrink_targets(&self, gamma: f64) -> Vec<crate::core::vector::AoD> {
        let y0 = self.points[0].x.coords().clone();
        self.points
            .iter()
            .map(|p| {
                let n = p.x.coords().len();
                let mut out = vec![0.0; n];
                for i in 0..n {
                    out[i] = y0[i].to_f64() + gamma * (p.x.coords()[i].to_f64() - y0[i].to_f64());
                }
                crate::core::vector::AoD::defined(out)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::eval_point::StepTag;
    use crate::core::point::Point;
    use crate::core::vector::{AoD, HNorm};

    fn pt(coords: Vec<f64>, f: f64) -> EvalPoint {
        let mut e = EvalPoint::new(Point::new(AoD::defined(coords)), StepTag::Initial);
        e.set_outputs(AoD::defined(vec![f, -1.0]), HNorm::L2);
        e
    }

    fn triangle() -> Simplex {
        Simplex::new(vec![
            pt(vec![0.0, 0.0], 3.0),
            pt(vec![1.0, 0.0], 1.0),
            pt(vec![0.0, 1.0], 2.0),
        ])
    }

    #[test]
    fn sorted_best_first() {
        let s = triangle();
        assert_eq!(s.best().f, crate::core::scalar::D::Value(1.0));
        assert_eq!(s.worst().f, crate::core::scalar::D::Value(3.0));
    }

    #[test]
    fn full_rank_triangle() {
        let s = triangle();
        assert!(s.is_full_rank());
    }

    #[test]
    fn degenerate_simplex_loses_rank() {
        let s = Simplex::new(vec![
            pt(vec![0.0, 0.0], 3.0),
            pt(vec![1.0, 0.0], 1.0),
            pt(vec![2.0, 0.0], 2.0),
        ]);
        assert!(!s.is_full_rank());
    }

    #[test]
    fn try_insert_rejects_non_improving() {
        let s = triangle();
        let worse = pt(vec![5.0, 5.0], 100.0);
        assert!(s.try_insert(worse).is_none());
    }

    #[test]
    fn try_insert_accepts_improving_full_rank() {
        let s = triangle();
        let better = pt(vec![0.3, 0.3], 0.5);
        let inserted = s.try_insert(better).unwrap();
        assert!(inserted.is_full_rank());
        assert_eq!(inserted.best().f, crate::core::scalar::D::Value(0.5));
    }
}
