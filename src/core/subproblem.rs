//! Maps each running algorithm instance to the set of variables it has
//! fixed, for full-space <-> sub-space conversion.
//!
//! A plain owned value threaded explicitly through each call rather than a
//! process-wide singleton, so nested fixed-variable instances never step
//! on each other's state.

use crate::core::point::Point;
use crate::core::scalar::D;
use crate::core::vector::AoD;

/// The fixed-variable projection owned by one algorithm instance.
#[derive(Debug, Clone)]
pub struct Subproblem {
    /// `Some(v)` at index `i` means coordinate `i` is pinned to `v` and
    /// excluded from this instance's search sub-space.
    fixed: Vec<Option<D>>,
}

impl Subproblem {
    pub fn new(fixed: Vec<Option<D>>) -> Self {
        Subproblem { fixed }
    }

    pub fn full_dimension(&self) -> usize {
        self.fixed.len()
    }

    pub fn sub_dimension(&self) -> usize {
        self.fixed.iter().filter(|f| f.is_none()).count()
    }

    pub fn free_indices(&self) -> Vec<usize> {
        (0..self.full_dimension())
            .filter(|&i| self.fixed[i].is_none())
            .collect()
    }

    /// Projects a full-space point down into this instance's sub-space.
    pub fn to_sub_space(&self, full: &Point) -> AoD {
        let free = self.free_indices();
        AoD::new(free.iter().map(|&i| full.coords()[i]).collect())
    }

    /// Expands a sub-space point back into full space, using the pinned
    /// values for fixed coordinates.
    pub fn to_full_space(&self, sub: &AoD) -> Point {
        let free = self.free_indices();
        let mut coords = vec![D::Undefined; self.full_dimension()];
        for (k, &i) in free.iter().enumerate() {
            coords[i] = sub[k];
        }
        for (i, f) in self.fixed.iter().enumerate() {
            if let Some(v) = f {
                coords[i] = *v;
            }
        }
        Point::new(AoD::new(coords))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_through_sub_space() {
        let sub = Subproblem::new(vec![Some(D::Value(9.0)), None, None, Some(D::Value(-1.0)), None]);
        assert_eq!(sub.sub_dimension(), 3);
        let full = Point::new(AoD::defined(vec![9.0, 1.0, 2.0, -1.0, 3.0]));
        let s = sub.to_sub_space(&full);
        assert_eq!(s, AoD::defined(vec![1.0, 2.0, 3.0]));
        let back = sub.to_full_space(&s);
        assert_eq!(back, full);
    }
}
