//! Integer expansion line search: the speculative-search idea restricted
//! to integer coordinates, with the direction reduced by its gcd and step
//! sizes clipped to stay inside bounds.

use crate::core::point::VariableType;
use crate::core::scalar::D;
use crate::core::vector::AoD;

use super::{SearchContext, SearchMethod};

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Divides every integer-coordinate entry of `d` by `gcd(|d_i|)` over the
/// integer coordinates (non-integer coordinates pass through unchanged).
fn reduce_by_gcd(d: &AoD, integer_mask: &[bool]) -> AoD {
    let ints: Vec<i64> = d
        .iter()
        .zip(integer_mask)
        .filter(|(_, &is_int)| is_int)
        .map(|(v, _)| v.to_f64().round() as i64)
        .filter(|v| *v != 0)
        .collect();
    let g = ints.into_iter().fold(0i64, gcd).max(1);
    AoD::new(
        d.iter()
            .zip(integer_mask)
            .map(|(v, &is_int)| if is_int { D::Value((v.to_f64() / g as f64).round()) } else { *v })
            .collect(),
    )
}

pub struct IntegerLineSearch {
    pub max_power: u32,
}

impl Default for IntegerLineSearch {
    fn default() -> Self {
        IntegerLineSearch { max_power: 4 }
    }
}

impl SearchMethod for IntegerLineSearch {
    fn generate_trial_points_final(&self, ctx: &SearchContext) -> Vec<AoD> {
        let Some(predecessor) = ctx.predecessor else {
            return Vec::new();
        };
        let integer_mask: Vec<bool> = ctx
            .input_type
            .iter()
            .map(|t| matches!(t, VariableType::Integer | VariableType::Binary))
            .collect();
        if !integer_mask.iter().any(|&b| b) {
            return Vec::new();
        }

        let raw = predecessor.vectorize(ctx.frame_center);
        let d = reduce_by_gcd(&raw, &integer_mask);

        (0..=self.max_power)
            .map(|k| 2f64.powi(k as i32))
            .map(|step| ctx.frame_center.add(&d.scale(step)))
            .map(|cand| cand.snap_to_bounds(ctx.lb, ctx.ub))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::GMesh;

    fn mesh2() -> GMesh {
        GMesh::initial(
            &AoD::undefined(2),
            &AoD::undefined(2),
            &AoD::zeros(2),
            AoD::zeros(2),
            Some(AoD::defined(vec![1.0, 1.0])),
            None,
            AoD::defined(vec![1e-9, 1e-9]),
            AoD::defined(vec![1e-9, 1e-9]),
        )
    }

    #[test]
    fn gcd_reduces_direction() {
        let d = AoD::defined(vec![4.0, 6.0]);
        let mask = [true, true];
        let reduced = reduce_by_gcd(&d, &mask);
        assert_eq!(reduced, AoD::defined(vec![2.0, 3.0]));
    }

    #[test]
    fn no_integer_coordinates_yields_no_candidates() {
        let search = IntegerLineSearch::default();
        let mesh = mesh2();
        let predecessor = AoD::defined(vec![0.0, 0.0]);
        let center = AoD::defined(vec![2.0, 4.0]);
        let lb = AoD::undefined(2);
        let ub = AoD::undefined(2);
        let types = [VariableType::Continuous, VariableType::Continuous];
        let ctx = SearchContext {
            frame_center: &center,
            predecessor: Some(&predecessor),
            mesh: &mesh,
            lb: &lb,
            ub: &ub,
            input_type: &types,
        };
        assert!(search.generate_trial_points_final(&ctx).is_empty());
    }

    #[test]
    fn clips_to_bounds() {
        let search = IntegerLineSearch { max_power: 3 };
        let mesh = mesh2();
        let predecessor = AoD::defined(vec![0.0, 0.0]);
        let center = AoD::defined(vec![1.0, 0.0]);
        let lb = AoD::defined(vec![0.0, 0.0]);
        let ub = AoD::defined(vec![5.0, 5.0]);
        let types = [VariableType::Integer, VariableType::Integer];
        let ctx = SearchContext {
            frame_center: &center,
            predecessor: Some(&predecessor),
            mesh: &mesh,
            lb: &lb,
            ub: &ub,
            input_type: &types,
        };
        let candidates = search.generate_trial_points_final(&ctx);
        for c in &candidates {
            assert!(c[0].to_f64() <= 5.0);
        }
    }
}
