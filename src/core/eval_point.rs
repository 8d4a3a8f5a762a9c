use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::mesh::GMesh;
use super::point::Point;
use super::scalar::D;
use super::vector::{AoD, HNorm};

/// Outcome of handing a point to the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvalStatus {
    Ok,
    Failed,
    Pending,
}

/// Which computation produced a point's outputs — kept narrow: only
/// blackbox and (routing-stub) model evaluations exist here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvalType {
    Bb,
    Model,
}

/// Which step produced a trial point, used for provenance display and for
/// the speculative-search direction `d = x_c - x_p`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepTag {
    Initial,
    Poll,
    Search(SearchKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchKind {
    Speculative,
    IntegerLineSearch,
    Cache,
    QuadModel,
    NelderMead,
}

/// A point plus its outputs, feasibility measure, and provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalPoint {
    pub x: Point,
    pub outputs: Option<AoD>,
    pub eval_status: EvalStatus,
    pub eval_type: EvalType,
    pub f: D,
    pub h: D,
    #[serde(skip)]
    pub generated_from: Option<Point>,
    pub gen_step: StepTag,
    #[serde(skip)]
    pub mesh: Option<Arc<GMesh>>,
}

impl EvalPoint {
    pub fn new(x: Point, gen_step: StepTag) -> Self {
        EvalPoint {
            x,
            outputs: None,
            eval_status: EvalStatus::Pending,
            eval_type: EvalType::Bb,
            f: D::Undefined,
            h: D::Undefined,
            generated_from: None,
            gen_step,
            mesh: None,
        }
    }

    /// Sets outputs and derives `f` (first output, `OBJ`) and `h` (sum of
    /// positive parts of the remaining constraint outputs) under the
    /// given norm. Non-finite outputs mark the point failed and never
    /// populate `f`/`h`.
    pub fn set_outputs(&mut self, outputs: AoD, norm: HNorm) {
        let all_finite = outputs
            .iter()
            .all(|d| matches!(d, D::Value(v) if v.is_finite()));
        if !all_finite || outputs.is_empty() {
            self.eval_status = EvalStatus::Failed;
            self.outputs = Some(outputs);
            self.f = D::Undefined;
            self.h = D::Undefined;
            return;
        }
        self.f = outputs[0];
        let cstr = AoD::new(outputs.0[1..].to_vec());
        self.h = cstr.positive_part_norm(norm);
        self.outputs = Some(outputs);
        self.eval_status = EvalStatus::Ok;
    }

    /// `h = 0 <=> isFeasible()`.
    pub fn is_feasible(&self) -> bool {
        self.eval_status == EvalStatus::Ok && self.h == D::ZERO
    }

    pub fn is_ok(&self) -> bool {
        self.eval_status == EvalStatus::Ok
    }
}

/// `a dominates b` iff `f(a) <= f(b) && h(a) <= h(b)` with at least one
/// strict.
pub fn dominates(fa: D, ha: D, fb: D, hb: D) -> bool {
    match (fa.partial_cmp(&fb), ha.partial_cmp(&hb)) {
        (Some(fo), Some(ho)) => {
            let f_leq = fo != std::cmp::Ordering::Greater;
            let h_leq = ho != std::cmp::Ordering::Greater;
            let strict = fo == std::cmp::Ordering::Less || ho == std::cmp::Ordering::Less;
            f_leq && h_leq && strict
        }
        _ => false,
    }
}
