//! The Nelder-Mead reflective state machine: a pure transition function
//! over `NMState`, tested independently of the mesh and barrier.

/// States of the reflective state machine, plus the `NM_STOP_*` terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NMState {
    Unset,
    Reflect,
    Expand,
    OutsideContract,
    InsideContract,
    Shrink,
    InsertInY,
    Continue,
    NmStopNoShrink,
    NmStopSingleCompleted,
    NmStopInitialFailed,
}

impl NMState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            NMState::NmStopNoShrink | NMState::NmStopSingleCompleted | NMState::NmStopInitialFailed
        )
    }
}

/// The action the driver must take to reach the next state: evaluate a new
/// trial point, attempt an insertion, or shrink the whole simplex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NMAction {
    EvaluateExpand,
    EvaluateOutsideContract,
    EvaluateInsideContract,
    InsertBetterOf2,
    InsertCandidate,
    ShrinkSimplex,
    None,
}

/// How the just-evaluated reflection point `x_t` classifies against `Y0`/
/// `Y_n`, computed by the caller via [`crate::solvers::nelder_mead::simplex::Simplex`].
#[derive(Debug, Clone, Copy)]
pub struct ReflectClassification {
    pub dominates_all_y0: bool,
    pub dominated_by_yn: bool,
    pub dominated_count: usize,
}

/// Whether an attempted insertion into `Y` succeeded (rank and
/// strictly-better-than-`y_n` preserved).
pub fn after_insert(ok: bool, allow_shrink: bool) -> NMState {
    if ok {
        NMState::Continue
    } else if allow_shrink {
        NMState::Shrink
    } else {
        NMState::Continue
    }
}

/// Transition out of `REFLECT` given how `x_t` classified. Returns the next
/// state and the action the driver must perform to reach it.
pub fn step_reflect(c: ReflectClassification) -> (NMState, NMAction) {
    if c.dominates_all_y0 {
        (NMState::Expand, NMAction::EvaluateExpand)
    } else if c.dominated_by_yn {
        (NMState::InsideContract, NMAction::EvaluateInsideContract)
    } else if c.dominated_count >= 2 {
        (NMState::InsertInY, NMAction::InsertCandidate)
    } else {
        (NMState::OutsideContract, NMAction::EvaluateOutsideContract)
    }
}

/// `EXPAND` always proceeds to inserting the better of `(x_R, x_E)`.
pub fn step_expand() -> (NMState, NMAction) {
    (NMState::InsertInY, NMAction::InsertBetterOf2)
}

/// `OUTSIDE_CONTRACT` always proceeds to inserting the better of `(x_R, x_OC)`.
pub fn step_outside_contract() -> (NMState, NMAction) {
    (NMState::InsertInY, NMAction::InsertBetterOf2)
}

/// `INSIDE_CONTRACT`: shrink if `x_IC` is dominated by `Y_n`, else attempt
/// to insert it.
pub fn step_inside_contract(dominated_by_yn: bool) -> (NMState, NMAction) {
    if dominated_by_yn {
        (NMState::Shrink, NMAction::ShrinkSimplex)
    } else {
        (NMState::InsertInY, NMAction::InsertCandidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_dominating_y0_expands() {
        let c = ReflectClassification {
            dominates_all_y0: true,
            dominated_by_yn: false,
            dominated_count: 3,
        };
        assert_eq!(step_reflect(c).0, NMState::Expand);
    }

    #[test]
    fn reflect_dominated_by_yn_inside_contracts() {
        let c = ReflectClassification {
            dominates_all_y0: false,
            dominated_by_yn: true,
            dominated_count: 0,
        };
        assert_eq!(step_reflect(c).0, NMState::InsideContract);
    }

    #[test]
    fn reflect_dominates_two_inserts() {
        let c = ReflectClassification {
            dominates_all_y0: false,
            dominated_by_yn: false,
            dominated_count: 2,
        };
        let (state, action) = step_reflect(c);
        assert_eq!(state, NMState::InsertInY);
        assert_eq!(action, NMAction::InsertCandidate);
    }

    #[test]
    fn reflect_dominates_one_outside_contracts() {
        let c = ReflectClassification {
            dominates_all_y0: false,
            dominated_by_yn: false,
            dominated_count: 1,
        };
        assert_eq!(step_reflect(c).0, NMState::OutsideContract);
    }

    #[test]
    fn inside_contract_dominated_shrinks() {
        assert_eq!(step_inside_contract(true).0, NMState::Shrink);
    }

    #[test]
    fn inside_contract_not_dominated_inserts() {
        assert_eq!(step_inside_contract(false).0, NMState::InsertInY);
    }

    #[test]
    fn failed_insertion_falls_to_shrink_when_allowed() {
        assert_eq!(after_insert(false, true), NMState::Shrink);
        assert_eq!(after_insert(false, false), NMState::Continue);
        assert_eq!(after_insert(true, true), NMState::Continue);
    }
}
