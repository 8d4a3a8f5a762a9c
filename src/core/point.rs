use serde::{Deserialize, Serialize};

use super::error::NomadError;
use super::scalar::D;
use super::vector::AoD;

/// A location in variable space. May be marked "to be defined" for
/// deferred initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    coords: AoD,
    to_be_defined: bool,
}

impl Point {
    pub fn new(coords: AoD) -> Self {
        Point {
            coords,
            to_be_defined: false,
        }
    }

    pub fn to_be_defined(n: usize) -> Self {
        Point {
            coords: AoD::undefined(n),
            to_be_defined: true,
        }
    }

    pub fn is_to_be_defined(&self) -> bool {
        self.to_be_defined
    }

    pub fn set(&mut self, coords: AoD) {
        self.coords = coords;
        self.to_be_defined = false;
    }

    pub fn coords(&self) -> &AoD {
        &self.coords
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// Per-coordinate input type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableType {
    Continuous,
    Integer,
    Binary,
}

/// Full description of the variable space: bounds, granularity, type and
/// fixed-variable pinning for one coordinate block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableSpace {
    pub input_type: Vec<VariableType>,
    pub granularity: AoD,
    pub lb: AoD,
    pub ub: AoD,
    pub fixed: Vec<Option<D>>,
}

impl VariableSpace {
    pub fn dimension(&self) -> usize {
        self.input_type.len()
    }

    /// Coordinate indices that are not pinned by `fixed` — the active
    /// sub-space a MADS/NM instance actually searches.
    pub fn free_indices(&self) -> Vec<usize> {
        (0..self.dimension())
            .filter(|&i| self.fixed[i].is_none())
            .collect()
    }

    /// Validates cross-array lengths, bound ordering, and the
    /// binary/integer coercions a variable space must satisfy before use.
    pub fn check_and_comply(&mut self) -> Result<(), NomadError> {
        let n = self.dimension();
        if self.granularity.len() != n || self.lb.len() != n || self.ub.len() != n || self.fixed.len() != n {
            return Err(NomadError::InvalidParameter(
                "variable-space arrays must all have the same length as DIMENSION".into(),
            ));
        }

        for i in 0..n {
            // Binary variables force bounds to [0,1] and granularity 1.
            if self.input_type[i] == VariableType::Binary {
                self.lb.set(i, D::Value(0.0));
                self.ub.set(i, D::Value(1.0));
                self.granularity.set(i, D::Value(1.0));
            }

            if self.input_type[i] == VariableType::Integer {
                match self.granularity[i] {
                    D::Value(g) if g >= 1.0 => {}
                    D::Undefined => self.granularity.set(i, D::Value(1.0)),
                    D::Value(g) if g == 0.0 => self.granularity.set(i, D::Value(1.0)),
                    D::Value(g) => {
                        return Err(NomadError::InvalidParameter(format!(
                            "coordinate {i} is integer but has granularity {g} < 1"
                        )));
                    }
                }
            }

            if let (D::Value(l), D::Value(u)) = (self.lb[i], self.ub[i]) {
                if l > u {
                    return Err(NomadError::InvalidParameter(format!(
                        "coordinate {i}: lb={l} > ub={u}"
                    )));
                }
            }

            if let Some(fv) = self.fixed[i] {
                if let D::Value(fv) = fv {
                    if let D::Value(l) = self.lb[i] {
                        if fv < l {
                            return Err(NomadError::InvalidParameter(format!(
                                "coordinate {i}: fixed value {fv} below lower bound {l}"
                            )));
                        }
                    }
                    if let D::Value(u) = self.ub[i] {
                        if fv > u {
                            return Err(NomadError::InvalidParameter(format!(
                                "coordinate {i}: fixed value {fv} above upper bound {u}"
                            )));
                        }
                    }
                } else {
                    return Err(NomadError::InvalidParameter(format!(
                        "coordinate {i}: fixed variable must have a defined value"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space(n: usize) -> VariableSpace {
        VariableSpace {
            input_type: vec![VariableType::Continuous; n],
            granularity: AoD::zeros(n),
            lb: AoD::undefined(n),
            ub: AoD::undefined(n),
            fixed: vec![None; n],
        }
    }

    #[test]
    fn binary_forces_bounds_and_granularity() {
        let mut s = space(1);
        s.input_type[0] = VariableType::Binary;
        s.check_and_comply().unwrap();
        assert_eq!(s.lb[0], D::Value(0.0));
        assert_eq!(s.ub[0], D::Value(1.0));
        assert_eq!(s.granularity[0], D::Value(1.0));
    }

    #[test]
    fn integer_sub_unit_granularity_is_fatal() {
        let mut s = space(1);
        s.input_type[0] = VariableType::Integer;
        s.granularity.set(0, D::Value(0.5));
        assert!(s.check_and_comply().is_err());
    }

    #[test]
    fn lb_greater_than_ub_is_fatal() {
        let mut s = space(1);
        s.lb.set(0, D::Value(5.0));
        s.ub.set(0, D::Value(1.0));
        assert!(s.check_and_comply().is_err());
    }

    #[test]
    fn free_indices_excludes_fixed() {
        let mut s = space(3);
        s.fixed[1] = Some(D::Value(2.0));
        assert_eq!(s.free_indices(), vec![0, 2]);
    }
}
