use log::debug;

use crate::error::SolveError;
use crate::problem::Sense;
use crate::tableau::Tableau;

/// Entering column and leaving row chosen for one iteration.
/// `leaving_row` is `None` when the ratio test finds no eligible row.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PivotSelection {
    pub entering_column: usize,
    pub leaving_row: Option<usize>,
}

/// Column/row selection and Gauss-Jordan elimination shared by every method
#[derive(Debug, Clone, Copy)]
pub struct PivotEngine {
    tolerance: f64,
}

impl PivotEngine {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Most negative objective-row entry when maximizing, most positive when
    /// minimizing. Ties go to the lowest index.
    pub fn select_entering_column(&self, tableau: &Tableau, sense: Sense) -> usize {
        let row = tableau.objective_row();
        let rhs_col = tableau.rhs_col();

        let mut best = 0;
        for j in 1..rhs_col {
            let better = match sense {
                Sense::Maximize => row[j] < row[best],
                Sense::Minimize => row[j] > row[best],
            };
            if better {
                best = j;
            }
        }
        best
    }

    /// True when `col` (the entering candidate) can no longer improve the
    /// objective.
    pub fn is_optimal(&self, tableau: &Tableau, col: usize, sense: Sense) -> bool {
        let value = tableau.objective_row()[col];
        match sense {
            Sense::Maximize => value >= -self.tolerance,
            Sense::Minimize => value <= self.tolerance,
        }
    }

    /// Minimum ratio test over rows with a strictly positive entry in `col`.
    /// Ties go to the lowest index; `None` means the column is unbounded.
    pub fn select_leaving_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let rhs_col = tableau.rhs_col();

        let mut min_ratio = f64::INFINITY;
        let mut min_row = None;

        for i in 0..tableau.num_constraints() {
            let val = tableau.get(i, col);
            if val > self.tolerance {
                let ratio = tableau.get(i, rhs_col) / val;
                if ratio < min_ratio {
                    min_ratio = ratio;
                    min_row = Some(i);
                }
            }
        }

        min_row
    }

    /// Entering column plus the ratio-test row for it
    pub fn select(&self, tableau: &Tableau, sense: Sense) -> PivotSelection {
        let entering_column = self.select_entering_column(tableau, sense);
        PivotSelection {
            entering_column,
            leaving_row: self.select_leaving_row(tableau, entering_column),
        }
    }

    /// Scales `row` so the pivot becomes 1 and eliminates `col` from every
    /// other row, objective included. `col` becomes basic in `row`.
    pub fn pivot(&self, tableau: &mut Tableau, row: usize, col: usize) -> Result<(), SolveError> {
        let pivot_val = tableau.get(row, col);
        if !pivot_val.is_finite() || pivot_val.abs() <= self.tolerance {
            return Err(SolveError::ZeroPivot {
                row,
                column: col,
                value: pivot_val,
            });
        }
        debug!("pivot at row {}, column {} (value {})", row, col, pivot_val);

        tableau.scale_row(row, pivot_val);
        tableau.set(row, col, 1.0);

        for i in 0..tableau.num_rows() {
            if i != row {
                let factor = tableau.get(i, col);
                tableau.subtract_scaled_row(i, row, factor);
                tableau.set(i, col, 0.0);
            }
        }

        tableau.set_basic(row, Some(col));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{ConstraintOp, LpProblem};

    fn scenario_a() -> Tableau {
        let mut problem = LpProblem::with_variable_count(2);
        problem.set_objective(vec![3.0, 5.0], Sense::Maximize);
        problem.add_constraint("c1", vec![1.0, 0.0], ConstraintOp::Le, 4.0);
        problem.add_constraint("c2", vec![0.0, 2.0], ConstraintOp::Le, 12.0);
        problem.add_constraint("c3", vec![3.0, 2.0], ConstraintOp::Le, 18.0);
        let mut tableau = Tableau::with_slacks(&problem);
        tableau.install_objective(&problem.objective.coefficients);
        tableau
    }

    #[test]
    fn test_entering_column() {
        let engine = PivotEngine::new(1e-9);
        let tableau = scenario_a();
        assert_eq!(engine.select_entering_column(&tableau, Sense::Maximize), 1);
        // Objective row is [-3, -5, 0, 0, 0]: most positive is the first zero
        assert_eq!(engine.select_entering_column(&tableau, Sense::Minimize), 2);
        assert!(!engine.is_optimal(&tableau, 1, Sense::Maximize));
        assert!(engine.is_optimal(&tableau, 2, Sense::Minimize));
    }

    #[test]
    fn test_entering_tie_takes_lowest_index() {
        let mut problem = LpProblem::with_variable_count(3);
        problem.add_constraint("c1", vec![1.0, 1.0, 1.0], ConstraintOp::Le, 1.0);
        let mut tableau = Tableau::with_slacks(&problem);
        tableau.install_objective(&[1.0, 4.0, 4.0]);

        let engine = PivotEngine::new(1e-9);
        assert_eq!(engine.select_entering_column(&tableau, Sense::Maximize), 1);
    }

    #[test]
    fn test_ratio_test() {
        let engine = PivotEngine::new(1e-9);
        let tableau = scenario_a();
        // Column x2: ratios inf, 12/2 = 6, 18/2 = 9
        assert_eq!(engine.select_leaving_row(&tableau, 1), Some(1));
        // Column x1: ratios 4, inf, 6
        assert_eq!(engine.select_leaving_row(&tableau, 0), Some(0));
    }

    #[test]
    fn test_ratio_tie_takes_lowest_row() {
        let mut problem = LpProblem::with_variable_count(1);
        problem.add_constraint("c1", vec![0.0], ConstraintOp::Le, 5.0);
        problem.add_constraint("c2", vec![2.0], ConstraintOp::Le, 6.0);
        problem.add_constraint("c3", vec![1.0], ConstraintOp::Le, 3.0);
        let tableau = Tableau::with_slacks(&problem);

        // Rows 1 and 2 both have ratio 3
        let engine = PivotEngine::new(1e-9);
        assert_eq!(engine.select_leaving_row(&tableau, 0), Some(1));
    }

    #[test]
    fn test_ratio_test_skips_non_positive_entries() {
        let mut problem = LpProblem::with_variable_count(2);
        problem.add_constraint("c1", vec![1.0, -1.0], ConstraintOp::Le, 1.0);
        problem.add_constraint("c2", vec![0.0, 0.0], ConstraintOp::Le, 5.0);
        let tableau = Tableau::with_slacks(&problem);

        let engine = PivotEngine::new(1e-9);
        assert_eq!(engine.select_leaving_row(&tableau, 1), None);
    }

    #[test]
    fn test_selection_is_pure() {
        let engine = PivotEngine::new(1e-9);
        let tableau = scenario_a();
        let first = engine.select(&tableau, Sense::Maximize);
        let second = engine.select(&tableau, Sense::Maximize);
        assert_eq!(first, second);
        assert_eq!(
            first,
            PivotSelection {
                entering_column: 1,
                leaving_row: Some(1)
            }
        );
    }

    #[test]
    fn test_pivot_makes_unit_column() {
        let engine = PivotEngine::new(1e-9);
        let mut tableau = scenario_a();
        engine.pivot(&mut tableau, 1, 1).unwrap();

        assert!((tableau.get(1, 1) - 1.0).abs() < 1e-12);
        for i in 0..tableau.num_rows() {
            if i != 1 {
                assert!(tableau.get(i, 1).abs() < 1e-12, "row {} = {}", i, tableau.get(i, 1));
            }
        }
        assert_eq!(tableau.basis()[1], Some(1));
        assert!((tableau.objective_value() - 30.0).abs() < 1e-12);
        assert_eq!(tableau.rhs_values(), vec![4.0, 6.0, 6.0]);
    }

    #[test]
    fn test_zero_pivot_fails_fast() {
        let engine = PivotEngine::new(1e-9);
        let mut tableau = scenario_a();
        let before = tableau.clone();
        let err = engine.pivot(&mut tableau, 0, 1).unwrap_err();
        assert_eq!(
            err,
            SolveError::ZeroPivot {
                row: 0,
                column: 1,
                value: 0.0
            }
        );
        assert_eq!(tableau, before);
    }
}
