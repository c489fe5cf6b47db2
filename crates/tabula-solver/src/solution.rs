use crate::simplex::Method;
use crate::tableau::{ColumnKind, Tableau};
use crate::trace::Trace;

/// The result of solving an LP problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Solution {
    /// Method that produced this result
    pub method: Method,
    /// Solution status
    pub status: SolutionStatus,
    /// RHS of the final objective row. Only the optimum when `status` is
    /// `Optimal`; after an infeasible two-phase run it is the phase 1 value.
    pub objective_value: f64,
    /// RHS column of the constraint rows, in row order
    pub basic_values: Vec<f64>,
    /// Column basic in each constraint row of the final tableau
    pub basis: Vec<Option<usize>>,
    /// Labels of the final tableau's columns (RHS excluded)
    pub columns: Vec<String>,
    /// Value of each structural variable (zero when non-basic)
    pub values: Vec<f64>,
    /// Column chosen by the last optimality test
    pub last_entering_column: Option<usize>,
    /// Row chosen by the last successful ratio test
    pub last_leaving_row: Option<usize>,
    /// Pivots performed across all phases
    pub iterations: usize,
    /// Snapshots and diagnostic messages
    pub trace: Trace,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// The iteration cap was reached before the optimality test passed
    IterationLimit,
}

impl SolutionStatus {
    pub fn is_optimal(self) -> bool {
        self == SolutionStatus::Optimal
    }
}

impl Solution {
    /// Reads the summary off the final tableau
    pub(crate) fn extract(
        method: Method,
        status: SolutionStatus,
        tableau: &Tableau,
        n_vars: usize,
        cursor: Cursor,
        trace: Trace,
    ) -> Self {
        let basic_values = tableau.rhs_values();

        let mut values = vec![0.0; n_vars];
        for (i, basic) in tableau.basis().iter().enumerate() {
            if let Some(ColumnKind::Structural(j)) = basic.map(|b| tableau.columns()[b]) {
                values[j] = basic_values[i];
            }
        }

        Self {
            method,
            status,
            objective_value: tableau.objective_value(),
            basic_values,
            basis: tableau.basis().to_vec(),
            columns: tableau.column_labels(),
            values,
            last_entering_column: cursor.entering_column,
            last_leaving_row: cursor.leaving_row,
            iterations: cursor.iterations,
            trace,
        }
    }

    /// Label of the column basic in each row, `None` for redundant rows
    pub fn basis_labels(&self) -> Vec<Option<&str>> {
        self.basis
            .iter()
            .map(|b| b.map(|col| self.columns[col].as_str()))
            .collect()
    }
}

/// Latest selection made by the iteration loop, carried across phases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Cursor {
    pub entering_column: Option<usize>,
    pub leaving_row: Option<usize>,
    pub iterations: usize,
}
