//! Big-M method: artificial variables carry a penalty of M in the objective
//! so that any optimum with a positive artificial is worse than every
//! feasible point.

use log::{debug, warn};

use crate::error::SolveError;
use crate::problem::{LpProblem, Sense};
use crate::simplex::{LoopOutcome, Method, Solver};
use crate::solution::{Cursor, Solution, SolutionStatus};
use crate::tableau::{self, ColumnKind, Tableau};
use crate::trace::Trace;

/// Builds the penalized starting tableau.
///
/// `>=` rows get a surplus (-1) in their slot and a separate artificial
/// column, `=` rows only the artificial column. Each artificial gets
/// reduced cost `+M` (maximize) or `-M` (minimize), which is then priced out
/// against its row so the artificial starts basic with a zero entry.
/// Expects a validated problem.
pub fn initialize(problem: &LpProblem, m: f64, trace: &mut Trace) -> Tableau {
    let rows = tableau::normalize(problem);
    for (i, row) in rows.iter().enumerate() {
        if row.flipped {
            trace.note(format!(
                "Constraint {} has a negative rhs; multiplied by -1 (now {})",
                i + 1,
                row.op
            ));
        }
    }

    let mut tableau = Tableau::augmented(&rows, problem.num_variables());
    for (i, row) in rows.iter().enumerate() {
        if row.op.needs_artificial() {
            trace.note(format!("Artificial variable added in constraint {}", i + 1));
        }
    }

    trace.note(format!("Method: Big-M (M = {})", m));
    tableau.install_objective(&problem.objective.coefficients);

    let penalty = match problem.objective.sense {
        Sense::Maximize => m,
        Sense::Minimize => -m,
    };
    let obj = tableau.objective_row_index();
    for i in 0..tableau.num_constraints() {
        let Some(col) = tableau.basis()[i] else {
            continue;
        };
        if !tableau.columns()[col].is_artificial() {
            continue;
        }

        tableau.set(obj, col, penalty);
        tableau.subtract_scaled_row(obj, i, penalty);
        tableau.set(obj, col, 0.0);
        trace.note(format!(
            "Penalized the objective row by M for constraint {}: {}",
            i + 1,
            format_row(&tableau.objective_row()[..problem.num_variables()])
        ));
    }

    tableau
}

pub(crate) fn solve(solver: &Solver, problem: &LpProblem) -> Result<Solution, SolveError> {
    let mut trace = Trace::new();
    let mut tableau = initialize(problem, solver.big_m(), &mut trace);
    trace.record("Initial tableau", &tableau);

    let mut cursor = Cursor::default();
    let outcome = solver.iterate(&mut tableau, problem.objective.sense, None, &mut cursor, &mut trace)?;

    // A positive artificial means infeasible whether the loop stopped at the
    // optimum or on a column the ratio test could not bound.
    let status = match outcome {
        LoopOutcome::Optimal | LoopOutcome::Unbounded { .. } => {
            match positive_artificial(&tableau, solver.tolerance()) {
                Some((row, col, value)) => {
                    warn!("artificial column {} still basic at {}", col, value);
                    trace.note(format!(
                        "Artificial variable {} remains basic in row {} at {}; the problem has no feasible solution",
                        tableau.columns()[col].label(),
                        row,
                        value
                    ));
                    SolutionStatus::Infeasible
                }
                None => solver.conclude(outcome, &tableau, &mut trace),
            }
        }
        LoopOutcome::IterationLimit => solver.conclude(outcome, &tableau, &mut trace),
    };
    debug!("Big-M finished with {:?}", status);

    Ok(Solution::extract(
        Method::BigM,
        status,
        &tableau,
        problem.num_variables(),
        cursor,
        trace,
    ))
}

/// First artificial column basic at a value above tolerance
fn positive_artificial(tableau: &Tableau, tolerance: f64) -> Option<(usize, usize, f64)> {
    let rhs_col = tableau.rhs_col();
    tableau.basis().iter().enumerate().find_map(|(i, basic)| {
        let col = (*basic)?;
        let value = tableau.get(i, rhs_col);
        (matches!(tableau.columns()[col], ColumnKind::Artificial(_)) && value > tolerance).then_some((i, col, value))
    })
}

fn format_row(values: &[f64]) -> String {
    let cells: Vec<String> = values.iter().map(|v| format!("{}", v)).collect();
    format!("[{}]", cells.join(", "))
}
