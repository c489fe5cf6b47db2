use crate::error::{ProblemError, SolveError};
use crate::problem::{ConstraintOp, LpProblem};
use crate::simplex::{Method, Solver};
use crate::solution::{Cursor, Solution};
use crate::tableau::Tableau;
use crate::trace::Trace;

/// Slack-only tableau. Every constraint must already be `<=` with a
/// non-negative rhs so the slacks form a feasible starting basis. The
/// problem must already have passed [`LpProblem::validate`].
pub fn initialize(problem: &LpProblem) -> Result<Tableau, ProblemError> {
    for (i, c) in problem.constraints.iter().enumerate() {
        if c.op != ConstraintOp::Le || c.rhs < 0.0 {
            return Err(ProblemError::NotStandardForm(i + 1));
        }
    }

    let mut tableau = Tableau::with_slacks(problem);
    tableau.install_objective(&problem.objective.coefficients);
    Ok(tableau)
}

pub(crate) fn solve(solver: &Solver, problem: &LpProblem) -> Result<Solution, SolveError> {
    let mut tableau = initialize(problem)?;

    let mut trace = Trace::new();
    trace.note("Method: standard simplex");
    trace.record("Initial tableau", &tableau);

    let mut cursor = Cursor::default();
    let outcome = solver.iterate(&mut tableau, problem.objective.sense, None, &mut cursor, &mut trace)?;
    let status = solver.conclude(outcome, &tableau, &mut trace);

    Ok(Solution::extract(
        Method::Standard,
        status,
        &tableau,
        problem.num_variables(),
        cursor,
        trace,
    ))
}
