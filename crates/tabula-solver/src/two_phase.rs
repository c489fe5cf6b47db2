//! Two-phase method.
//!
//! Phase 1 minimizes the sum of the artificial variables. If that sum cannot
//! be driven to zero the original problem is infeasible. Otherwise the
//! artificial columns are dropped and phase 2 optimizes the real objective
//! from the feasible basis phase 1 left behind.

use log::{info, warn};

use crate::error::SolveError;
use crate::pivot::PivotEngine;
use crate::problem::{LpProblem, Sense};
use crate::simplex::{LoopOutcome, Method, Solver};
use crate::solution::{Cursor, Solution, SolutionStatus};
use crate::tableau::{self, Tableau};
use crate::trace::Trace;

/// Phase 1 tableau: objective row is 1 in every artificial column, reduced
/// against each artificial's row so the artificials start with zero cost.
///
/// The row holds `c_j - z_j` of `min sum(a)`, so it is iterated with the
/// maximize rule and its RHS is minus the current artificial sum.
pub fn initialize_phase1(problem: &LpProblem, trace: &mut Trace) -> Tableau {
    let rows = tableau::normalize(problem);
    for (i, row) in rows.iter().enumerate() {
        if row.flipped {
            trace.note(format!(
                "Constraint {} has a negative rhs; multiplied by -1 (now {})",
                i + 1,
                row.op
            ));
        }
        if row.op.needs_artificial() {
            trace.note(format!("Artificial variable added in constraint {}", i + 1));
        }
    }

    let mut tableau = Tableau::augmented(&rows, problem.num_variables());
    let obj = tableau.objective_row_index();
    let artificials: Vec<usize> = tableau.artificial_columns().collect();
    for &col in &artificials {
        tableau.set(obj, col, 1.0);
    }

    for i in 0..tableau.num_constraints() {
        if tableau.basis()[i].is_some_and(|col| artificials.contains(&col)) {
            tableau.subtract_scaled_row(obj, i, 1.0);
        }
    }

    tableau
}

/// Phase 2 tableau: artificial columns removed, the real objective installed
/// and expressed in terms of the basis phase 1 ended with.
pub fn initialize_phase2(
    phase1: &Tableau,
    problem: &LpProblem,
    engine: &PivotEngine,
    trace: &mut Trace,
) -> Result<Tableau, SolveError> {
    let mut working = phase1.clone();
    drive_out_artificials(&mut working, engine, trace)?;

    let mut tableau = working.retain_columns(|kind| !kind.is_artificial());
    tableau.install_objective(&problem.objective.coefficients);
    tableau.price_out_basis();
    Ok(tableau)
}

/// Artificials still basic (at zero level) after a feasible phase 1 are
/// swapped for any non-artificial column with a nonzero entry in their row.
/// A row without one is redundant and keeps no basic variable.
fn drive_out_artificials(tableau: &mut Tableau, engine: &PivotEngine, trace: &mut Trace) -> Result<(), SolveError> {
    let rhs_col = tableau.rhs_col();

    for i in 0..tableau.num_constraints() {
        let Some(basic) = tableau.basis()[i] else {
            continue;
        };
        if !tableau.columns()[basic].is_artificial() {
            continue;
        }

        let replacement = (0..rhs_col).find(|&j| {
            !tableau.columns()[j].is_artificial() && tableau.get(i, j).abs() > engine.tolerance()
        });
        match replacement {
            Some(col) => {
                engine.pivot(tableau, i, col)?;
                trace.note(format!(
                    "Artificial variable {} left the basis at zero level in constraint {}, replaced by {}",
                    tableau.columns()[basic].label(),
                    i + 1,
                    tableau.columns()[col].label()
                ));
            }
            None => {
                trace.note(format!("Constraint {} is redundant", i + 1));
            }
        }
    }

    Ok(())
}

pub(crate) fn solve(solver: &Solver, problem: &LpProblem) -> Result<Solution, SolveError> {
    let n_vars = problem.num_variables();
    let engine = solver.engine();
    let mut trace = Trace::new();
    let mut cursor = Cursor::default();

    trace.note("Starting phase 1: find an initial basic feasible solution");
    let mut tableau = initialize_phase1(problem, &mut trace);
    trace.record("Initial tableau (phase 1)", &tableau);

    let outcome = solver.iterate(&mut tableau, Sense::Maximize, Some("Phase 1"), &mut cursor, &mut trace)?;
    match outcome {
        LoopOutcome::Optimal => {}
        LoopOutcome::Unbounded { .. } => {
            warn!("phase 1 ratio test failed");
            trace.note("The problem has no feasible solution");
            return Ok(Solution::extract(
                Method::TwoPhase,
                SolutionStatus::Infeasible,
                &tableau,
                n_vars,
                cursor,
                trace,
            ));
        }
        LoopOutcome::IterationLimit => {
            let status = solver.conclude(outcome, &tableau, &mut trace);
            return Ok(Solution::extract(Method::TwoPhase, status, &tableau, n_vars, cursor, trace));
        }
    }

    let infeasibility = tableau.objective_value();
    if infeasibility.abs() > solver.tolerance() {
        warn!("phase 1 ended with artificial sum {}", -infeasibility);
        trace.note(format!(
            "The original problem has no feasible solution (phase 1 objective {})",
            -infeasibility
        ));
        return Ok(Solution::extract(
            Method::TwoPhase,
            SolutionStatus::Infeasible,
            &tableau,
            n_vars,
            cursor,
            trace,
        ));
    }

    info!("phase 1 feasible after {} pivots", cursor.iterations);
    trace.note("Starting phase 2: optimize the original objective");
    let mut tableau = initialize_phase2(&tableau, problem, &engine, &mut trace)?;
    trace.record("Initial tableau (phase 2)", &tableau);

    let outcome = solver.iterate(
        &mut tableau,
        problem.objective.sense,
        Some("Phase 2"),
        &mut cursor,
        &mut trace,
    )?;
    let status = solver.conclude(outcome, &tableau, &mut trace);

    Ok(Solution::extract(Method::TwoPhase, status, &tableau, n_vars, cursor, trace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ConstraintOp;

    fn mixed() -> LpProblem {
        let mut problem = LpProblem::with_variable_count(2);
        problem.set_objective(vec![4.0, 1.0], Sense::Minimize);
        problem.add_constraint("c1", vec![3.0, 1.0], ConstraintOp::Eq, 3.0);
        problem.add_constraint("c2", vec![4.0, 3.0], ConstraintOp::Ge, 6.0);
        problem.add_constraint("c3", vec![1.0, 2.0], ConstraintOp::Le, 4.0);
        problem
    }

    #[test]
    fn test_one_artificial_per_ge_or_eq() {
        let mut trace = Trace::new();
        let tableau = initialize_phase1(&mixed(), &mut trace);

        assert_eq!(tableau.artificial_columns().count(), 2);
        assert_eq!(
            tableau.column_labels(),
            vec!["x1", "x2", "_1", "e2", "s3", "a1", "a2"]
        );
        assert_eq!(
            trace.messages(),
            &[
                "Artificial variable added in constraint 1".to_string(),
                "Artificial variable added in constraint 2".to_string(),
            ]
        );
    }

    #[test]
    fn test_phase1_row_zero_on_basic_artificials() {
        let mut trace = Trace::new();
        let tableau = initialize_phase1(&mixed(), &mut trace);
        let obj = tableau.objective_row();

        for (i, basic) in tableau.basis().iter().enumerate() {
            let col = basic.unwrap();
            assert_eq!(obj[col], 0.0, "row {} basic column {}", i, col);
        }
        // 1 - row1 - row2 on the structural and surplus columns
        assert_eq!(&obj[..4], &[-7.0, -4.0, 0.0, 1.0]);
        assert_eq!(tableau.objective_value(), -9.0);
    }

    #[test]
    fn test_phase2_drops_artificials_and_prices_out() {
        let problem = mixed();
        let solver = Solver::new();
        let engine = solver.engine();
        let mut trace = Trace::new();
        let mut cursor = Cursor::default();

        let mut phase1 = initialize_phase1(&problem, &mut trace);
        let outcome = solver
            .iterate(&mut phase1, Sense::Maximize, Some("Phase 1"), &mut cursor, &mut trace)
            .unwrap();
        assert_eq!(outcome, LoopOutcome::Optimal);
        assert!(phase1.objective_value().abs() < 1e-9);

        let phase2 = initialize_phase2(&phase1, &problem, &engine, &mut trace).unwrap();
        assert_eq!(phase2.num_rows(), phase1.num_rows());
        assert_eq!(phase2.num_cols(), phase1.num_cols() - 2);
        assert!(phase2.columns().iter().all(|c| !c.is_artificial()));

        let obj = phase2.objective_row();
        for basic in phase2.basis().iter().flatten() {
            assert!(obj[*basic].abs() < 1e-9);
        }
    }

    #[test]
    fn test_solves_mixed_problem() {
        let solution = Solver::new().solve(&mixed(), Method::TwoPhase).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.objective_value - 3.4).abs() < 1e-6, "obj = {}", solution.objective_value);
        assert!((solution.values[0] - 0.4).abs() < 1e-6);
        assert!((solution.values[1] - 1.8).abs() < 1e-6);

        let messages = solution.trace.messages();
        let phase1 = messages.iter().position(|m| m.starts_with("Starting phase 1")).unwrap();
        let phase2 = messages.iter().position(|m| m.starts_with("Starting phase 2")).unwrap();
        assert!(phase1 < phase2);
        assert!(solution
            .trace
            .snapshots()
            .iter()
            .any(|s| s.label == "Initial tableau (phase 2)"));
    }

    #[test]
    fn test_redundant_equality() {
        // x1 + x2 = 4 stated twice
        let mut problem = LpProblem::with_variable_count(2);
        problem.set_objective(vec![1.0, 2.0], Sense::Maximize);
        problem.add_constraint("a", vec![1.0, 1.0], ConstraintOp::Eq, 4.0);
        problem.add_constraint("b", vec![1.0, 1.0], ConstraintOp::Eq, 4.0);

        let solution = Solver::new().solve(&problem, Method::TwoPhase).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.objective_value - 8.0).abs() < 1e-6);
        assert!((solution.values[1] - 4.0).abs() < 1e-6);
        assert!(solution.basis.contains(&None));
        assert!(solution.trace.messages().iter().any(|m| m.contains("redundant")));
    }
}
