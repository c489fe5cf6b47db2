use std::fmt;

use log::{info, warn};

use crate::error::SolveError;
use crate::pivot::PivotEngine;
use crate::problem::{LpProblem, Sense};
use crate::solution::{Cursor, Solution, SolutionStatus};
use crate::tableau::Tableau;
use crate::trace::Trace;
use crate::{big_m, standard, two_phase};

/// Tableau construction strategy
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// One slack per constraint; every row must be `<=` with non-negative rhs
    Standard,
    /// Artificial variables penalized by a large constant in the objective
    BigM,
    /// Feasibility phase on the artificial sum, then the real objective
    TwoPhase,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Standard => "standard simplex",
            Method::BigM => "Big-M",
            Method::TwoPhase => "two-phase",
        };
        f.write_str(name)
    }
}

/// Simplex solver for linear programming problems
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum pivots per phase before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
    /// Big-M penalty on artificial variables
    big_m: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
            big_m: 1e6,
        }
    }
}

/// How one run of the iteration loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopOutcome {
    Optimal,
    Unbounded { column: usize },
    IterationLimit,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Sets the Big-M penalty.
    ///
    /// M has to dominate every other coefficient of the problem, otherwise
    /// the method can settle on a basis that keeps an artificial variable and
    /// report a wrong optimum. A very large M swamps the real costs in the
    /// objective row and loses precision, so pick the smallest value that
    /// comfortably dominates the data.
    pub fn with_big_m(mut self, m: f64) -> Self {
        self.big_m = m;
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn big_m(&self) -> f64 {
        self.big_m
    }

    pub fn engine(&self) -> PivotEngine {
        PivotEngine::new(self.tolerance)
    }

    /// Validates the problem and solves it with the given method.
    ///
    /// Infeasible, unbounded and non-converging problems are reported through
    /// [`SolutionStatus`] with the trace collected up to that point. An `Err`
    /// means the input was rejected or the elimination hit a zero pivot.
    pub fn solve(&self, problem: &LpProblem, method: Method) -> Result<Solution, SolveError> {
        problem.validate()?;
        info!(
            "solving {} variables x {} constraints with the {} method",
            problem.num_variables(),
            problem.num_constraints(),
            method
        );

        let solution = match method {
            Method::Standard => standard::solve(self, problem)?,
            Method::BigM => big_m::solve(self, problem)?,
            Method::TwoPhase => two_phase::solve(self, problem)?,
        };

        info!(
            "{} method finished: {:?} after {} pivots, objective {}",
            method, solution.status, solution.iterations, solution.objective_value
        );
        Ok(solution)
    }

    /// Pivots until the optimality test passes, the ratio test fails or the
    /// iteration cap is hit. Each pivot appends a snapshot labeled with the
    /// chosen column and row.
    pub(crate) fn iterate(
        &self,
        tableau: &mut Tableau,
        sense: Sense,
        phase: Option<&str>,
        cursor: &mut Cursor,
        trace: &mut Trace,
    ) -> Result<LoopOutcome, SolveError> {
        let engine = self.engine();
        let mut step = 0;

        loop {
            let selection = engine.select(tableau, sense);
            let col = selection.entering_column;
            cursor.entering_column = Some(col);
            if engine.is_optimal(tableau, col, sense) {
                return Ok(LoopOutcome::Optimal);
            }
            if step == self.max_iterations {
                return Ok(LoopOutcome::IterationLimit);
            }

            let Some(row) = selection.leaving_row else {
                return Ok(LoopOutcome::Unbounded { column: col });
            };
            engine.pivot(tableau, row, col)?;
            cursor.leaving_row = Some(row);
            cursor.iterations += 1;
            step += 1;

            let label = match phase {
                Some(phase) => format!("{} iteration {}: pivot column {}, pivot row {}", phase, step, col, row),
                None => format!("Iteration {}: pivot column {}, pivot row {}", step, col, row),
            };
            trace.record(label, tableau);
        }
    }

    /// Turns a loop outcome into a status, noting the terminal diagnostic.
    pub(crate) fn conclude(&self, outcome: LoopOutcome, tableau: &Tableau, trace: &mut Trace) -> SolutionStatus {
        match outcome {
            LoopOutcome::Optimal => {
                trace.note(format!("Optimal solution found: Z = {}", tableau.objective_value()));
                SolutionStatus::Optimal
            }
            LoopOutcome::Unbounded { column } => {
                warn!("column {} has no positive entry, problem is unbounded", column);
                trace.note(format!(
                    "The problem is unbounded: column {} has no positive entry for the ratio test",
                    column
                ));
                SolutionStatus::Unbounded
            }
            LoopOutcome::IterationLimit => {
                warn!("no convergence within {} iterations", self.max_iterations);
                trace.note(format!(
                    "Did not converge within {} iterations",
                    self.max_iterations
                ));
                SolutionStatus::IterationLimit
            }
        }
    }
}
