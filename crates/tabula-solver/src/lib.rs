//! Tableau-based simplex solver.
//!
//! Three ways of building the starting tableau share one pivot engine:
//! the plain slack tableau, the Big-M penalty method and the two-phase
//! method. Every solve records an append-only trace of tableau snapshots
//! and diagnostic messages next to the final summary.

pub mod big_m;
mod error;
mod pivot;
mod problem;
mod simplex;
mod solution;
pub mod standard;
mod tableau;
mod trace;
pub mod two_phase;

pub use error::{ProblemError, SolveError};
pub use pivot::{PivotEngine, PivotSelection};
pub use problem::{Constraint, ConstraintOp, LpProblem, Objective, Sense};
pub use simplex::{Method, Solver};
pub use solution::{Solution, SolutionStatus};
pub use tableau::{ColumnKind, Tableau};
pub use trace::{Snapshot, Trace};
