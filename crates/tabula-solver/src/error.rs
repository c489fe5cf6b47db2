use thiserror::Error;

/// Malformed problem data, rejected before any tableau is built
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    #[error("Problem has no variables")]
    NoVariables,
    #[error("Problem has no constraints")]
    NoConstraints,
    #[error("Objective has {found} coefficients, expected {expected}")]
    ObjectiveLength { expected: usize, found: usize },
    #[error("Constraint {constraint} has {found} coefficients, expected {expected}")]
    ConstraintLength {
        constraint: usize,
        expected: usize,
        found: usize,
    },
    #[error("Non-finite value in {0}")]
    NonFinite(String),
    #[error("Unknown relation '{0}', expected one of <=, >=, =")]
    UnknownRelation(String),
    #[error("The standard method only accepts '<=' constraints with non-negative rhs (constraint {0})")]
    NotStandardForm(usize),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Invalid problem: {0}")]
    InvalidProblem(#[from] ProblemError),
    /// Pivot selection handed the elimination step a zero element
    #[error("Pivot element at row {row}, column {column} is zero ({value:e})")]
    ZeroPivot { row: usize, column: usize, value: f64 },
}
