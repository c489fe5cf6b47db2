use std::fmt;
use std::str::FromStr;

use crate::error::ProblemError;

/// Represents a linear programming problem
///
/// All variables are implicitly non-negative. The solver only reads it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    /// Variable names
    pub variables: Vec<String>,
    /// Objective function
    pub objective: Objective,
    /// Constraints, in row order
    pub constraints: Vec<Constraint>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to maximize or minimize
    pub sense: Sense,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    #[cfg_attr(feature = "serde", serde(rename = "<="))]
    Le,
    /// Greater than or equal (>=)
    #[cfg_attr(feature = "serde", serde(rename = ">="))]
    Ge,
    /// Equal (=)
    #[cfg_attr(feature = "serde", serde(rename = "="))]
    Eq,
}

impl ConstraintOp {
    /// The relation obtained by multiplying both sides by -1
    pub fn flipped(self) -> Self {
        match self {
            ConstraintOp::Le => ConstraintOp::Ge,
            ConstraintOp::Ge => ConstraintOp::Le,
            ConstraintOp::Eq => ConstraintOp::Eq,
        }
    }

    /// Whether the row needs an artificial variable for an initial basis
    pub fn needs_artificial(self) -> bool {
        matches!(self, ConstraintOp::Ge | ConstraintOp::Eq)
    }
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            ConstraintOp::Le => "<=",
            ConstraintOp::Ge => ">=",
            ConstraintOp::Eq => "=",
        };
        f.write_str(token)
    }
}

impl FromStr for ConstraintOp {
    type Err = ProblemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<=" | "≤" => Ok(ConstraintOp::Le),
            ">=" | "≥" => Ok(ConstraintOp::Ge),
            "=" | "==" => Ok(ConstraintOp::Eq),
            other => Err(ProblemError::UnknownRelation(other.to_string())),
        }
    }
}

impl LpProblem {
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                coefficients: vec![0.0; n],
                sense: Sense::Maximize,
            },
            constraints: Vec::new(),
        }
    }

    /// Creates a problem with variables named `x1..xn`
    pub fn with_variable_count(n: usize) -> Self {
        Self::new((1..=n).map(|i| format!("x{}", i)).collect())
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, sense: Sense) {
        self.objective = Objective { coefficients, sense };
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            op,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn maximize(&self) -> bool {
        self.objective.sense == Sense::Maximize
    }

    /// Checks the structural well-formedness the solver relies on.
    pub fn validate(&self) -> Result<(), ProblemError> {
        let n = self.num_variables();
        if n == 0 {
            return Err(ProblemError::NoVariables);
        }
        if self.constraints.is_empty() {
            return Err(ProblemError::NoConstraints);
        }
        if self.objective.coefficients.len() != n {
            return Err(ProblemError::ObjectiveLength {
                expected: n,
                found: self.objective.coefficients.len(),
            });
        }
        if let Some(j) = self.objective.coefficients.iter().position(|c| !c.is_finite()) {
            return Err(ProblemError::NonFinite(format!("objective coefficient {}", j + 1)));
        }

        for (i, c) in self.constraints.iter().enumerate() {
            if c.coefficients.len() != n {
                return Err(ProblemError::ConstraintLength {
                    constraint: i + 1,
                    expected: n,
                    found: c.coefficients.len(),
                });
            }
            if let Some(j) = c.coefficients.iter().position(|v| !v.is_finite()) {
                return Err(ProblemError::NonFinite(format!(
                    "coefficient {} of constraint {}",
                    j + 1,
                    i + 1
                )));
            }
            if !c.rhs.is_finite() {
                return Err(ProblemError::NonFinite(format!("rhs of constraint {}", i + 1)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LpProblem {
        let mut problem = LpProblem::with_variable_count(2);
        problem.set_objective(vec![3.0, 5.0], Sense::Maximize);
        problem.add_constraint("c1", vec![1.0, 0.0], ConstraintOp::Le, 4.0);
        problem
    }

    #[test]
    fn test_relation_tokens() {
        assert_eq!("<=".parse::<ConstraintOp>().unwrap(), ConstraintOp::Le);
        assert_eq!(">=".parse::<ConstraintOp>().unwrap(), ConstraintOp::Ge);
        assert_eq!(" = ".parse::<ConstraintOp>().unwrap(), ConstraintOp::Eq);
        assert!(matches!(
            "<".parse::<ConstraintOp>(),
            Err(ProblemError::UnknownRelation(t)) if t == "<"
        ));
        assert_eq!(ConstraintOp::Ge.to_string(), ">=");
    }

    #[test]
    fn test_flip() {
        assert_eq!(ConstraintOp::Le.flipped(), ConstraintOp::Ge);
        assert_eq!(ConstraintOp::Eq.flipped(), ConstraintOp::Eq);
    }

    #[test]
    fn test_validate_ok() {
        let problem = sample();
        assert!(problem.validate().is_ok());
        assert_eq!(problem.variables, vec!["x1", "x2"]);
        assert!(problem.maximize());
    }

    #[test]
    fn test_validate_rejects_malformed() {
        let mut problem = sample();
        problem.constraints[0].coefficients.push(1.0);
        assert!(matches!(
            problem.validate(),
            Err(ProblemError::ConstraintLength { constraint: 1, expected: 2, found: 3 })
        ));

        let mut problem = sample();
        problem.objective.coefficients[1] = f64::NAN;
        assert!(matches!(problem.validate(), Err(ProblemError::NonFinite(_))));

        let mut problem = sample();
        problem.constraints.clear();
        assert!(matches!(problem.validate(), Err(ProblemError::NoConstraints)));

        let problem = LpProblem::new(Vec::new());
        assert!(matches!(problem.validate(), Err(ProblemError::NoVariables)));
    }
}
