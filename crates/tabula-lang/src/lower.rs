use std::collections::HashMap;

use tabula_solver::{ConstraintOp, LpProblem, Sense};
use thiserror::Error;

use crate::ast::*;
use crate::lexer::Span;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LowerError {
    #[error("Missing objective (start a line with 'maximize' or 'minimize')")]
    MissingObjective,
    #[error("Second objective at position {0:?}; only one is allowed")]
    DuplicateObjective(Span),
    #[error("Objective has a constant term ({0}); move it out of the problem")]
    ObjectiveConstant(f64),
    #[error("Objective has no variables")]
    EmptyObjective,
    #[error("Problem has no constraints")]
    NoConstraints,
    #[error("Constraint '{0}' has no variables")]
    EmptyConstraint(String),
}

/// Assigns column indices to variables in order of first appearance
#[derive(Default)]
struct VariableTable {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl VariableTable {
    fn intern(&mut self, name: &str) -> usize {
        if let Some(&i) = self.index.get(name) {
            return i;
        }
        let i = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), i);
        i
    }

    fn dense(&self, sparse: &[(usize, f64)]) -> Vec<f64> {
        let mut row = vec![0.0; self.names.len()];
        for &(j, v) in sparse {
            row[j] += v;
        }
        row
    }
}

/// Builds the solver's problem from a parsed program.
///
/// Variables on the right-hand side of a constraint move to the left and
/// constants move to the right, so `x + 2 <= y` becomes `x - y <= -2`.
pub fn lower(program: &Program) -> Result<LpProblem, LowerError> {
    let mut objective: Option<&ObjectiveDecl> = None;
    let mut decls = Vec::new();

    for item in &program.items {
        match item {
            Item::Objective(o) => {
                if objective.is_some() {
                    return Err(LowerError::DuplicateObjective(o.span));
                }
                objective = Some(o);
            }
            Item::Constraint(c) => decls.push(c),
        }
    }

    let objective = objective.ok_or(LowerError::MissingObjective)?;
    if !objective.expr.has_variables() {
        return Err(LowerError::EmptyObjective);
    }
    if objective.expr.constant != 0.0 {
        return Err(LowerError::ObjectiveConstant(objective.expr.constant));
    }
    if decls.is_empty() {
        return Err(LowerError::NoConstraints);
    }

    let mut vars = VariableTable::default();
    let objective_terms: Vec<(usize, f64)> = objective
        .expr
        .terms
        .iter()
        .map(|t| (vars.intern(&t.variable), t.coefficient))
        .collect();

    let mut rows = Vec::with_capacity(decls.len());
    for (i, c) in decls.iter().enumerate() {
        let name = c.label.clone().unwrap_or_else(|| format!("c{}", i + 1));
        if !c.lhs.has_variables() && !c.rhs.has_variables() {
            return Err(LowerError::EmptyConstraint(name));
        }

        let mut terms: Vec<(usize, f64)> = c
            .lhs
            .terms
            .iter()
            .map(|t| (vars.intern(&t.variable), t.coefficient))
            .collect();
        terms.extend(c.rhs.terms.iter().map(|t| (vars.intern(&t.variable), -t.coefficient)));

        let op = match c.relation {
            Relation::Le => ConstraintOp::Le,
            Relation::Ge => ConstraintOp::Ge,
            Relation::Eq => ConstraintOp::Eq,
        };
        rows.push((name, terms, op, c.rhs.constant - c.lhs.constant));
    }

    let mut problem = LpProblem::new(vars.names.clone());
    let sense = match objective.direction {
        Direction::Maximize => Sense::Maximize,
        Direction::Minimize => Sense::Minimize,
    };
    problem.set_objective(vars.dense(&objective_terms), sense);
    for (name, terms, op, rhs) in rows {
        problem.add_constraint(name, vars.dense(&terms), op, rhs);
    }

    Ok(problem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;

    fn lower_source(source: &str) -> Result<LpProblem, LowerError> {
        lower(&Parser::parse(source).unwrap())
    }

    #[test]
    fn test_lower_scenario() {
        let problem = lower_source(
            "maximize 3x1 + 5x2
             x1 <= 4
             2x2 <= 12
             c3: 3x1 + 2x2 <= 18",
        )
        .unwrap();

        assert_eq!(problem.variables, vec!["x1", "x2"]);
        assert_eq!(problem.objective.coefficients, vec![3.0, 5.0]);
        assert_eq!(problem.objective.sense, Sense::Maximize);
        assert_eq!(problem.num_constraints(), 3);
        assert_eq!(problem.constraints[1].name, "c2");
        assert_eq!(problem.constraints[1].coefficients, vec![0.0, 2.0]);
        assert_eq!(problem.constraints[2].name, "c3");
        assert_eq!(problem.constraints[2].rhs, 18.0);
        assert!(problem.validate().is_ok());
    }

    #[test]
    fn test_variables_in_order_of_appearance() {
        let problem = lower_source("min y\nx + y >= 1\nz - x <= 3").unwrap();
        assert_eq!(problem.variables, vec!["y", "x", "z"]);
        assert_eq!(problem.objective.coefficients, vec![1.0, 0.0, 0.0]);
        assert_eq!(problem.constraints[0].coefficients, vec![1.0, 1.0, 0.0]);
        assert_eq!(problem.constraints[1].coefficients, vec![0.0, -1.0, 1.0]);
    }

    #[test]
    fn test_moves_terms_across() {
        let problem = lower_source("max x\nx + 2 <= y + 5\nx + x = 4").unwrap();
        let c = &problem.constraints[0];
        assert_eq!(c.coefficients, vec![1.0, -1.0]);
        assert_eq!(c.rhs, 3.0);
        // Repeated variables are summed
        assert_eq!(problem.constraints[1].coefficients, vec![2.0, 0.0]);
    }

    #[test]
    fn test_exponent_is_a_number() {
        let problem = lower_source("max x\nx <= 1e5\n2.5e-1x >= 1E0").unwrap();
        assert_eq!(problem.variables, vec!["x"]);
        assert_eq!(problem.constraints[0].coefficients, vec![1.0]);
        assert_eq!(problem.constraints[0].rhs, 100000.0);
        assert_eq!(problem.constraints[1].coefficients, vec![0.25]);
        assert_eq!(problem.constraints[1].rhs, 1.0);
    }

    #[test]
    fn test_lower_errors() {
        assert_eq!(lower_source("x <= 4").unwrap_err(), LowerError::MissingObjective);
        assert_eq!(lower_source("max x").unwrap_err(), LowerError::NoConstraints);
        assert_eq!(
            lower_source("max x + 1\nx <= 2").unwrap_err(),
            LowerError::ObjectiveConstant(1.0)
        );
        assert_eq!(
            lower_source("max x\nbad: 1 <= 2").unwrap_err(),
            LowerError::EmptyConstraint("bad".to_string())
        );
        assert!(matches!(
            lower_source("max x\nmin x\nx <= 1").unwrap_err(),
            LowerError::DuplicateObjective(_)
        ));
    }
}
