use std::fmt::Write;

use tabula_solver::{LpProblem, Method, Snapshot, Solution, SolutionStatus, Solver};

const CELL_WIDTH: usize = 10;

/// One snapshot: label, column header, then one line per row.
pub fn snapshot(snap: &Snapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", snap.label);

    let header: Vec<String> = snap
        .columns
        .iter()
        .map(String::as_str)
        .chain(std::iter::once("RHS"))
        .map(|name| format!("{:>width$}", name, width = CELL_WIDTH))
        .collect();
    let _ = writeln!(out, "{}", header.join(" | "));

    for row in &snap.tableau {
        let cells: Vec<String> = row
            .iter()
            .map(|v| format!("{:width$.2}", v, width = CELL_WIDTH))
            .collect();
        let _ = writeln!(out, "{}", cells.join(" | "));
    }
    out
}

pub fn status_line(status: SolutionStatus) -> &'static str {
    match status {
        SolutionStatus::Optimal => "OPTIMAL",
        SolutionStatus::Infeasible => "INFEASIBLE",
        SolutionStatus::Unbounded => "UNBOUNDED",
        SolutionStatus::IterationLimit => "DID NOT CONVERGE",
    }
}

/// Full text report: every snapshot, the diagnostic messages and the summary.
pub fn report(problem: &LpProblem, solver: &Solver, solution: &Solution) -> String {
    let mut out = String::new();

    for snap in solution.trace.snapshots() {
        out.push_str(&snapshot(snap));
        out.push('\n');
    }

    for message in solution.trace.messages() {
        let _ = writeln!(out, "{}", message);
    }
    if !solution.trace.messages().is_empty() {
        out.push('\n');
    }

    let _ = writeln!(out, "Method: {}", solution.method);
    let _ = writeln!(
        out,
        "Settings: tolerance {:e}, at most {} pivots per phase",
        solver.tolerance(),
        solver.max_iterations()
    );
    if solution.method == Method::BigM {
        let _ = writeln!(out, "Penalty: M = {}", solver.big_m());
    }
    let _ = writeln!(out, "Status: {}", status_line(solution.status));
    let _ = writeln!(out, "Last pivot column: {}", optional(solution.last_entering_column));
    let _ = writeln!(out, "Last pivot row: {}", optional(solution.last_leaving_row));
    let _ = writeln!(out, "Objective value: {:.2}", solution.objective_value);

    let basics: Vec<String> = solution
        .basis_labels()
        .iter()
        .zip(&solution.basic_values)
        .map(|(label, value)| format!("{}={:.2}", label.unwrap_or("-"), value))
        .collect();
    let _ = writeln!(out, "Basic variable values: {}", basics.join(", "));

    if solution.status.is_optimal() {
        let _ = writeln!(out, "Variables:");
        for (name, value) in problem.variables.iter().zip(&solution.values) {
            let _ = writeln!(out, "  {:20} {:10.4}", name, value);
        }
    }
    out
}

fn optional(index: Option<usize>) -> String {
    index.map(|i| i.to_string()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_layout() {
        let snap = Snapshot {
            label: "Initial tableau".to_string(),
            columns: vec!["x1".to_string(), "s1".to_string()],
            tableau: vec![vec![1.0, 1.0, 4.0], vec![-3.0, 0.0, 0.0]],
        };
        let text = snapshot(&snap);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Initial tableau");
        assert_eq!(lines[1], "        x1 |         s1 |        RHS");
        assert_eq!(lines[2], "      1.00 |       1.00 |       4.00");
        assert_eq!(lines[3], "     -3.00 |       0.00 |       0.00");
    }

    #[test]
    fn test_report_summary() {
        let problem = tabula_lang::parse_problem(
            "max 3x1 + 5x2
             x1 <= 4
             2x2 <= 12
             3x1 + 2x2 <= 18",
        )
        .unwrap();
        let solver = Solver::new();
        let solution = solver.solve(&problem, Method::Standard).unwrap();
        let text = report(&problem, &solver, &solution);

        assert!(text.contains("Status: OPTIMAL"));
        assert!(text.contains("Objective value: 36.00"));
        assert!(text.contains("Basic variable values: s1=2.00, x2=6.00, x1=2.00"));
        assert!(text.contains("Last pivot row: 2"));
        assert!(text.contains("Iteration 2: pivot column 0, pivot row 2"));
        assert!(text.contains("Settings: tolerance 1e-9, at most 10000 pivots per phase"));
        assert!(!text.contains("Penalty"));
    }

    #[test]
    fn test_report_shows_big_m_penalty() {
        let problem = tabula_lang::parse_problem("min 2x + 3y
x + y = 10").unwrap();
        let solver = Solver::new().with_big_m(500.0).with_max_iterations(50);
        let solution = solver.solve(&problem, Method::BigM).unwrap();
        let text = report(&problem, &solver, &solution);

        assert!(text.contains("Method: Big-M"));
        assert!(text.contains("at most 50 pivots per phase"));
        assert!(text.contains("Penalty: M = 500"));
        assert!(text.contains("Objective value: 20.00"));
    }
}
