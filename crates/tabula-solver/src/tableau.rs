use crate::problem::{ConstraintOp, LpProblem};

/// What a tableau column stands for. Indices are zero-based: the variable
/// index for structural columns, the constraint index otherwise.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Structural(usize),
    Slack(usize),
    Surplus(usize),
    Artificial(usize),
    /// Slot reserved for a constraint that has neither slack nor surplus
    Unused(usize),
}

impl ColumnKind {
    pub fn is_artificial(self) -> bool {
        matches!(self, ColumnKind::Artificial(_))
    }

    pub fn label(self) -> String {
        match self {
            ColumnKind::Structural(j) => format!("x{}", j + 1),
            ColumnKind::Slack(i) => format!("s{}", i + 1),
            ColumnKind::Surplus(i) => format!("e{}", i + 1),
            ColumnKind::Artificial(i) => format!("a{}", i + 1),
            ColumnKind::Unused(i) => format!("_{}", i + 1),
        }
    }
}

/// Dense simplex tableau.
///
/// The last row is the objective (reduced-cost) row and the last column is
/// the RHS. `basis[i]` is the column currently basic in constraint row `i`,
/// `None` for a redundant row left without one.
#[derive(Debug, Clone, PartialEq)]
pub struct Tableau {
    data: Vec<Vec<f64>>,
    columns: Vec<ColumnKind>,
    basis: Vec<Option<usize>>,
}

/// A constraint row after sign normalization
#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub coefficients: Vec<f64>,
    pub op: ConstraintOp,
    pub rhs: f64,
    pub flipped: bool,
}

/// Multiplies every row with a negative rhs by -1, flipping its relation.
pub(crate) fn normalize(problem: &LpProblem) -> Vec<Row> {
    problem
        .constraints
        .iter()
        .map(|c| {
            if c.rhs < 0.0 {
                Row {
                    coefficients: c.coefficients.iter().map(|v| -v).collect(),
                    op: c.op.flipped(),
                    rhs: -c.rhs,
                    flipped: true,
                }
            } else {
                Row {
                    coefficients: c.coefficients.clone(),
                    op: c.op,
                    rhs: c.rhs,
                    flipped: false,
                }
            }
        })
        .collect()
}

impl Tableau {
    /// Zero tableau with one row per constraint plus the objective row.
    pub(crate) fn zeros(n_constraints: usize, columns: Vec<ColumnKind>) -> Self {
        let n_cols = columns.len() + 1;
        Self {
            data: vec![vec![0.0; n_cols]; n_constraints + 1],
            columns,
            basis: vec![None; n_constraints],
        }
    }

    /// Structural columns followed by one slack per constraint, each row's
    /// slack basic in that row. Relations are not inspected.
    pub(crate) fn with_slacks(problem: &LpProblem) -> Self {
        let n_vars = problem.num_variables();
        let n_constraints = problem.num_constraints();

        let columns = (0..n_vars)
            .map(ColumnKind::Structural)
            .chain((0..n_constraints).map(ColumnKind::Slack))
            .collect();
        let mut tableau = Self::zeros(n_constraints, columns);
        let rhs_col = tableau.rhs_col();

        for (i, c) in problem.constraints.iter().enumerate() {
            tableau.data[i][..n_vars].copy_from_slice(&c.coefficients);
            tableau.data[i][n_vars + i] = 1.0;
            tableau.data[i][rhs_col] = c.rhs;
            tableau.basis[i] = Some(n_vars + i);
        }

        tableau
    }

    /// Structural columns, one slot per constraint (slack `+1` for `<=`,
    /// surplus `-1` for `>=`, unused for `=`) and then one artificial column
    /// per `>=`/`=` row, in row order. Expects normalized rows.
    pub(crate) fn augmented(rows: &[Row], n_vars: usize) -> Self {
        let n_constraints = rows.len();

        let mut columns: Vec<ColumnKind> = (0..n_vars).map(ColumnKind::Structural).collect();
        for (i, row) in rows.iter().enumerate() {
            columns.push(match row.op {
                ConstraintOp::Le => ColumnKind::Slack(i),
                ConstraintOp::Ge => ColumnKind::Surplus(i),
                ConstraintOp::Eq => ColumnKind::Unused(i),
            });
        }
        for (i, row) in rows.iter().enumerate() {
            if row.op.needs_artificial() {
                columns.push(ColumnKind::Artificial(i));
            }
        }

        let mut tableau = Self::zeros(n_constraints, columns);
        let rhs_col = tableau.rhs_col();
        let mut artificial_idx = n_vars + n_constraints;

        for (i, row) in rows.iter().enumerate() {
            tableau.data[i][..n_vars].copy_from_slice(&row.coefficients);
            let slot = n_vars + i;
            match row.op {
                ConstraintOp::Le => {
                    tableau.data[i][slot] = 1.0;
                    tableau.basis[i] = Some(slot);
                }
                ConstraintOp::Ge => {
                    tableau.data[i][slot] = -1.0;
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basis[i] = Some(artificial_idx);
                    artificial_idx += 1;
                }
                ConstraintOp::Eq => {
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basis[i] = Some(artificial_idx);
                    artificial_idx += 1;
                }
            }
            tableau.data[i][rhs_col] = row.rhs;
        }

        tableau
    }

    /// Total row count, objective row included
    pub fn num_rows(&self) -> usize {
        self.data.len()
    }

    /// Total column count, RHS included
    pub fn num_cols(&self) -> usize {
        self.columns.len() + 1
    }

    pub fn num_constraints(&self) -> usize {
        self.data.len() - 1
    }

    pub fn objective_row_index(&self) -> usize {
        self.data.len() - 1
    }

    pub fn rhs_col(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row]
    }

    pub fn objective_row(&self) -> &[f64] {
        &self.data[self.objective_row_index()]
    }

    /// Current objective value (RHS of the objective row)
    pub fn objective_value(&self) -> f64 {
        self.data[self.objective_row_index()][self.rhs_col()]
    }

    /// RHS column of the constraint rows, in row order
    pub fn rhs_values(&self) -> Vec<f64> {
        let rhs_col = self.rhs_col();
        self.data[..self.num_constraints()].iter().map(|r| r[rhs_col]).collect()
    }

    pub fn columns(&self) -> &[ColumnKind] {
        &self.columns
    }

    pub fn column_labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.label()).collect()
    }

    pub fn basis(&self) -> &[Option<usize>] {
        &self.basis
    }

    pub fn artificial_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, kind)| kind.is_artificial())
            .map(|(j, _)| j)
    }

    /// Row-major copy of every cell
    pub fn to_matrix(&self) -> Vec<Vec<f64>> {
        self.data.clone()
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row][col] = value;
    }

    pub(crate) fn set_basic(&mut self, row: usize, col: Option<usize>) {
        self.basis[row] = col;
    }

    /// Replaces the objective row by zeros.
    pub(crate) fn clear_objective(&mut self) {
        let obj = self.objective_row_index();
        self.data[obj].iter_mut().for_each(|v| *v = 0.0);
    }

    /// Installs the reduced costs `z_j - c_j` of a fresh objective over the
    /// structural columns (all other entries zero). The row is not yet
    /// expressed in terms of the current basis.
    pub(crate) fn install_objective(&mut self, coefficients: &[f64]) {
        self.clear_objective();
        let obj = self.objective_row_index();
        for (j, kind) in self.columns.iter().enumerate() {
            if let ColumnKind::Structural(v) = kind {
                self.data[obj][j] = -coefficients[*v];
            }
        }
    }

    /// `data[target] -= factor * data[source]`
    pub(crate) fn subtract_scaled_row(&mut self, target: usize, source: usize, factor: f64) {
        if factor == 0.0 || target == source {
            return;
        }
        let (target_row, source_row) = if target < source {
            let (head, tail) = self.data.split_at_mut(source);
            (&mut head[target], &tail[0])
        } else {
            let (head, tail) = self.data.split_at_mut(target);
            (&mut tail[0], &head[source])
        };
        for (t, s) in target_row.iter_mut().zip(source_row) {
            *t -= factor * s;
        }
    }

    pub(crate) fn scale_row(&mut self, row: usize, divisor: f64) {
        for v in self.data[row].iter_mut() {
            *v /= divisor;
        }
    }

    /// Zeroes the objective-row entry of every basic column by subtracting
    /// the matching multiple of that column's row.
    pub(crate) fn price_out_basis(&mut self) {
        let obj = self.objective_row_index();
        for i in 0..self.num_constraints() {
            if let Some(col) = self.basis[i] {
                let factor = self.data[obj][col];
                self.subtract_scaled_row(obj, i, factor);
                self.data[obj][col] = 0.0;
            }
        }
    }

    /// Copy of the constraint rows keeping only the columns accepted by
    /// `keep`; the objective row is reset to zeros and rows whose basic column
    /// was dropped lose their basis entry.
    pub(crate) fn retain_columns(&self, keep: impl Fn(ColumnKind) -> bool) -> Tableau {
        let kept: Vec<usize> = (0..self.columns.len()).filter(|&j| keep(self.columns[j])).collect();
        let rhs_col = self.rhs_col();

        let columns = kept.iter().map(|&j| self.columns[j]).collect();
        let mut tableau = Tableau::zeros(self.num_constraints(), columns);
        let new_rhs = tableau.rhs_col();

        for i in 0..self.num_constraints() {
            for (new_j, &old_j) in kept.iter().enumerate() {
                tableau.data[i][new_j] = self.data[i][old_j];
            }
            tableau.data[i][new_rhs] = self.data[i][rhs_col];
            tableau.basis[i] = self.basis[i].and_then(|b| kept.iter().position(|&j| j == b));
        }

        tableau
    }
}
