use crate::tableau::Tableau;

/// Copy of the tableau taken after a labeled step
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub label: String,
    /// Column labels, RHS excluded
    pub columns: Vec<String>,
    /// Row-major cells; the last row is the objective row
    pub tableau: Vec<Vec<f64>>,
}

/// Append-only record of snapshots and diagnostic messages
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    snapshots: Vec<Snapshot>,
    messages: Vec<String>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, label: impl Into<String>, tableau: &Tableau) {
        self.snapshots.push(Snapshot {
            label: label.into(),
            columns: tableau.column_labels(),
            tableau: tableau.to_matrix(),
        });
    }

    pub fn note(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn last_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }
}
