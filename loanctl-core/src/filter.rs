//! Credit-history filter for the dashboard table and charts.

use serde::Serialize;

use crate::dataset::{Cell, LoanDataset, CREDIT_HISTORY};
use crate::error::Result;

/// Distinct non-empty `Credit_History` values in order of first appearance.
pub fn credit_history_options(dataset: &LoanDataset) -> Result<Vec<Cell>> {
    let idx = dataset.require_column(CREDIT_HISTORY)?;
    let mut options: Vec<Cell> = Vec::new();
    for row in dataset.rows() {
        let cell = &row[idx];
        if !cell.is_empty() && !options.contains(cell) {
            options.push(cell.clone());
        }
    }
    Ok(options)
}

/// The set of credit-history values a user has selected.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreditFilter {
    selected: Vec<Cell>,
}

impl CreditFilter {
    pub fn new(values: impl IntoIterator<Item = Cell>) -> Self {
        let mut selected: Vec<Cell> = Vec::new();
        for value in values {
            if !value.is_empty() && !selected.contains(&value) {
                selected.push(value);
            }
        }
        Self { selected }
    }

    /// Select every option present in the dataset (the dashboard default).
    pub fn all(dataset: &LoanDataset) -> Result<Self> {
        Ok(Self::new(credit_history_options(dataset)?))
    }

    /// Parse raw query values such as `["0", "1"]`.
    pub fn from_raw<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(values.into_iter().map(|v| Cell::parse(v.as_ref())))
    }

    pub fn selected(&self) -> &[Cell] {
        &self.selected
    }

    pub fn contains(&self, cell: &Cell) -> bool {
        !cell.is_empty() && self.selected.contains(cell)
    }
}

/// Keep rows whose `Credit_History` is part of the selection.
///
/// Rows with a missing credit history never match.
pub fn filter_by_credit_history(dataset: &LoanDataset, filter: &CreditFilter) -> Result<LoanDataset> {
    let idx = dataset.require_column(CREDIT_HISTORY)?;
    let filtered = dataset.retain_rows(|row| filter.contains(&row[idx]));
    tracing::debug!(
        before = dataset.len(),
        after = filtered.len(),
        selected = filter.selected().len(),
        "filtered by credit history"
    );
    Ok(filtered)
}
