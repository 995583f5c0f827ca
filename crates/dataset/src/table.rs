//! In-memory tabular source: named columns over row-major cells.
//!
//! Ratings and entity metadata both arrive as a `Table`, either built in
//! code or read from disk by the parser.

use crate::error::{DatasetError, Result};
use crate::types::FieldValue;

/// Named columns plus rows of cells, optionally keyed by one column
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<FieldValue>>,
    key: Option<String>,
}

impl Table {
    /// Create an empty table with the given column names
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            key: None,
        }
    }

    /// Build a table from columns of equal length.
    ///
    /// Handy for small fixtures:
    /// ```
    /// use dataset::{FieldValue, Table};
    ///
    /// let users = Table::from_columns(vec![
    ///     ("User", vec![FieldValue::Int(1), FieldValue::Int(2)]),
    ///     ("Name", vec!["Thomas".into(), "Henry".into()]),
    /// ]).unwrap();
    /// assert_eq!(users.len(), 2);
    /// ```
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<FieldValue>)>) -> Result<Self> {
        let n_rows = columns.first().map(|(_, cells)| cells.len()).unwrap_or(0);
        let mut names = Vec::with_capacity(columns.len());
        let mut cells_by_column = Vec::with_capacity(columns.len());
        for (line, (name, cells)) in columns.into_iter().enumerate() {
            if cells.len() != n_rows {
                return Err(DatasetError::FieldCountMismatch {
                    expected: n_rows,
                    found: cells.len(),
                    line: line + 1,
                });
            }
            names.push(name.into());
            cells_by_column.push(cells.into_iter());
        }

        let mut table = Table::new(names);
        for _ in 0..n_rows {
            let row = cells_by_column
                .iter_mut()
                .map(|cells| cells.next().unwrap_or(FieldValue::Null))
                .collect();
            table.rows.push(row);
        }
        Ok(table)
    }

    /// Append a row; its width must match the column count
    pub fn push_row(&mut self, row: Vec<FieldValue>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(DatasetError::FieldCountMismatch {
                expected: self.columns.len(),
                found: row.len(),
                line: self.rows.len() + 1,
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Designate the lookup key column
    pub fn set_key(&mut self, column: &str) -> Result<()> {
        self.column_index(column)?;
        self.key = Some(column.to_string());
        Ok(())
    }

    /// Name of the designated key column, if any
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<FieldValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, `UnknownColumn` if absent
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| DatasetError::UnknownColumn {
                column: column.to_string(),
            })
    }

    /// Iterate over the cells of one column
    pub fn column(&self, column: &str) -> Result<impl Iterator<Item = &FieldValue>> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }
}
