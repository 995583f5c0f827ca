//! Keyed metadata lookup for one entity kind (names, titles, genres, ...).

use crate::error::{DatasetError, Result};
use crate::table::Table;
use crate::types::{FieldValue, RawId};
use std::collections::{BTreeMap, HashMap};

/// Field name to value, for one entity
pub type Record = BTreeMap<String, FieldValue>;

/// Read-only metadata table keyed by raw id.
///
/// The key column is removed from the returned records, so a lookup yields
/// every *other* column of the matching row.
#[derive(Debug, Clone)]
pub struct InfoTable {
    key_column: String,
    /// Non-key columns, in source order
    columns: Vec<String>,
    rows: Vec<Vec<FieldValue>>,
    index: HashMap<RawId, usize>,
}

impl InfoTable {
    /// Build a lookup keyed by `index_col`.
    ///
    /// The source is only read; if it is keyed by a different column (or
    /// not keyed at all) the lookup is re-keyed on `index_col` without
    /// touching the caller's table.
    pub fn new(source: &Table, index_col: &str) -> Result<Self> {
        if source.key() != Some(index_col) {
            tracing::debug!(
                "re-keying info table from {:?} to {}",
                source.key(),
                index_col
            );
        }
        let key_idx = source.column_index(index_col)?;

        let columns: Vec<String> = source
            .columns()
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != key_idx)
            .map(|(_, c)| c.clone())
            .collect();

        let mut rows = Vec::with_capacity(source.len());
        let mut index = HashMap::with_capacity(source.len());
        for row in source.rows() {
            let key = &row[key_idx];
            let id = key.to_raw_id().ok_or_else(|| DatasetError::InvalidValue {
                field: index_col.to_string(),
                value: key.to_string(),
            })?;
            if index.contains_key(&id) {
                return Err(DatasetError::DuplicateKey {
                    column: index_col.to_string(),
                    id,
                });
            }

            let values: Vec<FieldValue> = row
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != key_idx)
                .map(|(_, v)| v.clone())
                .collect();
            index.insert(id, rows.len());
            rows.push(values);
        }

        Ok(Self {
            key_column: index_col.to_string(),
            columns,
            rows,
            index,
        })
    }

    /// Fields of the entity `id`: all of them when `fields` is `None`,
    /// otherwise only the requested subset
    pub fn lookup(&self, id: &RawId, fields: Option<&[&str]>) -> Result<Record> {
        let &row_idx = self.index.get(id).ok_or_else(|| DatasetError::UnknownEntity {
            entity: self.key_column.clone(),
            id: id.clone(),
        })?;
        let row = &self.rows[row_idx];

        match fields {
            None => Ok(self
                .columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect()),
            Some(fields) => fields
                .iter()
                .map(|&field| {
                    let col = self.column_position(field)?;
                    Ok((field.to_string(), row[col].clone()))
                })
                .collect(),
        }
    }

    /// Raw ids whose `column` matches `value`, in source order.
    ///
    /// Matching is loose (see `FieldValue::matches`), so `Int(3)` finds a
    /// `Float(3.0)` cell and `Int(1984)` finds the title `"1984"`.
    pub fn find(&self, column: &str, value: &FieldValue) -> Result<Vec<&RawId>> {
        self.find_where(&[(column, value)])
    }

    /// Raw ids matching every `(column, value)` pair, in source order
    pub fn find_where(&self, criteria: &[(&str, &FieldValue)]) -> Result<Vec<&RawId>> {
        let criteria = criteria
            .iter()
            .map(|&(column, value)| Ok((self.column_position(column)?, value)))
            .collect::<Result<Vec<_>>>()?;

        let mut matches: Vec<(usize, &RawId)> = self
            .index
            .iter()
            .filter(|&(_, &row)| {
                criteria
                    .iter()
                    .all(|&(col, value)| self.rows[row][col].matches(value))
            })
            .map(|(id, &row)| (row, id))
            .collect();
        matches.sort_unstable_by_key(|&(row, _)| row);
        Ok(matches.into_iter().map(|(_, id)| id).collect())
    }

    /// Every value of a non-key column, keyed by raw id
    pub fn column_values(&self, column: &str) -> Result<Vec<(&RawId, &FieldValue)>> {
        let col = self.column_position(column)?;
        Ok(self
            .index
            .iter()
            .map(|(id, &row)| (id, &self.rows[row][col]))
            .collect())
    }

    /// Name of the column the table is keyed by
    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Non-key columns, in source order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn contains(&self, id: &RawId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_position(&self, field: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == field)
            .ok_or_else(|| DatasetError::UnknownField {
                field: field.to_string(),
            })
    }
}
