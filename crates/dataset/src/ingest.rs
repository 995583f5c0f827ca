//! Ingestion front door: tabular records in, `Trainset` out.
//!
//! Rust concepts you'll see here:
//! - Positional column access with early `?` returns
//! - Converting loosely typed cells into strongly typed records
//! - Loading files and building the trainset in one call

use crate::error::{DatasetError, Result};
use crate::info_table::InfoTable;
use crate::parser::{self, LoadOptions};
use crate::rating_index::RatingIndex;
use crate::table::Table;
use crate::trainset::Trainset;
use crate::types::{FieldValue, RawId, RawRating};
use std::path::Path;

/// Raw ratings ready to be indexed
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    raw_ratings: Vec<RawRating>,
}

impl Dataset {
    /// Wrap already typed ratings
    pub fn from_ratings(raw_ratings: Vec<RawRating>) -> Self {
        Self { raw_ratings }
    }

    /// Read ratings from a table with columns, in order:
    /// user id, item id, rating, and an optional timestamp.
    ///
    /// Column names are ignored; only positions matter.
    pub fn from_table(table: &Table) -> Result<Self> {
        let columns = table.columns();
        if columns.len() < 3 {
            return Err(DatasetError::FieldCountMismatch {
                expected: 3,
                found: columns.len(),
                line: 0,
            });
        }

        let mut raw_ratings = Vec::with_capacity(table.len());
        for row in table.rows() {
            let user = to_id(&row[0], &columns[0])?;
            let item = to_id(&row[1], &columns[1])?;
            let rating = to_rating(&row[2]).ok_or_else(|| DatasetError::InvalidValue {
                field: columns[2].clone(),
                value: row[2].to_string(),
            })?;
            let timestamp = match row.get(3) {
                Some(FieldValue::Int(ts)) => Some(*ts),
                _ => None,
            };
            raw_ratings.push(RawRating {
                user,
                item,
                rating,
                timestamp,
            });
        }
        Ok(Self { raw_ratings })
    }

    /// Read a ratings file from disk
    ///
    /// This is the main entry point for loading data.
    pub fn load_from_file(path: &Path, options: &LoadOptions) -> Result<Self> {
        let table = parser::read_table(path, options)?;
        let dataset = Self::from_table(&table)?;
        tracing::info!("Loaded {} ratings from {:?}", dataset.len(), path);
        Ok(dataset)
    }

    pub fn raw_ratings(&self) -> &[RawRating] {
        &self.raw_ratings
    }

    pub fn len(&self) -> usize {
        self.raw_ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_ratings.is_empty()
    }

    /// Index every rating into a fresh trainset
    pub fn build_trainset(&self) -> Trainset {
        Trainset::new(RatingIndex::build(&self.raw_ratings))
    }
}

/// Read a metadata file from disk and key it by `index_col`
pub fn load_info_table(path: &Path, index_col: &str, options: &LoadOptions) -> Result<InfoTable> {
    let table = parser::read_table(path, options)?;
    let info = InfoTable::new(&table, index_col)?;
    tracing::info!("Loaded {} {} records from {:?}", info.len(), index_col, path);
    Ok(info)
}

fn to_id(cell: &FieldValue, column: &str) -> Result<RawId> {
    cell.to_raw_id().ok_or_else(|| DatasetError::InvalidValue {
        field: column.to_string(),
        value: cell.to_string(),
    })
}

/// Ratings are coerced to floats; numeric text counts too
fn to_rating(cell: &FieldValue) -> Option<f64> {
    match cell {
        FieldValue::Str(text) => text.trim().parse().ok(),
        other => other.as_f64(),
    }
}
