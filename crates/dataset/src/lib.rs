//! # Dataset Crate
//!
//! This crate turns raw (user, item, rating) records into an indexed
//! training structure that every recommendation strategy builds on.
//!
//! ## Main Components
//!
//! - **types**: Raw ids, field values and rating records
//! - **table**: In-memory tabular source
//! - **id_index**: Bijective raw id <-> dense inner id mapping
//! - **info_table**: Keyed metadata lookup (titles, names, genres, ...)
//! - **rating_index**: Single-pass reducer building per-user/per-item lists
//! - **trainset**: Read-only view with id translation and statistics
//! - **parser**: Delimited file loading
//! - **error**: Error types
//!
//! ## Example Usage
//!
//! ```
//! use dataset::{Dataset, EntityId, FieldValue, InfoTable, RawId, RawRating, Table};
//!
//! let data = Dataset::from_ratings(vec![
//!     RawRating::new(1, "a", 3.0),
//!     RawRating::new(2, "a", 4.0),
//! ]);
//! let mut trainset = data.build_trainset();
//!
//! assert_eq!(trainset.n_users(), 2);
//! assert_eq!(trainset.to_inner_uid(&RawId::from(2)).unwrap(), 1);
//! assert_eq!(trainset.global_mean().unwrap(), 3.5);
//!
//! let items = Table::from_columns(vec![
//!     ("id", vec![FieldValue::from("a")]),
//!     ("title", vec![FieldValue::from("Clara Callan")]),
//! ]).unwrap();
//! trainset.set_item_info(InfoTable::new(&items, "id").unwrap());
//!
//! let info = trainset.get_itemid_info(&EntityId::Inner(0), None).unwrap();
//! assert_eq!(info["title"], FieldValue::from("Clara Callan"));
//! ```
//!
//! ## Lifecycle
//!
//! 1. Ratings are ingested once, left to right; first appearance decides
//!    inner id numbering and adjacency order.
//! 2. The resulting `Trainset` is read-only apart from attaching info tables.
//! 3. Reverse id maps and the global mean are computed lazily and cached.

// Public modules
pub mod error;
pub mod id_index;
pub mod info_table;
pub mod ingest;
pub mod parser;
pub mod rating_index;
pub mod table;
pub mod trainset;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DatasetError, Result};
pub use id_index::IdIndex;
pub use info_table::{InfoTable, Record};
pub use ingest::{Dataset, load_info_table};
pub use parser::LoadOptions;
pub use rating_index::RatingIndex;
pub use table::Table;
pub use trainset::Trainset;
pub use types::{EntityId, EntityKind, FieldValue, InnerId, RawId, RawRating};
