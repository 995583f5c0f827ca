//! # Recommenders Crate
//!
//! Prediction strategies built on top of a `dataset::Trainset`.
//!
//! ## Components
//!
//! ### ContentFilter
//! Item-to-item similarity from item metadata (e.g. genre flags):
//! - "Because you liked X, here are items that look like X"
//!
//! ### SvdRecommender
//! Truncated matrix factorization of the user x item rating matrix:
//! - Reconstructs missing ratings from the top-k singular directions
//!
//! ### CollaborativeFilter
//! Neighborhood correlation between users:
//! - "Users whose ratings correlate with yours liked these items"
//!
//! ## Example Usage
//!
//! ```ignore
//! use recommenders::{Recommender, SvdRecommender};
//! use std::sync::Arc;
//!
//! let trainset = Arc::new(dataset.build_trainset());
//! let mut svd = SvdRecommender::new(trainset.clone()).with_components(20);
//! svd.fit()?;
//!
//! for rec in svd.recommend(&user_id, 5)? {
//!     println!("{} ({:.2})", rec.item, rec.score);
//! }
//! ```
//!
//! Every strategy only talks to the trainset's public query surface, never
//! to its internal indices.

// Public modules
pub mod collaborative;
pub mod content;
pub mod matrix;
pub mod svd;
pub mod traits;

// Re-export commonly used types
pub use collaborative::CollaborativeFilter;
pub use content::ContentFilter;
pub use svd::SvdRecommender;
pub use traits::{Recommendation, Recommender};
