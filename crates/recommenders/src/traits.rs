//! Core trait shared by every prediction strategy.

use anyhow::Result;
use dataset::{InnerId, RawId};
use serde::Serialize;

/// One suggested item for a user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// Raw id of the suggested item
    pub item: RawId,
    #[serde(skip)]
    pub inner_iid: InnerId,
    /// Strategy-specific score, higher is better
    pub score: f64,
}

/// A model able to suggest unseen items to a user.
///
/// ## Design Note
/// - `Send + Sync` lets a fitted model be shared across threads
/// - `fit` does all the heavy lifting; `recommend` only reads
pub trait Recommender: Send + Sync {
    /// Returns the name of this strategy (for logging/debugging)
    fn name(&self) -> &str;

    /// Train the model on its trainset
    fn fit(&mut self) -> Result<()>;

    /// Suggest up to `n` items the user has not rated.
    ///
    /// # Returns
    /// * `Ok(Vec<Recommendation>)` - sorted by descending score
    /// * `Err` - if the model is not fitted or the user is unknown
    fn recommend(&self, user: &RawId, n: usize) -> Result<Vec<Recommendation>>;
}
