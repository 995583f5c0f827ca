//! Collaborative Filter - user neighborhood correlation
//!
//! "Users whose ratings move with yours predict what you'll like."
//!
//! ## Algorithm
//! 1. Pivot ratings into a dense user x item matrix (0 = unrated)
//! 2. Pearson correlation between the target user's row and every other
//!    user's row (in parallel)
//! 3. Score each item the target has not rated as the similarity-weighted
//!    average of the neighbors' ratings: `sum(sim * r) / sum(|sim|)`
//! 4. Return the top N

use crate::matrix::{rated_items, rating_matrix, top_n};
use crate::traits::{Recommendation, Recommender};
use anyhow::{Result, anyhow};
use dataset::{InnerId, RawId, Trainset};
use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Neighborhood strategy over user-user correlation
pub struct CollaborativeFilter {
    trainset: Arc<Trainset>,

    /// Neighbors correlating below this are ignored
    min_similarity: f64,

    /// Dense rating matrix, filled by `fit`
    ratings: Option<Array2<f64>>,
}

impl CollaborativeFilter {
    /// Create a new collaborative filter
    pub fn new(trainset: Arc<Trainset>) -> Self {
        Self {
            trainset,
            min_similarity: -1.0,
            ratings: None,
        }
    }

    /// Configure the minimum neighbor correlation (default: -1.0, i.e. all)
    pub fn with_min_similarity(mut self, min: f64) -> Self {
        self.min_similarity = min;
        self
    }

    /// Correlation of `uid` with every user, itself excluded (as 0)
    pub fn similarities(&self, uid: InnerId) -> Result<Vec<f64>> {
        let ratings = self.ratings()?;
        // Rejects out-of-range ids before the row lookup
        self.trainset.user_ratings(uid)?;
        let target = ratings.row(uid);

        Ok((0..ratings.nrows())
            .into_par_iter()
            .map(|other| {
                if other == uid {
                    0.0
                } else {
                    pearson(target, ratings.row(other))
                }
            })
            .collect())
    }

    fn ratings(&self) -> Result<&Array2<f64>> {
        self.ratings
            .as_ref()
            .ok_or_else(|| anyhow!("{} has not been fitted", self.name()))
    }
}

/// Pearson correlation of two equally long rows, 0 when undefined
fn pearson(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    let n = a.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let mean_a = a.sum() / n;
    let mean_b = b.sum() / n;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom < f64::EPSILON {
        0.0
    } else {
        cov / denom
    }
}

impl Recommender for CollaborativeFilter {
    fn name(&self) -> &str {
        "CollaborativeFilter"
    }

    #[instrument(skip(self))]
    fn fit(&mut self) -> Result<()> {
        self.ratings = Some(rating_matrix(&self.trainset));
        Ok(())
    }

    #[instrument(skip(self))]
    fn recommend(&self, user: &RawId, n: usize) -> Result<Vec<Recommendation>> {
        let ratings = self.ratings()?;
        let uid = self.trainset.to_inner_uid(user)?;
        let rated = rated_items(&self.trainset, uid)?;

        let neighbors: Vec<(InnerId, f64)> = self
            .similarities(uid)?
            .into_iter()
            .enumerate()
            .filter(|&(other, sim)| other != uid && sim != 0.0 && sim >= self.min_similarity)
            .collect();
        debug!("Found {} correlated users", neighbors.len());

        let weight: f64 = neighbors.iter().map(|(_, sim)| sim.abs()).sum();
        let scored: Vec<(InnerId, f64)> = self
            .trainset
            .all_items()
            .filter(|iid| !rated.contains(iid))
            .map(|iid| {
                if weight == 0.0 {
                    return (iid, 0.0);
                }
                let total: f64 = neighbors
                    .iter()
                    .map(|&(other, sim)| sim * ratings[[other, iid]])
                    .sum();
                (iid, total / weight)
            })
            .collect();

        top_n(&self.trainset, scored, n)
    }
}
