//! SVD Recommender - truncated matrix factorization
//!
//! Reconstructs the user x item rating matrix from its top-k singular
//! directions and recommends the unrated items with the highest
//! reconstructed rating.
//!
//! ## Algorithm
//! 1. Pivot ratings into a dense matrix `R` (0 = unrated)
//! 2. Find the top-k eigenvectors `V_k` of `R^T R` (the right singular
//!    vectors of `R`) by power iteration with deflation
//! 3. Rank-k reconstruction: `R_k = U_k S_k V_k^T = R V_k V_k^T`
//! 4. For a user, sort unrated items by their reconstructed rating

use crate::matrix::{rated_items, rating_matrix, top_n};
use crate::traits::{Recommendation, Recommender};
use anyhow::{Result, anyhow};
use dataset::{InnerId, RawId, Trainset};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Eigenvalues below this fraction of the largest one are treated as zero
const RELATIVE_TOLERANCE: f64 = 1e-10;

/// Matrix factorization strategy
pub struct SvdRecommender {
    trainset: Arc<Trainset>,

    /// Number of singular components kept
    components: usize,

    /// Power iteration steps per component
    iterations: usize,

    /// Seed for the start vectors
    seed: u64,

    /// Reconstructed rating matrix, filled by `fit`
    predicted: Option<Array2<f64>>,
}

impl SvdRecommender {
    /// Create a new SVD recommender
    pub fn new(trainset: Arc<Trainset>) -> Self {
        Self {
            trainset,
            components: 20,
            iterations: 100,
            seed: 42,
            predicted: None,
        }
    }

    /// Configure the number of components k (default: 20)
    pub fn with_components(mut self, k: usize) -> Self {
        self.components = k;
        self
    }

    /// Configure power iteration steps (default: 100)
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Configure the start vector seed (default: 42)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reconstructed rating of every item for one user
    pub fn predicted_row(&self, user: &RawId) -> Result<Array1<f64>> {
        let uid = self.trainset.to_inner_uid(user)?;
        Ok(self.predicted()?.row(uid).to_owned())
    }

    /// Top `n` unrated items by reconstructed rating
    pub fn predict_ratings(&self, user: &RawId, n: usize) -> Result<Vec<Recommendation>> {
        let predicted = self.predicted()?;
        let uid = self.trainset.to_inner_uid(user)?;
        let rated = rated_items(&self.trainset, uid)?;

        let scored: Vec<(InnerId, f64)> = predicted
            .row(uid)
            .iter()
            .copied()
            .enumerate()
            .filter(|(iid, _)| !rated.contains(iid))
            .collect();
        top_n(&self.trainset, scored, n)
    }

    fn predicted(&self) -> Result<&Array2<f64>> {
        self.predicted
            .as_ref()
            .ok_or_else(|| anyhow!("{} has not been fitted", self.name()))
    }

    /// Top eigenvectors of the symmetric matrix `gram`, one per column
    fn top_eigenvectors(&self, gram: &Array2<f64>, k: usize) -> Array2<f64> {
        let n = gram.nrows();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut current = gram.clone();
        let mut vectors: Vec<Array1<f64>> = Vec::with_capacity(k);
        let mut largest = 0.0_f64;

        for component in 0..k {
            let mut v: Array1<f64> = Array1::from_shape_fn(n, |_| rng.random::<f64>() - 0.5);
            // Start orthogonal to what has already been found
            for found in &vectors {
                let proj = found.dot(&v);
                v = &v - &(found * proj);
            }
            let norm = v.dot(&v).sqrt();
            if norm < f64::EPSILON {
                break;
            }
            v /= norm;

            for _ in 0..self.iterations {
                let next = current.dot(&v);
                let norm = next.dot(&next).sqrt();
                if norm < f64::EPSILON {
                    break;
                }
                v = next / norm;
            }

            // Rayleigh quotient for the eigenvalue
            let lambda = v.dot(&current.dot(&v));
            if component == 0 {
                largest = lambda;
            }
            if lambda <= largest * RELATIVE_TOLERANCE || lambda <= 0.0 {
                debug!("Spectrum exhausted after {} components", component);
                break;
            }

            // Deflate: A' = A - lambda * v * v^T
            let v_col = v.clone().insert_axis(Axis(1));
            let v_row = v.clone().insert_axis(Axis(0));
            current = &current - &(v_col.dot(&v_row) * lambda);
            vectors.push(v);
        }

        let mut basis = Array2::zeros((n, vectors.len()));
        for (j, v) in vectors.iter().enumerate() {
            basis.column_mut(j).assign(v);
        }
        basis
    }
}

impl Recommender for SvdRecommender {
    fn name(&self) -> &str {
        "SvdRecommender"
    }

    #[instrument(skip(self))]
    fn fit(&mut self) -> Result<()> {
        let ratings = rating_matrix(&self.trainset);
        let k = self
            .components
            .min(self.trainset.n_users())
            .min(self.trainset.n_items());

        let gram = ratings.t().dot(&ratings);
        let basis = self.top_eigenvectors(&gram, k);
        debug!("Kept {} of {} requested components", basis.ncols(), self.components);

        self.predicted = Some(ratings.dot(&basis).dot(&basis.t()));
        Ok(())
    }

    #[instrument(skip(self))]
    fn recommend(&self, user: &RawId, n: usize) -> Result<Vec<Recommendation>> {
        self.predict_ratings(user, n)
    }
}
