//! Dense-matrix helpers shared by the matrix-based strategies.

use crate::traits::Recommendation;
use anyhow::Result;
use dataset::{InnerId, Trainset};
use ndarray::Array2;
use std::collections::HashSet;

/// Pivot the trainset into a dense `n_users x n_items` matrix.
///
/// Unrated cells are 0. When the same (user, item) pair was rated more
/// than once, the last rating in ingestion order wins.
pub fn rating_matrix(trainset: &Trainset) -> Array2<f64> {
    let mut matrix = Array2::zeros((trainset.n_users(), trainset.n_items()));
    for (u, i, r) in trainset.all_ratings() {
        matrix[[u, i]] = r;
    }
    matrix
}

/// Items a user has rated, by inner id
pub fn rated_items(trainset: &Trainset, uid: InnerId) -> Result<HashSet<InnerId>> {
    Ok(trainset.user_ratings(uid)?.iter().map(|&(i, _)| i).collect())
}

/// Sort `(iid, score)` pairs by descending score (ties by ascending id),
/// keep the first `n` and attach raw ids
pub fn top_n(
    trainset: &Trainset,
    mut scored: Vec<(InnerId, f64)>,
    n: usize,
) -> Result<Vec<Recommendation>> {
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(n);

    scored
        .into_iter()
        .map(|(iid, score)| {
            Ok(Recommendation {
                item: trainset.to_raw_iid(iid)?.clone(),
                inner_iid: iid,
                score,
            })
        })
        .collect()
}
