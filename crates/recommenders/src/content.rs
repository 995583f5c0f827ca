//! Content Filter - item similarity from item metadata
//!
//! Items are described by the numeric columns of the item info table
//! (typically one 0/1 column per genre). Two items are similar when their
//! feature vectors have a large dot product.
//!
//! ## Algorithm
//! 1. Build the `n_items x n_features` matrix `F`
//! 2. Similarity matrix `S = F . F^T`
//! 3. For a user, take their top-M rated items
//! 4. For each, collect its K most similar items
//! 5. Merge (max similarity per item), drop rated items, return the top N

use crate::matrix::{rated_items, top_n};
use crate::traits::{Recommendation, Recommender};
use anyhow::{Result, anyhow};
use dataset::{DatasetError, FieldValue, InnerId, RawId, Trainset};
use ndarray::Array2;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Content-based strategy over item metadata
pub struct ContentFilter {
    trainset: Arc<Trainset>,

    /// Explicit feature columns; `None` selects every numeric column
    feature_columns: Option<Vec<String>>,

    /// Columns never used as features when selecting automatically
    excluded_columns: Vec<String>,

    /// How many of the user's best-rated items seed the search
    top_rated: usize,

    /// How many similar items each seed contributes
    neighbors: usize,

    /// Item x item similarity, filled by `fit`
    similarity: Option<Array2<f64>>,
}

impl ContentFilter {
    /// Create a new content filter
    pub fn new(trainset: Arc<Trainset>) -> Self {
        Self {
            trainset,
            feature_columns: None,
            excluded_columns: vec!["title".to_string(), "year".to_string()],
            top_rated: 10,
            neighbors: 10,
            similarity: None,
        }
    }

    /// Use exactly these info columns as features
    pub fn with_feature_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.feature_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Columns skipped by automatic feature selection (default: title, year)
    pub fn with_excluded_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.excluded_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Number of top-rated items used as seeds (default: 10)
    pub fn with_top_rated(mut self, m: usize) -> Self {
        self.top_rated = m;
        self
    }

    /// Number of similar items per seed (default: 10)
    pub fn with_neighbors(mut self, k: usize) -> Self {
        self.neighbors = k;
        self
    }

    /// The `k` items most similar to `item`, excluding the item itself
    pub fn most_similar(&self, item: &RawId, k: usize) -> Result<Vec<Recommendation>> {
        let iid = self.trainset.to_inner_iid(item)?;
        let similar = self.similar_items(self.similarity()?, iid, k);
        top_n(&self.trainset, similar, k)
    }

    fn similarity(&self) -> Result<&Array2<f64>> {
        self.similarity
            .as_ref()
            .ok_or_else(|| anyhow!("{} has not been fitted", self.name()))
    }

    fn similar_items(&self, similarity: &Array2<f64>, iid: InnerId, k: usize) -> Vec<(InnerId, f64)> {
        let mut row: Vec<(InnerId, f64)> = similarity
            .row(iid)
            .iter()
            .copied()
            .enumerate()
            .filter(|&(other, _)| other != iid)
            .collect();
        row.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        row.truncate(k);
        row
    }

    /// Pick the feature columns from the item info table
    fn select_columns(&self) -> Result<Vec<String>> {
        let info = self.trainset.item_info().ok_or_else(|| DatasetError::MissingInfoTable {
            entity: "item".to_string(),
        })?;

        if let Some(columns) = &self.feature_columns {
            return Ok(columns.clone());
        }

        let mut selected = Vec::new();
        for column in info.columns() {
            if self.excluded_columns.contains(column) {
                continue;
            }
            let values = info.column_values(column)?;
            let numeric = values.iter().any(|(_, v)| v.is_numeric())
                && values.iter().all(|(_, v)| v.is_numeric() || matches!(v, FieldValue::Null));
            if numeric {
                selected.push(column.clone());
            }
        }
        Ok(selected)
    }

    fn feature_matrix(&self, columns: &[String]) -> Result<Array2<f64>> {
        let info = self.trainset.item_info().ok_or_else(|| DatasetError::MissingInfoTable {
            entity: "item".to_string(),
        })?;

        // Items without metadata keep a zero row
        let mut features = Array2::zeros((self.trainset.n_items(), columns.len()));
        for (j, column) in columns.iter().enumerate() {
            for (raw, value) in info.column_values(column)? {
                if let Ok(iid) = self.trainset.to_inner_iid(raw) {
                    features[[iid, j]] = value.as_f64().unwrap_or(0.0);
                }
            }
        }
        Ok(features)
    }
}

impl Recommender for ContentFilter {
    fn name(&self) -> &str {
        "ContentFilter"
    }

    #[instrument(skip(self))]
    fn fit(&mut self) -> Result<()> {
        let columns = self.select_columns()?;
        debug!("Content features: {:?}", columns);

        let features = self.feature_matrix(&columns)?;
        self.similarity = Some(features.dot(&features.t()));
        Ok(())
    }

    #[instrument(skip(self))]
    fn recommend(&self, user: &RawId, n: usize) -> Result<Vec<Recommendation>> {
        let similarity = self.similarity()?;
        let uid = self.trainset.to_inner_uid(user)?;

        // Seeds: the user's best-rated items, ties kept in rating order
        let mut ratings = self.trainset.user_ratings(uid)?.to_vec();
        ratings.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let mut seeds: Vec<InnerId> = Vec::with_capacity(self.top_rated);
        for (iid, _) in ratings {
            if seeds.len() == self.top_rated {
                break;
            }
            if !seeds.contains(&iid) {
                seeds.push(iid);
            }
        }

        let rated = rated_items(&self.trainset, uid)?;
        let mut candidates: HashMap<InnerId, f64> = HashMap::new();
        for &seed in &seeds {
            for (iid, sim) in self.similar_items(similarity, seed, self.neighbors) {
                if rated.contains(&iid) {
                    continue;
                }
                candidates
                    .entry(iid)
                    .and_modify(|best| *best = best.max(sim))
                    .or_insert(sim);
            }
        }
        debug!("{} seeds produced {} candidates", seeds.len(), candidates.len());

        top_n(&self.trainset, candidates.into_iter().collect(), n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataset::{Dataset, InfoTable, RawRating, Table};

    fn create_test_trainset() -> Trainset {
        let mut trainset = Dataset::from_ratings(vec![
            RawRating::new(1, "heat", 5.0),
            RawRating::new(1, "annie", 1.0),
            RawRating::new(2, "ronin", 4.0),
            RawRating::new(2, "fargo", 3.0),
            RawRating::new(2, "annie", 4.0),
        ])
        .build_trainset();

        let movies = Table::from_columns(vec![
            ("id", vec!["heat".into(), "annie".into(), "ronin".into(), "fargo".into()]),
            ("title", vec!["Heat".into(), "Annie".into(), "Ronin".into(), "Fargo".into()]),
            ("Action", vec![FieldValue::Int(1), FieldValue::Int(0), FieldValue::Int(1), FieldValue::Int(0)]),
            ("Crime", vec![FieldValue::Int(1), FieldValue::Int(0), FieldValue::Int(1), FieldValue::Int(1)]),
            ("Musical", vec![FieldValue::Int(0), FieldValue::Int(1), FieldValue::Int(0), FieldValue::Int(0)]),
        ])
        .unwrap();
        trainset.set_item_info(InfoTable::new(&movies, "id").unwrap());
        trainset
    }

    #[test]
    fn test_select_columns_skips_text() {
        let filter = ContentFilter::new(Arc::new(create_test_trainset()));
        assert_eq!(filter.select_columns().unwrap(), vec!["Action", "Crime", "Musical"]);
    }

    #[test]
    fn test_most_similar() {
        let mut filter = ContentFilter::new(Arc::new(create_test_trainset()));
        filter.fit().unwrap();

        let similar = filter.most_similar(&"heat".into(), 2).unwrap();
        assert_eq!(similar[0].item, RawId::from("ronin"));
        assert_eq!(similar[0].score, 2.0);
        assert_eq!(similar[1].item, RawId::from("fargo"));
    }

    #[test]
    fn test_recommend_unseen_similar_items() {
        let mut filter = ContentFilter::new(Arc::new(create_test_trainset())).with_top_rated(1);
        filter.fit().unwrap();

        let recs = filter.recommend(&1.into(), 5).unwrap();
        let items: Vec<RawId> = recs.iter().map(|r| r.item.clone()).collect();

        // Seeded by "heat"; "annie" is already rated
        assert_eq!(items, vec![RawId::from("ronin"), RawId::from("fargo")]);
    }

    #[test]
    fn test_requires_item_info_and_fit() {
        let trainset = Dataset::from_ratings(vec![RawRating::new(1, "a", 1.0)]).build_trainset();
        let mut filter = ContentFilter::new(Arc::new(trainset));

        assert!(filter.recommend(&1.into(), 5).is_err());
        let err = filter.fit().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DatasetError>(),
            Some(DatasetError::MissingInfoTable { .. })
        ));
    }
}
