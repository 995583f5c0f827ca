//! Build-time reducer from raw rating triples to adjacency lists.
//!
//! Single pass, left to right: each record gets its user and item inner ids
//! (assigned on first sight) and is appended to both adjacency lists. No
//! sorting, no deduplication, no bounds checks on the rating value.

use crate::id_index::IdIndex;
use crate::types::{EntityKind, InnerId, RawRating};

/// Per-user and per-item rating lists plus the id mappings that produced them
#[derive(Debug)]
pub struct RatingIndex {
    pub(crate) users: IdIndex,
    pub(crate) items: IdIndex,
    /// `by_user[uid]` = `(iid, rating)` in ingestion order
    pub(crate) by_user: Vec<Vec<(InnerId, f64)>>,
    /// `by_item[iid]` = `(uid, rating)` in ingestion order
    pub(crate) by_item: Vec<Vec<(InnerId, f64)>>,
    pub(crate) n_ratings: usize,
    /// Lowest and highest rating seen
    pub(crate) rating_scale: Option<(f64, f64)>,
}

impl RatingIndex {
    /// Index a sequence of raw ratings in one pass
    pub fn build<'a>(ratings: impl IntoIterator<Item = &'a RawRating>) -> Self {
        let mut index = Self {
            users: IdIndex::new(EntityKind::User),
            items: IdIndex::new(EntityKind::Item),
            by_user: Vec::new(),
            by_item: Vec::new(),
            n_ratings: 0,
            rating_scale: None,
        };
        for rating in ratings {
            index.insert(rating);
        }

        tracing::debug!(
            "indexed {} ratings over {} users and {} items",
            index.n_ratings,
            index.by_user.len(),
            index.by_item.len()
        );
        index
    }

    fn insert(&mut self, rating: &RawRating) {
        let uid = self.users.get_or_assign(rating.user.clone());
        let iid = self.items.get_or_assign(rating.item.clone());

        // Fresh ids are always the next slot
        if uid == self.by_user.len() {
            self.by_user.push(Vec::new());
        }
        if iid == self.by_item.len() {
            self.by_item.push(Vec::new());
        }
        self.by_user[uid].push((iid, rating.rating));
        self.by_item[iid].push((uid, rating.rating));

        let r = rating.rating;
        self.rating_scale = Some(match self.rating_scale {
            None => (r, r),
            Some((lo, hi)) => (lo.min(r), hi.max(r)),
        });
        self.n_ratings += 1;
    }

    pub fn users(&self) -> &IdIndex {
        &self.users
    }

    pub fn items(&self) -> &IdIndex {
        &self.items
    }

    pub fn n_ratings(&self) -> usize {
        self.n_ratings
    }
}
