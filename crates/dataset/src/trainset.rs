//! The read-only training view every prediction strategy consumes.

use crate::error::{DatasetError, Result};
use crate::info_table::{InfoTable, Record};
use crate::rating_index::RatingIndex;
use crate::types::{EntityId, EntityKind, InnerId, RawId};
use std::ops::Range;
use std::sync::OnceLock;

/// All useful data that constitutes a training set.
///
/// Built once from a [`RatingIndex`]; after that the only mutation is
/// attaching an [`InfoTable`] per entity kind (last one set wins).
///
/// Rust concept: `OnceLock` gives write-once caches behind `&self`, so the
/// global mean and the reverse id maps can be filled lazily even when the
/// trainset is shared behind an `Arc`.
#[derive(Debug)]
pub struct Trainset {
    index: RatingIndex,
    user_info: Option<InfoTable>,
    item_info: Option<InfoTable>,
    global_mean: OnceLock<f64>,
}

impl Trainset {
    pub fn new(index: RatingIndex) -> Self {
        tracing::info!(
            "built trainset: {} users, {} items, {} ratings",
            index.by_user.len(),
            index.by_item.len(),
            index.n_ratings
        );
        Self {
            index,
            user_info: None,
            item_info: None,
            global_mean: OnceLock::new(),
        }
    }

    // Counts and statistics

    /// Total number of users |U|
    pub fn n_users(&self) -> usize {
        self.index.by_user.len()
    }

    /// Total number of items |I|
    pub fn n_items(&self) -> usize {
        self.index.by_item.len()
    }

    /// Total number of ratings |R|
    pub fn n_ratings(&self) -> usize {
        self.index.n_ratings
    }

    /// `(min, max)` rating observed at ingestion, `None` when empty
    pub fn rating_scale(&self) -> Option<(f64, f64)> {
        self.index.rating_scale
    }

    /// Mean of all ratings, computed on first access and cached
    pub fn global_mean(&self) -> Result<f64> {
        if let Some(&mean) = self.global_mean.get() {
            return Ok(mean);
        }
        if self.n_ratings() == 0 {
            return Err(DatasetError::EmptyTrainset);
        }
        let mean = *self.global_mean.get_or_init(|| {
            let total: f64 = self.all_ratings().map(|(_, _, r)| r).sum();
            total / self.n_ratings() as f64
        });
        Ok(mean)
    }

    // Iteration

    /// Every `(uid, iid, rating)` triple: users in inner id order, each
    /// user's ratings in ingestion order. Call again to restart.
    pub fn all_ratings(&self) -> impl Iterator<Item = (InnerId, InnerId, f64)> + '_ {
        self.index
            .by_user
            .iter()
            .enumerate()
            .flat_map(|(u, ratings)| ratings.iter().map(move |&(i, r)| (u, i, r)))
    }

    /// Inner ids of all users, `0..n_users`
    pub fn all_users(&self) -> Range<InnerId> {
        0..self.n_users()
    }

    /// Inner ids of all items, `0..n_items`
    pub fn all_items(&self) -> Range<InnerId> {
        0..self.n_items()
    }

    /// `(iid, rating)` pairs of one user, in ingestion order
    pub fn user_ratings(&self, uid: InnerId) -> Result<&[(InnerId, f64)]> {
        self.index
            .by_user
            .get(uid)
            .map(|v| v.as_slice())
            .ok_or_else(|| invalid_inner(EntityKind::User, uid))
    }

    /// `(uid, rating)` pairs of one item, in ingestion order
    pub fn item_ratings(&self, iid: InnerId) -> Result<&[(InnerId, f64)]> {
        self.index
            .by_item
            .get(iid)
            .map(|v| v.as_slice())
            .ok_or_else(|| invalid_inner(EntityKind::Item, iid))
    }

    // Id translation

    pub fn to_inner_uid(&self, ruid: &RawId) -> Result<InnerId> {
        self.index.users.to_inner(ruid)
    }

    pub fn to_inner_iid(&self, riid: &RawId) -> Result<InnerId> {
        self.index.items.to_inner(riid)
    }

    pub fn to_raw_uid(&self, iuid: InnerId) -> Result<&RawId> {
        self.index.users.to_raw(iuid)
    }

    pub fn to_raw_iid(&self, iiid: InnerId) -> Result<&RawId> {
        self.index.items.to_raw(iiid)
    }

    // Entity metadata

    /// Attach user metadata, replacing any previous table
    pub fn set_user_info(&mut self, user_info: InfoTable) {
        self.user_info = Some(user_info);
    }

    /// Attach item metadata, replacing any previous table
    pub fn set_item_info(&mut self, item_info: InfoTable) {
        self.item_info = Some(item_info);
    }

    pub fn user_info(&self) -> Option<&InfoTable> {
        self.user_info.as_ref()
    }

    pub fn item_info(&self) -> Option<&InfoTable> {
        self.item_info.as_ref()
    }

    /// Metadata of a user, addressed by raw or inner id
    pub fn get_userid_info(&self, uid: &EntityId, fields: Option<&[&str]>) -> Result<Record> {
        let raw = match uid {
            EntityId::Raw(raw) => raw,
            EntityId::Inner(inner) => self.to_raw_uid(*inner)?,
        };
        info_table(&self.user_info, EntityKind::User)?.lookup(raw, fields)
    }

    /// Metadata of an item, addressed by raw or inner id
    pub fn get_itemid_info(&self, iid: &EntityId, fields: Option<&[&str]>) -> Result<Record> {
        let raw = match iid {
            EntityId::Raw(raw) => raw,
            EntityId::Inner(inner) => self.to_raw_iid(*inner)?,
        };
        info_table(&self.item_info, EntityKind::Item)?.lookup(raw, fields)
    }
}

fn info_table(table: &Option<InfoTable>, kind: EntityKind) -> Result<&InfoTable> {
    table.as_ref().ok_or_else(|| DatasetError::MissingInfoTable {
        entity: kind.to_string(),
    })
}

fn invalid_inner(kind: EntityKind, id: InnerId) -> DatasetError {
    DatasetError::InvalidInnerId {
        entity: kind.to_string(),
        id,
    }
}
