//! Bijective raw id <-> inner id mapping for one entity kind.
//!
//! Inner ids are handed out densely, `0, 1, 2, ...`, in order of first
//! appearance. The reverse direction is only needed by some consumers, so
//! it is built on the first `to_raw` call and cached.

use crate::error::{DatasetError, Result};
use crate::types::{EntityKind, InnerId, RawId};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Raw id to inner id mapper for users or items
#[derive(Debug)]
pub struct IdIndex {
    kind: EntityKind,
    forward: HashMap<RawId, InnerId>,
    /// `backward[inner] == raw`, populated lazily
    backward: OnceLock<Vec<RawId>>,
}

impl IdIndex {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            forward: HashMap::new(),
            backward: OnceLock::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Return the inner id of `raw`, assigning the next one if unseen
    pub fn get_or_assign(&mut self, raw: RawId) -> InnerId {
        let next = self.forward.len();
        let mut assigned = false;
        let inner = *self.forward.entry(raw).or_insert_with(|| {
            assigned = true;
            next
        });

        // A reverse map built before this point no longer covers every id
        if assigned {
            self.backward.take();
        }
        inner
    }

    /// Inner id of an already assigned raw id
    pub fn to_inner(&self, raw: &RawId) -> Result<InnerId> {
        self.forward
            .get(raw)
            .copied()
            .ok_or_else(|| DatasetError::UnknownEntity {
                entity: self.kind.to_string(),
                id: raw.clone(),
            })
    }

    /// Raw id behind an inner id, building the reverse map on first use
    pub fn to_raw(&self, inner: InnerId) -> Result<&RawId> {
        let backward = self.backward.get_or_init(|| self.build_backward());
        backward
            .get(inner)
            .ok_or_else(|| DatasetError::InvalidInnerId {
                entity: self.kind.to_string(),
                id: inner,
            })
    }

    pub fn contains(&self, raw: &RawId) -> bool {
        self.forward.contains_key(raw)
    }

    /// Number of distinct raw ids seen
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    fn build_backward(&self) -> Vec<RawId> {
        tracing::debug!("building reverse {} id map ({} ids)", self.kind, self.forward.len());
        let mut backward = vec![None; self.forward.len()];
        for (raw, &inner) in &self.forward {
            backward[inner] = Some(raw.clone());
        }
        // Inner ids are dense, so every slot is filled
        backward.into_iter().flatten().collect()
    }

    #[cfg(test)]
    fn reverse_built(&self) -> bool {
        self.backward.get().is_some()
    }
}
