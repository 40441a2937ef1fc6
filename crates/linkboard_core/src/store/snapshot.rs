//! Immutable collection snapshots.

use crate::adapter::SnapshotOrder;
use std::sync::Arc;

/// Point-in-time copy of one collection as returned by a backend.
///
/// Cloning is cheap and a clone keeps its data after the store swaps in a
/// newer snapshot.
#[derive(Debug)]
pub struct Snapshot<T> {
    items: Arc<[T]>,
    order: SnapshotOrder,
    revision: u64,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            order: self.order,
            revision: self.revision,
        }
    }
}

impl<T> Snapshot<T> {
    pub fn empty(order: SnapshotOrder) -> Self {
        Self::new(Vec::new(), order, 0)
    }

    pub fn new(items: Vec<T>, order: SnapshotOrder, revision: u64) -> Self {
        Self {
            items: items.into(),
            order,
            revision,
        }
    }

    /// Items in backend order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn order(&self) -> SnapshotOrder {
        self.order
    }

    /// Increments every time the store swaps this collection.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items newest-first, whatever order the backend used.
    pub fn presentation(&self) -> Vec<&T> {
        match self.order {
            SnapshotOrder::OldestFirst => self.items.iter().rev().collect(),
            SnapshotOrder::NewestFirst => self.items.iter().collect(),
        }
    }

    /// Items oldest-first (canonical storage order).
    pub fn storage_order(&self) -> Vec<&T> {
        match self.order {
            SnapshotOrder::OldestFirst => self.items.iter().collect(),
            SnapshotOrder::NewestFirst => self.items.iter().rev().collect(),
        }
    }
}
