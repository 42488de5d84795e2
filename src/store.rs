//! # Batch Store
//! Holds the most recently processed batch.
//!
//! `store` is a blind overwrite (no merge, no versioning). Callers that need
//! something stronger implement [`BatchStore`] themselves and inject it.

use std::sync::{Arc, RwLock};

use crate::transform::ProcessedBatch;

pub trait BatchStore: Send + Sync {
    /// Replace whatever is held with `batch`.
    fn store(&self, batch: ProcessedBatch);
    /// Last stored batch, or an empty one if nothing was stored yet.
    fn load(&self) -> ProcessedBatch;
}

impl<T: BatchStore + ?Sized> BatchStore for Arc<T> {
    fn store(&self, batch: ProcessedBatch) {
        (**self).store(batch)
    }

    fn load(&self) -> ProcessedBatch {
        (**self).load()
    }
}

/// Single in-memory slot behind an `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: RwLock<ProcessedBatch>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BatchStore for MemoryStore {
    fn store(&self, batch: ProcessedBatch) {
        let sources = batch.len();
        let mut slot = self.slot.write().unwrap_or_else(|p| p.into_inner());
        *slot = batch;
        tracing::debug!(target: "store", sources, "cached processed batch");
    }

    fn load(&self) -> ProcessedBatch {
        self.slot
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}
