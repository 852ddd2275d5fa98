//! In-memory model store, used by tests and the no-persistence setup.

use std::sync::Mutex;

use super::ModelStore;
use crate::error::StoreError;
use crate::nlp::classifier::TrainedModel;

/// Holds the artifact in memory; empty on construction.
#[derive(Debug, Default)]
pub struct MemoryModelStore {
    slot: Mutex<Option<TrainedModel>>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store, as if a previous run had saved.
    pub fn with_model(model: TrainedModel) -> Self {
        Self {
            slot: Mutex::new(Some(model)),
        }
    }
}

impl ModelStore for MemoryModelStore {
    fn save(&self, model: &TrainedModel) -> Result<(), StoreError> {
        *self.slot.lock().expect("store lock poisoned") = Some(model.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<TrainedModel>, StoreError> {
        Ok(self.slot.lock().expect("store lock poisoned").clone())
    }
}
