//! Persistence of the trained model artifact.

mod file;
mod memory;

pub use file::FileModelStore;
pub use memory::MemoryModelStore;

use crate::error::StoreError;
use crate::nlp::classifier::TrainedModel;

/// Storage backend for the fitted classifier state.
///
/// `load` must tolerate a first run (`Ok(None)`); corruption is reported
/// as an error and treated as absence by the caller. The artifact format
/// is opaque to the rest of the system.
pub trait ModelStore: Send + Sync {
    /// Persist the trained state, overwriting any previous artifact.
    fn save(&self, model: &TrainedModel) -> Result<(), StoreError>;

    /// Load previously trained state, `Ok(None)` when absent.
    fn load(&self) -> Result<Option<TrainedModel>, StoreError>;
}
