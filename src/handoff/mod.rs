pub mod launch;
pub mod storage;
pub mod store;

pub use launch::{LaunchParams, LaunchRequest};
pub use storage::{FileStorage, HandoffStorage, MemoryStorage};
pub use store::{FieldKind, FieldSpec, HandoffSchema, HandoffStore, PAYLOAD_VERSION};

use crate::config::{HandoffBackend, HandoffConfig};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Factory: create the storage backend named in config.
///
/// Relative paths resolve against `data_dir`.
pub fn create_storage(config: &HandoffConfig, data_dir: &Path) -> Result<Arc<dyn HandoffStorage>> {
    match config.backend {
        HandoffBackend::Memory => Ok(Arc::new(MemoryStorage::new())),
        HandoffBackend::File => {
            let path = match &config.path {
                Some(path) if path.is_absolute() => path.clone(),
                Some(path) => data_dir.join(path),
                None => data_dir.join("handoff.json"),
            };
            if path.is_dir() {
                anyhow::bail!("handoff path {} is a directory", path.display());
            }
            Ok(Arc::new(FileStorage::new(path)))
        }
    }
}
