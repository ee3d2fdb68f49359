use std::path::PathBuf;
use std::sync::Arc;

use paradise_core::config::{StorageBackend, StorageSettings};
use paradise_core::ports::TokenStore;
use tracing::debug;

use crate::configuration::project_dirs;
use crate::credentials::KeyringTokenStore;
use crate::memory::MemoryTokenStore;
use crate::token_file::FileTokenStore;

/// Where the file backend keeps its data when no path is configured
pub fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn build_token_store(settings: &StorageSettings) -> Arc<dyn TokenStore> {
    debug!(backend = ?settings.backend, "selecting token store");
    match settings.backend {
        StorageBackend::File => {
            let dir = settings.path.clone().unwrap_or_else(default_data_dir);
            Arc::new(FileTokenStore::new(dir, settings))
        }
        StorageBackend::Keyring => Arc::new(KeyringTokenStore::new(settings)),
        StorageBackend::Memory => Arc::new(MemoryTokenStore::new()),
    }
}
