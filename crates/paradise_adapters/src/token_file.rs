use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use paradise_core::config::StorageSettings;
use paradise_core::entities::TokenPair;
use paradise_core::ports::TokenStore;
use paradise_core::Error;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

const FILE_NAME: &str = "tokens.json";
const TEMP_FILE_NAME: &str = "tokens.json.tmp";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    value: String,
    stored_at: i64,
    expires_at: i64,
}

impl StoredToken {
    fn is_live(&self, now: i64) -> bool {
        now < self.expires_at
    }
}

pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Token pair persisted as JSON, one named entry per token.
///
/// Entries carry an absolute expiry; an expired entry reads as absent.
/// Writes go to a temporary file that is renamed over the old one, and reads
/// wait for any write in progress. On unix the file is only readable by its
/// owner.
pub struct FileTokenStore {
    store_path: PathBuf,
    token_key: String,
    refresh_token_key: String,
    lifetime: Duration,
    file_lock: RwLock<()>,
}

impl FileTokenStore {
    pub fn new(data_dir: PathBuf, settings: &StorageSettings) -> Self {
        Self {
            store_path: data_dir.join(FILE_NAME),
            token_key: settings.token_key.clone(),
            refresh_token_key: settings.refresh_token_key.clone(),
            lifetime: Duration::from_secs(u64::from(settings.expiry_days) * 24 * 60 * 60),
            file_lock: RwLock::new(()),
        }
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn path(&self) -> &PathBuf {
        &self.store_path
    }

    async fn load(&self) -> Result<HashMap<String, StoredToken>, Error> {
        if !fs::try_exists(&self.store_path).await.unwrap_or(false) {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(&self.store_path).await?;
        serde_json::from_str(&content)
            .map_err(|e| Error::CredentialStorage(format!("failed to parse token file: {}", e)))
    }

    async fn save(&self, entries: &HashMap<String, StoredToken>) -> Result<(), Error> {
        if let Some(parent) = self.store_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| Error::CredentialStorage(format!("failed to serialize tokens: {}", e)))?;

        let temp_path = self.store_path.with_file_name(TEMP_FILE_NAME);
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&temp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.store_path).await?;
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<String>, Error> {
        let entries = {
            let _guard = self.file_lock.read().await;
            self.load().await?
        };
        let now = unix_now();

        Ok(entries.get(key).and_then(|token| {
            if token.is_live(now) {
                Some(token.value.clone())
            } else {
                debug!(key, "stored token expired");
                None
            }
        }))
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn access_token(&self) -> Result<Option<String>, Error> {
        self.read(&self.token_key).await
    }

    async fn refresh_token(&self) -> Result<Option<String>, Error> {
        self.read(&self.refresh_token_key).await
    }

    #[instrument(skip(self, tokens), fields(path = %self.store_path.display()))]
    async fn set_tokens(&self, tokens: &TokenPair) -> Result<(), Error> {
        let _guard = self.file_lock.write().await;
        let mut entries = self.load().await?;

        let stored_at = unix_now();
        let expires_at = stored_at.saturating_add(self.lifetime.as_secs() as i64);
        for (key, value) in [
            (&self.token_key, &tokens.access_token),
            (&self.refresh_token_key, &tokens.refresh_token),
        ] {
            entries.insert(
                key.clone(),
                StoredToken {
                    value: value.clone(),
                    stored_at,
                    expires_at,
                },
            );
        }

        self.save(&entries).await
    }

    #[instrument(skip(self), fields(path = %self.store_path.display()))]
    async fn remove_tokens(&self) -> Result<(), Error> {
        let _guard = self.file_lock.write().await;
        let mut entries = self.load().await?;

        let removed = entries.remove(&self.token_key).is_some()
            | entries.remove(&self.refresh_token_key).is_some();
        if !removed {
            return Ok(());
        }

        self.save(&entries).await
    }
}
