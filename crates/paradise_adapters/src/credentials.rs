use async_trait::async_trait;
use keyring::Entry;
use paradise_core::config::StorageSettings;
use paradise_core::entities::TokenPair;
use paradise_core::ports::TokenStore;
use paradise_core::Error;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::token_file::unix_now;

const SERVICE_NAME: &str = "paradise";

/// What goes into the keyring password field
#[derive(Debug, Serialize, Deserialize)]
struct SealedToken {
    value: String,
    expires_at: i64,
}

fn seal(value: &str, expires_at: i64) -> Result<String, Error> {
    serde_json::to_string(&SealedToken {
        value: value.to_string(),
        expires_at,
    })
    .map_err(|e| Error::CredentialStorage(format!("failed to serialize token: {}", e)))
}

/// A bare string, as written by other tools, never expires.
fn unseal(raw: String, now: i64) -> Option<String> {
    match serde_json::from_str::<SealedToken>(&raw) {
        Ok(sealed) if now < sealed.expires_at => Some(sealed.value),
        Ok(_) => None,
        Err(_) => Some(raw),
    }
}

/// Token pair kept in the OS keyring (libsecret on Linux).
///
/// Each entry carries the same `expiry_days` deadline as the file store.
pub struct KeyringTokenStore {
    service: String,
    token_key: String,
    refresh_token_key: String,
    lifetime_secs: i64,
}

impl KeyringTokenStore {
    pub fn new(settings: &StorageSettings) -> Self {
        Self::with_service(SERVICE_NAME, settings)
    }

    pub fn with_service(service: &str, settings: &StorageSettings) -> Self {
        Self {
            service: service.to_string(),
            token_key: settings.token_key.clone(),
            refresh_token_key: settings.refresh_token_key.clone(),
            lifetime_secs: i64::from(settings.expiry_days) * 24 * 60 * 60,
        }
    }

    fn get_entry(&self, key: &str) -> Result<Entry, Error> {
        Entry::new(&self.service, key)
            .map_err(|e| Error::CredentialStorage(format!("failed to create keyring entry: {}", e)))
    }

    async fn read(&self, key: &str) -> Result<Option<String>, Error> {
        let entry = self.get_entry(key)?;

        let token = tokio::task::spawn_blocking(move || match entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(Error::CredentialStorage(format!("failed to read token: {}", e))),
        })
        .await
        .map_err(|e| Error::CredentialStorage(format!("task join error: {}", e)))??;

        let live = token.and_then(|raw| unseal(raw, unix_now()));
        if live.is_none() {
            debug!(key, "no live token in keyring");
        }
        Ok(live)
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), Error> {
        let entry = self.get_entry(key)?;

        let value = seal(value, unix_now().saturating_add(self.lifetime_secs))?;
        tokio::task::spawn_blocking(move || {
            entry
                .set_password(&value)
                .map_err(|e| Error::CredentialStorage(format!("failed to store token: {}", e)))
        })
        .await
        .map_err(|e| Error::CredentialStorage(format!("task join error: {}", e)))?
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        let entry = self.get_entry(key)?;

        tokio::task::spawn_blocking(move || {
            match entry.delete_credential() {
                Ok(()) => Ok(()),
                Err(keyring::Error::NoEntry) => Ok(()), // Already gone
                Err(e) => Err(Error::CredentialStorage(format!(
                    "failed to delete token: {}",
                    e
                ))),
            }
        })
        .await
        .map_err(|e| Error::CredentialStorage(format!("task join error: {}", e)))?
    }
}

#[async_trait]
impl TokenStore for KeyringTokenStore {
    async fn access_token(&self) -> Result<Option<String>, Error> {
        self.read(&self.token_key).await
    }

    async fn refresh_token(&self) -> Result<Option<String>, Error> {
        self.read(&self.refresh_token_key).await
    }

    #[instrument(skip(self, tokens))]
    async fn set_tokens(&self, tokens: &TokenPair) -> Result<(), Error> {
        debug!(service = %self.service, "storing tokens in keyring");
        self.write(&self.token_key, &tokens.access_token).await?;
        self.write(&self.refresh_token_key, &tokens.refresh_token).await
    }

    #[instrument(skip(self))]
    async fn remove_tokens(&self) -> Result<(), Error> {
        self.delete(&self.token_key).await?;
        self.delete(&self.refresh_token_key).await
    }
}
