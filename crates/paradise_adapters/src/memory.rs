use async_trait::async_trait;
use paradise_core::entities::TokenPair;
use paradise_core::ports::TokenStore;
use paradise_core::Error;
use tokio::sync::RwLock;

/// Process-local token store; forgets everything on exit.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn access_token(&self) -> Result<Option<String>, Error> {
        Ok(self.tokens.read().await.as_ref().map(|t| t.access_token.clone()))
    }

    async fn refresh_token(&self) -> Result<Option<String>, Error> {
        Ok(self.tokens.read().await.as_ref().map(|t| t.refresh_token.clone()))
    }

    async fn set_tokens(&self, tokens: &TokenPair) -> Result<(), Error> {
        *self.tokens.write().await = Some(tokens.clone());
        Ok(())
    }

    async fn remove_tokens(&self) -> Result<(), Error> {
        *self.tokens.write().await = None;
        Ok(())
    }
}
