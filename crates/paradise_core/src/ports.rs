use async_trait::async_trait;

use crate::entities::{GraphqlError, GraphqlResponse, OutboundRequest, TokenPair};
use crate::error::Error;

// ============================================================================
// Credential Ports
// ============================================================================

/// Durable storage for the access/refresh token pair
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current access token, if one is stored
    async fn access_token(&self) -> Result<Option<String>, Error>;

    /// Current refresh token, if one is stored
    async fn refresh_token(&self) -> Result<Option<String>, Error>;

    /// Replace both tokens
    async fn set_tokens(&self, tokens: &TokenPair) -> Result<(), Error>;

    /// Forget both tokens. Removing from an empty store is not an error.
    async fn remove_tokens(&self) -> Result<(), Error>;
}

// ============================================================================
// Transport Ports
// ============================================================================

/// Executes one GraphQL request against the remote endpoint.
///
/// Implementations return `Err` only for transport failures; GraphQL level
/// errors come back inside the response.
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    async fn execute(&self, request: &OutboundRequest) -> Result<GraphqlResponse, Error>;
}

/// Client-side navigation (login redirect, home after logout)
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Decides whether a GraphQL error means the session is no longer valid
pub trait AuthErrorPredicate: Send + Sync {
    fn is_auth_error(&self, error: &GraphqlError) -> bool;
}

impl<F> AuthErrorPredicate for F
where
    F: Fn(&GraphqlError) -> bool + Send + Sync,
{
    fn is_auth_error(&self, error: &GraphqlError) -> bool {
        self(error)
    }
}
