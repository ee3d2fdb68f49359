//! HTTP client construction for the GraphQL endpoint.

use paradise_core::config::GraphqlSettings;
use paradise_core::Error;
use reqwest::Client;

pub const USER_AGENT: &str = concat!("paradise/", env!("CARGO_PKG_VERSION"));

/// Build the client used by [`crate::transport::ReqwestTransport`].
///
/// Cookies are not kept: the bearer token is the only session state.
pub fn build_graphql_client(settings: &GraphqlSettings) -> Result<Client, Error> {
    Client::builder()
        .cookie_store(false)
        .user_agent(USER_AGENT)
        .timeout(settings.timeout())
        .connect_timeout(settings.connect_timeout())
        .build()
        .map_err(|e| Error::Network(format!("failed to create GraphQL HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_build_graphql_client() {
        let client = build_graphql_client(&GraphqlSettings::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_default_timeouts() {
        let settings = GraphqlSettings::default();
        assert_eq!(settings.timeout(), Duration::from_secs(30));
        assert_eq!(settings.connect_timeout(), Duration::from_secs(10));
    }
}
