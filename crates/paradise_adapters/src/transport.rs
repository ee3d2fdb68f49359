use async_trait::async_trait;
use paradise_core::config::GraphqlSettings;
use paradise_core::entities::{GraphqlResponse, OutboundRequest};
use paradise_core::ports::GraphqlTransport;
use paradise_core::Error;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use tracing::{debug, instrument};

use crate::network::build_graphql_client;

/// POSTs GraphQL requests as JSON to a single endpoint
pub struct ReqwestTransport {
    client: Client,
    endpoint: String,
}

impl ReqwestTransport {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn from_settings(settings: &GraphqlSettings) -> Result<Self, Error> {
        reqwest::Url::parse(&settings.endpoint).map_err(|e| {
            Error::Configuration(format!("invalid GraphQL endpoint {}: {}", settings.endpoint, e))
        })?;
        Ok(Self::new(build_graphql_client(settings)?, settings.endpoint.clone()))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GraphqlTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(operation = %request.request.display_name()))]
    async fn execute(&self, request: &OutboundRequest) -> Result<GraphqlResponse, Error> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Other(format!("invalid header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Other(format!("invalid value for header {}: {}", name, e)))?;
            headers.insert(name, value);
        }

        // `json` only adds a content type when none was given.
        let response = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(&request.request)
            .send()
            .await
            .map_err(|e| Error::Network(format!("request to {} failed: {}", self.endpoint, e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response body: {}", e)))?;

        debug!(status = %status, bytes = body.len(), "response received");

        // GraphQL servers may answer with a non-2xx status and still carry a
        // well-formed `errors` array; that array is what callers act on.
        match serde_json::from_slice::<GraphqlResponse>(&body) {
            Ok(parsed) if status.is_success() || parsed.data.is_some() || !parsed.errors.is_empty() => {
                Ok(parsed)
            }
            Ok(_) => Err(Error::Network(format!("server responded with {}", status))),
            Err(e) if status.is_success() => Err(Error::InvalidServerResponse(format!(
                "response is not a GraphQL body: {}",
                e
            ))),
            Err(_) => Err(Error::Network(format!("server responded with {}", status))),
        }
    }
}
