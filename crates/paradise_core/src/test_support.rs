//! In-memory doubles for the ports, shared by the use case tests.

use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{oneshot, Mutex};

use crate::entities::{GraphqlError, GraphqlResponse, OutboundRequest, TokenPair};
use crate::error::Error;
use crate::ports::{GraphqlTransport, Navigator, TokenStore};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub operation: String,
    pub authorization: Option<String>,
    pub variables: Value,
}

type Handler = Box<dyn Fn(&OutboundRequest) -> Result<GraphqlResponse, Error> + Send + Sync>;

pub struct MockTransport {
    calls: StdMutex<Vec<RecordedCall>>,
    handler: Handler,
    refresh_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl MockTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&OutboundRequest) -> Result<GraphqlResponse, Error> + Send + Sync + 'static,
    {
        Self {
            calls: StdMutex::new(Vec::new()),
            handler: Box::new(handler),
            refresh_gate: Mutex::new(None),
        }
    }

    /// Backend where `T1` has expired, `R1` refreshes to `T2`/`R2`, and any
    /// operation carrying `Bearer T2` succeeds with `{ <operation>: "ok" }`.
    pub fn expiring() -> Self {
        Self::new(|outbound| {
            let operation = outbound.request.display_name().to_string();
            match operation.as_str() {
                "RefreshToken" => {
                    if outbound.request.variables["refresh_token"] == "R1" {
                        Ok(GraphqlResponse::data(json!({
                            "refreshToken": { "access_token": "T2", "refresh_token": "R2" }
                        })))
                    } else {
                        Ok(GraphqlResponse::errors(vec![GraphqlError::new(
                            "Invalid refresh token",
                        )]))
                    }
                }
                _ if outbound.authorization() == Some("Bearer T2") => {
                    Ok(GraphqlResponse::data(json!({ operation.as_str(): "ok" })))
                }
                _ => Ok(GraphqlResponse::errors(vec![GraphqlError::new(
                    "The token has expired",
                )])),
            }
        })
    }

    /// Hold every refresh call until the returned sender fires.
    pub async fn gate_refresh(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.refresh_gate.lock().await = Some(rx);
        tx
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn calls_named(&self, operation: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.operation == operation)
            .collect()
    }
}

#[async_trait]
impl GraphqlTransport for MockTransport {
    async fn execute(&self, request: &OutboundRequest) -> Result<GraphqlResponse, Error> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                operation: request.request.display_name().to_string(),
                authorization: request.authorization().map(str::to_string),
                variables: request.request.variables.clone(),
            });

        if request.request.display_name() == "RefreshToken" {
            let gate = self.refresh_gate.lock().await.take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
        }

        (self.handler)(request)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tokens: Mutex<Option<TokenPair>>,
}

impl MemoryStore {
    pub fn with_tokens(access: &str, refresh: &str) -> Self {
        Self {
            tokens: Mutex::new(Some(TokenPair::new(access, refresh))),
        }
    }

    pub async fn snapshot(&self) -> Option<TokenPair> {
        self.tokens.lock().await.clone()
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn access_token(&self) -> Result<Option<String>, Error> {
        Ok(self.tokens.lock().await.as_ref().map(|t| t.access_token.clone()))
    }

    async fn refresh_token(&self) -> Result<Option<String>, Error> {
        Ok(self.tokens.lock().await.as_ref().map(|t| t.refresh_token.clone()))
    }

    async fn set_tokens(&self, tokens: &TokenPair) -> Result<(), Error> {
        *self.tokens.lock().await = Some(tokens.clone());
        Ok(())
    }

    async fn remove_tokens(&self) -> Result<(), Error> {
        *self.tokens.lock().await = None;
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: StdMutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(route.to_string());
    }
}
