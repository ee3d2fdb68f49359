use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::cache::QueryCache;
use crate::entities::GraphqlRequest;
use crate::error::Error;
use crate::ports::{GraphqlTransport, Navigator, TokenStore};
use crate::use_cases::AuthenticatedPipeline;

/// How a read consults the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    /// Serve from cache when possible, network otherwise
    CacheFirst,
    /// Serve from cache when possible and revalidate in the background
    #[default]
    CacheAndNetwork,
    /// Always hit the network, then store the result
    NetworkOnly,
    /// Always hit the network, never store
    NoCache,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    Cache,
    Network,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub data: Value,
    pub source: ResultSource,
}

/// Query/mutation front door: the authenticated pipeline plus a result cache.
pub struct GraphqlClient<T: ?Sized, S: ?Sized, N: ?Sized> {
    pipeline: AuthenticatedPipeline<T, S, N>,
    cache: Arc<QueryCache>,
}

impl<T: ?Sized, S: ?Sized, N: ?Sized> Clone for GraphqlClient<T, S, N> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<T, S, N> GraphqlClient<T, S, N>
where
    T: GraphqlTransport + ?Sized + 'static,
    S: TokenStore + ?Sized + 'static,
    N: Navigator + ?Sized + 'static,
{
    pub fn new(pipeline: AuthenticatedPipeline<T, S, N>, cache: QueryCache) -> Self {
        Self {
            pipeline,
            cache: Arc::new(cache),
        }
    }

    pub fn pipeline(&self) -> &AuthenticatedPipeline<T, S, N> {
        &self.pipeline
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// One-shot read that always goes to the network
    pub async fn query(&self, request: GraphqlRequest) -> Result<Value, Error> {
        Ok(self.fetch(request, FetchPolicy::NetworkOnly).await?.data)
    }

    /// Read for long-lived views: cached data first, refreshed behind the scenes
    pub async fn watch_query(&self, request: GraphqlRequest) -> Result<QueryResult, Error> {
        self.fetch(request, FetchPolicy::CacheAndNetwork).await
    }

    /// Mutations never touch the cache.
    pub async fn mutate(&self, request: GraphqlRequest) -> Result<Value, Error> {
        self.pipeline.send(request).await
    }

    #[instrument(skip(self, request), fields(operation = %request.display_name()))]
    pub async fn fetch(
        &self,
        request: GraphqlRequest,
        policy: FetchPolicy,
    ) -> Result<QueryResult, Error> {
        if request.is_mutation() {
            let data = self.mutate(request).await?;
            return Ok(QueryResult {
                data,
                source: ResultSource::Network,
            });
        }

        match policy {
            FetchPolicy::CacheFirst => {
                if let Some(data) = self.cache.get(&request).await {
                    return Ok(cached(data));
                }
                self.from_network(request, true).await
            }
            FetchPolicy::CacheAndNetwork => {
                let Some(data) = self.cache.get(&request).await else {
                    return self.from_network(request, true).await;
                };

                let client = self.clone();
                tokio::spawn(async move {
                    if let Err(e) = client.from_network(request, true).await {
                        debug!(error = %e, "background revalidation failed");
                    }
                });
                Ok(cached(data))
            }
            FetchPolicy::NetworkOnly => self.from_network(request, true).await,
            FetchPolicy::NoCache => self.from_network(request, false).await,
        }
    }

    async fn from_network(&self, request: GraphqlRequest, store: bool) -> Result<QueryResult, Error> {
        let data = self.pipeline.send(request.clone()).await?;
        if store {
            self.cache.put(&request, data.clone()).await;
        }
        Ok(QueryResult {
            data,
            source: ResultSource::Network,
        })
    }
}

fn cached(data: Value) -> QueryResult {
    QueryResult {
        data,
        source: ResultSource::Cache,
    }
}
