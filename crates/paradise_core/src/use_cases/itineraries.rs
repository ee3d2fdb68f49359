use tracing::{debug, info, instrument};

use crate::entities::extract_field;
use crate::error::Error;
use crate::itineraries::{itineraries_request, Itinerary, ITINERARIES_FIELD};
use crate::pagination::{merge_page, Page};
use crate::ports::{GraphqlTransport, Navigator, TokenStore};
use crate::use_cases::{FetchPolicy, GraphqlClient};

/// Lists the signed-in user's itineraries.
///
/// Without a stored session nothing is sent: the user is redirected to the
/// login route instead. Results are per user and never cached.
pub struct ItinerariesUseCase<T: ?Sized, S: ?Sized, N: ?Sized> {
    client: GraphqlClient<T, S, N>,
}

impl<T, S, N> ItinerariesUseCase<T, S, N>
where
    T: GraphqlTransport + ?Sized + 'static,
    S: TokenStore + ?Sized + 'static,
    N: Navigator + ?Sized + 'static,
{
    pub fn new(client: GraphqlClient<T, S, N>) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn list_page(&self, page: u32, limit: u32) -> Result<Page<Itinerary>, Error> {
        self.require_session().await?;

        let result = self
            .client
            .fetch(itineraries_request(page, limit), FetchPolicy::NoCache)
            .await?;
        extract_field(result.data, ITINERARIES_FIELD)
    }

    pub async fn list_pages(&self, pages: u32, limit: u32) -> Result<Page<Itinerary>, Error> {
        let mut listing = self.list_page(1, limit).await?;

        for _ in 1..pages.max(1) {
            let Some(next) = listing.paginator_info.next_page() else {
                break;
            };
            let page = self.list_page(next, limit).await?;
            listing = merge_page(listing, page);
            debug!(loaded = listing.data.len(), "merged next page");
        }

        Ok(listing)
    }

    async fn require_session(&self) -> Result<(), Error> {
        let pipeline = self.client.pipeline();
        if pipeline.token_store().access_token().await?.is_some() {
            return Ok(());
        }

        info!("not signed in, redirecting to login");
        pipeline.navigator().navigate(pipeline.login_route());
        Err(Error::Authentication(
            "sign in to see your itineraries".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::auth_errors::MarkerAuthErrors;
    use crate::cache::QueryCache;
    use crate::entities::GraphqlResponse;
    use crate::itineraries::ITINERARIES_PAGE_SIZE;
    use crate::test_support::{MemoryStore, MockTransport, RecordingNavigator};
    use crate::use_cases::AuthenticatedPipeline;

    type TestItineraries = ItinerariesUseCase<MockTransport, MemoryStore, RecordingNavigator>;

    /// Two pages for `Bearer T1`; page 2 repeats the last itinerary of page 1.
    fn itineraries_backend() -> MockTransport {
        MockTransport::new(|outbound| {
            let page = outbound.request.variables["page"].as_u64().unwrap_or(1);
            let data = match page {
                1 => json!([
                    { "uuid": "i-1", "name": "Honeymoon", "status": "confirmed" },
                    { "uuid": "i-2", "name": "Family week", "status": "draft" }
                ]),
                _ => json!([
                    { "uuid": "i-2", "name": "Family week", "status": "draft" },
                    { "uuid": "i-3", "name": "Dive trip", "status": "draft" }
                ]),
            };
            Ok(GraphqlResponse::data(json!({
                "myItineraries": {
                    "data": data,
                    "paginatorInfo": { "total": 3, "currentPage": page, "lastPage": 2 }
                }
            })))
        })
    }

    fn itineraries(
        store: MemoryStore,
    ) -> (
        TestItineraries,
        Arc<MockTransport>,
        Arc<RecordingNavigator>,
        GraphqlClient<MockTransport, MemoryStore, RecordingNavigator>,
    ) {
        let transport = Arc::new(itineraries_backend());
        let navigator = Arc::new(RecordingNavigator::default());
        let pipeline = AuthenticatedPipeline::new(
            transport.clone(),
            Arc::new(store),
            navigator.clone(),
            Arc::new(MarkerAuthErrors::default()),
        );
        let client = GraphqlClient::new(pipeline, QueryCache::new(50));
        (ItinerariesUseCase::new(client.clone()), transport, navigator, client)
    }

    #[tokio::test]
    async fn test_list_page_sends_bearer_and_limit() {
        let (use_case, transport, navigator, client) =
            itineraries(MemoryStore::with_tokens("T1", "R1"));

        let page = use_case.list_page(1, ITINERARIES_PAGE_SIZE).await.unwrap();

        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].name.as_deref(), Some("Honeymoon"));
        let call = &transport.calls()[0];
        assert_eq!(call.operation, "MyItineraries");
        assert_eq!(call.authorization.as_deref(), Some("Bearer T1"));
        assert_eq!(call.variables, json!({ "limit": 10, "page": 1 }));
        assert!(navigator.routes().is_empty());
        assert!(client.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_list_pages_merges_without_duplicates() {
        let (use_case, transport, _navigator, _client) =
            itineraries(MemoryStore::with_tokens("T1", "R1"));

        let listing = use_case.list_pages(5, ITINERARIES_PAGE_SIZE).await.unwrap();

        let uuids: Vec<&str> = listing.data.iter().map(|i| i.uuid.as_str()).collect();
        assert_eq!(uuids, vec!["i-1", "i-2", "i-3"]);
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_anonymous_user_is_sent_to_login() {
        let (use_case, transport, navigator, _client) = itineraries(MemoryStore::default());

        let err = use_case.list_page(1, ITINERARIES_PAGE_SIZE).await.unwrap_err();

        assert!(matches!(err, Error::Authentication(_)));
        assert!(transport.calls().is_empty());
        assert_eq!(navigator.routes(), vec!["/login"]);
    }
}
