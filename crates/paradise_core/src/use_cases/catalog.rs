use serde_json::Value;
use tracing::{debug, instrument};

use crate::catalog::{featured_experiences_request, CatalogItem, CatalogKind};
use crate::entities::extract_field;
use crate::error::Error;
use crate::pagination::{merge_page, Page};
use crate::ports::{GraphqlTransport, Navigator, TokenStore};
use crate::use_cases::{FetchPolicy, GraphqlClient};

pub struct CatalogUseCase<T: ?Sized, S: ?Sized, N: ?Sized> {
    client: GraphqlClient<T, S, N>,
}

impl<T, S, N> CatalogUseCase<T, S, N>
where
    T: GraphqlTransport + ?Sized + 'static,
    S: TokenStore + ?Sized + 'static,
    N: Navigator + ?Sized + 'static,
{
    pub fn new(client: GraphqlClient<T, S, N>) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn list_page(
        &self,
        kind: CatalogKind,
        page: u32,
        first: u32,
    ) -> Result<Page<CatalogItem>, Error> {
        let result = self
            .client
            .watch_query(kind.listing_request(page, first))
            .await?;
        extract_field(result.data, kind.listing_field())
    }

    /// Load up to `pages` pages, merging each into the previous ones the way
    /// a "load more" button does.
    pub async fn list_pages(
        &self,
        kind: CatalogKind,
        pages: u32,
        first: u32,
    ) -> Result<Page<CatalogItem>, Error> {
        let mut listing = self.list_page(kind, 1, first).await?;

        for _ in 1..pages.max(1) {
            let Some(next) = listing.paginator_info.next_page() else {
                break;
            };
            let page = self.list_page(kind, next, first).await?;
            listing = merge_page(listing, page);
            debug!(loaded = listing.data.len(), "merged next page");
        }

        Ok(listing)
    }

    /// Featured upcoming experiences. Served from the cache once loaded.
    #[instrument(skip(self))]
    pub async fn featured(&self, first: u32) -> Result<Page<CatalogItem>, Error> {
        let result = self
            .client
            .fetch(featured_experiences_request(1, first), FetchPolicy::CacheFirst)
            .await?;
        extract_field(result.data, CatalogKind::Experiences.listing_field())
    }

    /// `None` when the server has no item with that uuid
    #[instrument(skip(self))]
    pub async fn detail(&self, kind: CatalogKind, uuid: &str) -> Result<Option<CatalogItem>, Error> {
        let mut data = self.client.watch_query(kind.detail_request(uuid)).await?.data;

        match data.get_mut(kind.detail_field()).map(Value::take) {
            Some(Value::Null) | None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| Error::InvalidServerResponse(format!("malformed item: {}", e))),
        }
    }
}
