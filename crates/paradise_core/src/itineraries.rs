//! The signed-in user's trip plans.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::entities::GraphqlRequest;
use crate::pagination::Identified;

/// Itineraries per page
pub const ITINERARIES_PAGE_SIZE: u32 = 10;

/// Root field of the itineraries query
pub const ITINERARIES_FIELD: &str = "myItineraries";

const ITINERARIES_DOCUMENT: &str = "query MyItineraries($limit: Int, $page: Int) { \
     myItineraries(limit: $limit, page: $page) { \
     data { uuid name start_date end_date status destination { name country } experiences_count created_at } \
     paginatorInfo { total currentPage lastPage } } }";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDestination {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub uuid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub destination: Option<ItineraryDestination>,
    #[serde(default)]
    pub experiences_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Itinerary {
    /// `start - end`, with a blank side when only one date is set
    pub fn date_range(&self) -> Option<String> {
        match (self.start_date.as_deref(), self.end_date.as_deref()) {
            (None, None) => None,
            (start, end) => Some(format!("{} - {}", start.unwrap_or(""), end.unwrap_or(""))),
        }
    }

    /// `name, country` of the destination
    pub fn place(&self) -> Option<String> {
        self.destination.as_ref().map(|d| match &d.country {
            Some(country) => format!("{}, {}", d.name, country),
            None => d.name.clone(),
        })
    }
}

impl Identified for Itinerary {
    fn uuid(&self) -> &str {
        &self.uuid
    }
}

pub fn itineraries_request(page: u32, limit: u32) -> GraphqlRequest {
    GraphqlRequest::new(ITINERARIES_DOCUMENT).with_variables(json!({
        "limit": limit,
        "page": page,
    }))
}
