//! Marketplace catalog: listing and detail documents per section.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::entities::GraphqlRequest;
use crate::error::Error;
use crate::pagination::Identified;

/// Items per listing page
pub const DEFAULT_PAGE_SIZE: u32 = 9;

/// Size of the home page "exclusive" carousel
pub const FEATURED_PAGE_SIZE: u32 = 8;

const LOCALIZED_NAMES: &str = "name_es name_en name_fr name_de name_sv name_ar";

const SHORT_DESCRIPTIONS: &str = "short_description short_description_es short_description_en \
     short_description_fr short_description_de short_description_sv short_description_ar";

const MAIN_IMAGE: &str = "mainImage { uuid url file_mime_type }";

const COVER_VIDEO: &str = "coverVideo { uuid url file_mime_type }";

const LOCATION: &str =
    "location { uuid name address { uuid latitude longitude country { uuid name } } }";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Experiences,
    Activities,
    Tours,
    Accommodations,
    Services,
    Restaurants,
    Destinations,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 7] = [
        CatalogKind::Experiences,
        CatalogKind::Activities,
        CatalogKind::Tours,
        CatalogKind::Accommodations,
        CatalogKind::Services,
        CatalogKind::Restaurants,
        CatalogKind::Destinations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Experiences => "experiences",
            CatalogKind::Activities => "activities",
            CatalogKind::Tours => "tours",
            CatalogKind::Accommodations => "accommodations",
            CatalogKind::Services => "services",
            CatalogKind::Restaurants => "restaurants",
            CatalogKind::Destinations => "destinations",
        }
    }

    /// Root field of the paginated listing query
    pub fn listing_field(&self) -> &'static str {
        match self {
            CatalogKind::Experiences => "getAllExperiences",
            CatalogKind::Activities => "getAllActivities",
            CatalogKind::Tours => "getAllTours",
            CatalogKind::Accommodations => "getAllAccommodations",
            CatalogKind::Services => "getAllServices",
            CatalogKind::Restaurants => "getAllRestaurants",
            CatalogKind::Destinations => "getAllLocations",
        }
    }

    /// Root field of the single-item query
    pub fn detail_field(&self) -> &'static str {
        match self {
            CatalogKind::Experiences => "experience",
            CatalogKind::Activities => "activity",
            CatalogKind::Tours => "tour",
            CatalogKind::Accommodations => "accommodation",
            CatalogKind::Services => "service",
            CatalogKind::Restaurants => "restaurant",
            CatalogKind::Destinations => "destination",
        }
    }

    fn item_fields(&self) -> String {
        let extra = match self {
            CatalogKind::Experiences => format!(
                "{} start_date end_date remaining_uses user_can_purchase {}",
                LOCALIZED_NAMES, LOCATION
            ),
            CatalogKind::Activities => {
                format!("{} date user_can_purchase {}", LOCALIZED_NAMES, LOCATION)
            }
            CatalogKind::Tours => format!("{} estimated_duration {}", LOCALIZED_NAMES, LOCATION),
            CatalogKind::Accommodations => format!(
                "{} address {{ uuid latitude longitude }} \
                 accommodationType {{ uuid type }} min_price_per_night max_price_per_night",
                LOCATION
            ),
            CatalogKind::Services => format!(
                "{} user_can_purchase locations {{ uuid name address {{ uuid country {{ uuid name }} }} }}",
                LOCALIZED_NAMES
            ),
            CatalogKind::Restaurants => format!(
                "{} address {{ uuid latitude longitude }} user_can_purchase",
                LOCATION
            ),
            CatalogKind::Destinations => "language number_of_plans \
                 address { uuid latitude longitude country { uuid name } }"
                .to_string(),
        };
        format!("uuid slug name {} {} {}", SHORT_DESCRIPTIONS, MAIN_IMAGE, extra)
    }

    pub fn listing_document(&self) -> String {
        let field = self.listing_field();
        format!(
            "query {field}($orderBy: [Query{order}OrderByOrderByClause!], $first: Int, $page: Int, $showDrafts: Boolean = false) {{ \
             {field}(orderBy: $orderBy, first: $first, page: $page, showDrafts: $showDrafts) {{ \
             data {{ {fields} }} paginatorInfo {{ currentPage lastPage total }} }} }}",
            field = field,
            order = upper_first(field),
            fields = self.item_fields(),
        )
    }

    pub fn detail_document(&self) -> String {
        let field = self.detail_field();
        format!(
            "query {name}($uuid: String!) {{ {field}(uuid: $uuid) {{ uuid slug name description {short} {image} }} }}",
            name = upper_first(field),
            field = field,
            short = SHORT_DESCRIPTIONS,
            image = MAIN_IMAGE,
        )
    }

    /// Newest first, `first` items of page `page`
    pub fn listing_request(&self, page: u32, first: u32) -> GraphqlRequest {
        GraphqlRequest::new(self.listing_document()).with_variables(json!({
            "orderBy": [{ "column": "CREATED_AT", "order": "DESC" }],
            "first": first,
            "page": page,
        }))
    }

    pub fn detail_request(&self, uuid: &str) -> GraphqlRequest {
        GraphqlRequest::new(self.detail_document()).with_variables(json!({ "uuid": uuid }))
    }
}

/// Enabled, featured experiences that have not happened yet, newest first
pub fn featured_experiences_request(page: u32, first: u32) -> GraphqlRequest {
    let kind = CatalogKind::Experiences;
    let field = kind.listing_field();
    let document = format!(
        "query FeaturedExperiences($orderBy: [Query{order}OrderByOrderByClause!], $first: Int, $page: Int, \
         $featured: Boolean, $filterEnabled: Boolean, $dateGreaterThanToday: Boolean) {{ \
         {field}(orderBy: $orderBy, first: $first, page: $page, featured: $featured, \
         filterEnabled: $filterEnabled, dateGreaterThanToday: $dateGreaterThanToday) {{ \
         data {{ {fields} {video} }} paginatorInfo {{ currentPage lastPage total }} }} }}",
        field = field,
        order = upper_first(field),
        fields = kind.item_fields(),
        video = COVER_VIDEO,
    );

    GraphqlRequest::new(document).with_variables(json!({
        "orderBy": [{ "column": "CREATED_AT", "order": "DESC" }],
        "first": first,
        "page": page,
        "featured": true,
        "filterEnabled": true,
        "dateGreaterThanToday": true,
    }))
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        CatalogKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                Error::Other(format!(
                    "unknown catalog section `{}`, expected one of: {}",
                    s,
                    CatalogKind::ALL.map(|k| k.as_str()).join(", ")
                ))
            })
    }
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// A listing entry. Only `uuid` and `name` are guaranteed; everything else
/// stays as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub uuid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogItem {
    /// `name_<locale>` when the server has a translation, `name` otherwise
    pub fn localized_name(&self, locale: &str) -> Option<&str> {
        self.localized("name", locale)
            .or(self.name.as_deref().filter(|n| !n.is_empty()))
    }

    pub fn localized_short_description(&self, locale: &str) -> Option<&str> {
        self.localized("short_description", locale).or_else(|| {
            self.fields
                .get("short_description")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
    }

    fn localized(&self, field: &str, locale: &str) -> Option<&str> {
        let language = locale.split(['-', '_']).next().unwrap_or(locale).to_ascii_lowercase();
        self.fields
            .get(&format!("{}_{}", field, language))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

impl Identified for CatalogItem {
    fn uuid(&self) -> &str {
        &self.uuid
    }
}
