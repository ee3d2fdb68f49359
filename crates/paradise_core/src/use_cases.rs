mod catalog;
mod client;
mod itineraries;
mod pipeline;
mod session;

pub use catalog::CatalogUseCase;
pub use client::{FetchPolicy, GraphqlClient, QueryResult, ResultSource};
pub use itineraries::ItinerariesUseCase;
pub use pipeline::AuthenticatedPipeline;
pub use session::SessionUseCase;
