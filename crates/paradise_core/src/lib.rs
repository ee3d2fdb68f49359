pub mod auth_errors;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod entities;
pub mod error;
pub mod itineraries;
pub mod operations;
pub mod pagination;
pub mod ports;
pub mod routes;
pub mod use_cases;

#[cfg(test)]
mod test_support;

pub use error::Error;
