use thiserror::Error;

use crate::entities::GraphqlError;

fn join_messages(errors: &[GraphqlError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum Error {
    /// The request never reached the server or no usable response came back.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a GraphQL `errors` array.
    #[error("graphql error: {}", join_messages(.0))]
    GraphQl(Vec<GraphqlError>),

    #[error("invalid response from server: {0}")]
    InvalidServerResponse(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("credential storage error: {0}")]
    CredentialStorage(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// GraphQL error entries carried by this error, if any
    pub fn graphql_errors(&self) -> &[GraphqlError] {
        match self {
            Error::GraphQl(errors) => errors,
            _ => &[],
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
