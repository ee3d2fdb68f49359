use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const ACCEPT_HEADER: &str = "Accept";
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Access/refresh token pair issued by `login` and `refreshToken`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Tokens are bearer secrets; keep them out of logs.
impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Email/password pair for the login mutation (never persisted)
#[derive(Clone)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email: String, password: String) -> Self {
        Self { email, password }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Standard GraphQL request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlRequest {
    pub query: String,
    pub variables: Value,
    #[serde(rename = "operationName", skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

fn operation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?<kind>query|mutation|subscription)\b\s*(?<name>[_A-Za-z][_0-9A-Za-z]*)?")
            .expect("invalid regex")
    })
}

impl GraphqlRequest {
    /// Build a request from a document, taking the operation name from its
    /// first named definition.
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        let operation_name = operation_regex()
            .captures(&query)
            .and_then(|c| c.name("name"))
            .map(|m| m.as_str().to_string());

        Self {
            query,
            variables: Value::Object(Map::new()),
            operation_name,
        }
    }

    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = variables;
        self
    }

    pub fn is_mutation(&self) -> bool {
        operation_regex()
            .captures(&self.query)
            .and_then(|c| c.name("kind"))
            .is_some_and(|m| m.as_str() == "mutation")
    }

    pub fn display_name(&self) -> &str {
        self.operation_name.as_deref().unwrap_or("anonymous")
    }
}

/// A request as it leaves the pipeline: body plus the headers to send with it.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub request: GraphqlRequest,
    pub headers: Vec<(String, String)>,
}

impl OutboundRequest {
    /// Authenticated requests carry only the bearer header; anonymous ones
    /// carry content negotiation headers instead.
    pub fn new(request: GraphqlRequest, access_token: Option<&str>) -> Self {
        let headers = match access_token {
            Some(token) => vec![(AUTHORIZATION_HEADER.to_string(), format!("Bearer {}", token))],
            None => vec![
                (CONTENT_TYPE_HEADER.to_string(), JSON_MEDIA_TYPE.to_string()),
                (ACCEPT_HEADER.to_string(), JSON_MEDIA_TYPE.to_string()),
            ],
        };
        Self { request, headers }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn authorization(&self) -> Option<&str> {
        self.header(AUTHORIZATION_HEADER)
    }
}

/// One entry of a GraphQL `errors` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

impl GraphqlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            reason: None,
            path: None,
            extensions: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Reason marker, either top level or under `extensions.reason`
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref().or_else(|| {
            self.extensions
                .as_ref()
                .and_then(|ext| ext.get("reason"))
                .and_then(Value::as_str)
        })
    }
}

impl fmt::Display for GraphqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason() {
            Some(reason) => write!(f, "{} ({})", self.message, reason),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Standard GraphQL response body
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,
}

impl GraphqlResponse {
    pub fn data(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn errors(errors: Vec<GraphqlError>) -> Self {
        Self { data: None, errors }
    }

    /// Any `errors` entry fails the whole operation.
    pub fn into_result(self) -> Result<Value, Error> {
        if !self.errors.is_empty() {
            return Err(Error::GraphQl(self.errors));
        }
        self.data.ok_or_else(|| {
            Error::InvalidServerResponse("response carried neither data nor errors".to_string())
        })
    }
}

/// Pull a named root field out of `data` and deserialize it.
pub fn extract_field<T>(mut data: Value, field: &str) -> Result<T, Error>
where
    T: serde::de::DeserializeOwned,
{
    let value = data
        .get_mut(field)
        .map(Value::take)
        .filter(|v| !v.is_null())
        .ok_or_else(|| Error::InvalidServerResponse(format!("missing field `{}`", field)))?;

    serde_json::from_value(value)
        .map_err(|e| Error::InvalidServerResponse(format!("malformed `{}`: {}", field, e)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
}

/// Authenticated user as returned by the `me` query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub uuid: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub phone_country: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Client-side view of the authentication state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn roles(&self) -> &[Role] {
        self.user.as_ref().map(|u| u.roles.as_slice()).unwrap_or(&[])
    }
}
