use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:4000/graphql";
pub const LOGIN_ROUTE: &str = "/login";
pub const HOME_ROUTE: &str = "/";

/// 20 years: tokens are remembered until explicit logout
pub const DEFAULT_TOKEN_EXPIRY_DAYS: u32 = 365 * 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub graphql: GraphqlSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub routes: RouteSettings,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct GraphqlSettings {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl GraphqlSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Auth failure signature and redirect targets
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AuthSettings {
    /// Substrings of `errors[].message` that mean the session is gone
    pub message_markers: Vec<String>,
    /// Substrings of `errors[].reason` that mean the session is gone
    pub reason_markers: Vec<String>,
    pub login_route: String,
    pub home_route: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub token_key: String,
    pub refresh_token_key: String,
    pub expiry_days: u32,
    /// Directory for the file backend; platform data dir when unset
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheSettings {
    pub max_entries: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RouteSettings {
    pub protected: Vec<String>,
    pub guest_only: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            graphql: GraphqlSettings::default(),
            auth: AuthSettings::default(),
            storage: StorageSettings::default(),
            cache: CacheSettings::default(),
            routes: RouteSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for GraphqlSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            message_markers: vec![
                "Unauthenticated".to_string(),
                "The token has expired".to_string(),
            ],
            reason_markers: vec!["authentication_error".to_string()],
            login_route: LOGIN_ROUTE.to_string(),
            home_route: HOME_ROUTE.to_string(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            token_key: "apollo-token".to_string(),
            refresh_token_key: "apollo-token-refresh".to_string(),
            expiry_days: DEFAULT_TOKEN_EXPIRY_DAYS,
            path: None,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { max_entries: 500 }
    }
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            protected: [
                "/account",
                "/my-membership",
                "/your-itineraries",
                "/your-purchases",
                "/reservations",
                "/nft-wallet",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            guest_only: vec!["/login".to_string(), "/register".to_string()],
        }
    }
}
