//! Recognising "your session is gone" errors.
//!
//! The backend reports expired or invalid sessions inside the GraphQL
//! `errors` array, not through HTTP status codes. Detection is a substring
//! match on the message and on the reason marker, with markers taken from
//! [`AuthSettings`].

use crate::config::AuthSettings;
use crate::entities::GraphqlError;
use crate::ports::AuthErrorPredicate;

/// Substring matcher over `message` and `reason`
#[derive(Debug, Clone)]
pub struct MarkerAuthErrors {
    message_markers: Vec<String>,
    reason_markers: Vec<String>,
}

impl MarkerAuthErrors {
    pub fn new(message_markers: Vec<String>, reason_markers: Vec<String>) -> Self {
        Self {
            message_markers,
            reason_markers,
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(
            settings.message_markers.clone(),
            settings.reason_markers.clone(),
        )
    }
}

impl Default for MarkerAuthErrors {
    fn default() -> Self {
        Self::from_settings(&AuthSettings::default())
    }
}

impl AuthErrorPredicate for MarkerAuthErrors {
    fn is_auth_error(&self, error: &GraphqlError) -> bool {
        let message_hit = self
            .message_markers
            .iter()
            .any(|marker| error.message.contains(marker.as_str()));

        message_hit
            || error.reason().is_some_and(|reason| {
                self.reason_markers
                    .iter()
                    .any(|marker| reason.contains(marker.as_str()))
            })
    }
}
