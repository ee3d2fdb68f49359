use std::sync::Mutex;

use paradise_core::ports::Navigator;
use tracing::info;

/// Headless navigator: keeps the visited routes and logs each redirect.
///
/// Front ends without a router (the CLI, background jobs) use this and read
/// [`HistoryNavigator::last`] to tell the user where to go next.
#[derive(Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    pub fn last(&self) -> Option<String> {
        self.history().pop()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, route: &str) {
        info!(route, "navigating");
        match self.history.lock() {
            Ok(mut history) => history.push(route.to_string()),
            Err(e) => e.into_inner().push(route.to_string()),
        }
    }
}
