//! services/client/src/adapters/navigation.rs
//!
//! An in-memory history stack implementing the `NavigationService` port.

use recletters_core::ports::NavigationService;
use recletters_core::route::Destination;
use std::sync::Mutex;
use tracing::debug;

pub struct HistoryNavigator {
    history: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(vec![start.into()]),
        }
    }

    /// Every path visited so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl NavigationService for HistoryNavigator {
    fn current_path(&self) -> String {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.last().cloned().unwrap_or_else(|| "/".to_string())
    }

    fn navigate(&self, destination: Destination) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        match destination {
            Destination::Path(path) => history.push(path),
            Destination::Back(delta) if delta < 0 => {
                // The starting page always stays on the stack.
                let keep = history.len().saturating_sub(delta.unsigned_abs() as usize).max(1);
                history.truncate(keep);
            }
            Destination::Back(_) => {}
        }
        debug!(path = ?history.last(), "Navigated");
    }
}
