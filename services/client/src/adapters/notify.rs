//! services/client/src/adapters/notify.rs
//!
//! `tracing`-backed implementations of the notification and operational log
//! ports. Toasts go out on the `toast` target so a subscriber can route them
//! to the terminal separately from diagnostics.

use recletters_core::ports::{NotificationService, OperationalLog};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationService for TracingNotifier {
    fn notify(&self, message: &str) {
        info!(target: "toast", "{}", message);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl OperationalLog for TracingLog {
    fn log_error(&self, message: &str, context: &str) {
        error!(target: "ops", context, "{}", message);
    }
}
