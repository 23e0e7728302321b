//! crates/recletters_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the REST backend, the session source and the UI shell.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{CurrentUser, Listing};
use crate::endpoint::EndpointKey;
use crate::mutation::MutationPlan;
use crate::route::Destination;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    /// A 404. `message` is the server's own wording, when it sent one.
    #[error("Item not found")]
    NotFound { message: Option<String> },
    /// A 401 or 403: the session may not read or write this.
    #[error("Unauthorized")]
    Unauthorized { message: Option<String> },
    /// Any other non-2xx answer. `message` is the human-readable text of the
    /// error payload, when the server sent one.
    #[error("Remote call failed with status {status}")]
    Remote { status: u16, message: Option<String> },
    #[error("Request timed out")]
    Timeout,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// The line to show the user: the server's own message when present,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        let message = match self {
            PortError::NotFound { message }
            | PortError::Unauthorized { message }
            | PortError::Remote { message, .. } => message.as_deref(),
            PortError::Timeout | PortError::Unexpected(_) => None,
        };
        match message {
            Some(message) if !message.trim().is_empty() => message.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// What the server answered to a confirmed mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationReceipt {
    /// Id of the created or updated record, when the answer carries one.
    pub id: Option<i64>,
    /// Human-readable confirmation text, when the answer carries one.
    pub message: Option<String>,
    pub body: Value,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait RemoteCollectionService: Send + Sync {
    /// Reads the rows behind `key`.
    async fn fetch(&self, key: &EndpointKey) -> PortResult<Listing>;

    /// Issues a single planned write.
    async fn execute(&self, plan: &MutationPlan) -> PortResult<MutationReceipt>;
}

#[async_trait]
pub trait SessionService: Send + Sync {
    /// The user behind the current session; `CurrentUser::anonymous()` when
    /// there is none.
    async fn current_user(&self) -> PortResult<CurrentUser>;

    async fn logout(&self) -> PortResult<()>;
}

/// The user-visible toast channel.
pub trait NotificationService: Send + Sync {
    fn notify(&self, message: &str);
}

/// The operational log channel.
pub trait OperationalLog: Send + Sync {
    fn log_error(&self, message: &str, context: &str);
}

pub trait NavigationService: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate(&self, destination: Destination);
}
