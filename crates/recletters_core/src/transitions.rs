//! crates/recletters_core/src/transitions.rs
//!
//! The status transitions a professor can apply to a recommendation request.

use crate::domain::RequestStatus;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusAction {
    Accept,
    Deny,
    Complete,
}

impl StatusAction {
    /// The status a request ends up in after this action.
    pub fn target(&self) -> RequestStatus {
        match self {
            StatusAction::Accept => RequestStatus::InProgress,
            StatusAction::Deny => RequestStatus::Denied,
            StatusAction::Complete => RequestStatus::Completed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusAction::Accept => "accept",
            StatusAction::Deny => "deny",
            StatusAction::Complete => "complete",
        }
    }
}

impl fmt::Display for StatusAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusAction {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "accept" => Ok(StatusAction::Accept),
            "deny" => Ok(StatusAction::Deny),
            "complete" => Ok(StatusAction::Complete),
            _ => Err(TransitionError::UnknownAction(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Cannot {action} a request that is {from}")]
    NotOffered { from: RequestStatus, action: StatusAction },
    #[error("Unknown status action: {0}")]
    UnknownAction(String),
}

/// The actions offered for a request in `status`.
pub fn available_actions(status: RequestStatus) -> &'static [StatusAction] {
    match status {
        RequestStatus::Pending => &[StatusAction::Accept, StatusAction::Deny],
        RequestStatus::InProgress => &[StatusAction::Complete],
        RequestStatus::Completed | RequestStatus::Denied => &[],
    }
}

pub fn transition(from: RequestStatus, action: StatusAction) -> Result<RequestStatus, TransitionError> {
    if available_actions(from).contains(&action) {
        Ok(action.target())
    } else {
        Err(TransitionError::NotOffered { from, action })
    }
}
