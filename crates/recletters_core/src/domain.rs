//! crates/recletters_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any HTTP client or serialization format.

use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Role tokens granted by the backend. There is no hierarchy between them:
/// a user holds exactly the tokens listed in their role set.
pub mod roles {
    pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
    pub const ROLE_USER: &str = "ROLE_USER";
    pub const ROLE_PROFESSOR: &str = "ROLE_PROFESSOR";
    pub const ROLE_STUDENT: &str = "ROLE_STUDENT";
}

//=========================================================================================
// Current User
//=========================================================================================

/// Display fields of the signed-in user. Opaque to the authorization logic
/// except for `id`, which is used for ownership checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub given_name: String,
    pub family_name: String,
    pub picture_url: Option<String>,
}

/// The user the client is acting for. Replaced wholesale on every session refetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub logged_in: bool,
    pub roles: BTreeSet<String>,
    pub profile: Option<Profile>,
}

impl CurrentUser {
    /// A visitor without a session: no roles, no profile.
    pub fn anonymous() -> Self {
        Self {
            logged_in: false,
            roles: BTreeSet::new(),
            profile: None,
        }
    }

    pub fn signed_in<I, S>(profile: Profile, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            logged_in: true,
            roles: roles.into_iter().map(Into::into).collect(),
            profile: Some(profile),
        }
    }

    /// The profile id, only when the user is actually logged in.
    pub fn id(&self) -> Option<i64> {
        if !self.logged_in {
            return None;
        }
        self.profile.as_ref().map(|p| p.id)
    }
}

//=========================================================================================
// Recommendation Requests
//=========================================================================================

/// Lifecycle status of a recommendation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequestStatus {
    Pending,
    InProgress,
    Completed,
    Denied,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::InProgress => "IN_PROGRESS",
            RequestStatus::Completed => "COMPLETED",
            RequestStatus::Denied => "DENIED",
        }
    }

    /// Completed and denied requests carry a completion date.
    pub fn is_closed(&self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Denied)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown request status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for RequestStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(RequestStatus::Pending),
            "IN_PROGRESS" => Ok(RequestStatus::InProgress),
            "COMPLETED" => Ok(RequestStatus::Completed),
            "DENIED" => Ok(RequestStatus::Denied),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Identifies the requester or professor attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: i64,
    pub full_name: String,
    pub email: String,
}

/// A recommendation request as last returned by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationRequest {
    pub id: i64,
    pub requester: UserRef,
    pub professor: UserRef,
    pub recommendation_type: String,
    pub details: String,
    pub status: RequestStatus,
    pub submission_date: NaiveDateTime,
    pub last_modified_date: NaiveDateTime,
    pub completion_date: Option<NaiveDateTime>,
    pub due_date: NaiveDateTime,
}

impl RecommendationRequest {
    /// A completion date is present exactly when the request is closed.
    pub fn is_consistent(&self) -> bool {
        self.completion_date.is_some() == self.status.is_closed()
    }
}

/// A kind of recommendation a student can ask for. Has no status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestType {
    pub id: i64,
    pub request_type: String,
}

/// A row of the admin users table, also used to pick a professor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub admin: bool,
    pub professor: bool,
    pub student: bool,
}

//=========================================================================================
// Listings
//=========================================================================================

/// The rows of one remote collection view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Requests(Vec<RecommendationRequest>),
    RequestTypes(Vec<RequestType>),
    Users(Vec<UserSummary>),
}

impl Listing {
    pub fn len(&self) -> usize {
        match self {
            Listing::Requests(rows) => rows.len(),
            Listing::RequestTypes(rows) => rows.len(),
            Listing::Users(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_id(&self, id: i64) -> bool {
        match self {
            Listing::Requests(rows) => rows.iter().any(|r| r.id == id),
            Listing::RequestTypes(rows) => rows.iter().any(|r| r.id == id),
            Listing::Users(rows) => rows.iter().any(|r| r.id == id),
        }
    }

    pub fn requests(&self) -> &[RecommendationRequest] {
        match self {
            Listing::Requests(rows) => rows,
            _ => &[],
        }
    }

    pub fn request_types(&self) -> &[RequestType] {
        match self {
            Listing::RequestTypes(rows) => rows,
            _ => &[],
        }
    }

    pub fn users(&self) -> &[UserSummary] {
        match self {
            Listing::Users(rows) => rows,
            _ => &[],
        }
    }
}
