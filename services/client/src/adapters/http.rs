//! services/client/src/adapters/http.rs
//!
//! This module contains the REST adapter, which is the concrete implementation
//! of the `RemoteCollectionService` and `SessionService` ports from the `core`
//! crate. It handles all interactions with the backend using `reqwest`.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use recletters_core::domain::{
    CurrentUser, Listing, Profile, RecommendationRequest, RequestStatus, RequestType, UserRef,
    UserSummary,
};
use recletters_core::endpoint::{Collection, EndpointKey, Scope};
use recletters_core::mutation::{MutationPlan, MutationTarget, OwnershipScope, Verb};
use recletters_core::ports::{
    MutationReceipt, PortError, PortResult, RemoteCollectionService, SessionService,
};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::ClientError;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A REST adapter that implements the remote collection and session ports.
#[derive(Clone)]
pub struct HttpAdapter {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAdapter {
    /// Creates a new `HttpAdapter` from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| ClientError::Internal(format!("Invalid SESSION_COOKIE: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self::with_client(http, &config.backend_url))
    }

    /// Wraps an already configured `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    /// Sends a request and returns the decoded JSON body of a 2xx answer.
    async fn send(&self, builder: RequestBuilder) -> PortResult<Value> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(status_error(status, error_message(&text)));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| PortError::Unexpected(format!("Malformed response body: {}", e)))
    }
}

fn transport_error(err: reqwest::Error) -> PortError {
    if err.is_timeout() {
        PortError::Timeout
    } else {
        PortError::Unexpected(err.to_string())
    }
}

fn status_error(status: StatusCode, message: Option<String>) -> PortError {
    match status {
        StatusCode::NOT_FOUND => PortError::NotFound { message },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized { message },
        _ => PortError::Remote { status: status.as_u16(), message },
    }
}

/// Pulls the `message` field out of an error payload, if there is one.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
}

fn decode<T: DeserializeOwned>(value: Value) -> PortResult<T> {
    serde_json::from_value(value)
        .map_err(|e| PortError::Unexpected(format!("Unexpected response shape: {}", e)))
}

//=========================================================================================
// Paths
//=========================================================================================

const REQUESTS: &str = "/api/recommendationrequest";
const REQUEST_TYPES: &str = "/api/requesttypes";

/// The GET path and query of a collection view.
fn read_path(key: &EndpointKey) -> PortResult<(String, Option<i64>)> {
    let path = match (key.collection, key.scope) {
        (Collection::RecommendationRequests, Scope::Requester) => format!("{REQUESTS}/requester/all"),
        (Collection::RecommendationRequests, Scope::Professor) => format!("{REQUESTS}/professor/all"),
        (Collection::RecommendationRequests, Scope::Admin | Scope::All) => format!("{REQUESTS}/admin/all"),
        (Collection::RecommendationRequests, Scope::Id(id)) => return Ok((REQUESTS.to_string(), Some(id))),
        (Collection::RequestTypes, Scope::Id(id)) => return Ok((REQUEST_TYPES.to_string(), Some(id))),
        (Collection::RequestTypes, _) => format!("{REQUEST_TYPES}/all"),
        (Collection::Users, Scope::Admin | Scope::All) => "/api/admin/users".to_string(),
        (Collection::Professors, Scope::All) => "/api/users/professors".to_string(),
        _ => {
            return Err(PortError::Unexpected(format!("No endpoint serves {}", key)));
        }
    };
    Ok((path, None))
}

fn write_path(target: MutationTarget) -> String {
    match target {
        MutationTarget::NewRequestType => format!("{REQUEST_TYPES}/post"),
        MutationTarget::RequestTypes => REQUEST_TYPES.to_string(),
        MutationTarget::NewRecommendationRequest => format!("{REQUESTS}/post"),
        MutationTarget::RecommendationRequests(OwnershipScope::Admin) => format!("{REQUESTS}/admin"),
        MutationTarget::RecommendationRequests(OwnershipScope::Requester) => format!("{REQUESTS}/requester"),
        MutationTarget::RecommendationRequests(OwnershipScope::Professor) => format!("{REQUESTS}/professor"),
    }
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRefRecord {
    id: i64,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    email: String,
}
impl UserRefRecord {
    fn to_domain(self) -> UserRef {
        UserRef {
            id: self.id,
            full_name: self.full_name,
            email: self.email,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationRequestRecord {
    id: i64,
    requester: UserRefRecord,
    professor: UserRefRecord,
    recommendation_type: String,
    #[serde(default)]
    details: String,
    status: String,
    submission_date: NaiveDateTime,
    last_modified_date: NaiveDateTime,
    completion_date: Option<NaiveDateTime>,
    due_date: NaiveDateTime,
}
impl RecommendationRequestRecord {
    fn to_domain(self) -> PortResult<RecommendationRequest> {
        let status = self
            .status
            .parse::<RequestStatus>()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(RecommendationRequest {
            id: self.id,
            requester: self.requester.to_domain(),
            professor: self.professor.to_domain(),
            recommendation_type: self.recommendation_type,
            details: self.details,
            status,
            submission_date: self.submission_date,
            last_modified_date: self.last_modified_date,
            completion_date: self.completion_date,
            due_date: self.due_date,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestTypeRecord {
    id: i64,
    request_type: String,
}
impl RequestTypeRecord {
    fn to_domain(self) -> RequestType {
        RequestType {
            id: self.id,
            request_type: self.request_type,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    id: i64,
    email: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    admin: bool,
    #[serde(default)]
    professor: bool,
    #[serde(default)]
    student: bool,
}
impl UserRecord {
    fn to_domain(self) -> UserSummary {
        UserSummary {
            id: self.id,
            email: self.email,
            full_name: self.full_name,
            admin: self.admin,
            professor: self.professor,
            student: self.student,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRecord {
    id: i64,
    email: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    given_name: String,
    #[serde(default)]
    family_name: String,
    picture_url: Option<String>,
}

#[derive(Deserialize)]
struct AuthorityRecord {
    authority: String,
}

#[derive(Deserialize)]
struct CurrentUserRecord {
    user: ProfileRecord,
    #[serde(default)]
    roles: Vec<AuthorityRecord>,
}
impl CurrentUserRecord {
    fn to_domain(self) -> CurrentUser {
        let profile = Profile {
            id: self.user.id,
            email: self.user.email,
            full_name: self.user.full_name,
            given_name: self.user.given_name,
            family_name: self.user.family_name,
            picture_url: self.user.picture_url,
        };
        CurrentUser::signed_in(profile, self.roles.into_iter().map(|r| r.authority))
    }
}

/// A list endpoint answers with an array; a by-id endpoint with one object.
fn rows<T: DeserializeOwned>(value: Value) -> PortResult<Vec<T>> {
    match value {
        Value::Array(_) => decode(value),
        Value::Null => Ok(Vec::new()),
        single => Ok(vec![decode(single)?]),
    }
}

fn to_listing(collection: Collection, value: Value) -> PortResult<Listing> {
    match collection {
        Collection::RecommendationRequests => {
            let records: Vec<RecommendationRequestRecord> = rows(value)?;
            let requests = records
                .into_iter()
                .map(RecommendationRequestRecord::to_domain)
                .collect::<PortResult<Vec<_>>>()?;
            Ok(Listing::Requests(requests))
        }
        Collection::RequestTypes => {
            let records: Vec<RequestTypeRecord> = rows(value)?;
            Ok(Listing::RequestTypes(records.into_iter().map(RequestTypeRecord::to_domain).collect()))
        }
        Collection::Users | Collection::Professors => {
            let records: Vec<UserRecord> = rows(value)?;
            Ok(Listing::Users(records.into_iter().map(UserRecord::to_domain).collect()))
        }
    }
}

//=========================================================================================
// `RemoteCollectionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl RemoteCollectionService for HttpAdapter {
    #[instrument(skip(self, key), fields(key = %key))]
    async fn fetch(&self, key: &EndpointKey) -> PortResult<Listing> {
        let (path, id) = read_path(key)?;
        let mut builder = self.request(Method::GET, &path);
        if let Some(id) = id {
            builder = builder.query(&[("id", id)]);
        }
        let body = self.send(builder).await?;
        let listing = to_listing(key.collection, body)?;
        debug!(rows = listing.len(), "Fetched listing");
        Ok(listing)
    }

    #[instrument(skip(self, plan), fields(target = ?plan.target, verb = ?plan.verb))]
    async fn execute(&self, plan: &MutationPlan) -> PortResult<MutationReceipt> {
        let method = match plan.verb {
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Delete => Method::DELETE,
        };
        let mut builder = self.request(method, &write_path(plan.target)).query(&plan.query);
        if let Some(body) = &plan.body {
            builder = builder.json(body);
        }

        let body = self.send(builder).await?;
        Ok(MutationReceipt {
            id: body.get("id").and_then(Value::as_i64),
            message: body.get("message").and_then(Value::as_str).map(str::to_string),
            body,
        })
    }
}

//=========================================================================================
// `SessionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionService for HttpAdapter {
    async fn current_user(&self) -> PortResult<CurrentUser> {
        match self.send(self.request(Method::GET, "/api/currentUser")).await {
            Ok(Value::Null) => Ok(CurrentUser::anonymous()),
            Ok(body) => Ok(decode::<CurrentUserRecord>(body)?.to_domain()),
            Err(PortError::Unauthorized { .. }) => Ok(CurrentUser::anonymous()),
            Err(e) => Err(e),
        }
    }

    async fn logout(&self) -> PortResult<()> {
        self.send(self.request(Method::POST, "/logout")).await?;
        Ok(())
    }
}
