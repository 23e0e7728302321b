//! crates/recletters_core/src/mutation.rs
//!
//! Turns a user-initiated write into the exact remote call that performs it.
//!
//! Planning is where client-side authorization happens: a plan is only
//! produced for a caller allowed to issue it, so a refused mutation never
//! reaches the network.

use crate::authz::{has_role, is_logged_in, AuthzError};
use crate::domain::roles::{ROLE_ADMIN, ROLE_PROFESSOR, ROLE_USER};
use crate::domain::{CurrentUser, RecommendationRequest};
use crate::endpoint::Collection;
use crate::route::{Destination, Route};
use crate::transitions::{transition, StatusAction, TransitionError};
use chrono::NaiveDateTime;
use serde_json::{json, Map, Value};

/// Timestamp layout used in query parameters and bodies.
pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

//=========================================================================================
// Ownership Routing
//=========================================================================================

/// Which ownership-scoped endpoint variant a write on a request goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnershipScope {
    Admin,
    Requester,
    Professor,
}

/// Resolves the caller's relationship to `request`.
///
/// The admin check comes first: an admin whose id happens to match the
/// requester or professor still goes through the admin endpoint.
pub fn route_ownership(
    user: Option<&CurrentUser>,
    request: &RecommendationRequest,
) -> Result<OwnershipScope, AuthzError> {
    if has_role(user, ROLE_ADMIN) {
        return Ok(OwnershipScope::Admin);
    }
    let caller = user.and_then(CurrentUser::id).ok_or(AuthzError::NotLoggedIn)?;
    if request.requester.id == caller {
        Ok(OwnershipScope::Requester)
    } else if request.professor.id == caller {
        Ok(OwnershipScope::Professor)
    } else {
        Err(AuthzError::Forbidden(format!(
            "access recommendation request {}",
            request.id
        )))
    }
}

/// The endpoint a delete of `request` must go to.
pub fn route_delete(
    user: Option<&CurrentUser>,
    request: &RecommendationRequest,
) -> Result<OwnershipScope, AuthzError> {
    route_ownership(user, request)
}

//=========================================================================================
// Mutations
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecommendationRequest {
    pub professor_id: i64,
    pub recommendation_type: String,
    pub details: String,
    pub due_date: NaiveDateTime,
}

/// Fields changed by an edit form. `None` means unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestChanges {
    pub professor_id: Option<i64>,
    pub recommendation_type: Option<String>,
    pub details: Option<String>,
    pub due_date: Option<NaiveDateTime>,
}

impl RequestChanges {
    pub fn is_empty(&self) -> bool {
        self.professor_id.is_none()
            && self.recommendation_type.is_none()
            && self.details.is_none()
            && self.due_date.is_none()
    }

    fn to_body(&self) -> Value {
        let mut body = Map::new();
        if let Some(id) = self.professor_id {
            body.insert("professorId".to_string(), json!(id));
        }
        if let Some(kind) = &self.recommendation_type {
            body.insert("recommendationType".to_string(), json!(kind));
        }
        if let Some(details) = &self.details {
            body.insert("details".to_string(), json!(details));
        }
        if let Some(due) = &self.due_date {
            body.insert("dueDate".to_string(), json!(due.format(WIRE_DATE_FORMAT).to_string()));
        }
        Value::Object(body)
    }
}

/// Every write the client can issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateRequestType { request_type: String },
    UpdateRequestType { id: i64, request_type: String },
    DeleteRequestType { id: i64 },
    CreateRecommendationRequest(NewRecommendationRequest),
    UpdateRecommendationRequest {
        request: RecommendationRequest,
        changes: RequestChanges,
    },
    DeleteRecommendationRequest(RecommendationRequest),
    TransitionStatus {
        request: RecommendationRequest,
        action: StatusAction,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
    TransitionStatus,
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::CreateRequestType { .. } | Mutation::CreateRecommendationRequest(_) => MutationKind::Create,
            Mutation::UpdateRequestType { .. } | Mutation::UpdateRecommendationRequest { .. } => MutationKind::Update,
            Mutation::DeleteRequestType { .. } | Mutation::DeleteRecommendationRequest(_) => MutationKind::Delete,
            Mutation::TransitionStatus { .. } => MutationKind::TransitionStatus,
        }
    }
}

//=========================================================================================
// Plans
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Post,
    Put,
    Delete,
}

/// The remote endpoint a plan is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationTarget {
    NewRequestType,
    RequestTypes,
    NewRecommendationRequest,
    RecommendationRequests(OwnershipScope),
}

/// The records a mutation may have changed. `id` is `None` for creates,
/// whose id is only known once the server answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affected {
    pub collection: Collection,
    pub id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MutationPlan {
    pub kind: MutationKind,
    pub verb: Verb,
    pub target: MutationTarget,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
    pub affected: Affected,
    /// Where to go once the server confirms.
    pub destination: Option<Destination>,
    /// Default one-line confirmation when the server sends no message.
    pub confirmation: String,
    /// Default one-line failure message when the server sends no message.
    pub failure: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Authz(#[from] AuthzError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("Invalid mutation: {0}")]
    Invalid(String),
}

/// Computes the wire parameters for `mutation` on behalf of `user`.
pub fn plan(user: Option<&CurrentUser>, mutation: &Mutation) -> Result<MutationPlan, PlanError> {
    let kind = mutation.kind();
    match mutation {
        Mutation::CreateRequestType { request_type } => {
            require_admin(user, "create request types")?;
            let request_type = non_blank(request_type, "request type")?;
            Ok(MutationPlan {
                kind,
                verb: Verb::Post,
                target: MutationTarget::NewRequestType,
                query: vec![("requestType", request_type)],
                body: None,
                affected: Affected { collection: Collection::RequestTypes, id: None },
                destination: Some(Route::RequestTypes.into()),
                confirmation: "Request type created".to_string(),
                failure: "Failed to create request type".to_string(),
            })
        }
        Mutation::UpdateRequestType { id, request_type } => {
            require_admin(user, "edit request types")?;
            let request_type = non_blank(request_type, "request type")?;
            Ok(MutationPlan {
                kind,
                verb: Verb::Put,
                target: MutationTarget::RequestTypes,
                query: vec![("id", id.to_string())],
                body: Some(json!({ "requestType": request_type })),
                affected: Affected { collection: Collection::RequestTypes, id: Some(*id) },
                destination: Some(Destination::back()),
                confirmation: format!("Request type {id} updated"),
                failure: format!("Failed to update request type {id}"),
            })
        }
        Mutation::DeleteRequestType { id } => {
            require_admin(user, "delete request types")?;
            Ok(MutationPlan {
                kind,
                verb: Verb::Delete,
                target: MutationTarget::RequestTypes,
                query: vec![("id", id.to_string())],
                body: None,
                affected: Affected { collection: Collection::RequestTypes, id: Some(*id) },
                destination: None,
                confirmation: format!("Request type {id} deleted"),
                failure: format!("Failed to delete request type {id}"),
            })
        }
        Mutation::CreateRecommendationRequest(new) => {
            if !is_logged_in(user) {
                return Err(AuthzError::NotLoggedIn.into());
            }
            if !has_role(user, ROLE_USER) {
                return Err(AuthzError::Forbidden("create recommendation requests".to_string()).into());
            }
            let recommendation_type = non_blank(&new.recommendation_type, "recommendation type")?;
            Ok(MutationPlan {
                kind,
                verb: Verb::Post,
                target: MutationTarget::NewRecommendationRequest,
                query: vec![
                    ("professorId", new.professor_id.to_string()),
                    ("recommendationType", recommendation_type),
                    ("details", new.details.clone()),
                    ("dueDate", new.due_date.format(WIRE_DATE_FORMAT).to_string()),
                ],
                body: None,
                affected: Affected { collection: Collection::RecommendationRequests, id: None },
                destination: Some(Route::PendingRequests.into()),
                confirmation: "Recommendation request created".to_string(),
                failure: "Failed to create recommendation request".to_string(),
            })
        }
        Mutation::UpdateRecommendationRequest { request, changes } => {
            let scope = route_ownership(user, request)?;
            if scope == OwnershipScope::Professor {
                return Err(AuthzError::Forbidden(format!("edit recommendation request {}", request.id)).into());
            }
            if changes.is_empty() {
                return Err(PlanError::Invalid("no fields changed".to_string()));
            }
            Ok(MutationPlan {
                kind,
                verb: Verb::Put,
                target: MutationTarget::RecommendationRequests(scope),
                query: vec![("id", request.id.to_string())],
                body: Some(changes.to_body()),
                affected: Affected { collection: Collection::RecommendationRequests, id: Some(request.id) },
                destination: Some(Destination::back()),
                confirmation: format!("Recommendation request {} updated", request.id),
                failure: format!("Failed to update recommendation request {}", request.id),
            })
        }
        Mutation::DeleteRecommendationRequest(request) => {
            let scope = route_delete(user, request)?;
            Ok(MutationPlan {
                kind,
                verb: Verb::Delete,
                target: MutationTarget::RecommendationRequests(scope),
                query: vec![("id", request.id.to_string())],
                body: None,
                affected: Affected { collection: Collection::RecommendationRequests, id: Some(request.id) },
                destination: None,
                confirmation: format!("Recommendation request {} deleted", request.id),
                failure: format!("Failed to delete recommendation request {}", request.id),
            })
        }
        Mutation::TransitionStatus { request, action } => {
            if !has_role(user, ROLE_PROFESSOR) || user.and_then(CurrentUser::id) != Some(request.professor.id) {
                return Err(AuthzError::Forbidden(format!("{action} recommendation request {}", request.id)).into());
            }
            let status = transition(request.status, *action)?;
            Ok(MutationPlan {
                kind,
                verb: Verb::Put,
                target: MutationTarget::RecommendationRequests(OwnershipScope::Professor),
                query: vec![("id", request.id.to_string())],
                body: Some(json!({ "status": status.as_str() })),
                affected: Affected { collection: Collection::RecommendationRequests, id: Some(request.id) },
                destination: None,
                confirmation: format!("Recommendation request {} is now {}", request.id, status),
                failure: format!("Failed to {action} recommendation request {}", request.id),
            })
        }
    }
}

fn require_admin(user: Option<&CurrentUser>, action: &str) -> Result<(), AuthzError> {
    if !is_logged_in(user) {
        return Err(AuthzError::NotLoggedIn);
    }
    if !has_role(user, ROLE_ADMIN) {
        return Err(AuthzError::Forbidden(action.to_string()));
    }
    Ok(())
}

fn non_blank(value: &str, field: &str) -> Result<String, PlanError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PlanError::Invalid(format!("{field} must not be blank")));
    }
    Ok(trimmed.to_string())
}
