//! crates/recletters_core/src/endpoint.rs
//!
//! Typed identifiers for remote collection views. Readers and invalidators
//! agree on a view by deriving the same `EndpointKey`.

use crate::authz::has_role;
use crate::domain::roles::{ROLE_ADMIN, ROLE_PROFESSOR};
use crate::domain::CurrentUser;
use crate::route::Route;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    RecommendationRequests,
    RequestTypes,
    Users,
    Professors,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::RecommendationRequests => "recommendationrequests",
            Collection::RequestTypes => "requesttypes",
            Collection::Users => "users",
            Collection::Professors => "professors",
        }
    }
}

/// Which slice of a collection a view reads. Requester and professor scopes
/// are resolved server-side from the session, so they carry no user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    All,
    Admin,
    Requester,
    Professor,
    Id(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointKey {
    pub collection: Collection,
    pub scope: Scope,
}

impl EndpointKey {
    pub const fn new(collection: Collection, scope: Scope) -> Self {
        Self { collection, scope }
    }

    /// Whether the rows behind this key could include record `id` of `collection`.
    pub fn may_contain(&self, collection: Collection, id: i64) -> bool {
        if self.collection != collection {
            return false;
        }
        match self.scope {
            Scope::Id(own) => own == id,
            Scope::All | Scope::Admin | Scope::Requester | Scope::Professor => true,
        }
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let collection = self.collection.as_str();
        match self.scope {
            Scope::All => write!(f, "{collection}/all"),
            Scope::Admin => write!(f, "{collection}/admin/all"),
            Scope::Requester => write!(f, "{collection}/requester/all"),
            Scope::Professor => write!(f, "{collection}/professor/all"),
            Scope::Id(id) => write!(f, "{collection}?id={id}"),
        }
    }
}

//=========================================================================================
// Derivation
//=========================================================================================

/// How the viewer relates to the rows of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleCategory {
    Admin,
    Professor,
    Requester,
    Anonymous,
}

impl RoleCategory {
    /// Admins only read as admins on admin pages; elsewhere they see the
    /// requests they are party to like anyone else.
    pub fn resolve(user: Option<&CurrentUser>, route: &Route) -> Self {
        let logged_in = user.is_some_and(|u| u.logged_in);
        if !logged_in {
            RoleCategory::Anonymous
        } else if route.is_admin_route() && has_role(user, ROLE_ADMIN) {
            RoleCategory::Admin
        } else if has_role(user, ROLE_PROFESSOR) {
            RoleCategory::Professor
        } else {
            RoleCategory::Requester
        }
    }
}

/// The key a page reads, as a pure function of the page and the viewer's
/// category. `None` when the page reads no list for that category.
pub fn derive_endpoint_key(route: &Route, category: RoleCategory) -> Option<EndpointKey> {
    use Collection::*;

    let key = match (route, category) {
        (_, RoleCategory::Anonymous) => return None,
        (Route::PendingRequests | Route::CompletedRequests | Route::Profile, RoleCategory::Professor) => {
            EndpointKey::new(RecommendationRequests, Scope::Professor)
        }
        (Route::PendingRequests | Route::CompletedRequests | Route::Profile, _) => {
            EndpointKey::new(RecommendationRequests, Scope::Requester)
        }
        (Route::AdminRequests, RoleCategory::Admin) => EndpointKey::new(RecommendationRequests, Scope::Admin),
        (Route::AdminUsers, RoleCategory::Admin) => EndpointKey::new(Users, Scope::Admin),
        (Route::RequestEdit(id), _) => EndpointKey::new(RecommendationRequests, Scope::Id(*id)),
        (Route::RequestTypes, _) => EndpointKey::new(RequestTypes, Scope::All),
        (Route::RequestTypeEdit(id), _) => EndpointKey::new(RequestTypes, Scope::Id(*id)),
        (Route::RequestCreate, _) => EndpointKey::new(Professors, Scope::All),
        _ => return None,
    };
    Some(key)
}

/// Convenience for callers holding a user and a route.
pub fn endpoint_key_for(user: Option<&CurrentUser>, route: &Route) -> Option<EndpointKey> {
    derive_endpoint_key(route, RoleCategory::resolve(user, route))
}
