//! crates/recletters_core/src/authz.rs
//!
//! Role checks and the visibility predicates built on them.
//!
//! Every affordance (route, menu entry, table column) declares its own
//! required roles. Holding `ROLE_ADMIN` grants nothing beyond the affordances
//! that name `ROLE_ADMIN` explicitly.

use crate::domain::roles::{ROLE_ADMIN, ROLE_PROFESSOR, ROLE_USER};
use crate::domain::CurrentUser;
use crate::route::Route;

/// Raised when the caller is not allowed to perform an action. Always
/// produced before any request reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("Not permitted to {0}")]
    Forbidden(String),
}

/// An explicit list of acceptable role tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSet<'a>(Vec<&'a str>);

impl<'a> RoleSet<'a> {
    pub fn any_of<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self(roles.into_iter().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &&'a str> {
        self.0.iter()
    }
}

impl<'a> From<&'a str> for RoleSet<'a> {
    fn from(role: &'a str) -> Self {
        Self(vec![role])
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for RoleSet<'a> {
    fn from(roles: [&'a str; N]) -> Self {
        Self(roles.to_vec())
    }
}

/// True iff `user` is present, logged in, and holds `role`.
pub fn has_role(user: Option<&CurrentUser>, role: &str) -> bool {
    match user {
        Some(user) if user.logged_in => user.roles.contains(role),
        _ => false,
    }
}

/// True iff the user holds at least one of `roles`. An empty set never matches.
pub fn has_any_role<'a>(user: Option<&CurrentUser>, roles: impl Into<RoleSet<'a>>) -> bool {
    roles.into().iter().any(|role| has_role(user, role))
}

pub fn is_logged_in(user: Option<&CurrentUser>) -> bool {
    user.is_some_and(|u| u.logged_in)
}

//=========================================================================================
// Route Guards
//=========================================================================================

/// Whether the page at `route` may be shown to `user`.
pub fn can_visit(user: Option<&CurrentUser>, route: &Route) -> bool {
    match route {
        Route::Home | Route::NotFound => true,
        Route::Profile => is_logged_in(user),
        Route::PendingRequests | Route::CompletedRequests => has_role(user, ROLE_USER),
        Route::RequestCreate | Route::RequestEdit(_) => has_role(user, ROLE_USER),
        Route::RequestTypes => has_role(user, ROLE_USER),
        Route::RequestTypeCreate | Route::RequestTypeEdit(_) => has_role(user, ROLE_ADMIN),
        Route::AdminRequests | Route::AdminUsers => has_role(user, ROLE_ADMIN),
    }
}

//=========================================================================================
// Navigation Menu
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub route: Route,
}

/// The navigation entries shown to `user`, in display order.
pub fn navigation_menu(user: Option<&CurrentUser>) -> Vec<NavItem> {
    let mut items = Vec::new();

    if has_role(user, ROLE_ADMIN) {
        items.push(NavItem { label: "Users", route: Route::AdminUsers });
        items.push(NavItem { label: "All Requests", route: Route::AdminRequests });
    }
    if has_role(user, ROLE_USER) {
        items.push(NavItem { label: "Pending Requests", route: Route::PendingRequests });
        items.push(NavItem { label: "Completed Requests", route: Route::CompletedRequests });
        items.push(NavItem { label: "Request Types", route: Route::RequestTypes });
    }
    // Professors answer requests; they do not file them.
    if has_role(user, ROLE_USER) && !has_role(user, ROLE_PROFESSOR) {
        items.push(NavItem { label: "New Request", route: Route::RequestCreate });
    }
    if is_logged_in(user) {
        items.push(NavItem { label: "Profile", route: Route::Profile });
    }

    items
}

//=========================================================================================
// Table Affordances
//=========================================================================================

/// Which per-row controls a table renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableAffordances {
    pub show_edit: bool,
    pub show_delete: bool,
    pub show_status_actions: bool,
}

/// Controls of the recommendation request table on `route`.
pub fn request_table_affordances(user: Option<&CurrentUser>, route: &Route) -> TableAffordances {
    match route {
        Route::AdminRequests => TableAffordances {
            show_edit: false,
            show_delete: has_role(user, ROLE_ADMIN),
            show_status_actions: false,
        },
        Route::PendingRequests | Route::Profile => TableAffordances {
            show_edit: has_role(user, ROLE_USER) && !has_role(user, ROLE_PROFESSOR),
            show_delete: has_any_role(user, [ROLE_ADMIN, ROLE_USER]),
            show_status_actions: has_role(user, ROLE_PROFESSOR) && *route == Route::PendingRequests,
        },
        Route::CompletedRequests => TableAffordances {
            show_edit: false,
            show_delete: has_any_role(user, [ROLE_ADMIN, ROLE_PROFESSOR]),
            show_status_actions: false,
        },
        _ => TableAffordances::default(),
    }
}

/// Controls of the request type table.
pub fn request_type_table_affordances(user: Option<&CurrentUser>) -> TableAffordances {
    TableAffordances {
        show_edit: has_role(user, ROLE_ADMIN),
        show_delete: has_role(user, ROLE_ADMIN),
        show_status_actions: false,
    }
}
