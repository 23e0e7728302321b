//! crates/recletters_core/src/route.rs
//!
//! Typed identities for the pages the routing collaborator can be on.

/// A page of the application, resolved from the current path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Profile,
    PendingRequests,
    CompletedRequests,
    AdminRequests,
    AdminUsers,
    RequestTypes,
    RequestTypeCreate,
    RequestTypeEdit(i64),
    RequestCreate,
    RequestEdit(i64),
    NotFound,
}

impl Route {
    /// Resolves a path such as `/requests/edit/12`. Query strings and
    /// trailing slashes are ignored.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["profile"] => Route::Profile,
            ["requests", "pending"] => Route::PendingRequests,
            ["requests", "completed"] => Route::CompletedRequests,
            ["requests", "create"] => Route::RequestCreate,
            ["requests", "edit", id] => parse_id(id).map_or(Route::NotFound, Route::RequestEdit),
            ["admin", "requests"] => Route::AdminRequests,
            ["admin", "users"] => Route::AdminUsers,
            ["requesttypes"] => Route::RequestTypes,
            ["requesttypes", "create"] => Route::RequestTypeCreate,
            ["requesttypes", "edit", id] => {
                parse_id(id).map_or(Route::NotFound, Route::RequestTypeEdit)
            }
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::PendingRequests => "/requests/pending".to_string(),
            Route::CompletedRequests => "/requests/completed".to_string(),
            Route::RequestCreate => "/requests/create".to_string(),
            Route::RequestEdit(id) => format!("/requests/edit/{id}"),
            Route::AdminRequests => "/admin/requests".to_string(),
            Route::AdminUsers => "/admin/users".to_string(),
            Route::RequestTypes => "/requesttypes".to_string(),
            Route::RequestTypeCreate => "/requesttypes/create".to_string(),
            Route::RequestTypeEdit(id) => format!("/requesttypes/edit/{id}"),
            Route::NotFound => "/not-found".to_string(),
        }
    }

    pub fn is_admin_route(&self) -> bool {
        matches!(self, Route::AdminRequests | Route::AdminUsers)
    }
}

/// Where the routing collaborator should go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Path(String),
    /// Relative move through history, e.g. `-1` for back.
    Back(i32),
}

impl Destination {
    /// One step back, to the page the form was opened from.
    pub fn back() -> Self {
        Destination::Back(-1)
    }
}

impl From<Route> for Destination {
    fn from(route: Route) -> Self {
        Destination::Path(route.path())
    }
}

fn parse_id(segment: &str) -> Option<i64> {
    segment.parse::<i64>().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_paths_resolve_and_render_back() {
        let routes = [
            Route::Home,
            Route::Profile,
            Route::PendingRequests,
            Route::CompletedRequests,
            Route::RequestCreate,
            Route::RequestEdit(12),
            Route::AdminRequests,
            Route::AdminUsers,
            Route::RequestTypes,
            Route::RequestTypeCreate,
            Route::RequestTypeEdit(3),
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn query_strings_and_trailing_slashes_are_ignored() {
        assert_eq!(Route::parse("/requests/pending/"), Route::PendingRequests);
        assert_eq!(Route::parse("/profile?tab=requests"), Route::Profile);
        assert_eq!(Route::parse(""), Route::Home);
    }

    #[test]
    fn malformed_ids_do_not_resolve() {
        assert_eq!(Route::parse("/requests/edit/abc"), Route::NotFound);
        assert_eq!(Route::parse("/requesttypes/edit/0"), Route::NotFound);
        assert_eq!(Route::parse("/nowhere"), Route::NotFound);
    }
}
