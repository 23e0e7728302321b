//! services/client/src/sync/view.rs
//!
//! A page's binding to the store: which key it reads, which rows it shows and
//! which controls it offers on them.

use recletters_core::authz::{
    can_visit, request_table_affordances, request_type_table_affordances, AuthzError, TableAffordances,
};
use recletters_core::domain::{CurrentUser, RecommendationRequest, RequestType, UserSummary};
use recletters_core::endpoint::{endpoint_key_for, Collection, EndpointKey};
use recletters_core::route::Route;
use recletters_core::transitions::{available_actions, StatusAction};
use recletters_core::views::{filter_requests, StatusView};
use std::sync::Arc;

use crate::sync::store::{ListSnapshot, ListState, QueryStore, Subscription};

/// A mounted list page. Dropping it unmounts it.
pub struct ListView {
    route: Route,
    subscription: Subscription,
    affordances: TableAffordances,
}

impl ListView {
    /// Mounts the list read by `route` for `user`.
    ///
    /// Fails when the user may not visit the page or the page reads no list.
    pub async fn mount(
        store: &Arc<QueryStore>,
        user: Option<&CurrentUser>,
        route: Route,
    ) -> Result<Self, AuthzError> {
        if !can_visit(user, &route) {
            return Err(AuthzError::Forbidden(format!("view {}", route.path())));
        }
        let key = endpoint_key_for(user, &route)
            .ok_or_else(|| AuthzError::Forbidden(format!("list {}", route.path())))?;

        let affordances = match key.collection {
            Collection::RecommendationRequests => request_table_affordances(user, &route),
            Collection::RequestTypes => request_type_table_affordances(user),
            Collection::Users | Collection::Professors => TableAffordances::default(),
        };

        Ok(Self {
            route,
            subscription: store.mount(key).await,
            affordances,
        })
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn key(&self) -> EndpointKey {
        self.subscription.key()
    }

    pub fn affordances(&self) -> TableAffordances {
        self.affordances
    }

    pub fn snapshot(&self) -> ListSnapshot {
        self.subscription.snapshot()
    }

    pub fn state(&self) -> ListState {
        self.snapshot().state
    }

    pub async fn refresh(&self) -> ListState {
        self.subscription.refetch().await.state
    }

    /// The request rows this page shows. Empty while nothing has arrived;
    /// after a failed refetch, the last rows that did.
    pub fn requests(&self) -> Vec<RecommendationRequest> {
        let snapshot = self.snapshot();
        let rows = snapshot.listing.as_ref().map(|l| l.requests()).unwrap_or(&[]);
        filter_requests(rows, StatusView::for_route(&self.route))
    }

    pub fn request_types(&self) -> Vec<RequestType> {
        self.snapshot()
            .listing
            .map(|l| l.request_types().to_vec())
            .unwrap_or_default()
    }

    pub fn users(&self) -> Vec<UserSummary> {
        self.snapshot().listing.map(|l| l.users().to_vec()).unwrap_or_default()
    }

    /// The status actions offered on `request` in this table.
    pub fn row_actions(&self, request: &RecommendationRequest) -> &'static [StatusAction] {
        if self.affordances.show_status_actions {
            available_actions(request.status)
        } else {
            &[]
        }
    }
}
