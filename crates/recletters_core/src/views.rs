//! crates/recletters_core/src/views.rs
//!
//! Client-side status filters applied to a fetched request listing.

use crate::domain::{RecommendationRequest, RequestStatus};
use crate::route::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusView {
    /// Requests still waiting on the professor.
    Pending,
    /// Requests the professor has closed, either way.
    Completed,
    Everything,
}

impl StatusView {
    pub fn for_route(route: &Route) -> Self {
        match route {
            Route::PendingRequests => StatusView::Pending,
            Route::CompletedRequests => StatusView::Completed,
            _ => StatusView::Everything,
        }
    }

    pub fn admits(&self, status: RequestStatus) -> bool {
        match self {
            StatusView::Pending => matches!(status, RequestStatus::Pending | RequestStatus::InProgress),
            StatusView::Completed => status.is_closed(),
            StatusView::Everything => true,
        }
    }
}

/// Keeps the rows `view` admits, in their original order.
pub fn filter_requests(rows: &[RecommendationRequest], view: StatusView) -> Vec<RecommendationRequest> {
    rows.iter().filter(|r| view.admits(r.status)).cloned().collect()
}
