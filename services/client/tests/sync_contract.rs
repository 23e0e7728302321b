mod common;

use client_lib::error::ClientError;
use client_lib::sync::{ListState, ListView};
use common::{harness, request_json, user};
use recletters_core::authz::AuthzError;
use recletters_core::domain::roles::{ROLE_ADMIN, ROLE_PROFESSOR, ROLE_STUDENT, ROLE_USER};
use recletters_core::endpoint::{Collection, EndpointKey, Scope};
use recletters_core::mutation::{Mutation, PlanError};
use recletters_core::ports::{NavigationService, PortError};
use recletters_core::route::Route;
use recletters_core::transitions::StatusAction;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REQUESTER_ALL: &str = "/api/recommendationrequest/requester/all";

#[tokio::test]
async fn completed_view_shows_only_closed_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REQUESTER_ALL))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            request_json(1, 5, 9, "PENDING"),
            request_json(2, 5, 9, "COMPLETED"),
            request_json(3, 5, 9, "DENIED"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Route::CompletedRequests);
    let student = user(5, &[ROLE_USER, ROLE_STUDENT]);
    let view = ListView::mount(&h.app.store, Some(&student), Route::CompletedRequests).await.unwrap();

    assert_eq!(view.state(), ListState::Ready);
    let ids: Vec<i64> = view.requests().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[tokio::test]
async fn pending_and_profile_views_share_one_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REQUESTER_ALL))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([request_json(1, 5, 9, "PENDING")])))
        .mount(&server)
        .await;

    let h = harness(&server, Route::PendingRequests);
    let student = user(5, &[ROLE_USER, ROLE_STUDENT]);
    let pending = ListView::mount(&h.app.store, Some(&student), Route::PendingRequests).await.unwrap();
    let profile = ListView::mount(&h.app.store, Some(&student), Route::Profile).await.unwrap();

    assert_eq!(pending.key(), profile.key());
    assert_eq!(h.app.store.subscribers(&pending.key()), 2);
}

#[tokio::test]
async fn admin_delete_goes_to_admin_endpoint_even_when_owner() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/recommendationrequest"))
        .and(query_param("id", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(request_json(4, 5, 9, "PENDING")))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/recommendationrequest/admin"))
        .and(query_param("id", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Request with id 4 deleted" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/recommendationrequest/requester"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server, Route::AdminRequests);
    let admin = user(5, &[ROLE_USER, ROLE_ADMIN]);
    let view = ListView::mount(&h.app.store, Some(&admin), Route::RequestEdit(4)).await.unwrap();
    let record = view.requests().remove(0);

    h.app
        .mutations
        .mutate(Some(&admin), &Mutation::DeleteRecommendationRequest(record))
        .await
        .unwrap();

    assert_eq!(h.toasts.lines(), vec!["Request with id 4 deleted".to_string()]);
}

#[tokio::test]
async fn confirmed_mutation_refetches_each_mounted_view_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REQUESTER_ALL))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([request_json(1, 5, 9, "PENDING")])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(REQUESTER_ALL))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/recommendationrequest/requester"))
        .and(query_param("id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Request with id 1 deleted" })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Route::PendingRequests);
    let student = user(5, &[ROLE_USER, ROLE_STUDENT]);
    let pending = ListView::mount(&h.app.store, Some(&student), Route::PendingRequests).await.unwrap();
    let record = pending.requests().remove(0);

    h.app
        .mutations
        .mutate(Some(&student), &Mutation::DeleteRecommendationRequest(record))
        .await
        .unwrap();

    assert_eq!(pending.state(), ListState::Ready);
    assert!(pending.requests().is_empty());
}

#[tokio::test]
async fn failed_mutation_reports_server_message_and_keeps_lists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/requesttypes/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 3, "requestType": "Internship" }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/requesttypes"))
        .and(query_param("id", "3"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "type": "EntityNotFoundException",
            "message": "RequestType with id 3 not found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Route::RequestTypes);
    let admin = user(1, &[ROLE_USER, ROLE_ADMIN]);
    let view = ListView::mount(&h.app.store, Some(&admin), Route::RequestTypes).await.unwrap();

    let err = h
        .app
        .mutations
        .mutate(Some(&admin), &Mutation::DeleteRequestType { id: 3 })
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Port(PortError::NotFound { .. })));
    assert_eq!(h.toasts.lines(), vec!["RequestType with id 3 not found".to_string()]);
    assert_eq!(h.logs.lines().len(), 1);
    assert_eq!(view.request_types().len(), 1);
    assert!(!h.app.store.snapshot(&view.key()).stale);
}

#[tokio::test]
async fn failed_mutation_without_payload_uses_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/requesttypes"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let h = harness(&server, Route::RequestTypes);
    let admin = user(1, &[ROLE_ADMIN]);
    let _ = h.app.mutations.mutate(Some(&admin), &Mutation::DeleteRequestType { id: 8 }).await;

    assert_eq!(h.toasts.lines(), vec!["Failed to delete request type 8".to_string()]);
}

#[tokio::test]
async fn created_record_appears_on_next_fetch_and_form_is_left() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/requesttypes/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/requesttypes/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 7, "requestType": "Scholarship" }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/requesttypes/post"))
        .and(query_param("requestType", "Scholarship"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 7, "requestType": "Scholarship" })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Route::RequestTypeCreate);
    let admin = user(1, &[ROLE_USER, ROLE_ADMIN]);
    let list = ListView::mount(&h.app.store, Some(&admin), Route::RequestTypes).await.unwrap();
    assert!(list.request_types().is_empty());

    let receipt = h
        .app
        .mutations
        .mutate(Some(&admin), &Mutation::CreateRequestType { request_type: "Scholarship".to_string() })
        .await
        .unwrap();

    assert_eq!(receipt.id, Some(7));
    assert!(list.request_types().iter().any(|t| t.id == 7));
    assert_eq!(h.toasts.lines(), vec!["Request type created - id: 7".to_string()]);
    assert_eq!(h.app.current_route(), Route::RequestTypes);
}

#[tokio::test]
async fn professor_transition_sends_new_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/recommendationrequest/professor/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([request_json(4, 5, 9, "PENDING")])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/recommendationrequest/professor"))
        .and(query_param("id", "4"))
        .and(body_json(json!({ "status": "IN_PROGRESS" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(request_json(4, 5, 9, "IN_PROGRESS")))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Route::PendingRequests);
    let professor = user(9, &[ROLE_USER, ROLE_PROFESSOR]);
    let view = ListView::mount(&h.app.store, Some(&professor), Route::PendingRequests).await.unwrap();
    let record = view.requests().remove(0);
    assert_eq!(view.row_actions(&record), &[StatusAction::Accept, StatusAction::Deny]);

    h.app
        .mutations
        .mutate(Some(&professor), &Mutation::TransitionStatus { request: record, action: StatusAction::Accept })
        .await
        .unwrap();

    assert_eq!(h.toasts.lines(), vec!["Recommendation request 4 is now IN_PROGRESS".to_string()]);
}

#[tokio::test]
async fn refused_delete_never_reaches_the_server() {
    let server = MockServer::start().await;
    let h = harness(&server, Route::PendingRequests);
    let stranger = user(7, &[ROLE_USER]);
    let record = {
        let json = request_json(4, 5, 9, "PENDING");
        // Built through the listing path so the record matches what a view holds.
        Mock::given(method("GET"))
            .and(path("/api/recommendationrequest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json))
            .mount(&server)
            .await;
        let admin = user(1, &[ROLE_USER, ROLE_ADMIN]);
        let view = ListView::mount(&h.app.store, Some(&admin), Route::RequestEdit(4)).await.unwrap();
        view.requests().remove(0)
    };
    let before = server.received_requests().await.unwrap().len();

    let err = h
        .app
        .mutations
        .mutate(Some(&stranger), &Mutation::DeleteRecommendationRequest(record))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Plan(PlanError::Authz(AuthzError::Forbidden(_)))));
    assert_eq!(server.received_requests().await.unwrap().len(), before);
    assert!(h.toasts.lines().is_empty());
}

#[tokio::test]
async fn failed_fetch_notifies_and_keeps_last_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REQUESTER_ALL))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([request_json(1, 5, 9, "PENDING")])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(REQUESTER_ALL))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let h = harness(&server, Route::PendingRequests);
    let student = user(5, &[ROLE_USER, ROLE_STUDENT]);
    let view = ListView::mount(&h.app.store, Some(&student), Route::PendingRequests).await.unwrap();

    assert_eq!(view.refresh().await, ListState::Failed);
    assert_eq!(view.requests().len(), 1);
    assert_eq!(
        h.toasts.lines(),
        vec!["Error communicating with backend via GET on recommendationrequests/requester/all".to_string()]
    );
    assert_eq!(h.logs.lines().len(), 1);
}

#[tokio::test]
async fn superseded_fetch_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/requesttypes/all"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": 1, "requestType": "Old" }]))
                .set_delay(Duration::from_millis(300)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/requesttypes/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "requestType": "Old" },
            { "id": 2, "requestType": "New" }
        ])))
        .mount(&server)
        .await;

    let h = harness(&server, Route::RequestTypes);
    let key = EndpointKey::new(Collection::RequestTypes, Scope::All);

    let store = h.app.store.clone();
    let slow = tokio::spawn(async move { store.fetch(key).await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    let fresh = h.app.store.fetch(key).await;
    assert_eq!(fresh.listing.as_ref().map(|l| l.len()), Some(2));

    slow.await.unwrap();
    let settled = h.app.store.snapshot(&key);
    assert_eq!(settled.state, ListState::Ready);
    assert_eq!(settled.listing.map(|l| l.len()), Some(2));
}

#[tokio::test]
async fn admin_only_pages_refuse_other_users() {
    let server = MockServer::start().await;
    let h = harness(&server, Route::Home);
    let regular = user(2, &[ROLE_USER]);
    let result = ListView::mount(&h.app.store, Some(&regular), Route::AdminUsers).await;
    assert!(matches!(result, Err(AuthzError::Forbidden(_))));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn abandoned_mount_releases_its_view() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/requesttypes/all"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let h = harness(&server, Route::RequestTypes);
    let admin = user(1, &[ROLE_USER, ROLE_ADMIN]);
    let key = EndpointKey::new(Collection::RequestTypes, Scope::All);

    let mount = ListView::mount(&h.app.store, Some(&admin), Route::RequestTypes);
    let result = tokio::time::timeout(Duration::from_millis(50), mount).await;

    assert!(result.is_err());
    assert_eq!(h.app.store.subscribers(&key), 0);
}

#[tokio::test]
async fn saved_edit_returns_to_the_page_it_came_from() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/requesttypes"))
        .and(query_param("id", "3"))
        .and(body_json(json!({ "requestType": "Internship" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 3, "requestType": "Internship" })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Route::RequestTypes);
    h.navigator.navigate(Route::RequestTypeEdit(3).into());
    let admin = user(1, &[ROLE_USER, ROLE_ADMIN]);

    h.app
        .mutations
        .mutate(Some(&admin), &Mutation::UpdateRequestType { id: 3, request_type: "Internship".to_string() })
        .await
        .unwrap();

    assert_eq!(h.app.current_route(), Route::RequestTypes);
    assert_eq!(h.navigator.history(), vec!["/requesttypes".to_string()]);
}
