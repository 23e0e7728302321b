#![allow(dead_code)]

use client_lib::adapters::{HistoryNavigator, HttpAdapter};
use client_lib::config::Config;
use client_lib::state::AppState;
use recletters_core::domain::{CurrentUser, Profile};
use recletters_core::ports::{NotificationService, OperationalLog};
use recletters_core::route::Route;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use wiremock::MockServer;

/// Collects every toast or log line it receives.
#[derive(Default)]
pub struct Recorder(Mutex<Vec<String>>);

impl Recorder {
    pub fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl NotificationService for Recorder {
    fn notify(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

impl OperationalLog for Recorder {
    fn log_error(&self, message: &str, context: &str) {
        self.0.lock().unwrap().push(format!("{context}: {message}"));
    }
}

pub struct Harness {
    pub app: AppState,
    pub toasts: Arc<Recorder>,
    pub logs: Arc<Recorder>,
    pub navigator: Arc<HistoryNavigator>,
}

pub fn harness(server: &MockServer, start: Route) -> Harness {
    let uri = server.uri();
    let config = Config::from_lookup(|name| (name == "BACKEND_URL").then(|| uri.clone())).unwrap();
    let http = Arc::new(HttpAdapter::with_client(reqwest::Client::new(), &server.uri()));
    let toasts = Arc::new(Recorder::default());
    let logs = Arc::new(Recorder::default());
    let navigator = Arc::new(HistoryNavigator::new(start.path()));
    let app = AppState::from_parts(
        Arc::new(config),
        http.clone(),
        http,
        toasts.clone(),
        logs.clone(),
        navigator.clone(),
    );
    Harness { app, toasts, logs, navigator }
}

pub fn user(id: i64, roles: &[&str]) -> CurrentUser {
    CurrentUser::signed_in(
        Profile {
            id,
            email: format!("user{id}@ucsb.edu"),
            full_name: format!("User {id}"),
            given_name: "User".to_string(),
            family_name: id.to_string(),
            picture_url: None,
        },
        roles.iter().copied(),
    )
}

/// A recommendation request as the backend serializes it.
pub fn request_json(id: i64, requester: i64, professor: i64, status: &str) -> Value {
    let closed = status == "COMPLETED" || status == "DENIED";
    json!({
        "id": id,
        "requester": { "id": requester, "fullName": format!("User {requester}"), "email": format!("user{requester}@ucsb.edu") },
        "professor": { "id": professor, "fullName": format!("User {professor}"), "email": format!("user{professor}@ucsb.edu") },
        "recommendationType": "PhD program",
        "details": "Applying to three programs",
        "status": status,
        "submissionDate": "2024-05-01T12:00:00",
        "lastModifiedDate": "2024-05-02T12:00:00",
        "completionDate": if closed { json!("2024-05-03T12:00:00") } else { Value::Null },
        "dueDate": "2024-05-20T12:00:00"
    })
}
