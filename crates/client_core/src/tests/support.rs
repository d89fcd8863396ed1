use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use storage::{KeyValueStore, MemoryStore};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{api::EventApi, session::SessionClient, state::EventSession};

pub const EVENT_ID: &str = "evt-1";
pub const EVENT_KEY: &str = "summit";
pub const ME: &str = "user-me";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Debug, Clone)]
enum Reply {
    Json(StatusCode, Value),
    Empty,
}

/// In-process stand-in for the event backend. Unknown routes answer 404.
#[derive(Clone, Default)]
pub struct MockBackend {
    routes: Arc<Mutex<HashMap<(Method, String), Reply>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn respond(&self, method: Method, path: &str, body: Value) {
        self.respond_with_status(method, path, StatusCode::OK, body)
            .await;
    }

    pub async fn respond_with_status(
        &self,
        method: Method,
        path: &str,
        status: StatusCode,
        body: Value,
    ) {
        self.routes
            .lock()
            .await
            .insert((method, path.to_string()), Reply::Json(status, body));
    }

    pub async fn respond_empty(&self, method: Method, path: &str) {
        self.routes
            .lock()
            .await
            .insert((method, path.to_string()), Reply::Empty);
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn requests_to(&self, method: Method, path: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .cloned()
            .collect()
    }

    pub async fn spawn(&self) -> String {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let app = Router::new().fallback(handle).with_state(self.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}/")
    }
}

async fn handle(
    State(backend): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    backend.requests.lock().await.push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    let reply = backend.routes.lock().await.get(&(method, path)).cloned();
    match reply {
        Some(Reply::Json(status, body)) => (status, Json(body)).into_response(),
        Some(Reply::Empty) => StatusCode::NO_CONTENT.into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "route not found" })),
        )
            .into_response(),
    }
}

pub fn event_json() -> Value {
    json!({
        "_id": EVENT_ID,
        "key": EVENT_KEY,
        "name": "Summit 2024",
        "logo": "https://cdn.example/logo.png"
    })
}

pub fn user_json(id: &str, logged_in: bool) -> Value {
    json!({
        "_id": id,
        "code": "ABC123",
        "event": EVENT_ID,
        "firstName": "Ada",
        "lastName": "Lovelace",
        "company": "Engines Ltd",
        "email": format!("{id}@example.com"),
        "interests": [],
        "availableTimes": ["09:00-09:15"],
        "loggedIn": logged_in
    })
}

pub fn meeting_json(id: &str, creator: &str, receiver: &str, status: i8) -> Value {
    json!({
        "_id": id,
        "creator": user_json(creator, true),
        "receiver": user_json(receiver, true),
        "time": "09:00-09:15",
        "location": "Booth 4",
        "status": status
    })
}

pub fn conversation_json(other: &str, unread: u32) -> Value {
    json!({
        "unread": unread,
        "user": user_json(other, true),
        "message": "hello",
        "createdAt": "2024-05-01T10:00:00Z"
    })
}

pub fn session_client(url: &str, store: Arc<dyn KeyValueStore>) -> Arc<SessionClient> {
    Arc::new(SessionClient::new(url, store).expect("session client"))
}

/// A session with the event loaded and `ME` logged in with a completed profile.
pub async fn ready_session(backend: &MockBackend) -> EventSession {
    backend
        .respond(Method::GET, &format!("/events/{EVENT_KEY}"), event_json())
        .await;
    let mut login = user_json(ME, true);
    login["accessToken"] = json!("token-me");
    backend.respond(Method::POST, "/auth/login", login).await;

    let url = backend.spawn().await;
    let session = EventSession::new(EventApi::new(session_client(
        &url,
        Arc::new(MemoryStore::new()),
    )));
    session.load_event(EVENT_KEY).await.expect("load event");
    session.login("abc123").await.expect("login");
    session
}
