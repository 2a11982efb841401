//! End-to-end auth session against a stub backend over real HTTP.

use std::sync::{Arc, Mutex};

use accounts::{
    CSRF_HEADER, CsrfTokenResponse, ErrorBody, LoginRequest, LoginResponse, LogoutRequest, SESSION_HEADER,
    SESSION_ID_KEY, SessionPayload, SessionResponse, USER_KEY, User,
};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use client::{AuthError, HistoryNavigator, MemoryStore, RemoteInvalidation, SessionStore};

// =============================================================================
// stub backend
// =============================================================================

#[derive(Default)]
struct Recorded {
    logouts: Mutex<Vec<(String, Option<String>)>>,
}

fn pastor() -> User {
    User { id: 1, username: "pastor".into(), role: "pastor".into(), member_id: Some(1), visitor_id: None }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

async fn session(headers: HeaderMap) -> Response {
    match header(&headers, SESSION_HEADER).as_deref() {
        Some("xyz") => Json(SessionResponse { session: SessionPayload::from(pastor()) }).into_response(),
        _ => (StatusCode::UNAUTHORIZED, Json(ErrorBody::new("invalid session"))).into_response(),
    }
}

async fn login(Json(req): Json<LoginRequest>) -> Response {
    if req.username == "pastor" && req.password == "senha123" {
        Json(LoginResponse { user: pastor(), session_id: "xyz".into() }).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(ErrorBody::new("Invalid username or password"))).into_response()
    }
}

async fn csrf_token(headers: HeaderMap) -> Response {
    match header(&headers, SESSION_HEADER) {
        Some(id) => Json(CsrfTokenResponse { csrf_token: format!("tok-{id}") }).into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn logout(State(rec): State<Arc<Recorded>>, headers: HeaderMap, Json(req): Json<LogoutRequest>) -> StatusCode {
    rec.logouts
        .lock()
        .unwrap()
        .push((req.session_id, header(&headers, CSRF_HEADER)));
    StatusCode::NO_CONTENT
}

async fn spawn_stub() -> (String, Arc<Recorded>) {
    let recorded = Arc::new(Recorded::default());
    let app = Router::new()
        .route("/api/auth/session", get(session))
        .route("/api/auth/login", post(login))
        .route("/api/auth/csrf-token", get(csrf_token))
        .route("/api/auth/logout", post(logout))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), recorded)
}

// =============================================================================
// tests
// =============================================================================

#[tokio::test]
async fn login_check_logout_round_trip() {
    let (base_url, recorded) = spawn_stub().await;
    let store = MemoryStore::new();
    let nav = Arc::new(HistoryNavigator::new());
    let (mut session, _api) = client::connect(&base_url, Box::new(store.clone()), nav.clone()).unwrap();

    let user = session.login("pastor", "senha123").await.unwrap();
    assert_eq!(user.role, "pastor");
    assert_eq!(store.get(SESSION_ID_KEY).as_deref(), Some("xyz"));
    assert!(store.get(USER_KEY).is_some());

    session.check_session().await;
    assert!(session.is_authenticated());

    let outcome = session.logout().await;
    assert!(matches!(outcome, RemoteInvalidation::Acknowledged));
    assert_eq!(
        recorded.logouts.lock().unwrap().as_slice(),
        [("xyz".to_owned(), Some("tok-xyz".to_owned()))]
    );
    assert!(store.keys().is_empty());
    assert_eq!(nav.current().as_deref(), Some("/login"));
}

#[tokio::test]
async fn wrong_password_reports_server_message() {
    let (base_url, _) = spawn_stub().await;
    let store = MemoryStore::new();
    let (mut session, _api) =
        client::connect(&base_url, Box::new(store.clone()), Arc::new(HistoryNavigator::new())).unwrap();

    let err = session.login("pastor", "errada").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials(_)));
    assert_eq!(err.to_string(), "Invalid username or password");
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn stale_session_is_cleared_on_check() {
    let (base_url, _) = spawn_stub().await;
    let mut store = MemoryStore::new();
    store.set(SESSION_ID_KEY, "abc").unwrap();
    store.set(USER_KEY, r#"{"id":1,"username":"pastor","role":"pastor"}"#).unwrap();
    let (mut session, _api) =
        client::connect(&base_url, Box::new(store.clone()), Arc::new(HistoryNavigator::new())).unwrap();

    session.check_session().await;

    assert!(session.user().is_none());
    assert!(store.get(SESSION_ID_KEY).is_none());
    assert!(store.get(USER_KEY).is_none());
}

#[tokio::test]
async fn unreachable_backend_still_logs_out_locally() {
    let mut store = MemoryStore::new();
    store.set(SESSION_ID_KEY, "xyz").unwrap();
    let (mut session, _api) =
        client::connect("http://127.0.0.1:1", Box::new(store.clone()), Arc::new(HistoryNavigator::new())).unwrap();

    let outcome = session.logout().await;

    assert!(matches!(outcome, RemoteInvalidation::Failed(client::ApiError::Transport(_))));
    assert!(store.keys().is_empty());
    assert!(!session.is_authenticated());
}
