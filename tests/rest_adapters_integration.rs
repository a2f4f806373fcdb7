//! Integration tests for the REST authenticator and document store.
//!
//! Each test spins up an Axum server on a random port that mimics the
//! Identity Toolkit and Firestore endpoints, then drives the real adapters
//! against it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use casal_login::auth::{
    AuthFailureCode, Authenticator, CredentialGate, Credentials, IdentityToolkitAuthenticator,
    Session,
};
use casal_login::config::{LoginConfig, LookupFailurePolicy};
use casal_login::error::{AuthError, LoginError, StoreError};
use casal_login::login::LoginController;
use casal_login::navigation::{AlertSink, Navigator, Route};
use casal_login::onboarding::{OnboardingResolver, RouteDecision};
use casal_login::store::{Collection, DocumentStore, FirestoreStore};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

const API_KEY: &str = "test-api-key";
const PROJECT: &str = "casalapp";
const ID_TOKEN: &str = "id-token-u1";

/// In-process stand-in for the identity and document backends.
#[derive(Default)]
struct FakeBackend {
    /// email -> (password, uid)
    accounts: HashMap<String, (String, String)>,
    /// (collection, id) -> Firestore-typed fields
    documents: HashMap<(String, String), Value>,
    /// Collections that answer with a 500.
    broken: Vec<String>,
    /// Authorization headers seen on document fetches.
    seen_auth: Mutex<Vec<Option<String>>>,
    /// Answer sign-in with a 200 whose body is not JSON.
    garbled_sign_in: bool,
}

fn error_body(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": {"code": 400, "message": message, "errors": []}})),
    )
        .into_response()
}

async fn sign_in(
    State(backend): State<Arc<FakeBackend>>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if query.get("key").map(String::as_str) != Some(API_KEY) {
        return error_body("API key not valid. Please pass a valid API key.");
    }
    if backend.garbled_sign_in {
        return (StatusCode::OK, "<html>upstream proxy</html>").into_response();
    }
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    if !email.contains('@') {
        return error_body("INVALID_EMAIL");
    }
    match backend.accounts.get(email) {
        None => error_body("EMAIL_NOT_FOUND"),
        Some((expected, _)) if expected != password => {
            error_body("INVALID_PASSWORD : The password is invalid or the user does not have a password.")
        }
        Some((_, uid)) => Json(json!({
            "kind": "identitytoolkit#VerifyPasswordResponse",
            "localId": uid,
            "email": email,
            "idToken": ID_TOKEN,
            "refreshToken": "refresh",
            "expiresIn": "3600",
            "registered": true
        }))
        .into_response(),
    }
}

async fn get_document(
    State(backend): State<Arc<FakeBackend>>,
    Path((project, database, collection, id)): Path<(String, String, String, String)>,
    headers: HeaderMap,
) -> Response {
    backend.seen_auth.lock().unwrap().push(
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    );

    if project != PROJECT || database != "(default)" {
        return StatusCode::BAD_REQUEST.into_response();
    }
    if backend.broken.contains(&collection) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    match backend.documents.get(&(collection.clone(), id.clone())) {
        Some(fields) => Json(json!({
            "name": format!("projects/{project}/databases/(default)/documents/{collection}/{id}"),
            "fields": fields,
            "createTime": "2024-01-01T00:00:00Z",
            "updateTime": "2024-01-01T00:00:00Z"
        }))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"code": 404, "status": "NOT_FOUND"}})),
        )
            .into_response(),
    }
}

/// Start the fake backend on a random port, returning its `/v1` base URL.
async fn start_backend(backend: Arc<FakeBackend>) -> String {
    let app = Router::new()
        .route("/v1/accounts:signInWithPassword", post(sign_in))
        .route(
            "/v1/projects/{project}/databases/{database}/documents/{collection}/{id}",
            get(get_document),
        )
        .with_state(backend);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://127.0.0.1:{port}/v1")
}

fn backend_with_user(house: Option<&str>, house_exists: bool) -> FakeBackend {
    let mut backend = FakeBackend::default();
    backend.accounts.insert(
        "a@b.com".to_string(),
        ("ok".to_string(), "u1".to_string()),
    );
    let profile = match house {
        Some(h) => json!({"houseId": {"stringValue": h}, "name": {"stringValue": "Ana"}}),
        None => json!({"name": {"stringValue": "Ana"}}),
    };
    backend
        .documents
        .insert(("users".to_string(), "u1".to_string()), profile);
    if let (Some(h), true) = (house, house_exists) {
        backend.documents.insert(
            ("houses".to_string(), h.to_string()),
            json!({"name": {"stringValue": "Casa"}, "members": {"arrayValue": {"values": [{"stringValue": "u1"}]}}}),
        );
    }
    backend
}

/// Accepts connections and never answers, holding every socket open.
async fn start_silent_listener() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://127.0.0.1:{port}/v1")
}

fn adapters(base: &str) -> (Arc<Session>, IdentityToolkitAuthenticator, FirestoreStore) {
    let session = Arc::new(Session::new());
    let auth = IdentityToolkitAuthenticator::new(
        reqwest::Client::new(),
        base,
        SecretString::from(API_KEY),
        session.clone(),
    );
    let store = FirestoreStore::new(reqwest::Client::new(), base, PROJECT, session.clone());
    (session, auth, store)
}

#[derive(Default)]
struct Screen {
    resets: Mutex<Vec<Route>>,
    alerts: Mutex<Vec<String>>,
}

impl Navigator for Screen {
    fn reset_to(&self, route: Route) {
        self.resets.lock().unwrap().push(route);
    }
    fn navigate(&self, _route: Route) {}
}

impl AlertSink for Screen {
    fn alert(&self, _title: &str, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

#[tokio::test]
async fn sign_in_success_establishes_session() {
    timeout(TEST_TIMEOUT, async {
        let base = start_backend(Arc::new(backend_with_user(None, false))).await;
        let (session, auth, _) = adapters(&base);

        let creds = Credentials::new("a@b.com", "ok").unwrap();
        let principal = auth.sign_in(&creds).await.unwrap();

        assert_eq!(principal.uid, "u1");
        assert_eq!(principal.email.as_deref(), Some("a@b.com"));
        assert!(session.bearer().await.is_some());
        assert_eq!(session.principal().await, Some(principal));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn sign_in_failures_map_to_codes() {
    timeout(TEST_TIMEOUT, async {
        let base = start_backend(Arc::new(backend_with_user(None, false))).await;
        let (session, auth, _) = adapters(&base);

        let cases = [
            ("nobody@b.com", "ok", AuthFailureCode::UserNotFound),
            ("a@b.com", "wrong", AuthFailureCode::WrongPassword),
            ("not-an-email", "ok", AuthFailureCode::InvalidEmail),
        ];
        for (email, password, expected) in cases {
            let creds = Credentials::new(email, password).unwrap();
            assert_eq!(auth.sign_in(&creds).await.unwrap_err(), expected, "{email}");
        }
        assert!(session.bearer().await.is_none());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn bad_api_key_is_unknown_code() {
    timeout(TEST_TIMEOUT, async {
        let base = start_backend(Arc::new(backend_with_user(None, false))).await;
        let auth = IdentityToolkitAuthenticator::new(
            reqwest::Client::new(),
            &base,
            SecretString::from("wrong-key"),
            Arc::new(Session::new()),
        );

        let creds = Credentials::new("a@b.com", "ok").unwrap();
        let code = auth.sign_in(&creds).await.unwrap_err();
        assert!(matches!(code, AuthFailureCode::Other(_)));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unreachable_provider_is_unknown_error() {
    timeout(TEST_TIMEOUT, async {
        // Bind and immediately drop to get a port nothing listens on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let auth = IdentityToolkitAuthenticator::new(
            reqwest::Client::new(),
            format!("http://127.0.0.1:{port}/v1"),
            SecretString::from(API_KEY),
            Arc::new(Session::new()),
        );
        let gate = CredentialGate::new(Arc::new(auth));

        let err = gate.authenticate("a@b.com", "ok").await.unwrap_err();
        assert_eq!(err.user_message(), Some("Erro ao fazer login."));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn transport_failure_does_not_leak_api_key() {
    timeout(TEST_TIMEOUT, async {
        let secret_key = "SUPER-SECRET-KEY";
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let auth = IdentityToolkitAuthenticator::new(
            reqwest::Client::new(),
            format!("http://127.0.0.1:{port}/v1"),
            SecretString::from(secret_key),
            Arc::new(Session::new()),
        );

        let creds = Credentials::new("a@b.com", "ok").unwrap();
        let AuthFailureCode::Other(raw) = auth.sign_in(&creds).await.unwrap_err() else {
            panic!("expected an unrecognized failure code");
        };
        assert!(raw.starts_with("auth/network-request-failed"), "{raw}");
        assert!(!raw.contains(secret_key), "{raw}");
        assert!(!raw.contains("key="), "{raw}");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn undecodable_sign_in_response_does_not_leak_api_key() {
    timeout(TEST_TIMEOUT, async {
        let mut backend = backend_with_user(None, false);
        backend.garbled_sign_in = true;
        let base = start_backend(Arc::new(backend)).await;
        let (session, auth, _) = adapters(&base);

        let creds = Credentials::new("a@b.com", "ok").unwrap();
        let AuthFailureCode::Other(raw) = auth.sign_in(&creds).await.unwrap_err() else {
            panic!("expected an unrecognized failure code");
        };
        assert!(raw.starts_with("malformed sign-in response"), "{raw}");
        assert!(!raw.contains(API_KEY), "{raw}");
        assert!(session.bearer().await.is_none());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn hung_backend_times_out_through_configured_client() {
    timeout(TEST_TIMEOUT, async {
        let base = start_silent_listener().await;
        let config = LoginConfig::from_lookup(|key| match key {
            "CASAL_FIREBASE_API_KEY" => Some(API_KEY.to_string()),
            "CASAL_FIREBASE_PROJECT_ID" => Some(PROJECT.to_string()),
            "CASAL_IDENTITY_ENDPOINT" | "CASAL_FIRESTORE_ENDPOINT" => Some(base.clone()),
            "CASAL_REQUEST_TIMEOUT_SECS" => Some("1".to_string()),
            _ => None,
        })
        .unwrap();
        let session = Arc::new(Session::new());
        let auth = IdentityToolkitAuthenticator::from_config(&config, session.clone()).unwrap();
        let store = FirestoreStore::from_config(&config, session).unwrap();
        let gate = CredentialGate::new(Arc::new(auth));

        let (signed_in, fetched) = tokio::join!(
            gate.authenticate("a@b.com", "ok"),
            store.get_by_id(Collection::Users, "u1"),
        );

        assert!(matches!(
            signed_in,
            Err(LoginError::Auth(AuthError::Unknown))
        ));
        assert!(matches!(fetched, Err(StoreError::Transport { .. })));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn firestore_fetch_decodes_and_reports_absence() {
    timeout(TEST_TIMEOUT, async {
        let base = start_backend(Arc::new(backend_with_user(Some("h1"), true))).await;
        let (_, _, store) = adapters(&base);

        let profile = store
            .get_by_id(Collection::Users, "u1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile["houseId"], "h1");
        assert_eq!(profile["name"], "Ana");

        let house = store
            .get_by_id(Collection::Houses, "h1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(house["members"], json!(["u1"]));

        assert!(store
            .get_by_id(Collection::Houses, "missing")
            .await
            .unwrap()
            .is_none());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn firestore_server_error_is_status_error() {
    timeout(TEST_TIMEOUT, async {
        let mut backend = backend_with_user(Some("h1"), true);
        backend.broken.push("houses".to_string());
        let base = start_backend(Arc::new(backend)).await;
        let (_, _, store) = adapters(&base);

        let err = store.get_by_id(Collection::Houses, "h1").await.unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 500, .. }));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn full_login_routes_to_dashboard_with_bearer_token() {
    timeout(TEST_TIMEOUT, async {
        let backend = Arc::new(backend_with_user(Some("h1"), true));
        let base = start_backend(backend.clone()).await;
        let (_, auth, store) = adapters(&base);
        let screen = Arc::new(Screen::default());

        let controller = LoginController::new(
            CredentialGate::new(Arc::new(auth)),
            OnboardingResolver::new(Arc::new(store), LookupFailurePolicy::FailClosed),
            screen.clone(),
            screen.clone(),
        );

        let decision = controller.submit("a@b.com", "ok").await.unwrap();
        assert_eq!(decision, RouteDecision::Dashboard);
        assert_eq!(*screen.resets.lock().unwrap(), vec![Route::Dashboard]);

        let seen = backend.seen_auth.lock().unwrap().clone();
        let expected = Some(format!("Bearer {ID_TOKEN}"));
        assert_eq!(seen, vec![expected.clone(), expected]);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn full_login_dangling_house_routes_to_house_selection() {
    timeout(TEST_TIMEOUT, async {
        let base = start_backend(Arc::new(backend_with_user(Some("h1"), false))).await;
        let (_, auth, store) = adapters(&base);
        let screen = Arc::new(Screen::default());

        let controller = LoginController::new(
            CredentialGate::new(Arc::new(auth)),
            OnboardingResolver::new(Arc::new(store), LookupFailurePolicy::FailClosed),
            screen.clone(),
            screen.clone(),
        );

        let decision = controller.submit("a@b.com", "ok").await.unwrap();
        assert_eq!(decision, RouteDecision::HouseSelection);
        assert_eq!(*screen.resets.lock().unwrap(), vec![Route::HouseSelection]);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn full_login_store_outage_alerts_when_fail_closed() {
    timeout(TEST_TIMEOUT, async {
        let mut backend = backend_with_user(Some("h1"), true);
        backend.broken.push("users".to_string());
        let base = start_backend(Arc::new(backend)).await;
        let (_, auth, store) = adapters(&base);
        let screen = Arc::new(Screen::default());

        let controller = LoginController::new(
            CredentialGate::new(Arc::new(auth)),
            OnboardingResolver::new(Arc::new(store), LookupFailurePolicy::FailClosed),
            screen.clone(),
            screen.clone(),
        );

        let err = controller.submit("a@b.com", "ok").await.unwrap_err();
        assert!(matches!(err, LoginError::Lookup(_)));
        assert_eq!(
            *screen.alerts.lock().unwrap(),
            vec!["Erro ao fazer login.".to_string()]
        );
        assert!(screen.resets.lock().unwrap().is_empty());
    })
    .await
    .expect("test timed out");
}
