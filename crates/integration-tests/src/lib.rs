//! Integration test harness for Santa's Workshop.
//!
//! Drives the full console router in-process over the memory document store
//! and an in-memory session store; no database or running server needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p santas-workshop-integration-tests
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::{
    MemoryStore,
    session::{Id, Record},
    session_store::{self, SessionStore},
};

use santas_workshop::{
    config::WorkshopConfig,
    db::{MemoryDocumentStore, RoleRepository},
    middleware::create_session_layer,
    state::AppState,
};
use santas_workshop_core::{UserId, UserRole};

/// The console wired to in-memory stores.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
    store: Arc<MemoryDocumentStore>,
}

impl TestApp {
    /// Console with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorkshopConfig::default())
    }

    /// Console with a custom configuration.
    #[must_use]
    pub fn with_config(config: WorkshopConfig) -> Self {
        Self::with_session_store(config, MemoryStore::default())
    }

    /// Console with a custom configuration and session store.
    #[must_use]
    pub fn with_session_store<S>(config: WorkshopConfig, sessions: S) -> Self
    where
        S: SessionStore + Clone,
    {
        let store = Arc::new(MemoryDocumentStore::new());
        let session_layer = create_session_layer(sessions, &config);
        let state = AppState::with_store(config, store.clone());
        Self {
            router: santas_workshop::app(state, session_layer),
            store,
        }
    }

    /// The backing document store, for seeding and fault injection.
    #[must_use]
    pub fn store(&self) -> &MemoryDocumentStore {
        &self.store
    }

    /// A new browser with an empty cookie jar.
    #[must_use]
    pub fn client(&self) -> TestClient {
        TestClient {
            app: self.clone(),
            cookie: None,
        }
    }

    /// Register an account through the API and promote it to admin.
    ///
    /// # Panics
    ///
    /// Panics if registration or sign-in fails.
    pub async fn admin_client(&self, email: &str) -> TestClient {
        let mut client = self.client();
        let response = client.register(email, "candycane").await;
        assert_eq!(response.status, StatusCode::OK, "register: {}", response.body);

        let me = client.get("/auth/me").await;
        let user_id = me.body["user"]["id"]
            .as_str()
            .expect("registered user has an id")
            .to_string();
        RoleRepository::new(self.store.as_ref())
            .set_role(&UserId::new(user_id), UserRole::Admin)
            .await
            .expect("role update");

        client.post("/auth/logout", None).await;
        let response = client
            .post(
                "/auth/login",
                Some(serde_json::json!({ "email": email, "password": "candycane" })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login: {}", response.body);
        client
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory session store whose loads can be switched to fail.
#[derive(Debug, Clone, Default)]
pub struct FlakySessionStore {
    inner: MemoryStore,
    failing: Arc<AtomicBool>,
}

impl FlakySessionStore {
    /// Make every subsequent load fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl SessionStore for FlakySessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        self.inner.create(record).await
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.inner.save(record).await
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(session_store::Error::Backend(
                "session backend unavailable".to_string(),
            ));
        }
        self.inner.load(session_id).await
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.inner.delete(session_id).await
    }
}

/// Status and JSON body of a response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// A browser: sends requests and keeps the session cookie.
pub struct TestClient {
    app: TestApp,
    cookie: Option<String>,
}

impl TestClient {
    /// Send a request, updating the cookie jar from `Set-Cookie`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body is unreadable.
    pub async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .app
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
        {
            self.cookie = set_cookie.split(';').next().map(str::to_owned);
        }

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse { status, body }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Option<Value>) -> TestResponse {
        self.send(Method::POST, uri, body).await
    }

    pub async fn put(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    /// Register and sign in.
    pub async fn register(&mut self, email: &str, password: &str) -> TestResponse {
        self.post(
            "/auth/register",
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }
}
