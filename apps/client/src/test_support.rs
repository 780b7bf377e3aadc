//! Shared fixtures for unit tests: a sample profile, an in-memory identity
//! service, and an in-process mock of the backend for gateway tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{oneshot, Notify};

use crate::api::ApiClient;
use crate::config::Config;
use crate::errors::{AuthError, ClientError};
use crate::models::user::{
    GoogleAuthRequest, LoginRequest, RegisterRequest, TokenResponse, User, UserUpdate,
};
use crate::models::Role;
use crate::router::History;
use crate::session::{IdentityApi, SessionCore};
use crate::storage::MemoryStore;

pub use mock_backend::MockBackend;

/// Gateway against a fresh mock backend, signed in as the sample user,
/// with the history positioned at `location`.
pub async fn signed_in_api(location: &str) -> (MockBackend, Arc<ApiClient>, Arc<History>) {
    signed_in_as(location, sample_user()).await
}

/// Same as [`signed_in_api`] for an arbitrary profile; the backend honours
/// the token for `user.id`.
pub async fn signed_in_as(
    location: &str,
    user: User,
) -> (MockBackend, Arc<ApiClient>, Arc<History>) {
    let backend = MockBackend::start().await;
    let core = SessionCore::new(Arc::new(MemoryStore::new()));
    core.commit_login(backend.token_for(user.id), user).unwrap();
    let history = Arc::new(History::new(location));
    let config = Config {
        api_base_url: backend.base_url.clone(),
        ..Config::default()
    };
    let api = ApiClient::new(&config, core, history.clone()).unwrap();
    (backend, Arc::new(api), history)
}

pub fn sample_user() -> User {
    User {
        id: 7,
        email: "ada@example.com".to_string(),
        username: "ada".to_string(),
        full_name: "Ada Lovelace".to_string(),
        role: Role::User,
        is_active: true,
        phone: Some("555-0100".to_string()),
        bio: None,
        avatar_url: None,
        created_at: None,
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Network,
    Unauthorized,
    ServerError,
}

impl Failure {
    fn to_error(self) -> ClientError {
        match self {
            Failure::Network => ClientError::Network("connection reset".to_string()),
            Failure::Unauthorized => ClientError::Auth(AuthError::SessionExpired),
            Failure::ServerError => ClientError::Server {
                status: 503,
                message: String::new(),
            },
        }
    }
}

struct Account {
    password: String,
    user: User,
}

/// In-memory identity service with hooks for ordering concurrent calls.
pub struct FakeIdentity {
    accounts: Mutex<Vec<Account>>,
    tokens: Mutex<HashMap<String, User>>,
    failures: Mutex<HashMap<String, Failure>>,
    fail_next_issued: Mutex<Option<Failure>>,
    gate: tokio::sync::Mutex<Option<oneshot::Receiver<()>>>,
    /// Signalled when a held profile call has started and is waiting for release.
    pub entered: Notify,
    issued: AtomicUsize,
}

impl FakeIdentity {
    /// One account: `ada@example.com` / `secret`, also reachable with the
    /// federated credential `google-ok`.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            accounts: Mutex::new(vec![Account {
                password: "secret".to_string(),
                user: sample_user(),
            }]),
            tokens: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            fail_next_issued: Mutex::new(None),
            gate: tokio::sync::Mutex::new(None),
            entered: Notify::new(),
            issued: AtomicUsize::new(0),
        })
    }

    pub fn issue_token(&self, token: &str, user: User) {
        self.tokens.lock().unwrap().insert(token.to_string(), user);
    }

    pub fn fail_token(&self, token: &str, failure: Failure) {
        self.failures
            .lock()
            .unwrap()
            .insert(token.to_string(), failure);
    }

    /// The profile call for the next token handed out by login fails.
    pub fn fail_next_issued(&self, failure: Failure) {
        *self.fail_next_issued.lock().unwrap() = Some(failure);
    }

    /// The next profile call blocks until the returned sender fires.
    pub fn hold_next_profile(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.try_lock().unwrap() = Some(rx);
        tx
    }

    fn mint(&self, user: User) -> TokenResponse {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("token-{n}");
        if let Some(failure) = self.fail_next_issued.lock().unwrap().take() {
            self.fail_token(&token, failure);
        }
        self.issue_token(&token, user);
        TokenResponse {
            access_token: token,
            token_type: "bearer".to_string(),
        }
    }
}

#[async_trait]
impl IdentityApi for FakeIdentity {
    async fn register(&self, req: &RegisterRequest) -> Result<User, ClientError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|a| a.user.email == req.email) {
            return Err(ClientError::Server {
                status: 400,
                message: "Email already registered".to_string(),
            });
        }
        let user = User {
            id: accounts.len() as i64 + 100,
            email: req.email.clone(),
            username: req.username.clone(),
            full_name: req.full_name.clone(),
            role: Role::User,
            is_active: true,
            phone: req.phone.clone(),
            bio: None,
            avatar_url: None,
            created_at: None,
        };
        accounts.push(Account {
            password: req.password.clone(),
            user: user.clone(),
        });
        Ok(user)
    }

    async fn login(&self, req: &LoginRequest) -> Result<TokenResponse, ClientError> {
        let user = self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.user.email == req.email && a.password == req.password)
            .map(|a| a.user.clone());
        match user {
            Some(user) => Ok(self.mint(user)),
            None => Err(AuthError::InvalidCredentials("Invalid email or password".to_string()).into()),
        }
    }

    async fn google_auth(&self, req: &GoogleAuthRequest) -> Result<TokenResponse, ClientError> {
        if req.credential != "google-ok" {
            return Err(AuthError::InvalidCredentials("Invalid Google token".to_string()).into());
        }
        let user = self.accounts.lock().unwrap()[0].user.clone();
        Ok(self.mint(user))
    }

    async fn current_user(&self, token: &str) -> Result<User, ClientError> {
        let held = self.gate.lock().await.take();
        if let Some(release) = held {
            self.entered.notify_one();
            let _ = release.await;
        }
        if let Some(failure) = self.failures.lock().unwrap().get(token) {
            return Err(failure.to_error());
        }
        self.tokens
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(ClientError::Auth(AuthError::SessionExpired))
    }

    async fn update_current_user(
        &self,
        token: &str,
        update: &UserUpdate,
    ) -> Result<User, ClientError> {
        let mut tokens = self.tokens.lock().unwrap();
        let user = tokens
            .get_mut(token)
            .ok_or(ClientError::Auth(AuthError::SessionExpired))?;
        user.apply(update);
        Ok(user.clone())
    }
}

mod mock_backend {
    //! Axum app standing in for the FastAPI backend. One fallback handler
    //! dispatches on method and path, records every request, and keeps just
    //! enough state for the client flows under test.

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
    use axum::response::{IntoResponse, Response};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tokio::task::JoinHandle;

    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub method: String,
        pub path: String,
        pub bearer: Option<String>,
        pub body: Value,
    }

    struct Account {
        user: Value,
        password: String,
    }

    #[derive(Default)]
    struct Data {
        accounts: Vec<Account>,
        tokens: HashMap<String, i64>,
        collections: HashMap<&'static str, Vec<Value>>,
        forced: HashMap<String, (StatusCode, Value)>,
        requests: Vec<RecordedRequest>,
        next_id: i64,
    }

    impl Data {
        fn next_id(&mut self) -> i64 {
            self.next_id += 1;
            self.next_id
        }

        fn user_for(&self, bearer: Option<&str>) -> Option<Value> {
            let id = *self.tokens.get(bearer?)?;
            self.accounts
                .iter()
                .find(|a| a.user["id"] == id)
                .map(|a| a.user.clone())
        }

        fn mint(&mut self, user_id: i64) -> String {
            let token = format!("jwt-{}-{}", user_id, self.tokens.len() + 1);
            self.tokens.insert(token.clone(), user_id);
            token
        }
    }

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Data>>);

    pub struct MockBackend {
        pub base_url: String,
        shared: Shared,
        server: JoinHandle<()>,
    }

    impl Drop for MockBackend {
        fn drop(&mut self) {
            self.server.abort();
        }
    }

    impl MockBackend {
        /// Starts the mock with two accounts:
        /// `ada@example.com` / `secret` (user, id 7) and `root@example.com` / `rootpw` (admin, id 1).
        pub async fn start() -> Self {
            let shared = Shared::default();
            {
                let mut data = shared.0.lock().unwrap();
                data.next_id = 100;
                data.accounts.push(Account {
                    user: json!({
                        "id": 7, "email": "ada@example.com", "username": "ada",
                        "full_name": "Ada Lovelace", "role": "user", "is_active": true,
                        "phone": "555-0100", "bio": null, "avatar_url": null,
                        "created_at": "2024-05-01T10:00:00"
                    }),
                    password: "secret".to_string(),
                });
                data.accounts.push(Account {
                    user: json!({
                        "id": 1, "email": "root@example.com", "username": "root",
                        "full_name": "Root Admin", "role": "admin", "is_active": true
                    }),
                    password: "rootpw".to_string(),
                });
            }

            let app = Router::new().fallback(dispatch).with_state(shared.clone());
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let server = tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            Self {
                base_url: format!("http://{addr}"),
                shared,
                server,
            }
        }

        /// Makes the next request to `path` answer with `status` and `body`.
        pub fn force(&self, path: &str, status: StatusCode, body: Value) {
            self.shared
                .0
                .lock()
                .unwrap()
                .forced
                .insert(path.to_string(), (status, body));
        }

        /// Issues a token for an existing account without going through login.
        pub fn token_for(&self, user_id: i64) -> String {
            self.shared.0.lock().unwrap().mint(user_id)
        }

        pub fn revoke(&self, token: &str) {
            self.shared.0.lock().unwrap().tokens.remove(token);
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.shared.0.lock().unwrap().requests.clone()
        }

        pub fn last_request(&self, method: &str, path: &str) -> Option<RecordedRequest> {
            self.requests()
                .into_iter()
                .rev()
                .find(|r| r.method == method && r.path == path)
        }

        pub fn seed(&self, collection: &'static str, item: Value) {
            self.shared
                .0
                .lock()
                .unwrap()
                .collections
                .entry(collection)
                .or_default()
                .push(item);
        }

        pub fn collection(&self, collection: &'static str) -> Vec<Value> {
            self.shared
                .0
                .lock()
                .unwrap()
                .collections
                .get(collection)
                .cloned()
                .unwrap_or_default()
        }
    }

    fn detail(status: StatusCode, message: &str) -> Response {
        (status, Json(json!({ "detail": message }))).into_response()
    }

    const COLLECTIONS: [&str; 3] = ["resumes", "cover-letters", "portfolios"];

    async fn dispatch(
        State(shared): State<Shared>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        let path = uri.path().to_string();
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string);
        let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

        let mut data = shared.0.lock().unwrap();
        data.requests.push(RecordedRequest {
            method: method.to_string(),
            path: path.clone(),
            bearer: bearer.clone(),
            body: body.clone(),
        });

        if let Some((status, forced)) = data.forced.remove(&path) {
            return (status, Json(forced)).into_response();
        }

        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        match (method.as_str(), segments.as_slice()) {
            ("POST", ["api", "auth", "login"]) => {
                let found = data
                    .accounts
                    .iter()
                    .find(|a| a.user["email"] == body["email"] && a.password == body["password"])
                    .map(|a| a.user["id"].as_i64().unwrap_or_default());
                match found {
                    Some(id) => {
                        let token = data.mint(id);
                        Json(json!({ "access_token": token, "token_type": "bearer" })).into_response()
                    }
                    None => detail(StatusCode::UNAUTHORIZED, "Invalid email or password"),
                }
            }
            ("POST", ["api", "auth", "google"]) => {
                if body["credential"] == "google-ok" {
                    let token = data.mint(7);
                    Json(json!({ "access_token": token, "token_type": "bearer" })).into_response()
                } else {
                    detail(StatusCode::UNAUTHORIZED, "Invalid Google token")
                }
            }
            ("POST", ["api", "auth", "register"]) => {
                if data.accounts.iter().any(|a| a.user["email"] == body["email"]) {
                    return detail(StatusCode::BAD_REQUEST, "Email already registered");
                }
                let id = data.next_id();
                let user = json!({
                    "id": id, "email": body["email"], "username": body["username"],
                    "full_name": body["full_name"], "role": "user", "is_active": true,
                    "phone": body["phone"]
                });
                data.accounts.push(Account {
                    user: user.clone(),
                    password: body["password"].as_str().unwrap_or_default().to_string(),
                });
                (StatusCode::CREATED, Json(user)).into_response()
            }
            (_, ["api", ..]) => {
                let Some(current) = data.user_for(bearer.as_deref()) else {
                    return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
                };
                authenticated(&mut data, method.as_str(), &segments, current, body)
            }
            _ => detail(StatusCode::NOT_FOUND, "Not Found"),
        }
    }

    fn authenticated(
        data: &mut Data,
        method: &str,
        segments: &[&str],
        current: Value,
        body: Value,
    ) -> Response {
        let user_id = current["id"].as_i64().unwrap_or_default();
        match (method, segments) {
            ("GET", ["api", "auth", "me"]) => Json(current).into_response(),
            ("PUT", ["api", "auth", "me"]) => {
                let account = data
                    .accounts
                    .iter_mut()
                    .find(|a| a.user["id"] == user_id)
                    .expect("authenticated account exists");
                if let (Some(user), Some(update)) = (account.user.as_object_mut(), body.as_object()) {
                    for (k, v) in update {
                        user.insert(k.clone(), v.clone());
                    }
                }
                Json(account.user.clone()).into_response()
            }
            ("POST", ["api", "auth", "change-password"]) => {
                let account = data
                    .accounts
                    .iter_mut()
                    .find(|a| a.user["id"] == user_id)
                    .expect("authenticated account exists");
                if body["old_password"] != account.password.as_str() {
                    return detail(StatusCode::BAD_REQUEST, "Incorrect current password");
                }
                account.password = body["new_password"].as_str().unwrap_or_default().to_string();
                Json(json!({ "message": "Password changed successfully" })).into_response()
            }
            ("POST", ["api", "ai", "generate-resume"]) => Json(json!({
                "success": true,
                "message": "Resume generated successfully",
                "data": { "success": true, "generated_content": format!("ATS resume #{}", body["resume_id"]) }
            }))
            .into_response(),
            ("POST", ["api", "ai", "generate-cover-letter"]) => Json(json!({
                "success": true,
                "message": "Cover letter generated",
                "data": { "generated_content": format!("Dear hiring team (letter {})", body["cover_letter_id"]) }
            }))
            .into_response(),
            ("POST", ["api", "ai", "generate-portfolio"]) => {
                let id = data.next_id();
                let html = format!("<html>{} portfolio</html>", body["template"].as_str().unwrap_or("modern"));
                data.collections.entry("portfolios").or_default().push(json!({
                    "id": id, "user_id": user_id, "title": "My Portfolio",
                    "template": body["template"], "generated_html": html, "is_published": false
                }));
                Json(json!({ "success": true, "message": "Portfolio generated", "data": { "generated_html": html } }))
                    .into_response()
            }
            ("POST", ["api", "ai", "score-resume"]) => Json(json!({
                "id": 1, "resume_id": body["resume_id"], "overall_score": 72.4,
                "keyword_match_score": 64.0, "format_score": 90.0, "content_score": 70.0,
                "missing_keywords": ["kubernetes"], "suggestions": ["Quantify impact"],
                "detailed_analysis": "Solid match"
            }))
            .into_response(),
            ("POST", ["api", "ai", "skill-analysis"]) => {
                let required = vec!["python", "go", "kubernetes"];
                let have: Vec<String> = body["user_skills"]
                    .as_array()
                    .map(|a| a.iter().filter_map(|s| s.as_str()).map(str::to_lowercase).collect())
                    .unwrap_or_default();
                let missing: Vec<&str> = required
                    .iter()
                    .copied()
                    .filter(|r| !have.iter().any(|h| h == r))
                    .collect();
                let pct = 100.0 * (required.len() - missing.len()) as f64 / required.len() as f64;
                Json(json!({
                    "id": 1, "job_role": body["job_role"], "required_skills": required,
                    "user_skills": body["user_skills"], "missing_skills": missing,
                    "match_percentage": pct, "recommendations": ["Learn kubernetes"]
                }))
                .into_response()
            }
            ("GET", ["api", "ai", "download-pdf", id]) => (
                [(header::CONTENT_TYPE, "application/pdf")],
                format!("%PDF-1.4 resume {id}"),
            )
                .into_response(),
            (_, ["api", "admin", ..]) if current["role"] != "admin" => {
                detail(StatusCode::FORBIDDEN, "Admin access required")
            }
            ("GET", ["api", "admin", "dashboard"]) => Json(json!({
                "total_users": data.accounts.len(),
                "total_resumes": data.collections.get("resumes").map_or(0, Vec::len),
                "total_cover_letters": data.collections.get("cover-letters").map_or(0, Vec::len),
                "total_portfolios": data.collections.get("portfolios").map_or(0, Vec::len),
                "total_scores": 0,
                "most_requested_roles": [{ "role": "Backend Engineer", "count": 3 }]
            }))
            .into_response(),
            ("GET", ["api", "admin", "users"]) => {
                let users: Vec<Value> = data.accounts.iter().map(|a| a.user.clone()).collect();
                Json(users).into_response()
            }
            ("PUT", ["api", "admin", "users", id, "toggle-active"]) => {
                let id: i64 = id.parse().unwrap_or_default();
                match data.accounts.iter_mut().find(|a| a.user["id"] == id) {
                    Some(account) => {
                        let active = !account.user["is_active"].as_bool().unwrap_or(false);
                        account.user["is_active"] = json!(active);
                        let verb = if active { "activated" } else { "deactivated" };
                        Json(json!({ "message": format!("User {verb} successfully") })).into_response()
                    }
                    None => detail(StatusCode::NOT_FOUND, "User not found"),
                }
            }
            (_, ["api", collection, rest @ ..]) => match COLLECTIONS.iter().find(|c| *c == collection) {
                Some(name) => crud(data, name, method, rest, user_id, body),
                None => detail(StatusCode::NOT_FOUND, "Not Found"),
            },
            _ => detail(StatusCode::NOT_FOUND, "Not Found"),
        }
    }

    fn crud(
        data: &mut Data,
        name: &'static str,
        method: &str,
        rest: &[&str],
        user_id: i64,
        body: Value,
    ) -> Response {
        let id = data.next_id();
        let items = data.collections.entry(name).or_default();
        let target: Option<i64> = rest.first().filter(|s| !s.is_empty()).and_then(|s| s.parse().ok());
        match (method, target) {
            ("GET", None) => Json(items.clone()).into_response(),
            ("POST", None) => {
                let mut item = body;
                item["id"] = json!(id);
                item["user_id"] = json!(user_id);
                items.insert(0, item.clone());
                (StatusCode::CREATED, Json(item)).into_response()
            }
            ("GET", Some(target)) => match items.iter().find(|i| i["id"] == target) {
                Some(item) => Json(item.clone()).into_response(),
                None => detail(StatusCode::NOT_FOUND, "Not found"),
            },
            ("PUT", Some(target)) => match items.iter_mut().find(|i| i["id"] == target) {
                Some(item) => {
                    if let (Some(obj), Some(update)) = (item.as_object_mut(), body.as_object()) {
                        for (k, v) in update {
                            obj.insert(k.clone(), v.clone());
                        }
                    }
                    Json(item.clone()).into_response()
                }
                None => detail(StatusCode::NOT_FOUND, "Not found"),
            },
            ("DELETE", Some(target)) => {
                let before = items.len();
                items.retain(|i| i["id"] != target);
                if items.len() == before {
                    detail(StatusCode::NOT_FOUND, "Not found")
                } else {
                    Json(json!({ "message": "Deleted successfully" })).into_response()
                }
            }
            _ => detail(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"),
        }
    }
}
