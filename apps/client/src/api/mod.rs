//! API gateway: the only place that talks HTTP to the backend.
//!
//! Every request carries the session's bearer token. A 401 clears the session
//! and sends the user to `/login`, unless a sign-in exchange is running or the
//! rejected token has already been replaced. No retries, no caching.

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::{error_detail, AuthError, ClientError};
use crate::router::{Navigator, Route};
use crate::session::SessionCore;

pub mod admin;
pub mod ai;
pub mod auth;
pub mod documents;

/// Which token, if any, a request carries.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Credential<'a> {
    /// Whatever token the session holds when the request is sent.
    Session,
    /// A specific token, e.g. one just issued and not yet committed.
    Bearer(&'a str),
    /// Sign-in and registration calls: no token, and a 401 means bad credentials.
    Exchange,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionCore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        config: &Config,
        session: Arc<SessionCore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
            navigator,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Sends one request and maps any non-2xx status to a `ClientError`.
    pub(crate) async fn execute(
        &self,
        request: RequestBuilder,
        credential: Credential<'_>,
    ) -> Result<Response, ClientError> {
        let token = match credential {
            Credential::Session => self.session.token(),
            Credential::Bearer(token) => Some(token.to_string()),
            Credential::Exchange => None,
        };
        let request = match &token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            warn!("Request failed before a response arrived: {e}");
            ClientError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!("Could not read {status} error body: {e}");
                String::new()
            }
        };
        let detail = error_detail(&body);
        warn!(
            "API returned {}: {}",
            status,
            detail.as_deref().unwrap_or(body.as_str())
        );

        Err(match (status.as_u16(), credential) {
            (401, Credential::Exchange) => AuthError::InvalidCredentials(
                detail.unwrap_or_else(|| "Invalid credentials".to_string()),
            )
            .into(),
            (401, _) => {
                self.handle_unauthorized(token.as_deref());
                AuthError::SessionExpired.into()
            }
            (403, _) => AuthError::Forbidden(
                detail.unwrap_or_else(|| "Not enough permissions".to_string()),
            )
            .into(),
            (code, _) => ClientError::Server {
                status: code,
                message: detail.unwrap_or_default(),
            },
        })
    }

    fn handle_unauthorized(&self, rejected: Option<&str>) {
        if self.session.is_exchanging() {
            debug!("401 during sign-in exchange; leaving session alone");
            return;
        }
        if let Some(token) = rejected {
            if !self.session.invalidate_if_current(token) {
                debug!("401 for a superseded token; leaving session alone");
                return;
            }
            warn!("Session rejected by server; signed out");
        }
        let here = self.navigator.current_path();
        if Route::parse(&here) != Some(Route::Login) {
            self.navigator.navigate(&Route::Login.path());
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .execute(self.request(Method::GET, path), Credential::Session)
            .await?;
        decode(response).await
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(self.request(method, path).json(body), Credential::Session)
            .await?;
        decode(response).await
    }

    /// For endpoints that take no body, such as the admin toggle.
    pub(crate) async fn send_empty<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
    ) -> Result<T, ClientError> {
        let response = self
            .execute(self.request(method, path), Credential::Session)
            .await?;
        decode(response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.execute(self.request(Method::DELETE, path), Credential::Session)
            .await?;
        Ok(())
    }
}

/// Reads the body as text first so a malformed payload surfaces as a decode
/// error with serde's message rather than a transport error.
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::Resume;
    use crate::router::History;
    use crate::storage::MemoryStore;
    use crate::test_support::{sample_user, MockBackend};
    use axum::http::StatusCode;
    use serde_json::json;

    struct Harness {
        backend: MockBackend,
        api: ApiClient,
        core: Arc<SessionCore>,
        history: Arc<History>,
    }

    async fn harness(location: &str) -> Harness {
        let backend = MockBackend::start().await;
        let core = SessionCore::new(Arc::new(MemoryStore::new()));
        let history = Arc::new(History::new(location));
        let config = Config {
            api_base_url: backend.base_url.clone(),
            ..Config::default()
        };
        let api = ApiClient::new(&config, core.clone(), history.clone()).unwrap();
        Harness {
            backend,
            api,
            core,
            history,
        }
    }

    #[tokio::test]
    async fn test_attaches_session_token() {
        let h = harness("/dashboard").await;
        let token = h.backend.token_for(7);
        h.core.commit_login(token.clone(), sample_user()).unwrap();

        let resumes: Vec<Resume> = h.api.get_json("/api/resumes/").await.unwrap();

        assert!(resumes.is_empty());
        let req = h.backend.last_request("GET", "/api/resumes/").unwrap();
        assert_eq!(req.bearer.as_deref(), Some(token.as_str()));
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session_and_redirects() {
        let h = harness("/dashboard").await;
        h.core.commit_login("revoked".into(), sample_user()).unwrap();

        let err = h.api.get_json::<Vec<Resume>>("/api/resumes/").await.unwrap_err();

        assert!(matches!(err, ClientError::Auth(AuthError::SessionExpired)));
        assert!(!h.core.snapshot().is_authenticated());
        assert_eq!(h.history.current_path(), "/login");
    }

    #[tokio::test]
    async fn test_unauthorized_on_login_page_does_not_navigate() {
        let h = harness("/login").await;
        h.core.commit_login("revoked".into(), sample_user()).unwrap();

        let _ = h.api.get_json::<Vec<Resume>>("/api/resumes/").await;

        assert!(!h.core.snapshot().is_authenticated());
        assert_eq!(h.history.entries(), vec!["/login"]);
    }

    #[tokio::test]
    async fn test_unauthorized_for_superseded_token_keeps_session() {
        let h = harness("/dashboard").await;
        let current = h.backend.token_for(7);
        h.core.commit_login(current.clone(), sample_user()).unwrap();

        let err = h
            .api
            .execute(
                h.api.request(Method::GET, "/api/auth/me"),
                Credential::Bearer("old-token"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Auth(AuthError::SessionExpired)));
        assert_eq!(h.core.token().as_deref(), Some(current.as_str()));
        assert_eq!(h.history.current_path(), "/dashboard");
    }

    #[tokio::test]
    async fn test_unauthorized_during_exchange_keeps_session() {
        let h = harness("/dashboard").await;
        h.core.commit_login("revoked".into(), sample_user()).unwrap();

        let _guard = h.core.begin_exchange();
        let _ = h.api.get_json::<Vec<Resume>>("/api/resumes/").await;

        assert_eq!(h.core.token().as_deref(), Some("revoked"));
        assert_eq!(h.history.current_path(), "/dashboard");
    }

    #[tokio::test]
    async fn test_forbidden_keeps_session() {
        let h = harness("/admin").await;
        let token = h.backend.token_for(7);
        h.core.commit_login(token, sample_user()).unwrap();

        let err = h
            .api
            .get_json::<serde_json::Value>("/api/admin/dashboard")
            .await
            .unwrap_err();

        assert!(
            matches!(err, ClientError::Auth(AuthError::Forbidden(ref msg)) if msg == "Admin access required")
        );
        assert!(h.core.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn test_server_error_carries_detail() {
        let h = harness("/dashboard").await;
        let token = h.backend.token_for(7);
        h.core.commit_login(token, sample_user()).unwrap();
        h.backend.force(
            "/api/resumes/",
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "detail": "database unavailable" }),
        );

        let err = h.api.get_json::<Vec<Resume>>("/api/resumes/").await.unwrap_err();

        match err {
            ClientError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "database unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let h = harness("/dashboard").await;
        let token = h.backend.token_for(7);
        h.core.commit_login(token, sample_user()).unwrap();
        h.backend
            .force("/api/resumes/", StatusCode::OK, json!({ "unexpected": true }));

        let err = h.api.get_json::<Vec<Resume>>("/api/resumes/").await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let core = SessionCore::new(Arc::new(MemoryStore::new()));
        let config = Config {
            api_base_url: "http://127.0.0.1:1".to_string(),
            ..Config::default()
        };
        let api = ApiClient::new(&config, core, Arc::new(History::default())).unwrap();

        let err = api.get_json::<Vec<Resume>>("/api/resumes/").await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[tokio::test]
    async fn test_truncated_error_body_still_maps_status() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            // Promises 100 bytes, sends a few, then hangs up.
            let _ = socket
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\n{\"det")
                .await;
        });

        let core = SessionCore::new(Arc::new(MemoryStore::new()));
        let config = Config {
            api_base_url: format!("http://{addr}"),
            ..Config::default()
        };
        let api = ApiClient::new(&config, core, Arc::new(History::new("/dashboard"))).unwrap();

        let err = api.get_json::<Vec<Resume>>("/api/resumes/").await.unwrap_err();

        assert!(matches!(err, ClientError::Server { status: 500, ref message } if message.is_empty()));
    }
}
