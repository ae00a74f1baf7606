//! Main API client implementation

use crate::config::ClientConfig;
use crate::endpoints::{AuthApi, ListingsApi};
use crate::error::{ApiError, ApiResult};
use crate::options::{merge_headers, RequestOptions};
use crate::session::Session;
use hyper::ext::ReasonPhrase;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn, Span};
use tradepost_core::storage::{FileStore, KeyValueStore, MemoryStore};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Tradepost API client
///
/// Wraps `reqwest` and adds:
/// - Bearer token injection from a persisted session
/// - A hard per-request timeout that aborts the transport
/// - Classification of failed responses into [`ApiError`] variants
/// - Request correlation IDs for tracing
///
/// Cloning is cheap; clones share the connection pool, cookie jar and session.
#[derive(Clone)]
pub struct ApiClient {
    inner: Client,
    config: Arc<ClientConfig>,
    session: Arc<Session>,
}

impl ApiClient {
    /// Create a new client with configuration from the environment
    pub fn new() -> ApiResult<Self> {
        let config = ClientConfig::from_env()?;
        Self::with_config(config)
    }

    /// Create a new client with specific configuration
    ///
    /// The session token is persisted to `config.session_file` when set and
    /// kept in memory otherwise.
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        let store: Arc<dyn KeyValueStore> = match &config.session_file {
            Some(path) => Arc::new(FileStore::new(path)),
            None => Arc::new(MemoryStore::new()),
        };
        Self::with_store(config, store)
    }

    /// Create a new client persisting its session into `store`
    pub fn with_store(config: ClientConfig, store: Arc<dyn KeyValueStore>) -> ApiResult<Self> {
        config.validate()?;

        // Session cookies set by the backend accompany later requests.
        let inner = Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            inner,
            config: Arc::new(config),
            session: Arc::new(Session::restore(store)),
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    /// Replace the bearer token; `None` signs out
    pub fn set_token(&self, token: Option<String>) {
        self.session.set_token(token);
    }

    /// Forget the bearer token
    pub fn clear_token(&self) {
        self.session.set_token(None);
    }

    /// Current bearer token
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    /// Whether a bearer token is set
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    // -------------------------------------------------------------------------
    // Endpoint API accessors
    // -------------------------------------------------------------------------

    /// Access authentication endpoints
    #[must_use]
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access marketplace listing endpoints
    #[must_use]
    pub fn listings(&self) -> ListingsApi {
        ListingsApi::new(self.clone())
    }

    // -------------------------------------------------------------------------
    // HTTP verbs
    // -------------------------------------------------------------------------

    /// Perform a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.get_with(path, RequestOptions::new()).await
    }

    /// Perform a GET request with extra options. Any body is dropped.
    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        self.request(path, options.method(Method::GET).without_body())
            .await
    }

    /// Perform a POST request; the body is sent as JSON only when given
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<T> {
        self.post_with(path, body, RequestOptions::new()).await
    }

    /// Perform a POST request with extra options
    pub async fn post_with<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> ApiResult<T> {
        let options = with_json_body(options, body)?;
        self.request(path, options.method(Method::POST)).await
    }

    /// Perform a PUT request; the body is sent as JSON only when given
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<T> {
        self.put_with(path, body, RequestOptions::new()).await
    }

    /// Perform a PUT request with extra options
    pub async fn put_with<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> ApiResult<T> {
        let options = with_json_body(options, body)?;
        self.request(path, options.method(Method::PUT)).await
    }

    /// Perform a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.delete_with(path, RequestOptions::new()).await
    }

    /// Perform a DELETE request with extra options. Any body is dropped.
    pub async fn delete_with<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        self.request(path, options.method(Method::DELETE).without_body())
            .await
    }

    // -------------------------------------------------------------------------
    // Shared request path
    // -------------------------------------------------------------------------

    /// Execute a request and decode the JSON response into `T`
    ///
    /// Never retries. Failures are classified as described on [`ApiError`].
    #[instrument(skip(self, options), fields(method, request_id))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        let method = options.effective_method();
        let request_id = Uuid::new_v4().to_string();
        let span = Span::current();
        span.record("method", method.as_str());
        span.record("request_id", request_id.as_str());

        let url = self.config.url_for(path);
        let headers = self.compose_headers(&options.headers)?;

        let mut request = self
            .inner
            .request(method.clone(), &url)
            .headers(headers)
            .header(X_REQUEST_ID, &request_id);

        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = options.body {
            request = request.body(body);
        }

        let start = Instant::now();
        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let reason = reason_phrase(&response);
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, reason, bytes))
        };

        // Dropping `exchange` on expiry aborts the in-flight request.
        let (status, reason, bytes) = match tokio::time::timeout(self.config.timeout, exchange).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ApiError::Timeout {
                    after: self.config.timeout,
                });
            }
        };

        debug!(
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis(),
            bytes = bytes.len(),
            "Response received"
        );

        if !status.is_success() {
            return Err(self.failure(path, &method, status, reason.as_deref(), &bytes));
        }

        decode_body(&bytes)
    }

    /// Default JSON headers, caller overrides, then the bearer token
    fn compose_headers(&self, overrides: &HeaderMap) -> ApiResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        merge_headers(&mut headers, overrides);

        if let Some(token) = self.session.token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    /// Classify a failed response, logging it outside production
    fn failure(
        &self,
        path: &str,
        method: &Method,
        status: StatusCode,
        reason: Option<&str>,
        body: &[u8],
    ) -> ApiError {
        let error = ApiError::from_response(status, reason, body);

        if self.config.environment.logs_diagnostics() {
            let detail = match &error {
                ApiError::Validation { errors, .. } => Value::Object(errors.clone()).to_string(),
                ApiError::Api { body, .. } => body.to_string(),
                other => other.to_string(),
            };
            warn!(
                path,
                method = %method,
                status = status.as_u16(),
                error = %error,
                detail = %detail,
                "API request failed"
            );
        }

        error
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Reason phrase from the status line, present only when the server sent a
/// non-canonical one (e.g. `419 Page Expired`)
fn reason_phrase(response: &reqwest::Response) -> Option<String> {
    response
        .extensions()
        .get::<ReasonPhrase>()
        .and_then(|reason| std::str::from_utf8(reason.as_bytes()).ok())
        .map(str::to_owned)
}

fn with_json_body<B: Serialize + ?Sized>(
    options: RequestOptions,
    body: Option<&B>,
) -> ApiResult<RequestOptions> {
    match body {
        Some(body) => options.json(body),
        None => Ok(options),
    }
}

/// Decode a success body. An empty body reads as JSON `null`, so `()` and
/// `Option<_>` targets accept `204 No Content`.
fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> ApiResult<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(Value::Null)?);
    }
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::session::TOKEN_KEY;
    use reqwest::header::HeaderName;
    use std::io;
    use std::sync::Mutex;

    fn client_with_token(token: Option<&str>) -> ApiClient {
        let store = match token {
            Some(token) => MemoryStore::with_entry(TOKEN_KEY, token),
            None => MemoryStore::new(),
        };
        ApiClient::with_store(ClientConfig::development(), Arc::new(store)).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let config = ClientConfig::development().without_session_file();
        let client = ApiClient::with_config(config);
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ClientConfig::development().with_base_url("");
        assert!(matches!(ApiClient::with_config(config), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_headers_without_token_have_no_authorization() {
        let client = client_with_token(None);
        let headers = client.compose_headers(&HeaderMap::new()).unwrap();

        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
    }

    #[test]
    fn test_headers_with_restored_token() {
        let client = client_with_token(Some("tok"));
        let headers = client.compose_headers(&HeaderMap::new()).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn test_overrides_apply_before_token() {
        let client = client_with_token(Some("tok"));
        let mut overrides = HeaderMap::new();
        overrides.insert(CONTENT_TYPE, HeaderValue::from_static("multipart/form-data"));
        overrides.insert(
            HeaderName::from_static("x-locale"),
            HeaderValue::from_static("ar"),
        );

        let headers = client.compose_headers(&overrides).unwrap();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "multipart/form-data");
        assert_eq!(headers.get("x-locale").unwrap(), "ar");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
    }

    #[test]
    fn test_token_with_newline_is_rejected() {
        let client = client_with_token(None);
        client.set_token(Some("bad\ntoken".to_string()));
        assert!(matches!(
            client.compose_headers(&HeaderMap::new()),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn test_clones_share_session() {
        let client = client_with_token(None);
        let clone = client.clone();
        client.set_token(Some("shared".to_string()));
        assert_eq!(clone.token().as_deref(), Some("shared"));
        clone.clear_token();
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_decode_empty_body() {
        assert!(decode_body::<()>(b"").is_ok());
        let nothing: Option<Value> = decode_body(b"  \n").unwrap();
        assert!(nothing.is_none());
        assert!(matches!(decode_body::<Value>(b"{oops"), Err(ApiError::Json(_))));
    }

    /// Log sink shared between the subscriber and the assertions
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn failure_logs(environment: Environment) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();

        let client = ApiClient::with_store(
            ClientConfig::development().with_environment(environment),
            Arc::new(MemoryStore::new()),
        )
        .unwrap();

        let error = tracing::subscriber::with_default(subscriber, || {
            client.failure(
                "/listings/7",
                &Method::DELETE,
                StatusCode::FORBIDDEN,
                None,
                br#"{"message":"Not your listing"}"#,
            )
        });
        assert_eq!(error.status(), Some(403));

        logs.contents()
    }

    #[test]
    fn test_failure_logged_outside_production() {
        let logs = failure_logs(Environment::Development);

        assert!(logs.contains("WARN"));
        assert!(logs.contains("/listings/7"));
        assert!(logs.contains("DELETE"));
        assert!(logs.contains("status=403"));
        assert!(logs.contains("Not your listing"));

        assert!(failure_logs(Environment::Staging).contains("status=403"));
    }

    #[test]
    fn test_failure_silent_in_production() {
        assert!(failure_logs(Environment::Production).is_empty());
    }
}
