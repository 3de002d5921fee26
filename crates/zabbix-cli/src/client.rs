//! Zabbix JSON-RPC client.
//!
//! Requests are posted to `<url>/api_jsonrpc.php` as JSON-RPC 2.0 envelopes.
//! The session is established on the first call, either from a configured
//! API token or through `user.login`.
//!
//! # Example
//!
//! ```rust,no_run
//! use serde_json::json;
//! use zabbix_cli::client::{JsonRpcClient, ZabbixApi};
//! use zabbix_cli::config::ApiConfig;
//!
//! # async fn example() -> Result<(), zabbix_cli::CliError> {
//! let config = ApiConfig {
//!     url: "https://zabbix.example.com".into(),
//!     auth_token: "secret".into(),
//!     ..ApiConfig::default()
//! };
//! let client = JsonRpcClient::new(&config)?;
//! let hosts = client.call("host.get", json!({"output": ["host"]})).await?;
//! println!("{hosts}");
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::config::ApiConfig;
use crate::error::CliError;

/// Path of the JSON-RPC endpoint relative to the frontend URL.
const API_PATH: &str = "api_jsonrpc.php";

/// Methods that must be called without a session.
const UNAUTHENTICATED_METHODS: &[&str] = &["apiinfo.version", "user.login"];

/// Access to the Zabbix API.
///
/// This trait allows commands to be tested with fake implementations.
pub trait ZabbixApi: Send + Sync {
    /// Call an API method and return its `result`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API returns an error.
    fn call<'a>(&'a self, method: &'a str, params: Value) -> BoxFuture<'a, Result<Value, CliError>>;
}

/// Credentials used to open a session.
enum Credentials {
    Token(String),
    Password { username: String, password: String },
}

#[derive(Debug, Default)]
struct Session {
    token: Option<String>,
    /// Session came from `user.login` and should be closed with `user.logout`.
    logged_in: bool,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<String>,
}

/// JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// HTTP JSON-RPC client for the Zabbix API.
pub struct JsonRpcClient {
    http: reqwest::Client,
    endpoint: String,
    credentials: Credentials,
    session: Mutex<Session>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for JsonRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl JsonRpcClient {
    /// Create a client from API settings. No request is sent until the first
    /// call.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be
    /// built.
    pub fn new(config: &ApiConfig) -> Result<Self, CliError> {
        if !config.url.starts_with("http://") && !config.url.starts_with("https://") {
            return Err(CliError::Config(format!(
                "invalid API URL: {}, must start with http:// or https://",
                config.url
            )));
        }

        let mut builder = reqwest::Client::builder().danger_accept_invalid_certs(!config.verify_ssl);
        if config.timeout > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout));
        }
        let http = builder
            .build()
            .map_err(|e| CliError::Connection(format!("failed to build HTTP client: {e}")))?;

        let credentials = if config.auth_token.is_empty() {
            Credentials::Password {
                username: config.username.clone(),
                password: config.password.clone(),
            }
        } else {
            Credentials::Token(config.auth_token.clone())
        };

        Ok(Self {
            http,
            endpoint: endpoint_url(&config.url),
            credentials,
            session: Mutex::new(Session::default()),
            next_id: AtomicU64::new(1),
        })
    }

    /// The JSON-RPC endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Close a session opened with `user.login`. Does nothing for token
    /// sessions or when no session was opened.
    ///
    /// # Errors
    ///
    /// Returns an error if the logout request fails.
    pub async fn logout(&self) -> Result<(), CliError> {
        let mut session = self.session.lock().await;
        if !session.logged_in {
            return Ok(());
        }
        let token = session.token.take();
        session.logged_in = false;
        self.send("user.logout", json!([]), token.as_deref()).await?;
        debug!("logged out");
        Ok(())
    }

    async fn token(&self) -> Result<String, CliError> {
        let mut session = self.session.lock().await;
        if let Some(token) = &session.token {
            return Ok(token.clone());
        }

        let token = match &self.credentials {
            Credentials::Token(token) => token.clone(),
            Credentials::Password { username, password } => {
                let result = self
                    .send(
                        "user.login",
                        json!({ "username": username, "password": password }),
                        None,
                    )
                    .await?;
                session.logged_in = true;
                result
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| CliError::Protocol("user.login did not return a token".into()))?
            }
        };

        session.token = Some(token.clone());
        debug!(logged_in = session.logged_in, "session established");
        Ok(token)
    }

    async fn send(&self, method: &str, params: Value, token: Option<&str>) -> Result<Value, CliError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        trace!(method, id, "sending request");
        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                CliError::Timeout(format!("request '{method}' timed out"))
            } else {
                CliError::Connection(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CliError::Connection(e.to_string()))?;
        if !status.is_success() {
            return Err(CliError::Connection(format!("HTTP {status} from {}", self.endpoint)));
        }

        trace!(method, id, "received response");
        parse_response(&text)
    }
}

impl ZabbixApi for JsonRpcClient {
    fn call<'a>(&'a self, method: &'a str, params: Value) -> BoxFuture<'a, Result<Value, CliError>> {
        async move {
            let token = if UNAUTHENTICATED_METHODS.iter().any(|m| *m == method) {
                None
            } else {
                Some(self.token().await?)
            };
            self.send(method, params, token.as_deref()).await
        }
        .boxed()
    }
}

/// Build the endpoint URL from the frontend URL.
fn endpoint_url(url: &str) -> String {
    let url = url.trim_end_matches('/');
    if url.ends_with(API_PATH) {
        url.to_string()
    } else {
        format!("{url}/{API_PATH}")
    }
}

/// Extract the result from a JSON-RPC response body.
fn parse_response(text: &str) -> Result<Value, CliError> {
    let response: RpcResponse =
        serde_json::from_str(text).map_err(|e| CliError::Protocol(format!("invalid JSON-RPC response: {e}")))?;

    if let Some(error) = response.error {
        return Err(CliError::Api {
            code: error.code,
            message: error.message,
            data: error.data.filter(|d| !d.is_empty()),
        });
    }
    response
        .result
        .ok_or_else(|| CliError::Protocol("response has neither result nor error".into()))
}
