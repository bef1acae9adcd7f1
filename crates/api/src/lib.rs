//! Action server client utilities.
//!
//! This module provides a lightweight client for the action server. It
//! focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Validating the configured base URL for safety
//! - Fetching the server configuration and the action catalog
//! - Running an action and turning the response into a value or an error message
//!
//! The form engine only depends on the [`ActionInvoker`] and
//! [`ServerConfigProvider`] traits, so tests can substitute fakes for
//! [`ActionServerClient`].

use std::env;
use std::time::Duration;

use actrun_types::{ActionPackage, ServerConfig};
use actrun_util::redact_sensitive;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, header};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Environment variable holding the action server base URL.
pub const SERVER_URL_ENV: &str = "ACTRUN_SERVER_URL";
/// Base URL used when nothing is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1", "[::1]"];
/// Keys inspected, in order, for an error message in a failed response body.
const ERROR_MESSAGE_KEYS: &[&str] = &["detail", "message", "error"];

/// Failure of a run-action call; `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("{0}")]
    Network(String),
    #[error("{message}")]
    Status { status: u16, message: String },
}

impl RunError {
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Issues run-action calls.
#[async_trait]
pub trait ActionInvoker: Send + Sync {
    /// Run `action_id` from `package_id` with `payload`.
    ///
    /// `Ok(None)` means the server answered successfully without a value.
    async fn run_action(
        &self,
        package_id: &str,
        action_id: &str,
        payload: &Value,
        api_key: Option<&str>,
    ) -> Result<Option<Value>, RunError>;
}

/// Exposes server-wide settings such as whether authentication is enabled.
#[async_trait]
pub trait ServerConfigProvider: Send + Sync {
    async fn server_config(&self) -> Result<ServerConfig>;
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for action server access.
pub struct ActionServerClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
}

impl ActionServerClient {
    /// Construct a client for `base_url` after validating it.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        validate_base_url(&base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(300))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .context("build http client")?;

        Ok(Self {
            base_url,
            http,
            user_agent: format!("actrun/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    /// Construct a client from an explicit URL, `ACTRUN_SERVER_URL`, or the default.
    pub fn from_env(override_url: Option<&str>) -> Result<Self> {
        let base_url = resolve_base_url(override_url);
        Self::new(&base_url)
    }

    /// Build a request for a server-relative path.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, %method, "building request");

        self.http.request(method, url).header(header::USER_AGENT, &self.user_agent)
    }

    /// Build the run-action call, attaching `Authorization: Bearer` for a non-empty key.
    pub fn run_request(&self, package_id: &str, action_id: &str, payload: &Value, api_key: Option<&str>) -> RequestBuilder {
        let builder = self.request(Method::POST, &run_path(package_id, action_id)).json(payload);
        match api_key.filter(|key| !key.is_empty()) {
            Some(key) => {
                let authorization = format!("Bearer {key}");
                debug!(header = %redact_sensitive(&format!("authorization: {authorization}")), "attaching credential");
                builder.header(header::AUTHORIZATION, authorization)
            }
            None => builder,
        }
    }

    /// Fetch the packages and their actions.
    pub async fn list_action_packages(&self) -> Result<Vec<ActionPackage>> {
        let response = self
            .request(Method::GET, "/api/actionPackages")
            .send()
            .await
            .map_err(|e| anyhow!(transport_error_message(e)))?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(anyhow!("listing action packages failed: {}", error_message(status, &text)));
        }
        serde_json::from_str(&text).context("decode action packages")
    }
}

#[async_trait]
impl ServerConfigProvider for ActionServerClient {
    async fn server_config(&self) -> Result<ServerConfig> {
        let response = self
            .request(Method::GET, "/config")
            .send()
            .await
            .map_err(|e| anyhow!(transport_error_message(e)))?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(anyhow!("fetching server config failed: {}", error_message(status, &text)));
        }
        serde_json::from_str(&text).context("decode server config")
    }
}

#[async_trait]
impl ActionInvoker for ActionServerClient {
    async fn run_action(
        &self,
        package_id: &str,
        action_id: &str,
        payload: &Value,
        api_key: Option<&str>,
    ) -> Result<Option<Value>, RunError> {
        let response = self
            .run_request(package_id, action_id, payload, api_key)
            .send()
            .await
            .map_err(|e| RunError::Network(transport_error_message(e)))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RunError::Network(format!("Failed to read response: {}", error_chain(&e))))?;
        debug!(%status, bytes = text.len(), "run response received");
        parse_run_response(status, &text)
    }
}

/// `Network error: <error>: <cause>: …` for a failed send.
fn transport_error_message(error: reqwest::Error) -> String {
    format!("Network error: {}", error_chain(&error))
}

/// Display of `error` followed by each of its sources.
fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Server-relative path of the run endpoint.
pub fn run_path(package_id: &str, action_id: &str) -> String {
    format!("/api/actions/{package_id}/{action_id}/run")
}

/// Interpret a run response.
///
/// Successful bodies are decoded as JSON; an empty body is the undefined
/// result and a non-JSON body is returned as a string.
pub fn parse_run_response(status: StatusCode, text: &str) -> Result<Option<Value>, RunError> {
    if !status.is_success() {
        return Err(RunError::Status {
            status: status.as_u16(),
            message: error_message(status, text),
        });
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(
        serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(text.to_string())),
    ))
}

/// Extract a user-facing message from a failed response.
fn error_message(status: StatusCode, text: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        for key in ERROR_MESSAGE_KEYS {
            match map.get(*key) {
                Some(Value::String(message)) if !message.is_empty() => return message.clone(),
                Some(Value::Null) | None => {}
                Some(other) => return other.to_string(),
            }
        }
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        trimmed.to_string()
    }
}

fn resolve_base_url(override_url: Option<&str>) -> String {
    override_url
        .map(str::to_string)
        .filter(|url| !url.trim().is_empty())
        .or_else(|| env::var(SERVER_URL_ENV).ok().filter(|url| !url.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or a loopback address: any http(s) scheme is allowed
/// - otherwise: scheme must be HTTPS
fn validate_base_url(base: &str) -> Result<()> {
    let parsed_base_url = Url::parse(base).map_err(|e| anyhow!("Invalid server URL '{}': {}", base, e))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| anyhow!("server URL must include a host"))?;

    if !matches!(parsed_base_url.scheme(), "http" | "https") {
        return Err(anyhow!("server URL must use http or https; got '{}://'", parsed_base_url.scheme()));
    }

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed_base_url.scheme() != "https" {
        return Err(anyhow!(
            "server URL must use https for non-localhost hosts; got '{}://'",
            parsed_base_url.scheme()
        ));
    }

    Ok(())
}
