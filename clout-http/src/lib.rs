//! Minimal JSON-over-HTTP client with safe logging and bearer auth.
//!
//! - One request per call: no retries, no backoff
//! - Optional per-client timeout; unset means no timeout of any kind
//! - Every request carries `Cache-Control: no-store`
//! - Secrets are never logged; only the auth kind is recorded
//! - Optional *raw* request/response logging via `CLOUT_HTTP_RAW=1`
//!
//! ```no_run
//! # async fn demo() -> Result<(), clout_http::HttpError> {
//! let client = clout_http::HttpClient::new("https://api.example.com/v1")?;
//! let got: serde_json::Value = client
//!     .post_json("items", Some("secret"), &serde_json::json!({"q": 1}))
//!     .await?;
//! # Ok(()) }
//! ```

use reqwest::header::{HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use thiserror::Error;

const RAW_ENV: &str = "CLOUT_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

/// Authentication strategies supported by the client.
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Authorization: Bearer <token>
    Bearer(&'a str),
    None,
}

impl Auth<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Auth::Bearer(_) => "bearer",
            Auth::None => "none",
        }
    }
}

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Option<Duration>,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// Paths passed to the request helpers are resolved relative to the base,
    /// so a base of `https://api.openai.com/v1` plus `chat/completions` lands on
    /// `https://api.openai.com/v1/chat/completions`.
    ///
    /// ```
    /// use clout_http::{HttpClient, HttpError};
    ///
    /// let client = HttpClient::new("https://api.example.com/v1")?;
    /// assert!(client.default_timeout.is_none());
    /// assert_eq!(client.base_url().as_str(), "https://api.example.com/v1/");
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        };
        let base = Url::parse(&normalized).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: None,
        })
    }

    /// Apply a timeout to every request made by this client.
    ///
    /// It bounds the whole exchange, connect included. With `None` a request
    /// waits as long as the server and the OS allow.
    pub fn with_timeout(mut self, dur: Option<Duration>) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// POST JSON using optional Bearer auth.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        bearer: Option<&str>,
        body: &B,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let auth = bearer.map_or(Auth::None, Auth::Bearer);
        self.request_json(Method::POST, path, Some(body), auth)
            .await
    }

    async fn request_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        auth: Auth<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::Url(e.to_string()))?;

        let mut rb = self
            .inner
            .request(method.clone(), url.clone())
            .header(CACHE_CONTROL, HeaderValue::from_static("no-store"));

        let timeout = self.default_timeout;
        if let Some(t) = timeout {
            rb = rb.timeout(t);
        }

        let mut body_bytes: Option<Vec<u8>> = None;
        if let Some(b) = body {
            let bytes = serde_json::to_vec(b).map_err(|e| HttpError::Build(e.to_string()))?;
            body_bytes = Some(bytes.clone());
            rb = rb.header(CONTENT_TYPE, "application/json").body(bytes);
        }

        if let Auth::Bearer(tok) = &auth {
            let tok = sanitize_api_key(tok)?;
            rb = rb.bearer_auth(tok);
        }

        let auth_kind = auth.kind();
        let req_id = format!(
            "r{:x}",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            timeout_ms=?timeout.map(|t| t.as_millis() as u64),
            auth_kind,
            has_body=%body.is_some(),
            "http.request.start"
        );

        if raw_enabled() {
            let curl = make_curl(&method, &url, &auth, body_bytes.as_deref());
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        let t0 = Instant::now();
        let resp = rb.send().await.map_err(|err| {
            tracing::warn!(req_id=%req_id, error=%err, "http.network_error.send");
            HttpError::Network(err.to_string())
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|err| {
            tracing::warn!(req_id=%req_id, error=%err, "http.network_error.body");
            HttpError::Network(err.to_string())
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let request_id = headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%request_id,
            "http.response.headers"
        );

        if raw_enabled() {
            let end = bytes.len().min(RAW_MAX_BODY);
            let text = String::from_utf8_lossy(&bytes[..end]);
            tracing::info!(
                target: "http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                body=%text,
                truncated=bytes.len() > RAW_MAX_BODY
            );
        }

        let snippet = snip_body(&bytes);

        if status.is_success() {
            return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                tracing::warn!(
                    req_id=%req_id,
                    serde_err=%e,
                    body_snippet=%snippet,
                    "http.response.decode_error"
                );
                HttpError::Decode(e.to_string(), snippet)
            });
        }

        let message = extract_error_message(&bytes);
        tracing::warn!(
            req_id=%req_id,
            %status,
            api_message=%message,
            x_request_id=%request_id,
            body_snippet=%snippet,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            request_id,
        })
    }
}

/// Render a best-effort curl command for repro/debug. The bearer token is
/// never included, only a placeholder when the request carries one.
fn make_curl(method: &Method, url: &Url, auth: &Auth<'_>, body: Option<&[u8]>) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{method}")];
    if let Auth::Bearer(_) = auth {
        parts.push("-H 'Authorization: Bearer <redacted>'".to_string());
    }
    if let Some(bytes) = body {
        match std::str::from_utf8(bytes) {
            Ok(s) => {
                let mut s = s.to_string();
                if s.len() > RAW_MAX_BODY {
                    s.truncate(floor_char_boundary(&s, RAW_MAX_BODY));
                    s.push('…');
                }
                parts.push(format!("-d '{}'", s.replace('\'', r"'\''")));
            }
            Err(_) => parts.push(format!("--data-binary @- # ({} bytes)", bytes.len())),
        }
    }
    parts.push(format!("'{}'", url.as_str()));
    parts.join(" ")
}

/// Pull a human readable message out of an error body.
fn extract_error_message(body: &[u8]) -> String {
    // OpenAI style: {"error":{"message":"..."}}
    #[derive(Deserialize)]
    struct OpenAiEnv {
        error: OpenAiDetail,
    }
    #[derive(Deserialize)]
    struct OpenAiDetail {
        message: String,
    }

    // Generic: {"message":"..."} or {"detail":"..."} or {"error":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<OpenAiEnv>(body) {
        return env.error.message;
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        for candidate in [m.message, m.detail, m.error] {
            if !candidate.is_empty() {
                return candidate;
            }
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > SNIPPET_MAX {
        snip.truncate(floor_char_boundary(&snip, SNIPPET_MAX));
        snip.push_str("...");
    }
    snip
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    let mut idx = max.min(s.len());
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    s.retain(|ch| !ch.is_ascii_whitespace());

    if s.is_empty() {
        return Err(HttpError::Build("API key is empty".into()));
    }
    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }

    HeaderValue::from_str(&format!("Bearer {s}"))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}
