//! Minimal HTTP client for page and icon retrieval, with safe logging.
//!
//! - One [`HttpClient`] per process; clones share the connection pool
//! - Redirects are followed transparently and the final URL is reported
//! - Invalid TLS certificates are rejected unless explicitly opted in
//! - Optional *raw* request/response logging via `FAVER_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust,no_run
//! # async fn demo() -> Result<(), faver_http::HttpError> {
//! let client = faver_http::HttpClient::new()?;
//! let page = client.get("https://www.rust-lang.org").await?;
//! println!("{} -> {} ({} bytes)", page.status, page.url, page.body.len());
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated) and transport errors, plus raw
//! request/response lines (target `http.raw`) when `FAVER_HTTP_RAW=1`.
//! Cookie and authorization headers are never logged verbatim.

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Response, redirect};
use std::borrow::Cow;
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

pub use reqwest::{StatusCode, Url};

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "FAVER_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)
const SNIPPET_MAX: usize = 500;

static REQUEST_SEQ: AtomicU64 = AtomicU64::new(1);

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug.
fn make_curl(method: &Method, url: &Url, insecure: bool) -> String {
    let mut parts = vec!["curl".to_string(), "-L".to_string(), format!("-X{method}")];
    if insecure {
        parts.push("-k".to_string());
    }
    parts.push(format!("'{}'", url.as_str().replace('\'', r"'\''")));
    parts.join(" ")
}

fn is_sensitive_header(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "authorization" | "proxy-authorization" | "cookie" | "set-cookie"
    )
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let val = if is_sensitive_header(&key) {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("<binary>").to_string()
            };
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL {url:?}: {message}")]
    Url { url: String, message: String },
    #[error("client build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
}

// ==============================
// Client options
// ==============================

/// Process-wide tuning knobs for [`HttpClient`].
///
/// ```
/// use faver_http::ClientOpts;
/// use std::time::Duration;
///
/// let opts = ClientOpts {
///     timeout: Duration::from_secs(3),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.max_redirects, 10);
/// assert!(!opts.accept_invalid_certs);
/// ```
#[derive(Clone, Debug)]
pub struct ClientOpts {
    /// Total time allowed for one request, body included.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub max_redirects: usize,
    pub user_agent: String,
    /// Skip TLS certificate validation. Weakens transport security; opt-in only.
    pub accept_invalid_certs: bool,
}

impl Default for ClientOpts {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            max_redirects: 10,
            user_agent: concat!("faver/", env!("CARGO_PKG_VERSION")).to_string(),
            accept_invalid_certs: false,
        }
    }
}

// ==============================
// Client
// ==============================

/// A fully buffered response.
#[derive(Clone, Debug)]
pub struct Fetched {
    /// Final request URL after redirects.
    pub url: Url,
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl Fetched {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: Client,
    insecure: bool,
}

impl HttpClient {
    /// Construct a client with [`ClientOpts::default`].
    ///
    /// ```no_run
    /// use faver_http::{HttpClient, HttpError};
    ///
    /// let client = HttpClient::new()?;
    /// assert!(!client.accepts_invalid_certs());
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new() -> Result<Self, HttpError> {
        Self::with_opts(ClientOpts::default())
    }

    pub fn with_opts(opts: ClientOpts) -> Result<Self, HttpError> {
        if opts.accept_invalid_certs {
            tracing::warn!("http.tls.certificate_validation_disabled");
        }
        let inner = Client::builder()
            .timeout(opts.timeout)
            .connect_timeout(opts.connect_timeout)
            .redirect(redirect::Policy::limited(opts.max_redirects))
            .user_agent(opts.user_agent.as_str())
            .danger_accept_invalid_certs(opts.accept_invalid_certs)
            .build()
            .map_err(|e| HttpError::Build(error_chain(&e)))?;
        tracing::debug!(
            timeout_ms = opts.timeout.as_millis() as u64,
            connect_timeout_ms = opts.connect_timeout.as_millis() as u64,
            max_redirects = opts.max_redirects,
            user_agent = %opts.user_agent,
            "http.client.built"
        );
        Ok(Self {
            inner,
            insecure: opts.accept_invalid_certs,
        })
    }

    pub fn accepts_invalid_certs(&self) -> bool {
        self.insecure
    }

    /// GET `url` and buffer the whole body, whatever the status code.
    pub async fn get(&self, url: &str) -> Result<Fetched, HttpError> {
        let sent = self.send(url).await?;
        let final_url = sent.response.url().clone();
        let status = sent.response.status();
        let headers = sent.response.headers().clone();

        let body = match sent.response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => {
                let message = error_chain(&err);
                tracing::warn!(
                    req_id = %sent.req_id,
                    %status,
                    message = %message,
                    "http.network_error.body"
                );
                return Err(HttpError::Network(message));
            }
        };
        let dur_ms = sent.started.elapsed().as_millis() as u64;

        tracing::debug!(
            req_id = %sent.req_id,
            %status,
            final_url = %final_url,
            duration_ms = dur_ms,
            body_len = body.len(),
            content_type = ?headers.get(reqwest::header::CONTENT_TYPE),
            "http.response.headers"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&headers);
            let truncated = body.len() > RAW_MAX_BODY;
            let text = String::from_utf8_lossy(&body[..body.len().min(RAW_MAX_BODY)]);
            tracing::info!(
                target: "http.raw",
                req_id = %sent.req_id,
                status = %status,
                duration_ms = dur_ms,
                headers = ?hdrs,
                body = %text,
                truncated
            );
        }

        tracing::trace!(
            req_id = %sent.req_id,
            body_snippet = %snip_body(&body),
            "http.response.body_snippet"
        );

        Ok(Fetched {
            url: final_url,
            status,
            body,
        })
    }

    /// GET `url` and report the status without reading the body.
    pub async fn probe(&self, url: &str) -> Result<StatusCode, HttpError> {
        let sent = self.send(url).await?;
        let status = sent.response.status();
        tracing::debug!(
            req_id = %sent.req_id,
            %status,
            final_url = %sent.response.url(),
            duration_ms = sent.started.elapsed().as_millis() as u64,
            "http.probe.done"
        );
        Ok(status)
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn send(&self, raw_url: &str) -> Result<Sent, HttpError> {
        let url = Url::parse(raw_url).map_err(|e| HttpError::Url {
            url: raw_url.to_string(),
            message: e.to_string(),
        })?;
        let req_id = format!("r{}", REQUEST_SEQ.fetch_add(1, Ordering::Relaxed));
        let method = Method::GET;

        tracing::debug!(
            req_id = %req_id,
            method = %method,
            host_path = %format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            "http.request.start"
        );

        if raw_enabled() {
            let curl = make_curl(&method, &url, self.insecure);
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        let started = Instant::now();
        match self.inner.request(method, url).send().await {
            Ok(response) => Ok(Sent {
                req_id,
                response,
                started,
            }),
            Err(err) => {
                let message = error_chain(&err);
                tracing::warn!(
                    req_id = %req_id,
                    timeout = err.is_timeout(),
                    redirect = err.is_redirect(),
                    message = %message,
                    "http.network_error.send"
                );
                Err(HttpError::Network(message))
            }
        }
    }
}

struct Sent {
    req_id: String,
    response: Response,
    started: Instant,
}

// ==============================
// Helpers
// ==============================

/// Flatten an error and its sources into one line.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(&body[..body.len().min(SNIPPET_MAX)]).into_owned();
    if body.len() > SNIPPET_MAX {
        snip.push_str("...");
    }
    snip
}
