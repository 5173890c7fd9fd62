//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port. It resolves request
//! paths against the configured API base URL and hands back the raw status
//! and body; envelope handling stays in the application layer.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use mentorlink_application::ports::{HttpTransport, TransportError};
use mentorlink_domain::{ApiRequest, HttpMethod, RawResponse};
use reqwest::{Client, Method, Url, header};
use tracing::trace;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("MentorLink/", env!("CARGO_PKG_VERSION"));

/// HTTP transport backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    timeout_ms: u64,
}

impl ReqwestTransport {
    /// Creates a transport for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the client cannot be
    /// created.
    pub fn new(base_url: &str, timeout_ms: u64, user_agent: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Self::with_client(client, base_url, timeout_ms)
    }

    /// Creates a transport around a preconfigured reqwest client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn with_client(
        client: Client,
        base_url: &str,
        timeout_ms: u64,
    ) -> Result<Self, TransportError> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            timeout_ms,
        })
    }

    /// API base URL every request path is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the absolute URL of `request`.
    ///
    /// The request path is appended to the base URL's path, so a base of
    /// `https://host/api` and a path of `/users/me` give
    /// `https://host/api/users/me`.
    fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let relative = request.path_and_query();
        let joined = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            relative
        );
        Url::parse(&joined).map_err(|e| TransportError::InvalidUrl(format!("{e}: {joined}")))
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Maps reqwest errors to the port's `TransportError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            let host = error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string();
            return TransportError::Connection(format!("{host}: {error}"));
        }

        if error.is_builder() {
            return TransportError::InvalidUrl(error.to_string());
        }

        TransportError::Other(error.to_string())
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, TransportError> {
    let url =
        Url::parse(base_url).map_err(|e| TransportError::InvalidUrl(format!("{e}: {base_url}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(TransportError::InvalidUrl(format!(
            "unsupported scheme '{}': {base_url}",
            url.scheme()
        )));
    }
    Ok(url)
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<RawResponse, TransportError> {
        let url = self.url_for(request)?;
        let timeout_ms = self.timeout_ms;

        let start = Instant::now();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(Duration::from_millis(timeout_ms))
            .header(header::ACCEPT, "application/json")
            .header("X-Request-Id", request.id.to_string());

        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;

        let status = response.status().as_u16();

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Other(format!("failed to read body: {e}")))?
            .to_vec();

        let duration = start.elapsed();
        trace!(status, bytes = body.len(), "raw response");

        Ok(RawResponse::new(status, body, duration))
    }
}
