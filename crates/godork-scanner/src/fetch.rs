//! HTTP fetch session.
//!
//! A single pooled `reqwest` client issues every page request. Redirects are
//! never followed: a 3xx toward the block page is how the provider announces a
//! challenge, so the walker must see the `Location` header itself.

use crate::error::{Result, TransportError};
use async_trait::async_trait;
use godork_core::{HttpConfig, PageRequest, ProviderConfig};
use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, LOCATION, REFERER, USER_AGENT};
use std::time::Duration;

/// Desktop browser user agents rotated across requests.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Linux x86_64; rv:91.0) Gecko/20100101 Firefox/91.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 12_1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/97.0.4692.99 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 12.1; rv:96.0) Gecko/20100101 Firefox/96.0",
    "Mozilla/5.0 (Windows NT 10.0; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/97.0.4692.99 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; WOW64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/97.0.4692.99 Safari/537.36 OPR/83.0.4254.16",
    "Mozilla/5.0 (X11; Fedora; Linux x86_64; rv:96.0) Gecko/20100101 Firefox/96.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/97.0.4692.99 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Ubuntu Chromium/63.0.3239.84 Chrome/63.0.3239.84 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:96.0) Gecko/20100101 Firefox/96.0",
];

/// Values accepted by the provider's `client` parameter.
const CLIENT_TAGS: &[&str] = &["chrome", "firefox", "ubuntu", "gws"];

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_EN: &str = "en-US,en;q=0.5";

/// Raw outcome of one GET. Produced fresh per request and never mutated.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
    pub final_url: String,
}

impl RawResponse {
    /// Response with the given status and body and no headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            final_url: String::new(),
        }
    }

    /// Builder-style helper adding a `Location` header.
    ///
    /// Values that are not valid header text are ignored.
    #[must_use]
    pub fn with_location(mut self, location: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(location) {
            self.headers.insert(LOCATION, value);
        }
        self
    }

    /// `Location` header, when present and valid text.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
    }
}

/// Transport seam used by the page walker.
///
/// Implementations hold no per-query state and must be safe to share across
/// concurrently walked queries.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Issue one GET to `url` with `params` appended as the query string.
    async fn fetch(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> std::result::Result<RawResponse, TransportError>;
}

/// Query parameters for one results page.
///
/// The `client` tag is drawn at random on every call.
#[must_use]
pub fn search_params(request: &PageRequest) -> Vec<(String, String)> {
    let client = CLIENT_TAGS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("chrome");

    vec![
        ("q".to_string(), request.query.as_str().to_string()),
        ("channel".to_string(), "fs".to_string()),
        ("client".to_string(), client.to_string()),
        ("start".to_string(), request.offset.to_string()),
    ]
}

fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Pooled HTTP session shared by every walker.
pub struct FetchSession {
    client: reqwest::Client,
    timeout: Duration,
}

impl FetchSession {
    /// Build the session from transport and provider settings.
    ///
    /// When a proxy is configured TLS certificate verification is disabled.
    pub fn new(http: &HttpConfig, provider: &ProviderConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_EN));
        if let Ok(referer) = HeaderValue::from_str(&provider.referer) {
            headers.insert(REFERER, referer);
        }

        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .default_headers(headers)
            .danger_accept_invalid_certs(http.accept_invalid_certs());

        if let Some(proxy) = &http.proxy {
            tracing::debug!("Routing requests through proxy {}", proxy);
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
            timeout: http.timeout(),
        })
    }
}

#[async_trait]
impl PageFetcher for FetchSession {
    async fn fetch(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> std::result::Result<RawResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .header(USER_AGENT, random_user_agent())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url, &e))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(url, &e))?;

        Ok(RawResponse {
            status,
            headers,
            body,
            final_url,
        })
    }
}
