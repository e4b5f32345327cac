//! HTTP Session Management
//!
//! This module owns the single HTTP client used to talk to the array's management
//! web interface. The client keeps a cookie store, so the session cookie handed out
//! by the login page is replayed on every later request.
//!
//! Every request carries the same header set and a bounded timeout. Any network,
//! TLS, redirect or status failure becomes an [`ExporterError`] of the transport
//! family; nothing is retried. Response bodies are always parsed with the
//! permissive [`Document`] parser.

use crate::config::QsanConfig;
use crate::error::{ExporterError, Result};
use crate::qsan::markup::Document;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION};
use reqwest::{Method, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

/// A path on the array plus its query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: &'static str,
    pub query: Vec<(&'static str, String)>,
}

impl Endpoint {
    pub fn new(path: &'static str) -> Self {
        Self {
            path,
            query: Vec::new(),
        }
    }

    pub fn with(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }
}

/// One authenticated HTTP session against one array
pub struct Session {
    http: reqwest::Client,
    base_url: String,
}

impl Session {
    /// Opens a fresh client with an empty cookie store.
    pub fn open(config: &QsanConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()?;

        let base_url = config.base_url();
        info!("Opened HTTP session to {}", base_url);

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, endpoint: &Endpoint) -> Result<Document> {
        self.request(Method::GET, endpoint, None).await
    }

    /// POST with an optional urlencoded form body.
    pub async fn post(&self, endpoint: &Endpoint, form: Option<&[(&str, &str)]>) -> Result<Document> {
        self.request(Method::POST, endpoint, form).await
    }

    async fn request(
        &self,
        method: Method,
        endpoint: &Endpoint,
        form: Option<&[(&str, &str)]>,
    ) -> Result<Document> {
        let url = format!("{}{}", self.base_url, endpoint.path);
        debug!("{} {} {:?}", method, endpoint.path, endpoint.query);

        let mut request = self.http.request(method, &url).query(&endpoint.query);
        if let Some(form) = form {
            request = request.form(form);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !is_acceptable(status) {
            return Err(ExporterError::HttpStatus {
                path: endpoint.path.to_string(),
                status: status.as_u16(),
            });
        }

        debug!("{} answered {} ({} bytes)", endpoint.path, status, body.len());
        Ok(Document::parse(&body))
    }
}

/// 200, 302 and anything else below 400 count as success.
fn is_acceptable(status: StatusCode) -> bool {
    !(status.is_client_error() || status.is_server_error())
}
