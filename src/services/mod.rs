//! Clients for the external HTTP collaborators: weather, generated learning
//! content and certificates.
//!
//! Every call goes through [`ServiceClient`], which applies the configured
//! timeout and retries transient failures (connection errors, timeouts, 429
//! and 5xx responses) a fixed number of times.

pub mod certificate;
pub mod content;
pub mod weather;

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ServicesConfig;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("service not configured: {0}")]
    NotConfigured(&'static str),
}

impl ServiceError {
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Timeout => true,
            ServiceError::Transport(e) => e.is_connect() || e.is_timeout(),
            ServiceError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
            }
            ServiceError::Decode(_) | ServiceError::NotConfigured(_) => false,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Timeout => "service_timeout",
            ServiceError::Transport(_) => "service_unreachable",
            ServiceError::Status { .. } => "service_error",
            ServiceError::Decode(_) => "service_bad_response",
            ServiceError::NotConfigured(_) => "service_not_configured",
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ServiceError::Timeout
        } else if e.is_decode() {
            ServiceError::Decode(e.to_string())
        } else {
            ServiceError::Transport(e)
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    retries: u32,
    retry_delay: Duration,
}

impl ServiceClient {
    pub fn new(config: &ServicesConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(concat!("prepd/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ServiceError::Transport)?;
        Ok(Self {
            http,
            retries: config.retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// Sends the request built by `build`, rebuilding it for each attempt,
    /// and decodes a JSON body from a 2xx response.
    pub async fn send_json<T, F>(&self, what: &'static str, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            match self.send_once(&build).await {
                Ok(v) => return Ok(v),
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!(service = what, attempt, error = %e, "transient failure; retrying");
                    if !self.retry_delay.is_zero() {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
                Err(e) => {
                    tracing::error!(service = what, error = %e, "request failed");
                    return Err(e);
                }
            }
        }
    }

    async fn send_once<T, F>(&self, build: &F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let response = build(&self.http).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

/// The three collaborators, sharing one HTTP client.
pub struct Services {
    pub weather: weather::WeatherClient,
    pub content: content::ContentClient,
    pub certificate: certificate::CertificateClient,
}

impl Services {
    pub fn from_config(config: &ServicesConfig) -> Result<Self> {
        let client = ServiceClient::new(config)?;
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Ok(Self {
            weather: weather::WeatherClient::new(
                client.clone(),
                config.weather_url.clone(),
                config.alerts_url.clone(),
            ),
            content: content::ContentClient::new(
                client.clone(),
                config.content_url.clone(),
                config.content_model.clone(),
                api_key,
            ),
            certificate: certificate::CertificateClient::new(client, config.certificate_url.clone()),
        })
    }
}

/// Pulls the first JSON value out of model output that may be wrapped in
/// prose or a fenced code block.
pub(crate) fn extract_json(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let start = trimmed.find(['{', '['])?;
    let open = trimmed.as_bytes()[start];
    let close = if open == b'{' { '}' } else { ']' };
    let end = trimmed.rfind(close)?;
    (end > start).then(|| &trimmed[start..=end])
}
