use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use super::types::{
    ActivityFrequencyResponse, HealthResponse, MetricsResponse, PerformanceResponse,
};
use crate::error::{Error, Result};
use crate::infrastructure::backoff::Backoff;
use crate::infrastructure::config::ClientConfig;

/// Raw upstream answer, relayed by the dashboard's proxy routes.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// HTTP client for the process-mining API.
///
/// Connection failures, timeouts and 5xx answers are retried with
/// exponential backoff, since the dashboard may come up before the API has
/// finished migrating.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    config: ClientConfig,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            config,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn retryable(result: &reqwest::Result<Response>) -> bool {
        match result {
            Ok(resp) => resp.status().is_server_error(),
            Err(e) => e.is_connect() || e.is_timeout() || e.is_request(),
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response> {
        self.send(&self.url(path), query).await
    }

    /// GET with retries; the last answer (or error) is returned as-is.
    async fn send(&self, url: &str, query: &[(&str, String)]) -> Result<Response> {
        let mut backoff = Backoff::new(self.config.backoff.clone());
        let mut attempt = 0u32;

        loop {
            debug!(url = %url, attempt, "API request");
            let result = self.client.get(url).query(query).send().await;
            if attempt >= self.config.max_retries || !Self::retryable(&result) {
                return Ok(result?);
            }

            attempt += 1;
            let delay = backoff.next_delay();
            match &result {
                Ok(resp) => warn!(url = %url, status = %resp.status(), attempt, delay_ms = delay.as_millis() as u64, "API answered with server error, retrying"),
                Err(e) => warn!(url = %url, error = %e, attempt, delay_ms = delay.as_millis() as u64, "API unreachable, retrying"),
            }
            sleep(delay).await;
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.get(path, &[]).await?.error_for_status()?;
        Ok(resp.json().await?)
    }

    /// # Errors
    ///
    /// Returns an error if the API is unreachable or unhealthy.
    pub async fn health(&self) -> Result<HealthResponse> {
        self.get_json("/health").await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails after retries.
    pub async fn metrics(&self) -> Result<MetricsResponse> {
        self.get_json("/api/metrics/").await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails after retries.
    pub async fn performance(&self) -> Result<PerformanceResponse> {
        self.get_json("/api/performance/").await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails after retries.
    pub async fn activity_frequency(&self) -> Result<ActivityFrequencyResponse> {
        self.get_json("/api/activity-frequency/").await
    }

    /// Fetch a path and keep status, content type and body untouched.
    ///
    /// # Errors
    ///
    /// Returns an error only when no answer was received.
    pub async fn get_raw(&self, path: &str, query: &[(&str, String)]) -> Result<RawResponse> {
        let resp = self.get(path, query).await?;
        Self::into_raw(resp).await
    }

    /// Raw duration prediction for one case, with the id percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL cannot carry a path or no answer
    /// was received.
    pub async fn predict_duration_raw(&self, case_id: &str) -> Result<RawResponse> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|()| Error::Connection(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "predict-duration", case_id, ""]);
        let resp = self.send(url.as_str(), &[]).await?;
        Self::into_raw(resp).await
    }

    async fn into_raw(resp: Response) -> Result<RawResponse> {
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await.map_err(Error::from)?.to_vec();
        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}
