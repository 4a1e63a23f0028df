use async_trait::async_trait;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::Deserialize;
use slog::{debug, Logger};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ElevationError {
    #[error("elevation data not found for {lat},{lon}")]
    NoData { lat: f64, lon: f64 },
    #[error("error sending request: {0}")]
    Request(String),
    #[error("elevation service responded with status {0}")]
    Status(u16),
    #[error("error parsing body of request: {0}")]
    Parse(String),
}

/// Ground elevation lookup, meters above sea level
#[async_trait]
pub trait ElevationSource: Send + Sync {
    async fn elevation(&self, lat: f64, lon: f64) -> Result<f64, ElevationError>;
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    elevation: f64,
}

/// Extract the elevation from an open-elevation `/api/v1/lookup` body
pub fn parse_lookup(body: &str, lat: f64, lon: f64) -> Result<f64, ElevationError> {
    let response: LookupResponse =
        serde_json::from_str(body).map_err(|e| ElevationError::Parse(e.to_string()))?;
    response
        .results
        .first()
        .map(|r| r.elevation)
        .ok_or(ElevationError::NoData { lat, lon })
}

/// Client of an open-elevation compatible service
pub struct OpenElevation {
    logger: Logger,
    base_url: String,
    timeout: Duration,
    client: ClientWithMiddleware,
}

impl OpenElevation {
    pub fn new(
        logger: Logger,
        base_url: String,
        user_agent: String,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<OpenElevation, anyhow::Error> {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);
        let client = ClientBuilder::new(Client::builder().user_agent(user_agent).build()?)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            logger,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client,
        })
    }

    pub fn lookup_url(&self, lat: f64, lon: f64) -> String {
        format!("{}/api/v1/lookup?locations={},{}", self.base_url, lat, lon)
    }
}

#[async_trait]
impl ElevationSource for OpenElevation {
    async fn elevation(&self, lat: f64, lon: f64) -> Result<f64, ElevationError> {
        let url = self.lookup_url(lat, lon);
        debug!(self.logger, "requesting: {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ElevationError::Request(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ElevationError::Status(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ElevationError::Request(e.to_string()))?;
        parse_lookup(&body, lat, lon)
    }
}
