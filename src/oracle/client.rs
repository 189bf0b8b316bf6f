//! HTTP oracle client
//!
//! # Retry Logic
//!
//! | Condition | Kind | Action |
//! |-----------|------|--------|
//! | Connect / DNS / reset / timeout | Network | Retry; counts only if `bound_network_failures` |
//! | Non-2xx status | Response | Retry, counts against the bound |
//! | Empty body | Response | Retry, counts against the bound |
//! | Malformed JSON | Response | Retry, counts against the bound |
//!
//! When the bound is exhausted the pair fails with `OracleUnavailable`.

use crate::config::{OracleConfig, RetryConfig};
use crate::oracle::{decode_body, CombinationResult, ElementRef, FailureKind, OracleError};
use crate::{ConfigError, InfcError};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// When to give up on a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub bound_network_failures: bool,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Whether this failure uses up one of the allowed attempts
    pub fn counts(&self, err: &OracleError) -> bool {
        match err.kind() {
            FailureKind::Network => self.bound_network_failures,
            FailureKind::Response => true,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            bound_network_failures: config.bound_network_failures,
            delay: Duration::from_millis(config.delay_ms),
        }
    }
}

/// Builds an HTTP client for talking to the oracle
///
/// # Example
///
/// ```no_run
/// use infc::config::OracleConfig;
/// use infc::oracle::build_http_client;
///
/// let client = build_http_client(&OracleConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &OracleConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client for the combination oracle
#[derive(Debug, Clone)]
pub struct OracleClient {
    client: Client,
    endpoint: Url,
    retry: RetryPolicy,
}

impl OracleClient {
    /// Creates a client for the configured oracle endpoint
    pub fn new(config: &OracleConfig, retry: RetryPolicy) -> Result<Self, InfcError> {
        let endpoint = Url::parse(&config.base_url)
            .and_then(|base| base.join(&config.pair_path))
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid oracle endpoint: {}", e)))?;
        let client = build_http_client(config)?;

        Ok(Self {
            client,
            endpoint,
            retry,
        })
    }

    /// The resolved pairing endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Asks the oracle what `first` and `second` combine into
    ///
    /// Transient failures are retried per the retry policy.
    ///
    /// # Returns
    ///
    /// * `Ok(CombinationResult)` - The oracle answered
    /// * `Err(OracleError::OracleUnavailable)` - Retries were exhausted
    pub async fn combine(
        &self,
        first: &ElementRef,
        second: &ElementRef,
    ) -> Result<CombinationResult, OracleError> {
        let mut attempts = 0;

        loop {
            let err = match self.request_once(first, second).await {
                Ok(result) => return Ok(result),
                Err(err) => err,
            };

            if self.retry.counts(&err) {
                attempts += 1;
            }

            if attempts >= self.retry.max_attempts {
                return Err(OracleError::OracleUnavailable {
                    first: first.text.clone(),
                    second: second.text.clone(),
                    attempts,
                    last: Box::new(err),
                });
            }

            tracing::trace!(
                "Retrying {} + {} (attempt {}/{}): {}",
                first.text,
                second.text,
                attempts,
                self.retry.max_attempts,
                err
            );

            if !self.retry.delay.is_zero() {
                tokio::time::sleep(self.retry.delay).await;
            }
        }
    }

    /// Sends one request without retrying
    async fn request_once(
        &self,
        first: &ElementRef,
        second: &ElementRef,
    ) -> Result<CombinationResult, OracleError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("first", &first.text)
            .append_pair("second", &second.text);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(OracleError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(OracleError::Network)?;
        decode_body(&body)
    }
}
