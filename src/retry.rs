//! Bounded retries with exponential delay around the HTTP client
//!
//! The RemWaste backend runs on a host that scales to zero when idle, so the
//! first request after a quiet period may time out or answer 404 while the
//! service boots. [`RetryingClient`] wraps an [`HttpClient`] and re-issues a
//! request until the response is accepted or the [`RetryPolicy`] runs out.

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::Result;
use crate::fetch::{ApiResponse, FetchBuilder, HttpClient};

/// How many times to retry, and how long to wait in between
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry
    pub initial_delay: Duration,

    /// Multiplier applied to the delay after each retry
    pub backoff_factor: f64,

    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that performs a single attempt
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Set the number of retries
    pub fn with_max_retries(mut self, value: u32) -> Self {
        self.max_retries = value;
        self
    }

    /// Set the delay before the first retry
    pub fn with_initial_delay(mut self, value: Duration) -> Self {
        self.initial_delay = value;
        self
    }

    /// Set the backoff multiplier
    pub fn with_backoff_factor(mut self, value: f64) -> Self {
        self.backoff_factor = value;
        self
    }

    /// Set the delay cap
    pub fn with_max_delay(mut self, value: Duration) -> Self {
        self.max_delay = value;
        self
    }

    /// Delay to wait before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = self.backoff_factor.max(1.0).powi(attempt as i32 - 1);
        let millis = self.initial_delay.as_millis() as f64 * factor;
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }
}

/// Decorator that retries requests on an [`HttpClient`] according to a [`RetryPolicy`]
#[derive(Debug, Clone)]
pub struct RetryingClient {
    inner: HttpClient,
    policy: RetryPolicy,
}

impl RetryingClient {
    /// Wrap a client with a retry policy
    pub fn new(inner: HttpClient, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped client
    pub fn inner(&self) -> &HttpClient {
        &self.inner
    }

    /// The active policy
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send the request produced by `build` until `accept` returns true
    ///
    /// Network errors are retried as well. When the policy is exhausted the
    /// last response is returned as-is, so the caller decides what an
    /// unaccepted final response means; a last-attempt network error is
    /// returned as the error.
    pub async fn send_until<B, A>(&self, build: B, accept: A) -> Result<ApiResponse>
    where
        B: for<'c> Fn(&'c HttpClient) -> FetchBuilder<'c>,
        A: Fn(&ApiResponse) -> bool,
    {
        let mut attempt = 0;
        loop {
            let result = build(&self.inner).send().await;
            let retries_left = attempt < self.policy.max_retries;

            match result {
                Ok(response) if accept(&response) => return Ok(response),
                Ok(response) if !retries_left => return Ok(response),
                Ok(response) => {
                    warn!(
                        "Attempt {} answered {}, service may be sleeping",
                        attempt + 1,
                        response.status
                    );
                }
                Err(e) if e.is_network() && retries_left => {
                    warn!("Attempt {} failed: {}", attempt + 1, e);
                }
                Err(e) => return Err(e),
            }

            attempt += 1;
            let delay = self.policy.delay_for(attempt);
            debug!("Retrying in {:?} (retry {}/{})", delay, attempt, self.policy.max_retries);
            sleep(delay).await;
        }
    }
}
