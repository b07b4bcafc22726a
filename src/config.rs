//! Configuration options for the RemWaste client

use std::time::Duration;

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;

/// Base URL used when `API_BASE_URL` is not set
pub const DEFAULT_BASE_URL: &str = "https://remwasteapp-backend.onrender.com";

/// Environment variable that overrides the base URL
pub const BASE_URL_ENV: &str = "API_BASE_URL";

/// Configuration options for the RemWaste client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The backend base URL, without a trailing slash
    pub base_url: String,

    /// Timeout for regular requests
    pub default_timeout: Duration,

    /// Timeout for requests that are expected to fail
    pub fail_timeout: Duration,

    /// Timeout for warm-up probes against a cold service
    pub warmup_timeout: Duration,

    /// Retry policy for the health warm-up probe
    pub retry: RetryPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::for_base_url(DEFAULT_BASE_URL)
    }
}

impl ClientOptions {
    /// Options with defaults picked for the kind of deployment behind `base_url`
    ///
    /// Remote deployments sleep when idle, so they get longer timeouts and more
    /// warm-up retries than a local server.
    pub fn for_base_url(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let remote = is_remote_url(&base_url);

        let (default_timeout, retry) = if remote {
            (
                Duration::from_secs(30),
                RetryPolicy::default()
                    .with_max_retries(3)
                    .with_initial_delay(Duration::from_secs(10))
                    .with_max_delay(Duration::from_secs(30)),
            )
        } else {
            (
                Duration::from_secs(10),
                RetryPolicy::default()
                    .with_max_retries(1)
                    .with_initial_delay(Duration::from_millis(500))
                    .with_max_delay(Duration::from_secs(2)),
            )
        };

        Self {
            base_url,
            default_timeout,
            fail_timeout: Duration::from_secs(15),
            warmup_timeout: Duration::from_secs(60),
            retry,
        }
    }

    /// Read the base URL from `API_BASE_URL`, falling back to [`DEFAULT_BASE_URL`]
    pub fn from_env() -> Result<Self> {
        Self::from_env_var(std::env::var(BASE_URL_ENV))
    }

    /// Options for an already-read `API_BASE_URL` lookup
    pub fn from_env_var(value: std::result::Result<String, std::env::VarError>) -> Result<Self> {
        match value {
            Ok(url) if url.trim().is_empty() => {
                Err(Error::config(format!("{} is set but empty", BASE_URL_ENV)))
            }
            Ok(url) => Ok(Self::for_base_url(url.trim())),
            Err(std::env::VarError::NotPresent) => Ok(Self::default()),
            Err(e) => Err(Error::config(format!("{}: {}", BASE_URL_ENV, e))),
        }
    }

    /// Set the base URL, keeping the other options
    pub fn with_base_url(mut self, value: &str) -> Self {
        self.base_url = value.trim_end_matches('/').to_string();
        self
    }

    /// Set the default request timeout
    pub fn with_default_timeout(mut self, value: Duration) -> Self {
        self.default_timeout = value;
        self
    }

    /// Set the timeout for expected-failure requests
    pub fn with_fail_timeout(mut self, value: Duration) -> Self {
        self.fail_timeout = value;
        self
    }

    /// Set the warm-up timeout
    pub fn with_warmup_timeout(mut self, value: Duration) -> Self {
        self.warmup_timeout = value;
        self
    }

    /// Set the warm-up retry policy
    pub fn with_retry(mut self, value: RetryPolicy) -> Self {
        self.retry = value;
        self
    }

    /// Whether the base URL points at the hosted deployment
    pub fn is_remote(&self) -> bool {
        is_remote_url(&self.base_url)
    }

    /// Whether the base URL points at a local development server
    pub fn is_local(&self) -> bool {
        self.base_url.contains("localhost") || self.base_url.contains("127.0.0.1")
    }

    /// Human readable label for logs
    pub fn service_type(&self) -> &'static str {
        if self.is_remote() {
            "Remote (Render)"
        } else {
            "Local Development"
        }
    }
}

fn is_remote_url(url: &str) -> bool {
    url.contains("onrender.com")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_profile() {
        let options = ClientOptions::for_base_url("https://remwasteapp-backend.onrender.com/");
        assert_eq!(options.base_url, "https://remwasteapp-backend.onrender.com");
        assert!(options.is_remote());
        assert!(!options.is_local());
        assert_eq!(options.default_timeout, Duration::from_secs(30));
        assert_eq!(options.retry.max_retries, 3);
        assert_eq!(options.service_type(), "Remote (Render)");
    }

    #[test]
    fn test_local_profile() {
        let options = ClientOptions::for_base_url("http://localhost:5000");
        assert!(options.is_local());
        assert!(!options.is_remote());
        assert_eq!(options.default_timeout, Duration::from_secs(10));
        assert_eq!(options.retry.max_retries, 1);
        assert_eq!(options.fail_timeout, Duration::from_secs(15));
        assert_eq!(options.warmup_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_builder_overrides() {
        let options = ClientOptions::default()
            .with_base_url("http://127.0.0.1:8080/")
            .with_default_timeout(Duration::from_secs(1))
            .with_retry(RetryPolicy::none());

        assert_eq!(options.base_url, "http://127.0.0.1:8080");
        assert_eq!(options.default_timeout, Duration::from_secs(1));
        assert_eq!(options.retry.max_retries, 0);
        assert_eq!(options.service_type(), "Local Development");
    }

    #[test]
    fn test_base_url_variable() {
        use std::env::VarError;

        assert!(matches!(
            ClientOptions::from_env_var(Ok("   ".to_string())),
            Err(Error::Config(_))
        ));
        let set = ClientOptions::from_env_var(Ok(" http://localhost:5000/ ".to_string())).unwrap();
        assert_eq!(set.base_url, "http://localhost:5000");
        let unset = ClientOptions::from_env_var(Err(VarError::NotPresent)).unwrap();
        assert_eq!(unset.base_url, DEFAULT_BASE_URL);
    }
}
