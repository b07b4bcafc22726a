//! Health checks, API discovery and endpoint accessibility probing

mod types;

use chrono::NaiveDateTime;
use reqwest::Method;
use tracing::{info, warn};

use crate::auth::UserPayload;
use crate::config::ClientOptions;
use crate::contract;
use crate::error::{Error, Result};
use crate::fetch::{ApiResponse, HttpClient};
use crate::fixtures::{self, messages};
use crate::retry::RetryingClient;

pub use types::*;

/// Client for `/health`, `/` and unknown routes
#[derive(Debug, Clone)]
pub struct HealthService {
    http: HttpClient,
    retrying: RetryingClient,
}

impl HealthService {
    /// Create a new health service; warm-up follows the client's retry policy
    pub(crate) fn new(http: HttpClient) -> Self {
        let retrying = RetryingClient::new(http.clone(), http.options().retry.clone());
        Self { http, retrying }
    }

    /// Probe `/health` until it answers 200 or the retry policy runs out
    ///
    /// The final response is returned whatever its status.
    pub async fn warm_up(&self) -> Result<ApiResponse> {
        info!("Warming up {}", self.http.base_url());
        let warmup_timeout = self.http.options().warmup_timeout;

        self.retrying
            .send_until(
                |http| http.get("/health").timeout(warmup_timeout).allow_failure(),
                |response| response.status == 200,
            )
            .await
    }

    /// Warm up, then check the full `/health` contract
    pub async fn get_health_status(&self) -> Result<HealthStatus> {
        let response = self.warm_up().await?;
        if response.status != 200 {
            return Err(Error::ServiceUnavailable {
                status: response.status,
            });
        }

        contract::expect_json_response(&response, 200)?;
        contract::expect_str(&response.body, "status", "OK")?;
        contract::expect_str(&response.body, "message", "RemWaste API is running")?;
        contract::expect_keys(&response.body, &["environment", "database", "timestamp"])?;

        let health: HealthStatus = serde_json::from_value(response.body)?;
        if !has_iso_timestamp_prefix(&health.timestamp) {
            return Err(Error::contract(format!(
                "timestamp is not ISO 8601: {}",
                health.timestamp
            )));
        }
        Ok(health)
    }

    /// Check the `GET /` discovery document
    pub async fn get_api_documentation(&self) -> Result<ApiDocumentation> {
        let response = self.http.get("/").send().await?;

        contract::expect_json_response(&response, 200)?;
        contract::expect_str(
            &response.body,
            "message",
            "RemWaste API - Waste Management System",
        )?;
        contract::expect_str(&response.body, "version", "1.0.0")?;
        contract::expect_keys(&response.body, &["database", "endpoints"])?;
        contract::expect_keys(&response.body["endpoints"], &["health", "auth", "items"])?;

        Ok(serde_json::from_value(response.body)?)
    }

    /// An unknown route must answer 404 with `Route not found`
    pub async fn check_invalid_endpoint(&self) -> Result<ApiResponse> {
        let response = self
            .http
            .get("/invalid-endpoint")
            .timeout(self.http.options().fail_timeout)
            .allow_failure()
            .send()
            .await?;

        contract::expect_error_message(&response, 404, messages::ROUTE_NOT_FOUND)?;
        Ok(response)
    }

    /// Probe the public endpoints of `base_url` without failing on any answer
    ///
    /// Useful to tell which of several candidate deployments is actually
    /// serving the API.
    pub async fn probe(&self, base_url: &str) -> Result<AccessibilityReport> {
        let options = ClientOptions::for_base_url(base_url);
        let http = self.http.rebase(options)?;
        let timeout = http.options().fail_timeout.max(http.options().default_timeout);

        let mut checks = Vec::new();

        let health = send_probe(http.get("/health").timeout(timeout)).await?;
        checks.push(check(Method::GET, "/health", classify(health, |_| false)));

        let docs = send_probe(http.get("/").timeout(timeout)).await?;
        checks.push(check(Method::GET, "/", classify(docs, |_| false)));

        let user = UserPayload::new(
            &fixtures::unique_email("test.probe"),
            fixtures::test_password(),
        );
        let register = send_probe(http.post("/register").json(&user)?.timeout(timeout)).await?;
        checks.push(check(
            Method::POST,
            "/register",
            // Any 4xx other than 404 still means the route exists.
            classify(register, |r| r.status != 404),
        ));

        let invalid = send_probe(http.get("/invalid").timeout(timeout)).await?;
        checks.push(check(Method::GET, "/invalid", classify_unknown_route(invalid)));

        let report = AccessibilityReport {
            base_url: http.base_url().to_string(),
            checks,
        };

        for c in &report.checks {
            if c.accessibility == Accessibility::Reachable {
                info!("{} {}{}: {}", c.method, report.base_url, c.path, c.accessibility);
            } else {
                warn!("{} {}{}: {}", c.method, report.base_url, c.path, c.accessibility);
            }
        }

        Ok(report)
    }
}

fn has_iso_timestamp_prefix(timestamp: &str) -> bool {
    timestamp
        .get(..19)
        .map(|prefix| NaiveDateTime::parse_from_str(prefix, "%Y-%m-%dT%H:%M:%S").is_ok())
        .unwrap_or(false)
}

type ProbeOutcome = std::result::Result<ApiResponse, String>;

async fn send_probe(builder: crate::fetch::FetchBuilder<'_>) -> Result<ProbeOutcome> {
    match builder.allow_failure().send().await {
        Ok(response) => Ok(Ok(response)),
        Err(e) if e.is_network() => Ok(Err(e.to_string())),
        Err(e) => Err(e),
    }
}

fn check(method: Method, path: &str, accessibility: Accessibility) -> EndpointCheck {
    EndpointCheck {
        method: method.to_string(),
        path: path.to_string(),
        accessibility,
    }
}

fn classify<F>(outcome: ProbeOutcome, accepted: F) -> Accessibility
where
    F: Fn(&ApiResponse) -> bool,
{
    match outcome {
        Err(reason) => Accessibility::Unreachable(reason),
        Ok(r) if r.is_success() => Accessibility::Reachable,
        Ok(r) if r.status == 404 => Accessibility::NotFound,
        Ok(r) if r.status >= 500 => Accessibility::ServerError(r.status),
        Ok(r) if accepted(&r) => Accessibility::Reachable,
        Ok(r) => Accessibility::Unexpected(r.status),
    }
}

fn classify_unknown_route(outcome: ProbeOutcome) -> Accessibility {
    match outcome {
        Err(reason) => Accessibility::Unreachable(reason),
        Ok(r) if r.status == 404 && r.error_message() == Some(messages::ROUTE_NOT_FOUND) => {
            Accessibility::Reachable
        }
        Ok(r) if r.status == 404 => Accessibility::NotFound,
        Ok(r) if r.status >= 500 => Accessibility::ServerError(r.status),
        Ok(r) => Accessibility::Unexpected(r.status),
    }
}
