//! Health and discovery types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
    pub environment: Value,
    pub database: Value,
    pub timestamp: String,
}

/// The `endpoints` map advertised by `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointIndex {
    pub health: Value,
    pub auth: Value,
    pub items: Value,
}

/// Body of `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDocumentation {
    pub message: String,
    pub version: String,
    pub database: Value,
    pub endpoints: EndpointIndex,
}

/// How one endpoint answered during an accessibility probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Accessibility {
    /// Answered as a running RemWaste backend would
    Reachable,
    /// Generic 404: not deployed, wrong URL, or asleep
    NotFound,
    /// 5xx: usually still starting up
    ServerError(u16),
    /// Any other status
    Unexpected(u16),
    /// No HTTP answer at all
    Unreachable(String),
}

impl fmt::Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessibility::Reachable => write!(f, "reachable"),
            Accessibility::NotFound => write!(f, "not found (not deployed or sleeping)"),
            Accessibility::ServerError(s) => write!(f, "server error {} (may be starting up)", s),
            Accessibility::Unexpected(s) => write!(f, "unexpected status {}", s),
            Accessibility::Unreachable(reason) => write!(f, "unreachable: {}", reason),
        }
    }
}

/// Result of probing one endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointCheck {
    pub method: String,
    pub path: String,
    pub accessibility: Accessibility,
}

/// Result of probing every public endpoint of one base URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessibilityReport {
    pub base_url: String,
    pub checks: Vec<EndpointCheck>,
}

impl AccessibilityReport {
    /// Every probed endpoint answered as expected
    pub fn is_healthy(&self) -> bool {
        !self.checks.is_empty()
            && self
                .checks
                .iter()
                .all(|c| c.accessibility == Accessibility::Reachable)
    }

    /// Count of reachable endpoints
    pub fn reachable_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.accessibility == Accessibility::Reachable)
            .count()
    }
}
