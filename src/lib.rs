//! RemWaste API client
//!
//! A contract-checking client for the RemWaste waste-management backend.
//! Every service call sends one request and asserts the documented response
//! shape: status code, JSON body keys and literal messages. Mismatches surface
//! as [`Error::Contract`](crate::error::Error::Contract).

pub mod auth;
pub mod config;
pub mod contract;
pub mod error;
pub mod fetch;
pub mod fixtures;
pub mod health;
pub mod items;
pub mod retry;

use tracing::info;

use crate::auth::AuthService;
use crate::config::ClientOptions;
use crate::error::Result;
use crate::fetch::HttpClient;
use crate::health::HealthService;
use crate::items::ItemsService;

pub use crate::error::Error;

/// The main entry point for the RemWaste client
#[derive(Debug, Clone)]
pub struct RemWaste {
    http: HttpClient,
    auth: AuthService,
    items: ItemsService,
    health: HealthService,
}

impl RemWaste {
    /// Create a client for `base_url`, with defaults picked for that deployment
    ///
    /// # Example
    ///
    /// ```
    /// use remwaste_client::RemWaste;
    ///
    /// let client = RemWaste::new("http://localhost:5000").unwrap();
    /// assert_eq!(client.http().base_url(), "http://localhost:5000");
    /// ```
    pub fn new(base_url: &str) -> Result<Self> {
        Self::new_with_options(ClientOptions::for_base_url(base_url))
    }

    /// Create a client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use remwaste_client::{RemWaste, config::ClientOptions, retry::RetryPolicy};
    ///
    /// let options = ClientOptions::for_base_url("http://localhost:5000")
    ///     .with_default_timeout(Duration::from_secs(5))
    ///     .with_retry(RetryPolicy::none());
    /// let client = RemWaste::new_with_options(options).unwrap();
    /// ```
    pub fn new_with_options(options: ClientOptions) -> Result<Self> {
        info!("API service: {} at {}", options.service_type(), options.base_url);
        if options.is_remote() {
            info!("Remote service may sleep and need warming up");
        }

        let http = HttpClient::new(options)?;

        Ok(Self {
            auth: AuthService::new(http.clone()),
            items: ItemsService::new(http.clone()),
            health: HealthService::new(http.clone()),
            http,
        })
    }

    /// Create a client from `API_BASE_URL`
    pub fn from_env() -> Result<Self> {
        Self::new_with_options(ClientOptions::from_env()?)
    }

    /// Registration and login
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Waste item CRUD
    pub fn items(&self) -> &ItemsService {
        &self.items
    }

    /// Health, discovery and probing
    pub fn health(&self) -> &HealthService {
        &self.health
    }

    /// The underlying HTTP wrapper, for requests outside the service contracts
    pub fn http(&self) -> &HttpClient {
        &self.http
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::auth::{AuthenticatedUser, Session, UserPayload};
    pub use crate::config::ClientOptions;
    pub use crate::error::{Error, Result};
    pub use crate::items::{Item, ItemPayload, ItemStatus};
    pub use crate::retry::RetryPolicy;
    pub use crate::RemWaste;
}
