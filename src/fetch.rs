//! HTTP client wrapper for making requests to the RemWaste backend

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::ClientOptions;
use crate::error::{Error, Result};

/// A response with its body already read and parsed
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,

    /// Response headers
    pub headers: HeaderMap,

    /// Parsed body; `Null` when empty, a JSON string when not JSON
    pub body: Value,
}

impl ApiResponse {
    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `Content-Type` header, if present and valid UTF-8
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// The `error` field of a JSON error body
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

/// Thin wrapper around `reqwest::Client` bound to one backend
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    options: ClientOptions,
}

impl HttpClient {
    /// Create a client for the base URL in `options`
    pub fn new(options: ClientOptions) -> Result<Self> {
        Self::with_client(Client::new(), options)
    }

    /// Create a client reusing an existing `reqwest::Client`
    pub fn with_client(client: Client, options: ClientOptions) -> Result<Self> {
        let base_url = Url::parse(&options.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "'{}' cannot be used as a base URL",
                options.base_url
            )));
        }
        Ok(Self {
            client,
            base_url,
            options,
        })
    }

    /// A client for another backend sharing this client's connection pool
    pub fn rebase(&self, options: ClientOptions) -> Result<Self> {
        Self::with_client(self.client.clone(), options)
    }

    /// The backend base URL
    pub fn base_url(&self) -> &str {
        &self.options.base_url
    }

    /// The options this client was built with
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    fn url_for(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        let base_path = url.path().trim_end_matches('/').to_string();
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };
        url.set_path(&format!("{}/{}", base_path, path.trim_start_matches('/')));
        url.set_query(query);
        Ok(url)
    }

    /// Start a request with an arbitrary method
    pub fn request(&self, method: Method, path: &str) -> FetchBuilder<'_> {
        FetchBuilder::new(self, method, path)
    }

    /// Create a GET request
    pub fn get(&self, path: &str) -> FetchBuilder<'_> {
        self.request(Method::GET, path)
    }

    /// Create a POST request
    pub fn post(&self, path: &str) -> FetchBuilder<'_> {
        self.request(Method::POST, path)
    }

    /// Create a PUT request
    pub fn put(&self, path: &str) -> FetchBuilder<'_> {
        self.request(Method::PUT, path)
    }

    /// Create a DELETE request
    pub fn delete(&self, path: &str) -> FetchBuilder<'_> {
        self.request(Method::DELETE, path)
    }
}

/// Helper for building and executing one request
pub struct FetchBuilder<'a> {
    client: &'a HttpClient,
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    timeout: Option<Duration>,
    fail_on_status: bool,
    invalid_header: Option<String>,
}

impl<'a> FetchBuilder<'a> {
    fn new(client: &'a HttpClient, method: Method, path: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            client,
            method,
            path: path.to_string(),
            headers,
            body: None,
            timeout: None,
            fail_on_status: true,
            invalid_header: None,
        }
    }

    /// Add a header to the request
    ///
    /// An invalid name or value is not sent; [`FetchBuilder::send`] then fails
    /// with [`Error::Config`] instead of issuing the request without it.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => {
                warn!("Dropping invalid header {:?}", name);
                self.invalid_header.get_or_insert_with(|| name.to_string());
            }
        }
        self
    }

    /// Add bearer token authentication to the request
    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("Authorization", &format!("Bearer {}", token))
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    /// Override the client's default timeout
    pub fn timeout(mut self, value: Duration) -> Self {
        self.timeout = Some(value);
        self
    }

    /// Return non-2xx responses instead of failing on them
    pub fn allow_failure(mut self) -> Self {
        self.fail_on_status = false;
        self
    }

    /// Execute the request and read the whole response
    pub async fn send(self) -> Result<ApiResponse> {
        if let Some(name) = self.invalid_header {
            return Err(Error::config(format!("invalid value for header {}", name)));
        }

        let url = self.client.url_for(&self.path)?;
        let timeout = self
            .timeout
            .unwrap_or(self.client.options.default_timeout);

        debug!("{} {}", self.method, url);

        let mut req = self
            .client
            .client
            .request(self.method.clone(), url.as_str())
            .headers(self.headers)
            .timeout(timeout);

        if let Some(body) = self.body {
            req = req.body(body);
        }

        let response = req.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let text = response.text().await?;

        if status >= 500 {
            error!("{} {} answered {}: {}", self.method, url, status, text);
        }

        if self.fail_on_status && !(200..300).contains(&status) {
            return Err(Error::UnexpectedStatus { status, body: text });
        }

        Ok(ApiResponse {
            status,
            headers,
            body: parse_body(&text),
        })
    }
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(base: &str) -> HttpClient {
        HttpClient::new(ClientOptions::for_base_url(base)).unwrap()
    }

    #[test]
    fn test_url_for_joins_paths() {
        let http = client("http://localhost:5000");
        assert_eq!(http.url_for("/items").unwrap().as_str(), "http://localhost:5000/items");
        assert_eq!(http.url_for("items/7").unwrap().as_str(), "http://localhost:5000/items/7");
        assert_eq!(http.url_for("/").unwrap().as_str(), "http://localhost:5000/");
    }

    #[test]
    fn test_url_for_keeps_base_path_and_query() {
        let http = client("http://localhost:5000/api/");
        assert_eq!(
            http.url_for("/items?page=2").unwrap().as_str(),
            "http://localhost:5000/api/items?page=2"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        let result = HttpClient::new(ClientOptions::for_base_url("mailto:ops@remwaste.test"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("{\"ok\":true}"), json!({"ok": true}));
        assert_eq!(parse_body("Not Found"), json!("Not Found"));
    }
}
