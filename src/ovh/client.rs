//! OVHcloud Client
//!
//! Main client for interacting with the API, combining credentials
//! and HTTP functionality.

use super::auth::Credentials;
use super::http::OvhHttpClient;
use crate::config::Config;
use crate::error::Result;
use reqwest::Method;
use serde_json::Value;

/// Main API client
#[derive(Clone)]
pub struct OvhClient {
    pub credentials: Credentials,
    pub http: OvhHttpClient,
    base_url: String,
}

impl OvhClient {
    /// Create a client from the loaded configuration
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config.effective_endpoint()?;
        Ok(Self {
            credentials: Credentials::from_config(config),
            http: OvhHttpClient::new()?,
            base_url,
        })
    }

    /// Create a client targeting an explicit base URL (mock servers, other regions)
    pub fn with_base_url(base_url: &str, credentials: Credentials) -> Result<Self> {
        Ok(Self {
            credentials,
            http: OvhHttpClient::new()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the absolute URL of an API path (`/v1/cloud/project/...`)
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn call(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = self.url(path);
        self.http
            .send(method, &url, path, self.credentials.token(), body)
            .await
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Value> {
        self.call(Method::GET, path, None).await
    }

    /// Make a POST request
    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<Value> {
        self.call(Method::POST, path, body).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.call(Method::DELETE, path, None).await
    }

    /// Send a request with an HTTP method named in a resource definition
    pub async fn send(&self, method: &str, path: &str, body: Option<&Value>) -> Result<Value> {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|_| crate::Error::config(format!("unsupported HTTP method {method:?}")))?;
        self.call(method, path, body).await
    }
}

/// Encode a value for use as a single path segment
pub fn path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Format an API error for display
pub fn format_api_error(error: &crate::Error) -> String {
    super::http::format_api_error(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_and_path() {
        let client =
            OvhClient::with_base_url("https://eu.api.ovh.com/", Credentials::default()).unwrap();
        assert_eq!(
            client.url("/v1/cloud/project/p/region"),
            "https://eu.api.ovh.com/v1/cloud/project/p/region"
        );
        assert_eq!(client.url("1.0/me"), "https://eu.api.ovh.com/1.0/me");
    }

    #[test]
    fn test_path_segment_is_encoded() {
        assert_eq!(path_segment("urn:v1:eu:resource/x"), "urn%3Av1%3Aeu%3Aresource%2Fx");
        assert_eq!(path_segment("GRA11"), "GRA11");
    }
}
