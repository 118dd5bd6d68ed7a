//! HTTP utilities for OVHcloud REST API calls

use crate::error::{Error, Result};
use reqwest::{Client, Method};
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Extract the human readable message of an API error body.
///
/// The API answers errors as `{"class": "...", "message": "..."}`; anything
/// else falls back to the raw (sanitized) body.
fn api_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
}

/// HTTP client wrapper for API calls
#[derive(Clone)]
pub struct OvhHttpClient {
    client: Client,
}

impl OvhHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ovhcloud/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Send a request and decode the JSON answer.
    ///
    /// `endpoint` is the API path, kept in errors so failures can be traced
    /// back to the call that produced them. Empty bodies decode to `Null`.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        endpoint: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Value> {
        tracing::debug!("{} {}", method, url);

        let transport_error = |status: Option<u16>, message: String| Error::Transport {
            method: method.to_string(),
            endpoint: endpoint.to_string(),
            status,
            message,
        };

        let mut request = self
            .client
            .request(method.clone(), url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(None, format!("failed to send request: {e}")))?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| transport_error(Some(status.as_u16()), format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&response_body));
            let message = match api_error_message(&response_body) {
                Some(message) => format!("{status}: {message}"),
                None => status.to_string(),
            };
            return Err(transport_error(Some(status.as_u16()), message));
        }

        if response_body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response_body).map_err(|e| {
            transport_error(
                Some(status.as_u16()),
                format!("failed to parse response JSON: {e}"),
            )
        })
    }
}

/// Format an API error for display, with a hint for the common statuses
pub fn format_api_error(error: &Error) -> String {
    let hint = match error.status() {
        Some(401) => Some("check the access token in your configuration or OVH_ACCESS_TOKEN"),
        Some(403) => Some("your credentials are not allowed to perform this call"),
        Some(429) => Some("rate limit exceeded, please try again later"),
        Some(500..=599) => Some("the API is temporarily unavailable, please try again"),
        _ => None,
    };

    match hint {
        Some(hint) => format!("{error} ({hint})"),
        None => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.contains("500 bytes total"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("line1\nline2\t"), "line1line2");
    }

    #[test]
    fn test_api_error_message() {
        assert_eq!(
            api_error_message(r#"{"class":"Client::NotFound","message":"This service does not exist"}"#),
            Some("This service does not exist".to_string())
        );
        assert_eq!(api_error_message("<html>oops</html>"), None);
    }

    #[test]
    fn test_format_api_error_adds_hint() {
        let err = Error::Transport {
            method: "GET".into(),
            endpoint: "/1.0/me".into(),
            status: Some(401),
            message: "401 Unauthorized".into(),
        };
        let formatted = format_api_error(&err);
        assert!(formatted.starts_with("GET /1.0/me failed: 401 Unauthorized"));
        assert!(formatted.contains("access token"));
    }
}
