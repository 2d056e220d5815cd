//! api::errors
//!
//! Errors from talking to the release service.

use serde::Deserialize;
use thiserror::Error;

/// Errors from API requests.
///
/// Messages never include credential values.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the response not received.
    #[error("network error: {0}")]
    Network(String),

    /// The service rejected the credential.
    #[error("{message}")]
    Unauthorized {
        /// Message extracted from the response
        message: String,
    },

    /// The service answered with a non-success status.
    #[error("{message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response
        message: String,
    },

    /// The response body was not what the endpoint promises.
    #[error("invalid response from {endpoint}: {message}")]
    InvalidResponse {
        /// Endpoint that produced the response
        endpoint: String,
        /// Parse failure detail
        message: String,
    },

    /// A header value could not be encoded.
    #[error("invalid header value for '{0}'")]
    InvalidHeader(&'static str),
}

impl ApiError {
    /// HTTP status, when the service produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build an error from a failed response body.
    ///
    /// The service reports failures as `{ "errors": { "data": [{ "message": ... }] } }`.
    /// When that shape is absent the raw body is used.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = extract_message(body)
            .unwrap_or_else(|| format!("API Error: {} - {}", status, body.trim()));
        if status == 401 {
            ApiError::Unauthorized { message }
        } else {
            ApiError::Status { status, message }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(mut err: reqwest::Error) -> Self {
        // Pre-signed URLs carry their signature in the query string.
        if let Some(url) = err.url_mut() {
            url.set_query(None);
            url.set_fragment(None);
        }
        ApiError::Network(err.to_string())
    }
}

/// `url` without its query string, for logs and messages.
pub(crate) fn without_query(url: &str) -> &str {
    url.split_once(|c: char| c == '?' || c == '#')
        .map_or(url, |(base, _)| base)
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    errors: ErrorList,
}

#[derive(Deserialize)]
struct ErrorList {
    data: Vec<ErrorItem>,
}

#[derive(Deserialize)]
struct ErrorItem {
    message: String,
}

fn extract_message(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    envelope
        .errors
        .data
        .into_iter()
        .next()
        .map(|item| item.message)
        .filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_message_is_extracted() {
        let body = r#"{"errors":{"data":[{"message":"Project not found"}]}}"#;
        let err = ApiError::from_response(404, body);
        assert_eq!(err.to_string(), "Project not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn raw_body_is_used_without_envelope() {
        let err = ApiError::from_response(500, "upstream exploded\n");
        assert_eq!(err.to_string(), "API Error: 500 - upstream exploded");
    }

    #[test]
    fn unauthorized_is_classified() {
        let err = ApiError::from_response(401, "{}");
        assert!(matches!(err, ApiError::Unauthorized { .. }));
    }

    #[test]
    fn query_is_stripped_for_display() {
        assert_eq!(
            without_query("https://bucket.s3.amazonaws.com/build.zip?X-Amz-Signature=abc"),
            "https://bucket.s3.amazonaws.com/build.zip"
        );
        assert_eq!(without_query("https://bucket/build.zip"), "https://bucket/build.zip");
    }

    #[tokio::test]
    async fn network_errors_do_not_carry_the_query() {
        let err = reqwest::Client::new()
            .put("http://127.0.0.1:9/build.zip?X-Amz-Credential=key&X-Amz-Signature=secret")
            .send()
            .await
            .unwrap_err();

        let message = ApiError::from(err).to_string();
        assert!(message.contains("127.0.0.1:9/build.zip"), "{}", message);
        assert!(!message.contains("secret"), "{}", message);
        assert!(!message.contains("X-Amz-Credential"), "{}", message);
    }

    #[test]
    fn empty_error_list_falls_back_to_body() {
        let err = ApiError::from_response(400, r#"{"errors":{"data":[]}}"#);
        assert!(err.to_string().starts_with("API Error: 400"));
    }
}
