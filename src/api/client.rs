//! api::client
//!
//! Thin typed wrapper over reqwest for the release service.
//!
//! # Credentials
//!
//! A client carries at most one [`Credential`]. A session token travels in
//! `x-access-token`; a CI token travels in `x-ci-token` and also switches
//! the signed-URL request to its CI variant.
//!
//! # Example
//!
//! ```no_run
//! # async fn example() -> Result<(), stallion::api::ApiError> {
//! use stallion::api::{ApiClient, Credential};
//!
//! let client = ApiClient::new("https://stallion-api.redhorse.tech/api/v1")
//!     .with_credential(Credential::Session("token".into()));
//! client.verify_session().await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::endpoints;
use super::errors::{without_query, ApiError};
use super::types::{
    PromoteBundleRequest, SignedUrlRequest, SignedUrlResponse, UpdateReleaseRequest,
};

/// A credential attached to outgoing requests.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Interactive session token from `login`.
    Session(String),
    /// Short-lived CI token passed on the command line.
    Ci(String),
}

impl Credential {
    fn header_name(&self) -> &'static str {
        match self {
            Credential::Session(_) => endpoints::ACCESS_TOKEN_HEADER,
            Credential::Ci(_) => endpoints::CI_TOKEN_HEADER,
        }
    }

    fn value(&self) -> &str {
        match self {
            Credential::Session(v) | Credential::Ci(v) => v,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Session(_) => f.write_str("Session([REDACTED])"),
            Credential::Ci(_) => f.write_str("Ci([REDACTED])"),
        }
    }
}

/// Client for the release service API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    credential: Option<Credential>,
}

impl ApiClient {
    /// Create an unauthenticated client for `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credential: None,
        }
    }

    /// Attach a credential to every request made by this client.
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Get the API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check whether requests carry a CI token.
    pub fn uses_ci_token(&self) -> bool {
        matches!(self.credential, Some(Credential::Ci(_)))
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    fn headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(credential) = &self.credential {
            let name = credential.header_name();
            let value =
                HeaderValue::from_str(credential.value()).map_err(|_| ApiError::InvalidHeader(name))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: &str,
    ) -> Result<T, ApiError> {
        let response = request.headers(self.headers()?).send().await?;
        Self::handle_response(response, endpoint).await
    }

    async fn handle_response<T: DeserializeOwned>(
        response: Response,
        endpoint: &str,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), &body));
        }

        let body = if body.trim().is_empty() { "null" } else { &body };
        serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    /// GET a JSON document.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        log::debug!("GET {}", path);
        self.send(self.client.get(self.url(path)), path).await
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        log::debug!("POST {}", path);
        self.send(self.client.post(self.url(path)).json(body), path)
            .await
    }

    /// PUT raw bytes to an absolute URL.
    ///
    /// Credentials are not forwarded: the target is a pre-signed storage URL.
    pub async fn put_bytes(
        &self,
        url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ApiError> {
        log::debug!("PUT {} ({} bytes)", without_query(url), bytes.len());
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_response(status.as_u16(), &body))
        }
    }

    /// Fetch the profile of the session owner.
    ///
    /// Succeeds only when the attached token is accepted.
    pub async fn verify_session(&self) -> Result<serde_json::Value, ApiError> {
        self.get(endpoints::USER_PROFILE).await
    }

    /// Ask for a pre-signed upload URL.
    ///
    /// The CI variant of the endpoint is used when a CI token is attached.
    pub async fn request_signed_url(
        &self,
        request: &SignedUrlRequest,
    ) -> Result<SignedUrlResponse, ApiError> {
        let endpoint = if self.uses_ci_token() {
            endpoints::GENERATE_SIGNED_URL_WITH_CI_TOKEN
        } else {
            endpoints::GENERATE_SIGNED_URL
        };
        self.post(endpoint, request).await
    }

    /// Promote an uploaded bundle to an app version.
    pub async fn promote_bundle(
        &self,
        request: &PromoteBundleRequest,
    ) -> Result<serde_json::Value, ApiError> {
        self.post(endpoints::PROMOTE_BUNDLE, request).await
    }

    /// Update an existing release.
    pub async fn update_release(
        &self,
        request: &UpdateReleaseRequest,
    ) -> Result<serde_json::Value, ApiError> {
        self.post(endpoints::UPDATE_RELEASE, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:1234/api/v1/");
        assert_eq!(client.base_url(), "http://localhost:1234/api/v1");
        assert_eq!(
            client.url(endpoints::USER_PROFILE),
            "http://localhost:1234/api/v1/auth/user-profile"
        );
    }

    #[test]
    fn absolute_urls_are_used_verbatim() {
        let client = ApiClient::new("http://localhost");
        assert_eq!(client.url("https://bucket/x?sig=1"), "https://bucket/x?sig=1");
    }

    #[test]
    fn session_credential_uses_access_token_header() {
        let client =
            ApiClient::new("http://localhost").with_credential(Credential::Session("tok".into()));
        let headers = client.headers().unwrap();
        assert_eq!(headers.get("x-access-token").unwrap(), "tok");
        assert!(headers.get("x-ci-token").is_none());
        assert!(!client.uses_ci_token());
    }

    #[test]
    fn ci_credential_uses_ci_header() {
        let client = ApiClient::new("http://localhost").with_credential(Credential::Ci("ci".into()));
        let headers = client.headers().unwrap();
        assert_eq!(headers.get("x-ci-token").unwrap(), "ci");
        assert!(client.uses_ci_token());
    }

    #[test]
    fn debug_never_prints_tokens() {
        let client =
            ApiClient::new("http://localhost").with_credential(Credential::Ci("secret-ci".into()));
        assert!(!format!("{:?}", client).contains("secret-ci"));
    }

    #[test]
    fn invalid_header_value_is_rejected() {
        let client =
            ApiClient::new("http://localhost").with_credential(Credential::Session("bad\nvalue".into()));
        assert!(matches!(client.headers(), Err(ApiError::InvalidHeader(_))));
    }
}
