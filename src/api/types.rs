//! api::types
//!
//! Request and response bodies of the release service.

use serde::{Deserialize, Serialize};

/// Body of a signed upload URL request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlRequest {
    /// SHA-256 of the archive.
    pub hash: String,
    /// Lowercased bucket path.
    pub upload_path: String,
    /// `android` or `ios`.
    pub platform: String,
    /// Release note shown in the console.
    pub release_note: String,
}

/// Signed upload URL response.
///
/// The URL is normally nested under `data`; a top-level `url` is accepted too.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignedUrlResponse {
    #[serde(default)]
    data: Option<SignedUrlData>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SignedUrlData {
    #[serde(default)]
    url: Option<String>,
}

impl SignedUrlResponse {
    /// The upload URL, if the service provided a non-empty one.
    pub fn url(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.url.as_deref())
            .or(self.url.as_deref())
            .filter(|u| !u.trim().is_empty())
    }
}

/// Body of a bundle promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteBundleRequest {
    pub project_id: String,
    pub hash: String,
    pub app_version: String,
    pub release_note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_mandatory: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_paused: Option<bool>,
}

/// Body of a release update.
///
/// Absent fields are omitted so the service leaves them unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReleaseRequest {
    pub project_id: String,
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_mandatory: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_paused: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_rolled_back: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollout_percent: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signed_url_request_uses_camel_case() {
        let body = SignedUrlRequest {
            hash: "abc".into(),
            upload_path: "org/project/v1".into(),
            platform: "android".into(),
            release_note: "fix".into(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "hash": "abc",
                "uploadPath": "org/project/v1",
                "platform": "android",
                "releaseNote": "fix"
            })
        );
    }

    #[test]
    fn signed_url_is_read_from_data() {
        let resp: SignedUrlResponse =
            serde_json::from_value(json!({"data": {"url": "https://s3/x"}})).unwrap();
        assert_eq!(resp.url(), Some("https://s3/x"));
    }

    #[test]
    fn signed_url_falls_back_to_top_level() {
        let resp: SignedUrlResponse = serde_json::from_value(json!({"url": "https://s3/y"})).unwrap();
        assert_eq!(resp.url(), Some("https://s3/y"));
    }

    #[test]
    fn empty_signed_url_is_none() {
        let resp: SignedUrlResponse =
            serde_json::from_value(json!({"data": {"url": ""}})).unwrap();
        assert_eq!(resp.url(), None);
    }

    #[test]
    fn rollout_percent_serializes_as_number() {
        let body = UpdateReleaseRequest {
            project_id: "p".into(),
            hash: "h".into(),
            release_note: None,
            is_mandatory: None,
            is_paused: Some(false),
            is_rolled_back: None,
            rollout_percent: Some(50),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["rolloutPercent"], json!(50));
        assert_eq!(value["isPaused"], json!(false));
        assert!(value.get("releaseNote").is_none());
    }
}
