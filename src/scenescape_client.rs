//! SceneScape REST client
//!
//! Catalogue lookup adapter. Consumed once at startup: the scene
//! inventory gives events their display names, so an unreachable or
//! empty catalogue is fatal. Unknown ids at runtime are still tolerated
//! downstream via placeholder naming.

use crate::error::{Error, Result};
use crate::models::SceneRecord;
use crate::scene_registry::SceneRegistry;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use std::time::Duration;

/// Catalogue response envelope
#[derive(Debug, Deserialize)]
struct ScenesResponse {
    #[serde(default)]
    results: Vec<SceneSummary>,
}

/// One scene as the REST API reports it
#[derive(Debug, Deserialize)]
struct SceneSummary {
    uid: String,

    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    status: Option<String>,
}

impl SceneSummary {
    fn into_record(self) -> SceneRecord {
        let display_name = self
            .name
            .unwrap_or_else(|| SceneRegistry::placeholder_name(&self.uid));
        SceneRecord {
            id: self.uid,
            display_name,
            status: self.status.unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

/// SceneScape REST API client
pub struct SceneScapeClient {
    client: reqwest::Client,
    base_url: String,
}

impl SceneScapeClient {
    /// Create a client with token authentication.
    ///
    /// `verify_ssl = false` accepts the self-signed certificate the
    /// tracking service ships with.
    pub fn new(base_url: &str, api_token: &str, verify_ssl: bool) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut token = HeaderValue::from_str(&format!("Token {api_token}"))
            .map_err(|e| Error::Config(format!("Invalid API token: {e}")))?;
        token.set_sensitive(true);
        headers.insert(AUTHORIZATION, token);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(!verify_ssl)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the scene catalogue.
    ///
    /// Any transport failure, non-success status, invalid envelope or an
    /// empty scene list maps to `Error::UnavailableService`.
    pub async fn get_scenes(&self) -> Result<Vec<SceneRecord>> {
        let url = format!("{}/scenes", self.base_url);
        tracing::debug!(url = %url, "Fetching scene catalogue");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::UnavailableService(format!("{url}: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::UnavailableService(format!(
                "{} returned {}",
                url,
                resp.status()
            )));
        }

        let body: ScenesResponse = resp
            .json()
            .await
            .map_err(|e| Error::UnavailableService(format!("Invalid scene list from {url}: {e}")))?;

        if body.results.is_empty() {
            return Err(Error::UnavailableService(
                "No scenes found in catalogue response".to_string(),
            ));
        }

        Ok(body.results.into_iter().map(SceneSummary::into_record).collect())
    }

    /// Base URL the client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_envelope_decode() {
        let body: ScenesResponse = serde_json::from_str(
            r#"{
                "results": [
                    {"uid": "3bc091c7-e449-46a0-9540-29c499bca18c", "name": "Lobby", "status": "active"},
                    {"uid": "9f2d11aa-0001-4aaa-bbbb-1234567890ab"}
                ]
            }"#,
        )
        .unwrap();

        let records: Vec<SceneRecord> =
            body.results.into_iter().map(SceneSummary::into_record).collect();

        assert_eq!(records[0].id, "3bc091c7-e449-46a0-9540-29c499bca18c");
        assert_eq!(records[0].display_name, "Lobby");
        assert_eq!(records[0].status, "active");

        // Missing name falls back to the placeholder, missing status to unknown
        assert_eq!(records[1].display_name, "Scene-9f2d11aa");
        assert_eq!(records[1].status, "unknown");
    }

    #[test]
    fn test_envelope_without_results_decodes_empty() {
        let body: ScenesResponse = serde_json::from_str("{}").unwrap();
        assert!(body.results.is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = SceneScapeClient::new("https://scenescape/api/v1/", "tok", false).unwrap();
        assert_eq!(client.base_url(), "https://scenescape/api/v1");
    }
}
