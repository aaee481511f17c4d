//! Generation client: prompt in, artifact reference out

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::config::GeneratorSettings;
use crate::error::{GenerationError, Result};

/// Successful generation response
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResponse {
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl GenerationResponse {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            thumbnail_url: None,
            metadata: None,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail_url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(thumbnail_url.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Map<String, serde_json::Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Remote generation service.
///
/// Implementations must fail rather than return a partial success: a missing
/// or blank `url` is [`GenerationError::EmptyResponse`], anything that goes
/// wrong on the wire is [`GenerationError::Transport`]. No retries.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn submit(&self, prompt: &str) -> std::result::Result<GenerationResponse, GenerationError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponseBody {
    #[serde(default)]
    url: Option<String>,
    #[serde(default, rename = "viewer_url")]
    viewer_url: Option<String>,
    #[serde(default, rename = "public_url")]
    public_url: Option<String>,
    #[serde(default, alias = "thumbnail_url")]
    thumbnail_url: Option<String>,
    #[serde(default)]
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Apply the response-shape rules to a raw response body
pub fn parse_response(body: &str) -> std::result::Result<GenerationResponse, GenerationError> {
    let parsed: GenerateResponseBody = serde_json::from_str(body)
        .map_err(|e| GenerationError::Transport(format!("invalid response body: {}", e)))?;

    let url = non_blank(parsed.url)
        .or_else(|| non_blank(parsed.viewer_url))
        .or_else(|| non_blank(parsed.public_url))
        .ok_or(GenerationError::EmptyResponse)?;

    let mut response = GenerationResponse::new(url);
    if let Some(thumbnail_url) = non_blank(parsed.thumbnail_url) {
        response = response.with_thumbnail(thumbnail_url);
    }
    if let Some(metadata) = parsed.metadata {
        response = response.with_metadata(metadata);
    }
    Ok(response)
}

/// HTTP client for a generation service speaking `POST {"text": ...}`
#[derive(Debug, Clone)]
pub struct HttpGenerationClient {
    endpoint: String,
    api_key: Option<String>,
    headers: HashMap<String, String>,
    http_client: reqwest::Client,
}

impl HttpGenerationClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key: None,
            headers: HashMap::new(),
            http_client,
        })
    }

    pub fn from_settings(settings: &GeneratorSettings) -> Result<Self> {
        let client = Self::new(
            settings.endpoint.trim(),
            Duration::from_secs(settings.timeout_secs),
        )?;
        Ok(match &settings.api_key {
            Some(key) => client.with_api_key(key.clone()),
            None => client,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn submit(&self, prompt: &str) -> std::result::Result<GenerationResponse, GenerationError> {
        let mut builder = self
            .http_client
            .post(&self.endpoint)
            .header("Content-Type", "application/json");

        if let Some(api_key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }

        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }

        tracing::debug!("Submitting generation request to {}", self.endpoint);

        let response = builder.json(&GenerateRequest { text: prompt }).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Transport(format!(
                "generation service error ({}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_response() {
        let response = parse_response(r#"{"url":"a.glb"}"#).unwrap();
        assert_eq!(response, GenerationResponse::new("a.glb"));
    }

    #[test]
    fn test_parse_full_response() {
        let response = parse_response(
            r#"{"url":"a.glb","thumbnailUrl":"a.png","metadata":{"wing_area":12.5}}"#,
        )
        .unwrap();
        assert_eq!(response.thumbnail_url.as_deref(), Some("a.png"));
        assert_eq!(
            response.metadata.unwrap().get("wing_area"),
            Some(&serde_json::json!(12.5))
        );
    }

    #[test]
    fn test_parse_snake_case_thumbnail() {
        let response = parse_response(r#"{"url":"a.glb","thumbnail_url":"t.png"}"#).unwrap();
        assert_eq!(response.thumbnail_url.as_deref(), Some("t.png"));
    }

    #[test]
    fn test_parse_viewer_url_fallback() {
        let response =
            parse_response(r#"{"viewer_url":"http://h/models/w.glb","source":"parametric"}"#)
                .unwrap();
        assert_eq!(response.url, "http://h/models/w.glb");
    }

    #[test]
    fn test_missing_or_blank_url_is_empty_response() {
        for body in [r#"{}"#, r#"{"url":null}"#, r#"{"url":"  "}"#, r#"{"thumbnailUrl":"x"}"#] {
            assert_eq!(
                parse_response(body),
                Err(GenerationError::EmptyResponse),
                "body: {}",
                body
            );
        }
    }

    #[test]
    fn test_undecodable_body_is_transport() {
        for body in ["", "not json", "42", r#"{"url":5}"#] {
            assert!(
                matches!(parse_response(body), Err(GenerationError::Transport(_))),
                "body: {}",
                body
            );
        }
    }

    #[test]
    fn test_from_settings() {
        let settings = GeneratorSettings {
            endpoint: " http://localhost:9/generate ".to_string(),
            timeout_secs: 5,
            api_key: Some("k".to_string()),
        };
        let client = HttpGenerationClient::from_settings(&settings).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9/generate");
        assert_eq!(client.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_extra_headers_accumulate() {
        let client = HttpGenerationClient::new("http://localhost:9/generate", Duration::from_secs(1))
            .unwrap()
            .with_header("X-Hangar-Client", "old")
            .with_header("X-Hangar-Client", "hangar-cli")
            .with_header("X-Trace", "1");
        assert_eq!(client.headers.len(), 2);
        assert_eq!(client.headers["X-Hangar-Client"], "hangar-cli");
    }
}
