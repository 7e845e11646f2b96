use crate::error::{ArtError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// What came back from one POST, before any interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map_or(false, |ct| ct.starts_with("application/json"))
    }
}

#[async_trait]
pub trait InferenceTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        bearer: &str,
        body: &serde_json::Value,
    ) -> Result<RawResponse>;
}

#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(request_timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ArtError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl InferenceTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        bearer: &str,
        body: &serde_json::Value,
    ) -> Result<RawResponse> {
        let response = self
            .client
            .post(url)
            .bearer_auth(bearer)
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        let body = response.bytes().await?.to_vec();

        log::debug!(
            "POST {} -> {} ({}, {} bytes)",
            url,
            status,
            content_type.as_deref().unwrap_or("no content type"),
            body.len()
        );

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}
