use crate::{
    config::{ArtConfig, DEFAULT_ENDPOINT, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY},
    error::{ArtError, Result},
    inference::transport::{InferenceTransport, RawResponse},
    models::{InferenceErrorBody, Resolution},
};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct RequesterConfig {
    pub credential: String,
    pub endpoint: String,
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl fmt::Debug for RequesterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequesterConfig")
            .field("credential", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("max_attempts", &self.max_attempts)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

impl RequesterConfig {
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn from_config(config: &ArtConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            credential: config.credential()?.to_string(),
            endpoint: config.endpoint.clone(),
            max_attempts: config.max_attempts,
            retry_delay: config.retry_delay,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_retry_policy(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.retry_delay = retry_delay;
        self
    }
}

#[derive(Clone)]
pub struct ImageRequester {
    transport: Arc<dyn InferenceTransport>,
    config: RequesterConfig,
}

impl ImageRequester {
    /// Refuses to build without a credential so no unauthenticated request is ever sent.
    pub fn new(transport: Arc<dyn InferenceTransport>, config: RequesterConfig) -> Result<Self> {
        if config.credential.trim().is_empty() {
            return Err(ArtError::MissingCredential);
        }
        if config.max_attempts == 0 {
            return Err(ArtError::ConfigError(
                "max_attempts must be at least 1".into(),
            ));
        }

        Ok(Self { transport, config })
    }

    pub fn config(&self) -> &RequesterConfig {
        &self.config
    }

    /// Generate raw image bytes for a prompt, waiting out a cold-starting model.
    ///
    /// The prompt is expected to be non-empty; callers validate it. The
    /// resolution only produces a logged size hint, nothing is sent for it.
    pub async fn generate(&self, prompt: &str, resolution: Resolution) -> Result<Vec<u8>> {
        let (width, height) = resolution.dimensions();
        log::debug!(
            "Resolution hint {} -> {}x{} (not transmitted)",
            resolution,
            width,
            height
        );

        let max_attempts = self.config.max_attempts;

        for attempt in 1..=max_attempts {
            match self.attempt(prompt).await {
                Ok(bytes) => {
                    log::info!(
                        "🎨 Received {} bytes of image data on attempt {}/{}",
                        bytes.len(),
                        attempt,
                        max_attempts
                    );
                    return Ok(bytes);
                }
                Err(e) if e.is_retryable() => {
                    if attempt == max_attempts {
                        break;
                    }
                    log::info!(
                        "⏳ {}. Retrying in {} seconds...",
                        e,
                        self.config.retry_delay.as_secs()
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(e) => {
                    log::error!("❌ {}", e);
                    return Err(e);
                }
            }
        }

        log::error!("⚠️  Model took too long to load. Please try again later.");
        Err(ArtError::RetriesExhausted {
            attempts: max_attempts,
        })
    }

    async fn attempt(&self, prompt: &str) -> Result<Vec<u8>> {
        let payload = json!({ "inputs": prompt });

        let response = self
            .transport
            .post_json(&self.config.endpoint, &self.config.credential, &payload)
            .await?;

        interpret_response(response)
    }
}

/// JSON bodies are errors (cold start or hard failure); anything else is the image.
fn interpret_response(response: RawResponse) -> Result<Vec<u8>> {
    if !response.is_json() {
        return Ok(response.body);
    }

    let body: InferenceErrorBody = serde_json::from_slice(&response.body)
        .map_err(|e| ArtError::ResponseError(format!("malformed JSON body: {}", e)))?;

    if body.is_loading() {
        return Err(ArtError::RemoteColdStart {
            estimated_time: body.estimated_secs(),
        });
    }

    Err(ArtError::RemoteError(
        body.error_text()
            .unwrap_or_else(|| "Unknown error".to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_response(body: &str) -> RawResponse {
        RawResponse {
            status: 503,
            content_type: Some("application/json".into()),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn binary_body_is_returned_verbatim() {
        let response = RawResponse {
            status: 200,
            content_type: Some("image/jpeg".into()),
            body: vec![0xFF, 0xD8, 0xFF],
        };
        assert_eq!(interpret_response(response).unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn loading_without_estimate_defaults_to_zero() {
        let err = interpret_response(json_response(r#"{"error":"Model is currently loading"}"#))
            .unwrap_err();
        assert!(
            matches!(err, ArtError::RemoteColdStart { estimated_time } if estimated_time == 0.0)
        );
    }

    #[test]
    fn non_numeric_estimate_still_means_cold_start() {
        let err = interpret_response(json_response(
            r#"{"error":"Model is currently loading","estimated_time":"20.5"}"#,
        ))
        .unwrap_err();
        assert!(err.is_retryable());
        assert!(
            matches!(err, ArtError::RemoteColdStart { estimated_time } if estimated_time == 20.5)
        );

        let err = interpret_response(json_response(
            r#"{"error":"Model is currently loading","estimated_time":[1]}"#,
        ))
        .unwrap_err();
        assert!(
            matches!(err, ArtError::RemoteColdStart { estimated_time } if estimated_time == 0.0)
        );
    }

    #[test]
    fn json_without_error_field_is_unknown_error() {
        let err = interpret_response(json_response("{}")).unwrap_err();
        assert!(matches!(err, ArtError::RemoteError(ref reason) if reason == "Unknown error"));
    }

    #[test]
    fn malformed_json_is_a_response_error() {
        let err = interpret_response(json_response("{not json")).unwrap_err();
        assert!(matches!(err, ArtError::ResponseError(_)));
    }
}
