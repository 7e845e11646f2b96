use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtError {
    #[error("API key is missing! Set the 'API_KEY' environment variable.")]
    MissingCredential,

    /// The remote model is still being loaded into memory. Retried internally.
    #[error("Model is loading (estimated time: {estimated_time} seconds)")]
    RemoteColdStart { estimated_time: f64 },

    #[error("API error: {0}")]
    RemoteError(String),

    #[error("Image decode error: {0}")]
    DecodeError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("timeout waiting for model")]
    RetriesExhausted { attempts: u32 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Response error: {0}")]
    ResponseError(String),

    #[error("Image encode error: {0}")]
    EncodeError(String),
}

impl ArtError {
    /// Only a cold-starting model is worth asking again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ArtError::RemoteColdStart { .. })
    }
}

impl From<reqwest::Error> for ArtError {
    fn from(err: reqwest::Error) -> Self {
        ArtError::TransportError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ArtError>;

#[cfg(feature = "server")]
impl actix_web::ResponseError for ArtError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            ArtError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ArtError::DecodeError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ArtError::RemoteError(_)
            | ArtError::TransportError(_)
            | ArtError::ResponseError(_)
            | ArtError::RemoteColdStart { .. } => StatusCode::BAD_GATEWAY,
            ArtError::RetriesExhausted { .. } => StatusCode::GATEWAY_TIMEOUT,
            ArtError::MissingCredential | ArtError::ConfigError(_) | ArtError::EncodeError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        actix_web::HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}
