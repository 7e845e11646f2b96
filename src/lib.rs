pub mod config;
pub mod error;
pub mod inference;
pub mod logger;
pub mod models;
pub mod postprocess;
#[cfg(feature = "server")]
pub mod server;
pub mod storage;

pub use config::ArtConfig;
pub use error::{ArtError, Result};
pub use inference::{
    ArtClient, ImageRequester, InferenceTransport, RawResponse, ReqwestTransport, RequesterConfig,
};
pub use models::{FilterChoice, GenerationRequest, Resolution};
pub use postprocess::{ImagePostprocessor, DOWNLOAD_FILENAME, DOWNLOAD_MIME};
pub use storage::{CacheKey, GenerationCache};
