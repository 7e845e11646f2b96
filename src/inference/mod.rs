pub mod image_client;
pub mod transport;

use crate::{
    config::ArtConfig,
    error::Result,
    models::{FilterChoice, GenerationRequest},
    postprocess::ImagePostprocessor,
    storage::{CacheKey, GenerationCache},
};
use image::DynamicImage;
use std::sync::Arc;

pub use image_client::{ImageRequester, RequesterConfig};
pub use transport::{InferenceTransport, RawResponse, ReqwestTransport};

#[derive(Clone)]
pub struct ArtClient {
    requester: ImageRequester,
    postprocessor: ImagePostprocessor,
    cache: Option<Arc<GenerationCache>>,
}

impl ArtClient {
    /// Build a client talking to the configured endpoint over HTTP.
    pub fn new(config: &ArtConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(
        config: &ArtConfig,
        transport: Arc<dyn InferenceTransport>,
    ) -> Result<Self> {
        let requester = ImageRequester::new(transport, RequesterConfig::from_config(config)?)?;

        let cache = if config.cache_capacity > 0 {
            Some(Arc::new(GenerationCache::new(config.cache_capacity)))
        } else {
            None
        };

        Ok(Self {
            requester,
            postprocessor: ImagePostprocessor::new(),
            cache,
        })
    }

    pub fn requester(&self) -> &ImageRequester {
        &self.requester
    }

    pub fn postprocessor(&self) -> &ImagePostprocessor {
        &self.postprocessor
    }

    pub fn cache(&self) -> Option<&Arc<GenerationCache>> {
        self.cache.as_ref()
    }

    /// Raw image bytes for the request, reusing an earlier result for the same
    /// prompt and resolution when caching is enabled.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Arc<Vec<u8>>> {
        match &self.cache {
            Some(cache) => {
                let key = CacheKey::new(request.prompt.clone(), request.resolution);
                cache
                    .get_or_generate(key, || {
                        self.requester
                            .generate(&request.prompt, request.resolution)
                    })
                    .await
            }
            None => self
                .requester
                .generate(&request.prompt, request.resolution)
                .await
                .map(Arc::new),
        }
    }

    /// Generate and decode in one step, applying `filter` to the result.
    pub async fn generate_image(
        &self,
        request: &GenerationRequest,
        filter: FilterChoice,
    ) -> Result<DynamicImage> {
        let bytes = self.generate(request).await?;
        self.postprocessor.apply(&bytes, filter)
    }
}
