pub mod filters;

use crate::{
    error::{ArtError, Result},
    models::FilterChoice,
};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

pub const DOWNLOAD_FILENAME: &str = "generated_art.png";
pub const DOWNLOAD_MIME: &str = "image/png";

/// Decodes generated bytes and applies one of the fixed filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagePostprocessor;

impl ImagePostprocessor {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes).map_err(|e| ArtError::DecodeError(e.to_string()))
    }

    pub fn apply(&self, bytes: &[u8], filter: FilterChoice) -> Result<DynamicImage> {
        let image = self.decode(bytes)?;
        log::debug!(
            "Applying filter {} to {}x{} image",
            filter,
            image.width(),
            image.height()
        );

        Ok(apply_filter(image, filter))
    }

    /// `apply` followed by PNG encoding, ready to serve as `generated_art.png`.
    pub fn render_png(&self, bytes: &[u8], filter: FilterChoice) -> Result<Vec<u8>> {
        let image = self.apply(bytes, filter)?;
        encode_png(&image)
    }
}

pub fn apply_filter(image: DynamicImage, filter: FilterChoice) -> DynamicImage {
    match filter {
        FilterChoice::None => image,
        FilterChoice::Blur => filters::blur(&image),
        FilterChoice::Sharpen => filters::sharpen(&image, filters::SHARPEN_FACTOR),
        FilterChoice::Grayscale => DynamicImage::ImageLuma8(image.to_luma8()),
    }
}

pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| ArtError::EncodeError(e.to_string()))?;
    Ok(buf)
}
