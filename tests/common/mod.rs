#![allow(dead_code)]

use artgen::{ArtError, InferenceTransport, RawResponse, Result};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub bearer: String,
    pub body: serde_json::Value,
}

/// Plays back canned responses in order and records every call.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Result<RawResponse>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<RawResponse>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl InferenceTransport for ScriptedTransport {
    async fn post_json(
        &self,
        url: &str,
        bearer: &str,
        body: &serde_json::Value,
    ) -> Result<RawResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            bearer: bearer.to_string(),
            body: body.clone(),
        });
        tokio::task::yield_now().await;

        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ArtError::TransportError("script exhausted".into())))
    }
}

pub fn image_response(bytes: Vec<u8>) -> Result<RawResponse> {
    Ok(RawResponse {
        status: 200,
        content_type: Some("image/png".into()),
        body: bytes,
    })
}

pub fn json_response(status: u16, body: serde_json::Value) -> Result<RawResponse> {
    Ok(RawResponse {
        status,
        content_type: Some("application/json".into()),
        body: serde_json::to_vec(&body).unwrap(),
    })
}

pub fn loading_response(estimated_time: f64) -> Result<RawResponse> {
    json_response(
        503,
        serde_json::json!({
            "error": "Model stabilityai/stable-diffusion-2-1 is currently loading",
            "estimated_time": estimated_time,
        }),
    )
}

pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 40 % 256) as u8, (y * 40 % 256) as u8, 128])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}
