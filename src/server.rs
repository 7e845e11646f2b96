//! HTTP front end: takes a prompt, returns the generated (and filtered) PNG.

use crate::{
    error::{ArtError, Result},
    inference::ArtClient,
    logger,
    models::{FilterChoice, GenerationOptions, GenerationRequest, Resolution, ResolutionInfo},
    postprocess::{encode_png, DOWNLOAD_FILENAME, DOWNLOAD_MIME},
};
use actix_web::{
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web, App, HttpResponse, HttpServer,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

pub const GENERATION_TIME_HEADER: &str = "X-Generation-Time-Ms";

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateBody {
    pub prompt: String,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
}

impl GenerateBody {
    fn parse(&self) -> Result<(GenerationRequest, FilterChoice)> {
        if self.prompt.trim().is_empty() {
            return Err(ArtError::InvalidRequest(
                "Please enter a prompt to generate an image.".into(),
            ));
        }

        let resolution = self
            .resolution
            .as_deref()
            .map(Resolution::from_label)
            .unwrap_or_default();

        let filter = match self.filter.as_deref() {
            None => FilterChoice::None,
            Some(label) => FilterChoice::from_label(label).ok_or_else(|| {
                ArtError::InvalidRequest(format!("unknown filter '{}'", label))
            })?,
        };

        Ok((GenerationRequest::new(self.prompt.clone(), resolution), filter))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub image_base64: String,
    pub width: u32,
    pub height: u32,
    pub resolution_hint: ResolutionInfo,
    pub filter: String,
    pub elapsed_ms: u64,
}

struct Rendered {
    png: Vec<u8>,
    image: DynamicImage,
    elapsed_ms: u64,
}

async fn render(
    client: &ArtClient,
    body: &GenerateBody,
) -> Result<(GenerationRequest, FilterChoice, Rendered)> {
    let (request, filter) = body.parse()?;
    let request_id = Uuid::new_v4();
    let started = Instant::now();

    log::info!(
        "[req:{}] Generating '{}' at {} with filter {}",
        request_id,
        request.prompt,
        request.resolution,
        filter
    );

    let _timer = logger::timer(&format!("[req:{}] image generation", request_id));
    let bytes = client.generate(&request).await?;

    let postprocessor = *client.postprocessor();
    let (image, png) = web::block(move || -> Result<(DynamicImage, Vec<u8>)> {
        let image = postprocessor.apply(&bytes, filter)?;
        let png = encode_png(&image)?;
        Ok((image, png))
    })
    .await
    .map_err(|e| ArtError::EncodeError(format!("image worker failed: {}", e)))??;

    let elapsed_ms = started.elapsed().as_millis() as u64;
    Ok((
        request,
        filter,
        Rendered {
            png,
            image,
            elapsed_ms,
        },
    ))
}

async fn generate(
    client: web::Data<ArtClient>,
    body: web::Json<GenerateBody>,
) -> Result<HttpResponse> {
    let (_, _, rendered) = render(&client, &body).await?;

    Ok(HttpResponse::Ok()
        .content_type(DOWNLOAD_MIME)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(DOWNLOAD_FILENAME.to_string())],
        })
        .insert_header((GENERATION_TIME_HEADER, rendered.elapsed_ms.to_string()))
        .body(rendered.png))
}

async fn preview(
    client: web::Data<ArtClient>,
    body: web::Json<GenerateBody>,
) -> Result<HttpResponse> {
    let (request, filter, rendered) = render(&client, &body).await?;

    Ok(HttpResponse::Ok().json(PreviewResponse {
        image_base64: STANDARD.encode(&rendered.png),
        width: rendered.image.width(),
        height: rendered.image.height(),
        resolution_hint: request.resolution.into(),
        filter: filter.to_string(),
        elapsed_ms: rendered.elapsed_ms,
    }))
}

async fn options() -> HttpResponse {
    HttpResponse::Ok().json(GenerationOptions::available())
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    ArtError::InvalidRequest(err.to_string()).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .route("/health", web::get().to(health))
        .route("/options", web::get().to(options))
        .route("/generate", web::post().to(generate))
        .route("/generate/preview", web::post().to(preview));
}

pub async fn run(client: ArtClient, port: u16) -> std::io::Result<()> {
    let data = web::Data::new(client);

    HttpServer::new(move || App::new().app_data(data.clone()).configure(configure))
        .bind(("0.0.0.0", port))?
        .run()
        .await
}
