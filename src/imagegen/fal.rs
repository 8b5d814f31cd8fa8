use super::*;
use crate::types::ImageUrl;
use reqwest::header;
use std::time::Instant;

/// Default per-request deadline. Generation that outlives this is treated as
/// a transport failure so the round can fall back instead of hanging.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// fal.ai provider, speaking the synchronous `fal.run` endpoint.
pub struct FalProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl FalProvider {
    /// Create a new provider for the given API key and model id
    /// (e.g. `fal-ai/imagen4/preview/fast`).
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            timeout: REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Serialize)]
struct FalRequest<'a> {
    prompt: &'a str,
    num_images: u32,
    image_size: ImageSize,
    enable_safety_checker: bool,
}

#[derive(Debug, serde::Deserialize)]
struct FalResponse {
    #[serde(default)]
    images: Vec<FalImage>,
}

#[derive(Debug, serde::Deserialize)]
struct FalImage {
    url: String,
}

#[async_trait]
impl ImageProvider for FalProvider {
    async fn generate(&self, request: ImageRequest) -> ImageGenResult<Vec<ImageUrl>> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            // A player who never typed anything gets an empty candidate list
            // without burning a provider call.
            return Ok(Vec::new());
        }

        let start = Instant::now();
        tracing::info!("Generating {} images for prompt: \"{}\"", request.count, prompt);

        let body = FalRequest {
            prompt,
            num_images: request.count,
            image_size: request.image_size,
            enable_safety_checker: request.safety_checker,
        };

        let url = format!("https://fal.run/{}", self.model);
        let response = tokio::time::timeout(
            self.timeout,
            self.http
                .post(&url)
                .header(header::AUTHORIZATION, format!("Key {}", self.api_key))
                .json(&body)
                .send(),
        )
        .await
        .map_err(|_| ImageGenError::Timeout(self.timeout))??;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(ImageGenError::ApiError(format!("{}: {}", status, detail)));
        }

        let parsed: FalResponse = response
            .json()
            .await
            .map_err(|e| ImageGenError::ParseError(e.to_string()))?;

        let urls: Vec<ImageUrl> = parsed.images.into_iter().map(|img| img.url).collect();
        tracing::info!(
            "Received {} images in {}ms",
            urls.len(),
            start.elapsed().as_millis()
        );

        Ok(urls)
    }

    fn name(&self) -> &str {
        "fal"
    }
}
