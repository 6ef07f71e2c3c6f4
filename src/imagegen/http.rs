use super::{GeneratedImage, ImageGenerator, ImageRequest};
use crate::config::ImageConfig;
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    n: u8,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    data: Vec<GenerationData>,
}

#[derive(Debug, Deserialize)]
struct GenerationData {
    url: Option<String>,
}

/// Client for an OpenAI-compatible `images/generations` endpoint
pub struct HttpImageGenerator {
    client: Client,
    config: ImageConfig,
}

impl HttpImageGenerator {
    pub fn new(config: ImageConfig) -> AppResult<Self> {
        Ok(Self {
            client: Client::builder()
                .user_agent(concat!("engify/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(90))
                .build()
                .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?,
            config,
        })
    }

    fn api_key(&self) -> AppResult<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AppError::Unavailable(
                    "Image generation is not configured. Set image.api_key or ENGIFY_IMAGE_API_KEY".to_string(),
                )
            })
    }
}

fn first_url(response: GenerationResponse) -> AppResult<String> {
    response
        .data
        .into_iter()
        .find_map(|d| d.url)
        .ok_or_else(|| AppError::Network("Image provider returned no image URL".to_string()))
}

#[async_trait]
impl ImageGenerator for HttpImageGenerator {
    async fn generate(&self, request: ImageRequest) -> AppResult<GeneratedImage> {
        let api_key = self.api_key()?;

        let body = GenerationRequest {
            model: &self.config.model,
            prompt: &request.prompt,
            size: &self.config.size,
            n: 1,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Failed to reach image provider: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Network(format!(
                "Image generation failed: {} - {}",
                status, error_text
            )));
        }

        let parsed: GenerationResponse = response
            .json()
            .await
            .map_err(|e| AppError::Network(format!("Failed to parse image response: {}", e)))?;

        let url = first_url(parsed)?;
        tracing::info!(model = %self.config.model, "image generated");
        Ok(GeneratedImage { url })
    }
}
