pub mod http;

use crate::core::data::Prompt;
use crate::utils::error::AppResult;
use crate::utils::format::truncate_string;
use async_trait::async_trait;

pub use http::HttpImageGenerator;

const IMAGE_PROMPT_MAX: usize = 1_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub url: String,
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: ImageRequest) -> AppResult<GeneratedImage>;
}

/// Illustration brief for a library card: subject from the prompt, look from `style`
pub fn image_prompt_for(prompt: &Prompt, style: Option<&str>) -> String {
    let style = style
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("clean flat vector illustration, soft gradients, no text");

    let mut brief = format!(
        "Cover illustration for an AI prompt titled \"{}\" in the {} category.",
        prompt.title, prompt.category
    );
    if !prompt.description.is_empty() {
        brief.push_str(&format!(" It is about: {}.", prompt.description.trim_end_matches('.')));
    }
    brief.push_str(&format!(" Style: {}.", style.trim_end_matches('.')));

    truncate_string(&brief, IMAGE_PROMPT_MAX)
}
