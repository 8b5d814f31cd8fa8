mod fal;

use crate::types::ImageUrl;
use async_trait::async_trait;
use serde::Serialize;
use std::str::FromStr;
use std::time::Duration;

pub use fal::FalProvider;

/// Result type for image generation operations
pub type ImageGenResult<T> = Result<T, ImageGenError>;

/// Errors that can occur while talking to the image provider.
///
/// All variants are transport-level failures as far as the game is concerned;
/// an empty image list is a normal `Ok` outcome, not an error.
#[derive(Debug, thiserror::Error)]
pub enum ImageGenError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("Response parsing failed: {0}")]
    ParseError(String),
}

/// Request to generate candidate images for one player's prompt
#[derive(Debug, Clone)]
pub struct ImageRequest {
    /// The prompt text, passed through verbatim
    pub prompt: String,
    /// How many candidates to request
    pub count: u32,
    /// Provider size preset
    pub image_size: ImageSize,
    /// Whether the provider should run its safety checker
    pub safety_checker: bool,
}

/// Size presets accepted by the provider, with its exact wire spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageSize {
    #[serde(rename = "square")]
    Square,
    #[serde(rename = "square_hd")]
    SquareHd,
    #[serde(rename = "portrait_4_3")]
    Portrait43,
    #[serde(rename = "portrait_16_9")]
    Portrait169,
    #[serde(rename = "landscape_4_3")]
    Landscape43,
    #[serde(rename = "landscape_16_9")]
    Landscape169,
}

impl FromStr for ImageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "square" => Ok(ImageSize::Square),
            "square_hd" => Ok(ImageSize::SquareHd),
            "portrait_4_3" => Ok(ImageSize::Portrait43),
            "portrait_16_9" => Ok(ImageSize::Portrait169),
            "landscape_4_3" => Ok(ImageSize::Landscape43),
            "landscape_16_9" => Ok(ImageSize::Landscape169),
            other => Err(format!("unknown image size preset '{}'", other)),
        }
    }
}

/// Trait the game talks to instead of a concrete provider, so tests can
/// script outcomes.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generate candidate images for a prompt. An empty list is a valid
    /// response; `Err` means the round cannot proceed.
    async fn generate(&self, request: ImageRequest) -> ImageGenResult<Vec<ImageUrl>>;

    /// Get the name of this provider
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_size_wire_spelling() {
        assert_eq!(
            serde_json::to_string(&ImageSize::SquareHd).unwrap(),
            "\"square_hd\""
        );
        assert_eq!(
            serde_json::to_string(&ImageSize::Landscape169).unwrap(),
            "\"landscape_16_9\""
        );
    }

    #[test]
    fn test_image_size_from_str() {
        assert_eq!("square_hd".parse::<ImageSize>().unwrap(), ImageSize::SquareHd);
        assert_eq!(
            "portrait_4_3".parse::<ImageSize>().unwrap(),
            ImageSize::Portrait43
        );
        assert!("4k".parse::<ImageSize>().is_err());
    }
}
