//! Startup configuration, loaded once from the environment.
//!
//! Anything missing or malformed here is fatal: the process refuses to serve
//! rather than run a misconfigured game.

use crate::imagegen::ImageSize;
use std::fmt::Display;
use std::net::IpAddr;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value '{value}' for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Rules of a battle round, carried into the state machine.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Candidate images requested per player
    pub images_per_player: u32,
    /// Length of the prompting countdown in seconds
    pub prompt_seconds: u32,
    /// Provider size preset
    pub image_size: ImageSize,
    /// Whether the provider runs its safety checker
    pub safety_checker: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            images_per_player: 3,
            prompt_seconds: 60,
            image_size: ImageSize::SquareHd,
            safety_checker: false,
        }
    }
}

/// Full startup configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind IP
    pub bind: IpAddr,
    /// Bind port
    pub port: u16,
    /// fal.ai credential
    pub fal_key: String,
    /// Provider model id
    pub model: String,
    pub game: GameConfig,
}

impl AppConfig {
    /// Load configuration from environment variables. Call after dotenvy has
    /// had its chance to populate the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let fal_key = var("FAL_KEY").ok_or(ConfigError::Missing("FAL_KEY"))?;

        let bind = parse_var("BIND_ADDR", IpAddr::from([0, 0, 0, 0]))?;
        let port = parse_var("PORT", 3000u16)?;
        let model =
            var("FAL_MODEL").unwrap_or_else(|| "fal-ai/imagen4/preview/fast".to_string());

        let images_per_player = parse_var("IMAGES_PER_PLAYER", 3u32)?;
        let prompt_seconds = parse_var("PROMPT_SECONDS", 60u32)?;
        if prompt_seconds == 0 {
            return Err(ConfigError::Invalid {
                name: "PROMPT_SECONDS",
                value: "0".to_string(),
                reason: "countdown must be at least one second".to_string(),
            });
        }

        let image_size = parse_var("IMAGE_SIZE", ImageSize::SquareHd)?;
        let safety_checker = parse_flag("SAFETY_CHECKER", false)?;

        Ok(Self {
            bind,
            port,
            fal_key,
            model,
            game: GameConfig {
                images_per_player,
                prompt_seconds,
                image_size,
                safety_checker,
            },
        })
    }

    /// The URL clients should open their WebSocket against
    pub fn socket_url(&self) -> String {
        format!("http://{}:{}", self.bind, self.port)
    }
}

fn var(name: &'static str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match var(name) {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_flag(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match var(name) {
        Some(value) => match value.to_lowercase().as_str() {
            "1" | "true" => Ok(true),
            "0" | "false" => Ok(false),
            _ => Err(ConfigError::Invalid {
                name,
                value,
                reason: "expected one of 1/0/true/false".to_string(),
            }),
        },
        None => Ok(default),
    }
}
