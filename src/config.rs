use crate::utils::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_BIND: &str = "ENGIFY_BIND";
pub const ENV_DATA_DIR: &str = "ENGIFY_DATA_DIR";
pub const ENV_BASE_URL: &str = "ENGIFY_BASE_URL";
pub const ENV_IMAGE_API_KEY: &str = "ENGIFY_IMAGE_API_KEY";

/// One year
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    /// Absolute origin used in sitemap and redirect URLs
    pub base_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub session_cookie: String,
    pub admin_roles: Vec<String>,
    pub session_ttl_hours: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketConfig {
    pub capacity: f64,
    pub refill_per_sec: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub admin_write: BucketConfig,
    pub image: BucketConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    pub endpoint: String,
    pub model: String,
    pub size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            base_url: "https://engify.ai".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("engify");
        Self {
            backend: StorageBackend::File,
            data_dir,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie: "engify_session".to_string(),
            admin_roles: vec!["admin".to_string(), "super_admin".to_string()],
            session_ttl_hours: 24 * 7,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            admin_write: BucketConfig { capacity: 30.0, refill_per_sec: 0.5 },
            image: BucketConfig { capacity: 3.0, refill_per_sec: 1.0 / 60.0 },
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/images/generations".to_string(),
            model: "dall-e-3".to_string(),
            size: "1024x1024".to_string(),
            api_key: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Config {
    pub fn load() -> AppResult<Self> {
        Self::load_custom(&Self::config_file_path())
    }

    pub fn ensure_config_exists() -> AppResult<()> {
        let config_path = Self::config_file_path();
        if !config_path.exists() {
            Config::default().save_to(&config_path)?;
        }
        Ok(())
    }

    pub fn load_custom(config_path: &Path) -> AppResult<Self> {
        let mut config = if config_path.exists() {
            let content =
                std::fs::read_to_string(config_path).map_err(|e| AppError::Io(e.to_string()))?;
            toml::from_str::<Config>(&content)
                .map_err(|e| AppError::System(format!("Failed to parse config file: {}", e)))?
        } else {
            let default_config = Config::default();
            default_config.save_to(config_path)?;
            default_config
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Environment variables win over file values
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = lookup(ENV_BIND).filter(|v| !v.is_empty()) {
            self.server.bind = bind;
        }
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.server.base_url = base_url;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup(ENV_IMAGE_API_KEY).filter(|v| !v.is_empty()) {
            self.image.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.auth.session_cookie.trim().is_empty() {
            return Err(AppError::System("Session cookie name cannot be empty".to_string()));
        }

        if self.auth.admin_roles.iter().all(|r| r.trim().is_empty()) {
            return Err(AppError::System("At least one admin role must be configured".to_string()));
        }

        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.auth.session_ttl_hours) {
            return Err(AppError::System(format!(
                "Session TTL must be between 1 and {} hours",
                MAX_SESSION_TTL_HOURS
            )));
        }

        for (name, bucket) in [
            ("admin_write", &self.rate_limit.admin_write),
            ("image", &self.rate_limit.image),
        ] {
            if bucket.capacity < 1.0 || bucket.refill_per_sec <= 0.0 {
                return Err(AppError::System(format!(
                    "Rate limit '{}' needs capacity >= 1 and a positive refill rate",
                    name
                )));
            }
        }

        let base_url = &self.server.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(AppError::System(format!(
                "Base URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        Ok(())
    }

    /// Base URL without the trailing slash
    pub fn origin(&self) -> &str {
        self.server.base_url.trim_end_matches('/')
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&Self::config_file_path())
    }

    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Io(e.to_string()))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::System(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content).map_err(|e| AppError::Io(e.to_string()))?;

        Ok(())
    }

    pub fn config_file_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("engify")
            .join("config.toml")
    }
}
