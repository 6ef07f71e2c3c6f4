use crate::config::{BucketConfig, RateLimitConfig};
use crate::utils::error::{AppError, AppResult};
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::Mutex;

/// Rate-limited admin actions, each with its own bucket per user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateAction {
    AdminWrite,
    ImageGeneration,
}

impl RateAction {
    fn as_str(&self) -> &'static str {
        match self {
            RateAction::AdminWrite => "admin-write",
            RateAction::ImageGeneration => "image",
        }
    }

    fn bucket<'a>(&self, config: &'a RateLimitConfig) -> &'a BucketConfig {
        match self {
            RateAction::AdminWrite => &config.admin_write,
            RateAction::ImageGeneration => &config.image,
        }
    }
}

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// In-process token buckets keyed by action and user
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, Bucket>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Take one token, or fail with the seconds until one is available
    pub async fn check(&self, action: RateAction, user: &str) -> AppResult<()> {
        let cfg = action.bucket(&self.config);
        let key = format!("{}:{}", action.as_str(), user);

        let now = Instant::now();
        let mut lock = self.buckets.lock().await;
        let bucket = lock.entry(key).or_insert_with(|| Bucket {
            tokens: cfg.capacity,
            last_refill: now,
        });
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.last_refill = now;
        bucket.tokens = (bucket.tokens + (elapsed * cfg.refill_per_sec)).min(cfg.capacity);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return Ok(());
        }

        let retry_after_secs = if cfg.refill_per_sec > 0.0 {
            ((1.0 - bucket.tokens) / cfg.refill_per_sec).ceil().max(1.0) as u64
        } else {
            u64::MAX
        };
        tracing::warn!(action = action.as_str(), user, retry_after_secs, "rate limited");
        Err(AppError::RateLimited { retry_after_secs })
    }
}
