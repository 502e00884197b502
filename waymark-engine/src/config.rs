//! Engine configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::time::Duration;

use waymark_domain::Coordinate;
use waymark_gateways::WatchOptions;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration error.
#[derive(Debug, thiserror::Error)]
#[error("Invalid configuration: {0}")]
pub struct ConfigError(pub String);

/// When the start-location confirmation may be shown again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPolicy {
    /// At most one confirmation per session, regardless of the answer
    OncePerSession,
    /// Re-evaluate on every fix; a persisted "No" is asked again
    EveryFix,
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Period between interval-mode one-shot requests
    pub poll_interval: Duration,
    /// Acquisition options for continuous-watch mode
    pub watch_options: WatchOptions,
    /// Delay between recentering on a fix and opening the start-location
    /// confirmation, so the recenter animation is visually decoupled from
    /// the dialog
    pub prompt_debounce: Duration,
    /// Zoom applied when recentering on a fix or a remembered location
    pub recenter_zoom: f64,
    /// Viewport center used when no start preference is stored
    pub default_center: Coordinate,
    /// Viewport zoom used when no start preference is stored
    pub default_zoom: f64,
    /// Re-prompt behavior of the start-location flow
    pub prompt_policy: PromptPolicy,
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(ms) = load_millis_env("WAYMARK_POLL_INTERVAL_MS")? {
            config.poll_interval = ms;
        }
        if let Some(ms) = load_millis_env("WAYMARK_WATCH_TIMEOUT_MS")? {
            config.watch_options.timeout = ms;
        }
        if let Some(ms) = load_millis_env("WAYMARK_PROMPT_DEBOUNCE_MS")? {
            config.prompt_debounce = ms;
        }
        if let Ok(policy) = env::var("WAYMARK_PROMPT_POLICY") {
            config.prompt_policy = match policy.to_lowercase().as_str() {
                "once" => PromptPolicy::OncePerSession,
                "every-fix" => PromptPolicy::EveryFix,
                other => {
                    return Err(ConfigError(format!(
                        "Invalid WAYMARK_PROMPT_POLICY: {}. Expected: once, every-fix",
                        other
                    )))
                }
            };
        }

        Ok(config)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(750),
            watch_options: WatchOptions::default(),
            prompt_debounce: Duration::from_millis(500),
            recenter_zoom: 12.0,
            default_center: Coordinate {
                lat: 42.9758025,
                lng: -81.244782,
            },
            default_zoom: 13.25,
            prompt_policy: PromptPolicy::OncePerSession,
        }
    }
}

fn load_millis_env(key: &str) -> Result<Option<Duration>, ConfigError> {
    match env::var(key) {
        Ok(val) => {
            let ms = val
                .parse::<u64>()
                .map_err(|_| ConfigError(format!("Invalid {} value: {}", key, val)))?;
            Ok(Some(Duration::from_millis(ms)))
        }
        Err(_) => Ok(None),
    }
}

// =============================================================================
// Tests
// =============================================================================
