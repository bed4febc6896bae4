// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the CRPT submission client.
//!
//! Defaults match the upstream API's documented quota of five document
//! submissions per second.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Configuration for the CRPT submission client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// Target API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Document creation endpoint (default: the production CRPT endpoint)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Length of one quota window in milliseconds (default: 1000)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Maximum requests admitted per window (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
}

// Default value functions
fn default_endpoint() -> String {
    "https://ismp.crpt.ru/api/v3/lk/documents/create".to_string()
}

fn default_window_ms() -> u64 {
    1000
}

fn default_max_requests() -> u32 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            max_requests: default_max_requests(),
        }
    }
}

impl RateLimitConfig {
    /// Get the quota window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    ///
    /// - `CRPT_API_ENDPOINT`: document creation endpoint
    /// - `CRPT_WINDOW_MS`: quota window length in milliseconds
    /// - `CRPT_MAX_REQUESTS`: max requests admitted per window
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig {
                endpoint: std::env::var("CRPT_API_ENDPOINT")
                    .unwrap_or_else(|_| default_endpoint()),
            },
            rate_limit: RateLimitConfig {
                window_ms: std::env::var("CRPT_WINDOW_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(default_window_ms),
                max_requests: std::env::var("CRPT_MAX_REQUESTS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(default_max_requests),
            },
        }
    }

    /// Validate the configuration. Called before any resources are started;
    /// a failure here means nothing was spawned.
    pub fn validate(&self) -> Result<(), String> {
        if self.rate_limit.max_requests == 0 {
            return Err("max_requests must be at least 1".to_string());
        }
        if self.rate_limit.window_ms == 0 {
            return Err("window_ms must be positive".to_string());
        }
        let endpoint = Url::parse(&self.api.endpoint)
            .map_err(|e| format!("invalid endpoint URL {:?}: {e}", self.api.endpoint))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(format!(
                "endpoint must be http(s), got scheme {:?}",
                endpoint.scheme()
            ));
        }
        Ok(())
    }
}
