use std::env;

use crate::rack::UtilizationThresholds;

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub cache_capacity: usize,
    pub utilization: UtilizationThresholds,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            listen_addr: get_env("LISTEN_ADDR", "0.0.0.0:8080"),
            cache_capacity: get_env("LAYOUT_CACHE_CAPACITY", "64")
                .parse()
                .unwrap_or(64),
            utilization: UtilizationThresholds {
                critical: parse_env("UTIL_CRITICAL", 90),
                warning: parse_env("UTIL_WARNING", 75),
                moderate: parse_env("UTIL_MODERATE", 50),
            },
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env(key: &str, default: i64) -> i64 {
    get_env(key, "").parse().unwrap_or(default)
}
