use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What to do when two columns read the same source path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathCollision {
    /// The later column takes the path; the earlier one always reads null.
    #[default]
    LastWins,
    /// Refuse to build the cursor.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Hits per page. Zero is treated as one.
    pub page_size: usize,
    /// Keep-alive requested with the initial search.
    pub initial_keep_alive: Duration,
    /// Keep-alive requested with every continuation page.
    pub continuation_keep_alive: Duration,
    pub path_collision: PathCollision,
}

impl ScrollConfig {
    pub const DEFAULT_PAGE_SIZE: usize = 20_000;

    /// Defaults overridden by `QUARRY_PAGE_SIZE`,
    /// `QUARRY_SCROLL_KEEP_ALIVE_SECS`, `QUARRY_SCROLL_CONTINUATION_SECS`
    /// and `QUARRY_STRICT_PATHS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let secs = |key: &str, fallback: Duration| {
            lookup(key)
                .and_then(|s| s.parse().ok())
                .map_or(fallback, Duration::from_secs)
        };
        Self {
            page_size: lookup("QUARRY_PAGE_SIZE")
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.page_size),
            initial_keep_alive: secs("QUARRY_SCROLL_KEEP_ALIVE_SECS", defaults.initial_keep_alive),
            continuation_keep_alive: secs(
                "QUARRY_SCROLL_CONTINUATION_SECS",
                defaults.continuation_keep_alive,
            ),
            path_collision: match lookup("QUARRY_STRICT_PATHS").as_deref() {
                Some("1" | "true") => PathCollision::Reject,
                _ => defaults.path_collision,
            },
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            page_size: Self::DEFAULT_PAGE_SIZE,
            initial_keep_alive: Duration::from_secs(60),
            continuation_keep_alive: Duration::from_secs(600),
            path_collision: PathCollision::LastWins,
        }
    }
}
