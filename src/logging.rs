//! Tracing setup and helpers for keeping secrets out of logs.

use std::fmt;
use tracing_subscriber::{fmt as tracing_fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// `RUST_LOG` takes precedence; otherwise everything at `info` and above is
/// emitted. `log_format` selects `"json"` or human-readable text.
///
/// Note: This function can only be called once.
pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    if log_format == "json" {
        registry
            .with(tracing_fmt::layer().json().with_target(true))
            .init();
    } else {
        registry.with(tracing_fmt::layer().with_target(true)).init();
    }
}

/// API key that only shows its first 8 characters when displayed
#[derive(Clone, Debug)]
pub struct SensitiveApiKey<'a> {
    inner: &'a str,
}

impl<'a> SensitiveApiKey<'a> {
    /// # 示例
    /// ```
    /// use usagey_demo::logging::SensitiveApiKey;
    ///
    /// let sanitized = SensitiveApiKey::new("uk_live_abcdef123456");
    /// assert_eq!(format!("{}", sanitized), "uk_live_***");
    /// ```
    pub fn new(key: &'a str) -> Self {
        Self { inner: key }
    }
}

impl<'a> fmt::Display for SensitiveApiKey<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible_len = 8.min(self.inner.len());
        if self.inner.len() <= visible_len || !self.inner.is_char_boundary(visible_len) {
            // 如果 key 太短，全部脱敏
            write!(f, "***")
        } else {
            write!(f, "{}***", &self.inner[..visible_len])
        }
    }
}

/// Mask an API key for display in `config show`
///
/// Shows the first 7 and last 4 characters.
/// Example: "uk_live_1234567890abcdef" -> "uk_live...cdef"
pub fn mask_api_key(key: &str) -> String {
    if key.is_empty() {
        return String::new();
    }

    if key.len() <= 11 || !key.is_char_boundary(7) || !key.is_char_boundary(key.len() - 4) {
        // Too short to mask meaningfully
        return "***".to_string();
    }

    format!("{}...{}", &key[..7], &key[key.len() - 4..])
}
