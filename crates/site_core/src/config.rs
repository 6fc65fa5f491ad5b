use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

const DEFAULT_SETTINGS_FILE: &str = "site.toml";

/// Timings and thresholds of the site's interactions.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteSettings {
    pub reveal_delay_ms: u64,
    pub hide_delay_ms: u64,
    pub relayout_delay_ms: u64,
    pub feedback_lifetime_ms: u64,
    pub request_timeout_secs: u64,
    pub header_scroll_threshold: f64,
    pub back_to_top_threshold: f64,
    pub anchor_offset: f64,
    pub counter_steps: u32,
    pub counter_tick_ms: u64,
    pub log_filter: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            reveal_delay_ms: 50,
            hide_delay_ms: 300,
            relayout_delay_ms: 350,
            feedback_lifetime_ms: 5000,
            request_timeout_secs: 15,
            header_scroll_threshold: 100.0,
            back_to_top_threshold: 300.0,
            anchor_offset: 70.0,
            counter_steps: 200,
            counter_tick_ms: 1,
            log_filter: "info".into(),
        }
    }
}

impl SiteSettings {
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }

    /// Always later than the hide step, so the relayout check sees the final visible set.
    pub fn relayout_delay(&self) -> Duration {
        Duration::from_millis(self.relayout_delay_ms.max(self.hide_delay_ms.saturating_add(1)))
    }

    pub fn feedback_lifetime(&self) -> Duration {
        Duration::from_millis(self.feedback_lifetime_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn counter_tick(&self) -> Duration {
        Duration::from_millis(self.counter_tick_ms.max(1))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    reveal_delay_ms: Option<u64>,
    hide_delay_ms: Option<u64>,
    relayout_delay_ms: Option<u64>,
    feedback_lifetime_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    header_scroll_threshold: Option<f64>,
    back_to_top_threshold: Option<f64>,
    anchor_offset: Option<f64>,
    counter_steps: Option<u32>,
    counter_tick_ms: Option<u64>,
    log_filter: Option<String>,
}

/// Defaults, then `site.toml` (or `path`), then `APP__*` environment variables.
///
/// A missing default `site.toml` is fine; a missing explicit `path` is an error.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<SiteSettings> {
    let mut settings = SiteSettings::default();

    let (file, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
    };

    if required || file.exists() {
        let raw = fs::read_to_string(&file)
            .with_context(|| format!("failed to read settings file '{}'", file.display()))?;
        apply_toml(&mut settings, &raw)
            .with_context(|| format!("invalid settings file '{}'", file.display()))?;
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    if settings.relayout_delay_ms <= settings.hide_delay_ms {
        warn!(
            relayout_delay_ms = settings.relayout_delay_ms,
            hide_delay_ms = settings.hide_delay_ms,
            "relayout delay must exceed the hide delay; using hide delay + 1 ms"
        );
    }
    Ok(settings)
}

pub fn apply_toml(settings: &mut SiteSettings, raw: &str) -> anyhow::Result<()> {
    let file: SettingsFile = toml::from_str(raw)?;

    if let Some(v) = file.reveal_delay_ms {
        settings.reveal_delay_ms = v;
    }
    if let Some(v) = file.hide_delay_ms {
        settings.hide_delay_ms = v;
    }
    if let Some(v) = file.relayout_delay_ms {
        settings.relayout_delay_ms = v;
    }
    if let Some(v) = file.feedback_lifetime_ms {
        settings.feedback_lifetime_ms = v;
    }
    if let Some(v) = file.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file.header_scroll_threshold {
        settings.header_scroll_threshold = v;
    }
    if let Some(v) = file.back_to_top_threshold {
        settings.back_to_top_threshold = v;
    }
    if let Some(v) = file.anchor_offset {
        settings.anchor_offset = v;
    }
    if let Some(v) = file.counter_steps {
        settings.counter_steps = v;
    }
    if let Some(v) = file.counter_tick_ms {
        settings.counter_tick_ms = v;
    }
    if let Some(v) = file.log_filter {
        settings.log_filter = v;
    }

    Ok(())
}

pub fn apply_env(settings: &mut SiteSettings, lookup: impl Fn(&str) -> Option<String>) {
    fn parsed<T: std::str::FromStr>(
        lookup: &impl Fn(&str) -> Option<String>,
        key: &str,
    ) -> Option<T> {
        let raw = lookup(key)?;
        match raw.trim().parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(key, value = %raw, "ignoring unparseable setting override");
                None
            }
        }
    }

    if let Some(v) = parsed(&lookup, "APP__REVEAL_DELAY_MS") {
        settings.reveal_delay_ms = v;
    }
    if let Some(v) = parsed(&lookup, "APP__HIDE_DELAY_MS") {
        settings.hide_delay_ms = v;
    }
    if let Some(v) = parsed(&lookup, "APP__RELAYOUT_DELAY_MS") {
        settings.relayout_delay_ms = v;
    }
    if let Some(v) = parsed(&lookup, "APP__FEEDBACK_LIFETIME_MS") {
        settings.feedback_lifetime_ms = v;
    }
    if let Some(v) = parsed(&lookup, "APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = parsed(&lookup, "APP__HEADER_SCROLL_THRESHOLD") {
        settings.header_scroll_threshold = v;
    }
    if let Some(v) = parsed(&lookup, "APP__BACK_TO_TOP_THRESHOLD") {
        settings.back_to_top_threshold = v;
    }
    if let Some(v) = parsed(&lookup, "APP__ANCHOR_OFFSET") {
        settings.anchor_offset = v;
    }
    if let Some(v) = parsed(&lookup, "APP__COUNTER_STEPS") {
        settings.counter_steps = v;
    }
    if let Some(v) = parsed(&lookup, "APP__COUNTER_TICK_MS") {
        settings.counter_tick_ms = v;
    }
    if let Some(v) = lookup("RUST_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
