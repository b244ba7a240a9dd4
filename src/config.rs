//! Discovery configuration
//!
//! Every selector, title, attribute name and timing constant the discovery
//! code depends on lives in [`DiscoveryConfig`]. It is built once and passed by
//! reference into each component, so a host page that changes its markup only
//! needs a new configuration, not new code.

use crate::dom::Selector;
use crate::error::{AppError, AppResult};
use log::info;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SECTION_RETRY_ROUNDS: u32 = 10;
pub const DEFAULT_SECTION_RETRY_DELAY_MS: u64 = 500;
/// Share of page-wide toggles a "common parent" must contain.
pub const DEFAULT_COMMON_PARENT_RATIO: f64 = 0.5;
pub const DEFAULT_LABEL_ANCESTOR_DEPTH: usize = 3;
pub const DEFAULT_LABEL_MAX_CHARS: usize = 100;
pub const DEFAULT_SCROLL_STEP: f64 = 200.0;
pub const DEFAULT_SCROLL_SETTLE_MS: u64 = 300;
pub const DEFAULT_SCROLL_MAX_STEPS: u32 = 10;
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_LOAD_POLL_INTERVAL_MS: u64 = 1_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// What counts as a toggle control.
    pub toggle: Selector,
    /// Section candidates, most precise first.
    pub section_hints: Vec<Selector>,
    /// Ancestor markers used when no section hint matches.
    pub ancestor_hint: Selector,
    pub section_retry_rounds: u32,
    pub section_retry_delay_ms: u64,
    pub common_parent_ratio: f64,

    /// Row wrapper searched for a label element.
    pub row_container: Selector,
    pub label_like: Selector,
    pub label_ancestor_depth: usize,
    pub label_max_chars: usize,
    pub label_data_attributes: Vec<String>,

    /// Visible heading texts that mark the scrollable calendar list.
    pub section_titles: Vec<String>,
    pub heading: Selector,
    pub scroll_step: f64,
    pub scroll_settle_ms: u64,
    pub scroll_max_steps: u32,

    pub load_timeout_ms: u64,
    pub load_poll_interval_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            toggle: Selector::toggle(),
            section_hints: vec![
                Selector::attr_eq("aria-label", "My calendars"),
                Selector::attr_eq("aria-label", "マイカレンダー"),
                Selector::attr_contains("aria-label", "calendars"),
                Selector::attr_contains("aria-label", "カレンダー"),
                Selector::role("list"),
                Selector::role("listbox"),
                Selector::role("group"),
            ],
            ancestor_hint: Selector::any(vec![
                Selector::role("list"),
                Selector::role("listbox"),
                Selector::role("group"),
                Selector::attr_contains("aria-label", "calendar"),
                Selector::attr_contains("aria-label", "カレンダー"),
            ]),
            section_retry_rounds: DEFAULT_SECTION_RETRY_ROUNDS,
            section_retry_delay_ms: DEFAULT_SECTION_RETRY_DELAY_MS,
            common_parent_ratio: DEFAULT_COMMON_PARENT_RATIO,

            row_container: Selector::any(vec![
                Selector::tag("li"),
                Selector::role("listitem"),
                Selector::tag("div"),
            ]),
            label_like: Selector::any(vec![
                Selector::tag("label"),
                Selector::tag("span"),
                Selector::tag("div"),
            ]),
            label_ancestor_depth: DEFAULT_LABEL_ANCESTOR_DEPTH,
            label_max_chars: DEFAULT_LABEL_MAX_CHARS,
            label_data_attributes: vec![
                "data-label".to_string(),
                "data-name".to_string(),
                "data-calendar-name".to_string(),
            ],

            section_titles: vec![
                "My calendars".to_string(),
                "マイカレンダー".to_string(),
            ],
            heading: Selector::any(vec![
                Selector::tag("h1"),
                Selector::tag("h2"),
                Selector::tag("h3"),
                Selector::role("heading"),
            ]),
            scroll_step: DEFAULT_SCROLL_STEP,
            scroll_settle_ms: DEFAULT_SCROLL_SETTLE_MS,
            scroll_max_steps: DEFAULT_SCROLL_MAX_STEPS,

            load_timeout_ms: DEFAULT_LOAD_TIMEOUT_MS,
            load_poll_interval_ms: DEFAULT_LOAD_POLL_INTERVAL_MS,
        }
    }
}

impl DiscoveryConfig {
    /// Parses a JSON override; absent fields keep their defaults.
    pub fn from_json(json: &str) -> AppResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.section_retry_rounds == 0 {
            return Err(AppError::config("section_retry_rounds must be at least 1"));
        }
        if !(self.common_parent_ratio > 0.0 && self.common_parent_ratio <= 1.0) {
            return Err(AppError::config(format!(
                "common_parent_ratio must be in (0, 1], got {}",
                self.common_parent_ratio
            )));
        }
        if self.scroll_step <= 0.0 {
            return Err(AppError::config("scroll_step must be positive"));
        }
        if self.scroll_max_steps == 0 {
            return Err(AppError::config("scroll_max_steps must be at least 1"));
        }
        if self.load_poll_interval_ms == 0 {
            return Err(AppError::config("load_poll_interval_ms must be positive"));
        }
        if let Selector::Any(options) | Selector::All(options) = &self.toggle {
            if options.is_empty() {
                return Err(AppError::config("toggle selector is empty"));
            }
        }
        info!(
            "Discovery config: {} section hints, {} retry rounds, scroll step {}",
            self.section_hints.len(),
            self.section_retry_rounds,
            self.scroll_step
        );
        Ok(())
    }

    pub fn section_retry_delay(&self) -> Duration {
        Duration::from_millis(self.section_retry_delay_ms)
    }

    pub fn scroll_settle_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn load_poll_interval(&self) -> Duration {
        Duration::from_millis(self.load_poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validates() {
        let config = DiscoveryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.section_retry_delay(), Duration::from_millis(500));
        assert_eq!(config.load_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_from_json_keeps_defaults() {
        let config = DiscoveryConfig::from_json(r#"{"common_parent_ratio": 0.75}"#).unwrap();
        assert_eq!(config.common_parent_ratio, 0.75);
        assert_eq!(config.scroll_max_steps, DEFAULT_SCROLL_MAX_STEPS);
        assert_eq!(config.section_titles[0], "My calendars");
    }

    #[test]
    fn test_rejects_bad_ratio() {
        let result = DiscoveryConfig::from_json(r#"{"common_parent_ratio": 1.5}"#);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
