//! Configuration handling for the page behaviours

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Selector strings binding the behaviours to the page templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomContract {
    pub nav_toggle: String,
    pub nav_collapse: String,
    pub nav_link: String,
    pub anchor_nav_link: String,
    pub section: String,
    pub header: String,
    pub in_page_anchor: String,
    pub image: String,
    pub form: String,
    pub form_field: String,
    pub submit_button: String,
    pub field_group: String,
    pub check_group: String,
    pub field_error: String,
    /// Element id (not a selector) of the FAQ search input
    pub faq_search_id: String,
    pub accordion_item: String,
    pub interactive: String,
}

impl Default for DomContract {
    fn default() -> Self {
        Self {
            nav_toggle: ".c-nav__toggle, .navbar-toggler".to_string(),
            nav_collapse: ".navbar-collapse".to_string(),
            nav_link: ".nav-link".to_string(),
            anchor_nav_link: ".nav-link[href^=\"#\"]".to_string(),
            section: "section[id]".to_string(),
            header: ".l-header".to_string(),
            in_page_anchor: "a[href^=\"#\"]".to_string(),
            image: "img".to_string(),
            form: ".c-form, form".to_string(),
            form_field: "input, textarea, select".to_string(),
            submit_button: "button[type=\"submit\"]".to_string(),
            field_group: ".c-form__group".to_string(),
            check_group: ".form-check".to_string(),
            field_error: ".c-form__error, .invalid-feedback".to_string(),
            faq_search_id: "faqSearch".to_string(),
            accordion_item: ".accordion-item".to_string(),
            interactive: ".c-button, .btn, .nav-link, .card".to_string(),
        }
    }
}

/// Fixed delays, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Latency of the simulated submission transport
    pub submit_latency_ms: u64,
    pub redirect_delay_ms: u64,
    pub notification_lifetime_ms: u64,
    pub notification_fade_ms: u64,
    pub search_debounce_ms: u64,
    pub resize_debounce_ms: u64,
    pub scroll_throttle_ms: u64,
    pub smooth_scroll_ms: u64,
    pub initial_scroll_delay_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            submit_latency_ms: 1500,
            redirect_delay_ms: 1000,
            notification_lifetime_ms: 5000,
            notification_fade_ms: 150,
            search_debounce_ms: 300,
            resize_debounce_ms: 150,
            scroll_throttle_ms: 100,
            smooth_scroll_ms: 400,
            initial_scroll_delay_ms: 300,
        }
    }
}

impl Timings {
    pub fn submit_latency(&self) -> Duration {
        Duration::from_millis(self.submit_latency_ms)
    }
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
    pub fn notification_lifetime(&self) -> Duration {
        Duration::from_millis(self.notification_lifetime_ms)
    }
    pub fn notification_fade(&self) -> Duration {
        Duration::from_millis(self.notification_fade_ms)
    }
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
    pub fn scroll_throttle(&self) -> Duration {
        Duration::from_millis(self.scroll_throttle_ms)
    }
    pub fn smooth_scroll(&self) -> Duration {
        Duration::from_millis(self.smooth_scroll_ms)
    }
    pub fn initial_scroll_delay(&self) -> Duration {
        Duration::from_millis(self.initial_scroll_delay_ms)
    }
}

/// Site configuration for the page behaviours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Where to send the visitor after a successful submission
    pub redirect_target: String,
    /// Header height used when the page has no `.l-header`
    pub header_fallback_height: f64,
    /// Viewport width at which the collapsed menu is closed on resize
    pub mobile_breakpoint: f64,
    pub timings: Timings,
    pub dom: DomContract,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            redirect_target: "thank_you.html".to_string(),
            header_fallback_height: 80.0,
            mobile_breakpoint: 768.0,
            timings: Timings::default(),
            dom: DomContract::default(),
        }
    }
}

impl SiteConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "pagekit", "pagekit")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the user config directory, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_if_present(&path),
            None => Ok(Self::default()),
        }
    }

    fn load_if_present(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: SiteConfig = serde_json::from_str(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.redirect_target, "thank_you.html");
        assert_eq!(config.header_fallback_height, 80.0);
        assert_eq!(config.mobile_breakpoint, 768.0);
        assert_eq!(config.timings.submit_latency(), Duration::from_millis(1500));
        assert_eq!(config.timings.redirect_delay(), Duration::from_millis(1000));
        assert_eq!(config.timings.notification_lifetime(), Duration::from_secs(5));
        assert_eq!(config.dom.form, ".c-form, form");
    }

    #[test]
    fn test_deserialize_from_empty_json() {
        let parsed: SiteConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, SiteConfig::default());
    }

    #[test]
    fn test_partial_timings() {
        let json = r#"{"timings": {"search_debounce_ms": 500}}"#;
        let parsed: SiteConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.timings.search_debounce_ms, 500);
        assert_eq!(parsed.timings.scroll_throttle_ms, 100);
    }

    #[test]
    fn test_deserialize_with_extra_fields() {
        // Should ignore unknown fields
        let json = r#"{"redirect_target": "bedankt.html", "unknown_field": "value"}"#;
        let parsed: SiteConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.redirect_target, "bedankt.html");
    }

    #[test]
    fn test_serialization_round_trip_of_overrides() {
        let config = SiteConfig {
            redirect_target: "/bedankt".to_string(),
            dom: DomContract {
                form: "form.contact".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SiteConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.redirect_target, "/bedankt");
        assert_eq!(parsed.dom.form, "form.contact");
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let result = SiteConfig::load_from(Path::new("/nonexistent/pagekit/config.json"));
        assert!(result.is_err());
    }

    fn temp_config_path() -> PathBuf {
        std::env::temp_dir().join(format!("pagekit-{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_absent_user_config_gives_defaults() {
        let path = temp_config_path();
        let config = SiteConfig::load_if_present(&path).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn test_present_user_config_is_read() {
        let path = temp_config_path();
        fs::write(&path, r#"{"mobile_breakpoint": 992.0}"#).unwrap();
        let config = SiteConfig::load_if_present(&path);
        fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.mobile_breakpoint, 992.0);
        assert_eq!(config.timings, Timings::default());
    }
}
