//! Settings for cbv-rs.
//!
//! This module provides the [`Settings`] struct, which holds all framework
//! configuration, and [`LazySettings`], a globally-accessible, lazily-initialized
//! settings instance.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// The complete set of framework settings.
///
/// # Examples
///
/// ```
/// use cbv_rs_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.page_kwarg, "page");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,
    /// Address the development server binds to.
    pub bind_address: String,

    // ── Templates ────────────────────────────────────────────────────

    /// Directories to load templates from.
    pub template_dirs: Vec<PathBuf>,
    /// Whether HTML templates are auto-escaped.
    pub autoescape: bool,

    // ── List views ───────────────────────────────────────────────────

    /// Query-string key carrying the requested page number.
    pub page_kwarg: String,
    /// Query-string key carrying the requested sort field.
    pub sort_kwarg: String,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            bind_address: "127.0.0.1:8000".to_string(),
            template_dirs: Vec::new(),
            autoescape: true,
            page_kwarg: "page".to_string(),
            sort_kwarg: "sort_by".to_string(),
            log_level: "info".to_string(),
            extra: HashMap::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup, then use
/// [`get`](LazySettings::get) or [`get_or_default`](LazySettings::get_or_default).
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns the configured settings, initializing them with defaults if
    /// nothing was configured.
    pub fn get_or_default(&self) -> &Settings {
        self.inner.get_or_init(Settings::default)
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert!(s.autoescape);
        assert!(s.template_dirs.is_empty());
        assert_eq!(s.page_kwarg, "page");
        assert_eq!(s.sort_kwarg, "sort_by");
        assert_eq!(s.log_level, "info");
        assert_eq!(s.bind_address, "127.0.0.1:8000");
    }

    #[test]
    fn test_lazy_settings_configure_and_get() {
        let lazy = LazySettings::new();
        assert!(!lazy.is_configured());

        let settings = Settings {
            debug: false,
            page_kwarg: "p".to_string(),
            ..Settings::default()
        };

        lazy.configure(settings);
        assert!(lazy.is_configured());
        assert!(!lazy.get().debug);
        assert_eq!(lazy.get().page_kwarg, "p");
    }

    #[test]
    fn test_lazy_settings_get_or_default() {
        let lazy = LazySettings::new();
        assert_eq!(lazy.get_or_default().sort_kwarg, "sort_by");
        assert!(lazy.is_configured());
    }

    #[test]
    #[should_panic(expected = "already been configured")]
    fn test_lazy_settings_double_configure_panics() {
        let lazy = LazySettings::new();
        lazy.configure(Settings::default());
        lazy.configure(Settings::default());
    }

    #[test]
    #[should_panic(expected = "not been configured")]
    fn test_lazy_settings_get_before_configure_panics() {
        let lazy = LazySettings::new();
        let _ = lazy.get();
    }
}
