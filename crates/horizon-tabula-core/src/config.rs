//! Construction-time configuration.
//!
//! [`TabulaConfig`] carries the defaults that would otherwise be process-wide
//! settings: default page size, pager width, sort history depth, date formats
//! and pager labels. A page hands its configuration to every control it
//! creates; nothing reads configuration from a global.
//!
//! Configuration can be built in code or loaded from TOML or JSON:
//!
//! ```
//! use horizon_tabula_core::TabulaConfig;
//!
//! let config = TabulaConfig::from_toml_str(r#"
//!     default_page_size = 25
//!     max_page_buttons = 7
//! "#).unwrap();
//! assert_eq!(config.default_page_size, 25);
//! assert_eq!(config.sort_history_limit, 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, TabulaError};

/// Defaults used by tables, pagers and columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabulaConfig {
    /// Page size used when a paged control has no explicit size.
    pub default_page_size: usize,
    /// Maximum number of numbered buttons a pager shows.
    pub max_page_buttons: usize,
    /// How many columns a table remembers in its sort history.
    pub sort_history_limit: usize,
    /// strftime format for date-only values.
    pub date_format: String,
    /// strftime format for time-only values.
    pub time_format: String,
    /// strftime format used for time values without a column format.
    pub datetime_format: String,
    /// Label of the pager's previous button.
    pub prev_label: String,
    /// Label of the pager's next button.
    pub next_label: String,
    /// Html shown inside a pager's ellipsis button.
    pub ellipsis_html: String,
    /// Tag name used for the pager container.
    pub pager_tag: String,
}

impl Default for TabulaConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_buttons: 10,
            sort_history_limit: 1,
            date_format: "%Y-%m-%d".to_string(),
            time_format: "%H:%M:%S".to_string(),
            datetime_format: "%Y-%m-%d %H:%M:%S".to_string(),
            prev_label: "Previous".to_string(),
            next_label: "Next".to_string(),
            ellipsis_html: "&hellip;".to_string(),
            pager_tag: "div".to_string(),
        }
    }
}

impl TabulaConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from a TOML document. Missing keys take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validated()
    }

    /// Parse configuration from a JSON document. Missing keys take defaults.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(source).map_err(|e| TabulaError::Config(e.to_string()))?;
        config.validated()
    }

    /// Serialize to a TOML document.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| TabulaError::Config(e.to_string()))
    }

    fn validated(self) -> Result<Self> {
        if self.default_page_size == 0 {
            return Err(TabulaError::Config(
                "default_page_size must be greater than zero".into(),
            ));
        }
        if self.max_page_buttons < 5 {
            return Err(TabulaError::Config(format!(
                "max_page_buttons must be at least 5, got {}",
                self.max_page_buttons
            )));
        }
        if self.sort_history_limit == 0 {
            return Err(TabulaError::Config(
                "sort_history_limit must be at least 1".into(),
            ));
        }
        Ok(self)
    }

    /// Set the default page size.
    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size.max(1);
        self
    }

    /// Set the maximum number of numbered pager buttons.
    pub fn with_max_page_buttons(mut self, count: usize) -> Self {
        self.max_page_buttons = count;
        self
    }

    /// Set the sort history depth.
    pub fn with_sort_history_limit(mut self, limit: usize) -> Self {
        self.sort_history_limit = limit.max(1);
        self
    }

    /// Set the format used for time values.
    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = format.into();
        self
    }

    /// Set the pager's previous/next labels.
    pub fn with_labels(mut self, prev: impl Into<String>, next: impl Into<String>) -> Self {
        self.prev_label = prev.into();
        self.next_label = next.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TabulaConfig::default();
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.max_page_buttons, 10);
        assert_eq!(config.sort_history_limit, 1);
        assert_eq!(config.pager_tag, "div");
    }

    #[test]
    fn test_from_json_partial() {
        let config = TabulaConfig::from_json_str(r#"{"sort_history_limit": 3}"#).unwrap();
        assert_eq!(config.sort_history_limit, 3);
        assert_eq!(config.default_page_size, 10);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = TabulaConfig::from_toml_str("max_page_buttons = 3").unwrap_err();
        assert!(matches!(err, TabulaError::Config(_)));

        let err = TabulaConfig::from_toml_str("default_page_size = \"ten\"").unwrap_err();
        assert!(matches!(err, TabulaError::Config(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = TabulaConfig::new()
            .with_default_page_size(50)
            .with_labels("<", ">");
        let text = config.to_toml_string().unwrap();
        let parsed = TabulaConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
