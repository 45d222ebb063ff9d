//! Optional `nudge.toml` settings file.
//!
//! Command line flags (and their `NUDGE_*` environment fallbacks) win over
//! anything set here. A missing file is not an error.
//!
//! ```toml
//! endpoint = "https://api.example.com/v1"
//! site-id = "site-1"
//! api-key = "…"
//! poll-interval = 30
//! viewport-width = 1280
//!
//! [design]
//! position = "bottom-right"
//! timing = { delay = 2, displayDuration = 6 }
//!
//! [display]
//! reducedMotionSupport = true
//! ```

use std::path::{Path, PathBuf};

use nudge_engine::{ConfigError, RawWidgetConfig, Resolved, resolve};
use serde::Deserialize;

/// Default settings file, looked up in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "nudge.toml";

const KNOWN_KEYS: &[&str] = &[
	"endpoint",
	"site-id",
	"api-key",
	"poll-interval",
	"viewport-width",
	"design",
	"display",
];

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
	pub endpoint: Option<String>,
	pub site_id: Option<String>,
	pub api_key: Option<String>,
	/// Seconds between feed polls.
	pub poll_interval: Option<u64>,
	pub viewport_width: Option<u32>,
	/// Widget design payload used until the feed serves one.
	pub design: Option<toml::Table>,
	pub display: Option<toml::Table>,
}

impl Settings {
	/// Resolves the initial widget config for `site_id` from the `[design]`
	/// and `[display]` tables.
	pub fn widget_config(&self, site_id: &str) -> Result<Resolved, ConfigError> {
		let to_json = |table: &Option<toml::Table>| table.as_ref().and_then(|t| serde_json::to_value(t).ok());
		resolve(&RawWidgetConfig {
			site_id: Some(site_id.to_string()),
			widget_id: None,
			design: to_json(&self.design),
			display: to_json(&self.display),
		})
	}
}

/// Outcome of loading the settings file.
#[derive(Debug, Default)]
pub struct SettingsLoadReport {
	/// Parsed settings, if the file existed and parsed.
	pub settings: Option<Settings>,
	/// Non-fatal problems keyed by file path.
	pub warnings: Vec<(PathBuf, String)>,
	/// Read or parse errors keyed by file path.
	pub errors: Vec<(PathBuf, String)>,
}

impl SettingsLoadReport {
	/// Logs every warning and error, then yields the settings (or defaults).
	pub fn into_settings(self) -> Settings {
		for (path, warning) in &self.warnings {
			tracing::warn!(path = %path.display(), %warning, "settings warning");
		}
		for (path, error) in &self.errors {
			tracing::error!(path = %path.display(), %error, "settings file ignored");
		}
		self.settings.unwrap_or_default()
	}
}

/// Loads settings from `path`. A missing file yields an empty report.
pub fn load_settings(path: &Path) -> SettingsLoadReport {
	let mut report = SettingsLoadReport::default();
	if !path.exists() {
		return report;
	}

	let content = match std::fs::read_to_string(path) {
		Ok(content) => content,
		Err(error) => {
			report.errors.push((path.to_path_buf(), error.to_string()));
			return report;
		}
	};

	let table: toml::Table = match toml::from_str(&content) {
		Ok(table) => table,
		Err(error) => {
			report.errors.push((path.to_path_buf(), error.to_string()));
			return report;
		}
	};
	for key in table.keys().filter(|key| !KNOWN_KEYS.contains(&key.as_str())) {
		report.warnings.push((path.to_path_buf(), format!("unknown key '{key}'")));
	}

	match toml::Value::Table(table).try_into::<Settings>() {
		Ok(settings) => report.settings = Some(settings),
		Err(error) => report.errors.push((path.to_path_buf(), error.to_string())),
	}
	report
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use nudge_engine::config::Corner;
	use pretty_assertions::assert_eq;

	use super::*;

	fn write(dir: &tempfile::TempDir, content: &str) -> PathBuf {
		let path = dir.path().join(DEFAULT_SETTINGS_FILE);
		std::fs::write(&path, content).unwrap();
		path
	}

	#[test]
	fn missing_file_is_empty() {
		let dir = tempfile::tempdir().unwrap();
		let report = load_settings(&dir.path().join(DEFAULT_SETTINGS_FILE));
		assert!(report.settings.is_none());
		assert!(report.warnings.is_empty());
		assert!(report.errors.is_empty());
	}

	#[test]
	fn parses_connection_settings() {
		let dir = tempfile::tempdir().unwrap();
		let path = write(
			&dir,
			r#"
				endpoint = "https://api.example.com/v1"
				site-id = "site-1"
				poll-interval = 15
			"#,
		);
		let settings = load_settings(&path).settings.unwrap();
		assert_eq!(settings.endpoint.as_deref(), Some("https://api.example.com/v1"));
		assert_eq!(settings.site_id.as_deref(), Some("site-1"));
		assert_eq!(settings.poll_interval, Some(15));
		assert_eq!(settings.api_key, None);
	}

	#[test]
	fn unknown_keys_warn() {
		let dir = tempfile::tempdir().unwrap();
		let path = write(&dir, "site-id = \"s\"\nsite_idd = \"typo\"\n");
		let report = load_settings(&path);
		assert!(report.settings.is_some());
		assert_eq!(report.warnings.len(), 1);
		assert!(report.warnings[0].1.contains("site_idd"));
	}

	#[test]
	fn wrong_types_are_errors() {
		let dir = tempfile::tempdir().unwrap();
		let path = write(&dir, "poll-interval = \"soon\"\n");
		let report = load_settings(&path);
		assert!(report.settings.is_none());
		assert_eq!(report.errors.len(), 1);
	}

	#[test]
	fn design_table_feeds_the_widget_config() {
		let dir = tempfile::tempdir().unwrap();
		let path = write(
			&dir,
			r#"
				[design]
				position = "top-right"
				timing = { delay = 1, displayDuration = 8 }
			"#,
		);
		let settings = load_settings(&path).settings.unwrap();
		let resolved = settings.widget_config("site-1").unwrap();
		assert_eq!(resolved.config.position.corner, Corner::TopRight);
		assert_eq!(resolved.config.timing.delay, Duration::from_secs(1));
		assert_eq!(resolved.config.timing.display_duration, Duration::from_secs(8));
		assert!(resolved.warnings.is_empty());
	}
}
