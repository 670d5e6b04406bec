use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{provider::weatherly::DEFAULT_BASE_URL, units::UnitSystem};

/// How many recent searches are remembered.
pub const MAX_RECENT_SEARCHES: usize = 5;

pub const DEFAULT_REFRESH_SECS: u64 = 300;

/// Colour scheme of the info panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Dark,
    Light,
}

impl ThemePreference {
    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::Dark => ThemePreference::Light,
            ThemePreference::Light => ThemePreference::Dark,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Dark => "dark",
            ThemePreference::Light => "light",
        }
    }
}

impl std::fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Units {
    #[serde(default)]
    pub temperature: UnitSystem,
    #[serde(default)]
    pub wind: UnitSystem,
}

/// Feature toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "enabled")]
    pub animations: bool,
    #[serde(default = "enabled")]
    pub auto_refresh: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { animations: true, auto_refresh: true }
    }
}

fn enabled() -> bool {
    true
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_refresh_secs() -> u64 {
    DEFAULT_REFRESH_SECS
}

/// Client state persisted between runs.
///
/// Example TOML:
/// ```toml
/// api_base_url = "https://weatherly-app-bp4c.onrender.com"
/// last_city = "London"
/// theme = "dark"
/// recent_searches = ["London", "Paris"]
///
/// [units]
/// temperature = "metric"
/// wind = "imperial"
///
/// [settings]
/// animations = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_base_url")]
    pub api_base_url: String,

    pub last_city: Option<String>,

    /// Latitude of the last loaded location.
    pub last_latitude: Option<f64>,

    #[serde(default)]
    pub theme: ThemePreference,

    #[serde(default)]
    pub recent_searches: Vec<String>,

    #[serde(default = "default_refresh_secs")]
    pub refresh_interval_secs: u64,

    // Tables last, so the TOML stays valid.
    #[serde(default)]
    pub units: Units,

    #[serde(default)]
    pub settings: Settings,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            api_base_url: default_base_url(),
            last_city: None,
            last_latitude: None,
            theme: ThemePreference::default(),
            recent_searches: Vec::new(),
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            units: Units::default(),
            settings: Settings::default(),
        }
    }
}

impl Preferences {
    /// Load preferences from `path`, or return defaults if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read preferences file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse preferences file: {}", path.display()))
    }

    /// Save preferences to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create preferences directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize preferences to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write preferences file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory for logs and other non-config state.
    pub fn data_dir() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().to_path_buf())
    }

    /// Put `city` at the front of the recent list, dropping any case-insensitive duplicate.
    pub fn add_recent_search(&mut self, city: &str) {
        let city = city.trim();
        if city.is_empty() {
            return;
        }

        let lower = city.to_lowercase();
        self.recent_searches.retain(|c| c.to_lowercase() != lower);
        self.recent_searches.insert(0, city.to_string());
        self.recent_searches.truncate(MAX_RECENT_SEARCHES);
    }

    pub fn clear_recent_searches(&mut self) {
        self.recent_searches.clear();
    }

    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weatherly", "weatherly")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.api_base_url, DEFAULT_BASE_URL);
        assert!(prefs.settings.animations);
        assert_eq!(prefs.refresh_interval_secs, 300);
    }

    #[test]
    fn save_creates_directories_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut prefs = Preferences::default();
        prefs.last_city = Some("Oslo".into());
        prefs.last_latitude = Some(59.91);
        prefs.units.temperature = UnitSystem::Imperial;
        prefs.theme = ThemePreference::Light;
        prefs.settings.animations = false;
        prefs.save_to(&path).unwrap();

        assert_eq!(Preferences::load_from(&path).unwrap(), prefs);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "last_city = \"Rome\"\n[units]\nwind = \"imperial\"\n").unwrap();

        let prefs = Preferences::load_from(&path).unwrap();
        assert_eq!(prefs.last_city.as_deref(), Some("Rome"));
        assert_eq!(prefs.units.wind, UnitSystem::Imperial);
        assert_eq!(prefs.units.temperature, UnitSystem::Metric);
        assert!(prefs.settings.auto_refresh);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "theme = [").unwrap();

        let err = Preferences::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse preferences file"));
    }

    #[test]
    fn recent_searches_dedupe_and_cap() {
        let mut prefs = Preferences::default();
        for city in ["London", "Paris", "Tokyo", "Rome", "Berlin", "Madrid"] {
            prefs.add_recent_search(city);
        }
        assert_eq!(prefs.recent_searches, ["Madrid", "Berlin", "Rome", "Tokyo", "Paris"]);

        prefs.add_recent_search("  tokyo ");
        assert_eq!(prefs.recent_searches, ["tokyo", "Madrid", "Berlin", "Rome", "Paris"]);

        prefs.add_recent_search("   ");
        assert_eq!(prefs.recent_searches.len(), MAX_RECENT_SEARCHES);
    }

    #[test]
    fn theme_toggle() {
        assert_eq!(ThemePreference::Dark.toggled(), ThemePreference::Light);
        assert_eq!(ThemePreference::Light.toggled(), ThemePreference::Dark);
    }
}
