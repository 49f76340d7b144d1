//! Settings management for grove tools

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Persisted timer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Selected preset name (pomodoro, deep, quick, custom)
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Focus length used by the custom preset (minutes)
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,

    /// Break length used by the custom preset (minutes)
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,

    /// Chain focus and break phases without a manual restart
    #[serde(default)]
    pub auto_cycle: bool,

    /// Scene theme recorded with each session
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_preset() -> String {
    "pomodoro".to_string()
}

fn default_focus_minutes() -> u32 {
    25
}

fn default_break_minutes() -> u32 {
    5
}

fn default_theme() -> String {
    "forest".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            focus_minutes: default_focus_minutes(),
            break_minutes: default_break_minutes(),
            auto_cycle: false,
            theme: default_theme(),
        }
    }
}

impl Settings {
    /// Keys accepted by [`Settings::set`]
    pub const KEYS: [&'static str; 5] =
        ["preset", "focus_minutes", "break_minutes", "auto_cycle", "theme"];

    /// Load settings from file, falling back to defaults when it is missing
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))
    }

    /// Save settings to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings: {}", path.display()))
    }

    /// Update one setting from its textual form
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "preset" => self.preset = value.to_lowercase(),
            "focus_minutes" => self.focus_minutes = parse_minutes(key, value)?,
            "break_minutes" => self.break_minutes = parse_minutes(key, value)?,
            "auto_cycle" => {
                self.auto_cycle = match value.to_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => true,
                    "false" | "off" | "no" | "0" => false,
                    _ => bail!("auto_cycle expects true or false, got '{}'", value),
                }
            }
            "theme" => self.theme = value.to_lowercase(),
            _ => bail!("Unknown setting '{}' (expected one of: {})", key, Self::KEYS.join(", ")),
        }
        Ok(())
    }

    /// Read one setting as text
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "preset" => Some(self.preset.clone()),
            "focus_minutes" => Some(self.focus_minutes.to_string()),
            "break_minutes" => Some(self.break_minutes.to_string()),
            "auto_cycle" => Some(self.auto_cycle.to_string()),
            "theme" => Some(self.theme.clone()),
            _ => None,
        }
    }
}

fn parse_minutes(key: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .with_context(|| format!("{} expects a whole number of minutes, got '{}'", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.focus_minutes, 25);
        assert_eq!(settings.break_minutes, 5);
        assert!(!settings.auto_cycle);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.set("focus_minutes", "50").unwrap();
        settings.set("auto_cycle", "on").unwrap();
        settings.set("theme", "Ice").unwrap();
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.focus_minutes, 50);
        assert!(loaded.auto_cycle);
        assert_eq!(loaded.theme, "ice");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"auto_cycle": true}"#).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert!(loaded.auto_cycle);
        assert_eq!(loaded.preset, "pomodoro");
        assert_eq!(loaded.break_minutes, 5);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut settings = Settings::default();
        assert!(settings.set("focus_minutes", "soon").is_err());
        assert!(settings.set("auto_cycle", "maybe").is_err());
        assert!(settings.set("volume", "11").is_err());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_get_known_keys() {
        let settings = Settings::default();
        for key in Settings::KEYS {
            assert!(settings.get(key).is_some());
        }
        assert_eq!(settings.get("volume"), None);
    }
}
