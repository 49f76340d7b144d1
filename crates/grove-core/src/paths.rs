//! Standard paths used by grove tools

use std::path::PathBuf;

/// Standard grove paths
pub struct Paths {
    /// Data directory (~/.local/share/grove)
    pub data: PathBuf,
    /// Config directory (~/.config/grove)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("grove");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("grove");

        Self { data, config }
    }

    /// Get the data directory for a tool
    pub fn state(&self, tool: &str) -> PathBuf {
        self.data.join(tool)
    }

    /// Get the settings file path
    pub fn settings_file(&self) -> PathBuf {
        self.config.join("settings.json")
    }
}
