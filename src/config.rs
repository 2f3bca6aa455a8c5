use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::{NemoError, Result};
use crate::orthodox::OrthodoxAction;

/// External programs started by the orthodox shortcuts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(default = "default_editor")]
    pub editor: String,
    #[serde(default = "default_terminal")]
    pub terminal: String,
    #[serde(default = "default_git_client")]
    pub git_client: String,
    /// Diff tool for the "Compare..." item
    #[serde(default = "default_diff")]
    pub diff: String,
}

fn default_editor() -> String {
    "gedit".to_string()
}

fn default_terminal() -> String {
    "gnome-terminal".to_string()
}

fn default_git_client() -> String {
    "gitg".to_string()
}

fn default_diff() -> String {
    "meld".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            editor: default_editor(),
            terminal: default_terminal(),
            git_client: default_git_client(),
            diff: default_diff(),
        }
    }
}

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub tools: ToolSettings,
    /// Per-action key overrides, e.g. {"terminal": ["<Control>t"]}.
    /// Actions not listed keep their orthodox defaults.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub keybindings: HashMap<OrthodoxAction, Vec<String>>,
    /// Verbose logging and the widget outline dump
    #[serde(default)]
    pub debug: bool,
    /// Saved accelerator overrides. Defaults to ~/.captain-nemo/accels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accel_file: Option<String>,
}

impl Settings {
    /// Returns the config directory path (~/.captain-nemo)
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".captain-nemo"))
    }

    /// Returns the config file path (~/.captain-nemo/settings.json)
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("settings.json"))
    }

    /// Where accelerator overrides are stored
    pub fn accel_path(&self) -> Option<PathBuf> {
        match &self.accel_file {
            Some(p) => Some(PathBuf::from(p)),
            None => Self::config_dir().map(|d| d.join("accels")),
        }
    }

    /// Loads settings from the config file, returns default if not found or invalid
    pub fn load() -> Self {
        match Self::load_with_error() {
            Ok(settings) => settings,
            Err(NemoError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!("ignoring settings: {}", e);
                Self::default()
            }
        }
    }

    /// Loads settings from the config file with error information
    pub fn load_with_error() -> Result<Self> {
        let config_path = Self::config_path().ok_or(NemoError::NoConfigDir)?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Saves settings to the config file using atomic write pattern
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir().ok_or(NemoError::NoConfigDir)?;
        self.save_to(&config_dir)
    }

    /// Saves `settings.json` into `config_dir`, creating it user-only on Unix.
    pub fn save_to(&self, config_dir: &std::path::Path) -> Result<()> {
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let perms = fs::Permissions::from_mode(0o700);
                let _ = fs::set_permissions(config_dir, perms);
            }
        }

        let config_path = config_dir.join("settings.json");
        let temp_path = config_dir.join("settings.json.tmp");
        let content = serde_json::to_string_pretty(self)?;

        // Atomic write: write to temp file first, then rename
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &config_path)?;

        Ok(())
    }
}
