//! Configuration loading and data folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Data folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_folder(
    cli_arg: Option<&str>,
    env_var_name: &str,
    config_file_key: Option<&str>,
) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Some(key) = config_file_key {
        if let Ok(config_path) = locate_config_file() {
            if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
                if let Ok(config) = toml_content.parse::<toml::Value>() {
                    if let Some(folder) = config.get(key).and_then(|v| v.as_str()) {
                        return Ok(PathBuf::from(folder));
                    }
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_data_folder())
}

/// Get the configuration file path for the platform
pub fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/cmdanno/config.toml first, then /etc/cmdanno/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("cmdanno").join("config.toml"));
        let system_config = PathBuf::from("/etc/cmdanno/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("cmdanno").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// OS-dependent default data folder path
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("cmdanno"))
        .unwrap_or_else(|| PathBuf::from("./cmdanno_data"))
}

/// HTTP server bind settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5780,
        }
    }
}

/// Utility tag exclusion lists for the utility panel.
///
/// `allow_override` holds utilities collected through a separate channel and
/// therefore hidden from the panel; `deny` holds utilities out of scope for
/// annotation (general-purpose languages, editors). Both are configuration
/// data so the sets can be adjusted without a redeploy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UtilityLists {
    pub allow_override: Vec<String>,
    pub deny: Vec<String>,
}

impl Default for UtilityLists {
    fn default() -> Self {
        Self {
            allow_override: vec!["find".into(), "xargs".into()],
            deny: vec![
                "cpp".into(),
                "g++".into(),
                "java".into(),
                "perl".into(),
                "python".into(),
                "ruby".into(),
                "nano".into(),
                "emacs".into(),
                "vim".into(),
            ],
        }
    }
}

/// Application configuration, loaded from `config.toml` in the data folder.
///
/// Missing file or missing keys fall back to compiled defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub utilities: UtilityLists,
    /// Prefix prepended to page URLs on the collection page so annotators
    /// see the highlighted view of the page.
    pub viewer_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            utilities: UtilityLists::default(),
            viewer_prefix: "https://via.hypothes.is/".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `<data_folder>/config.toml`, falling back to
    /// defaults when the file is absent.
    pub fn load(data_folder: &std::path::Path) -> Result<Self> {
        let path = data_folder.join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// True when a utility tag is excluded from the utility panel
    pub fn is_excluded(&self, tag: &str) -> bool {
        self.utilities.allow_override.iter().any(|t| t == tag)
            || self.utilities.deny.iter().any(|t| t == tag)
    }
}
