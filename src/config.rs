use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::pricing::PricingDefaults;
use crate::utils::{debug_log, warn};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ConfigSortOrder {
    Name,
    Cost,
    Tokens,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ConfigColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) db: Option<PathBuf>,
    #[serde(default)]
    pub(crate) compact: bool,
    #[serde(default)]
    pub(crate) no_color: bool,
    #[serde(default)]
    pub(crate) debug: bool,
    #[serde(default)]
    pub(crate) order: Option<ConfigSortOrder>,
    #[serde(default)]
    pub(crate) color: Option<ConfigColorMode>,
    #[serde(default)]
    pub(crate) locale: Option<String>,
    #[serde(default)]
    pub(crate) currency: Option<String>,
    #[serde(default)]
    pub(crate) defaults: PricingDefaults,
}

impl Config {
    pub(crate) fn load() -> Self {
        // Try config locations in order of priority
        for path in Self::get_config_paths() {
            if path.exists()
                && let Ok(content) = fs::read_to_string(&path)
            {
                match Self::parse(&content) {
                    Ok(config) => {
                        debug_log(&format!("loaded config from {}", path.display()));
                        return config;
                    }
                    Err(e) => warn(&format!("Failed to parse {}: {}", path.display(), e)),
                }
            }
        }

        debug_log("no config file found, using defaults");
        Self::default()
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Config>(content)
    }

    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config: ~/.config/tokbill/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("tokbill").join("config.toml"));
        }

        // 2. Platform config dir (macOS Application Support, etc.)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("tokbill").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 3. Home directory: ~/.tokbill.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".tokbill.toml"));
        }

        paths
    }
}
