pub mod settings;

pub use settings::Settings;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Failed to get config directory")?
        .join("searxngr");

    // Create config directory if it doesn't exist
    fs::create_dir_all(&config_dir)
        .context("Failed to create config directory")?;

    Ok(config_dir.join("config.toml"))
}

/// Load configuration from file, or create default if not exists
pub fn load_or_create_settings() -> Result<Settings> {
    let path = config_path()?;

    if path.exists() {
        read_settings(&path)
    } else {
        let settings = Settings::default();
        save_settings(&settings)?;

        println!("Created default config at: {}", path.display());
        println!("Please edit this file to set your SearXNG instance URL.");

        Ok(settings)
    }
}

/// Load configuration from an explicit path.
pub fn read_settings(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .context("Failed to read config file")?;
    let settings: Settings = toml::from_str(&content)
        .context("Failed to parse config file")?;
    Ok(settings)
}

/// Save configuration to file
pub fn save_settings(settings: &Settings) -> Result<()> {
    let path = config_path()?;
    let content = toml::to_string_pretty(settings)
        .context("Failed to serialize config")?;
    fs::write(&path, content)
        .context("Failed to write config file")?;
    Ok(())
}
