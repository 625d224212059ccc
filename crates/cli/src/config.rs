//! Configuration management for the CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::output::{print_success, OutputFormat};

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API endpoint URL
    pub api_url: Option<String>,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("tms").join("config.json"))
    }
}

/// Show the stored and resolved configuration
pub fn show_config(config: &Config, resolved_url: &str, format: OutputFormat) -> Result<()> {
    let config_path = Config::config_path()?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "config_file": config_path.display().to_string(),
                "stored_api_url": config.api_url,
                "api_url": resolved_url,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            println!("Config file:    {}", config_path.display());
            println!(
                "Stored API URL: {}",
                config.api_url.as_deref().unwrap_or("(not set)")
            );
            println!("Active API URL: {}", resolved_url);
        }
    }

    Ok(())
}

/// Persist a new default API endpoint URL
pub fn set_api_url(url: &str) -> Result<()> {
    let parsed = url::Url::parse(url).context("Invalid API URL")?;

    let mut config = Config::load().unwrap_or_default();
    config.api_url = Some(parsed.to_string());
    config.save()?;

    print_success(&format!("API URL set to {}", parsed));
    Ok(())
}
