use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Default site stored alongside the credentials.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SavedLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// DataHub API key, issued through the Met Office DataHub portal.
    pub api_key: Option<String>,

    /// Example TOML:
    /// [location]
    /// latitude = 54.0
    /// longitude = -3.0
    pub location: Option<SavedLocation>,
}

impl Config {
    /// Return the stored API key, or a hint-bearing error when none is configured.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `metoffice configure` and enter your DataHub API key."
            )
        })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Store default coordinates for forecast calls that don't pass their own.
    pub fn set_default_location(&mut self, latitude: f64, longitude: f64) {
        self.location = Some(SavedLocation {
            latitude,
            longitude,
        });
    }

    pub fn default_location(&self) -> Option<SavedLocation> {
        self.location
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("uk", "metoffice", "metoffice-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key().unwrap_err();

        assert!(err.to_string().contains("No API key configured"));
        assert!(err.to_string().contains("Hint: run `metoffice configure`"));
        assert!(!cfg.is_configured());
    }

    #[test]
    fn set_and_read_api_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("DATAHUB_KEY".into());

        assert_eq!(cfg.api_key().expect("key must exist"), "DATAHUB_KEY");
        assert!(cfg.is_configured());
    }

    #[test]
    fn default_location_roundtrip() {
        let mut cfg = Config::default();
        assert!(cfg.default_location().is_none());

        cfg.set_default_location(54.0, -3.0);

        let saved = cfg.default_location().expect("location must exist");
        assert_eq!(saved.latitude, 54.0);
        assert_eq!(saved.longitude, -3.0);
    }

    #[test]
    fn config_toml_roundtrip() {
        let mut cfg = Config::default();
        cfg.set_api_key("DATAHUB_KEY".into());
        cfg.set_default_location(51.5, -0.12);

        let toml = toml::to_string_pretty(&cfg).expect("should serialize");
        let parsed: Config = toml::from_str(&toml).expect("should parse");

        assert_eq!(parsed.api_key().expect("key"), "DATAHUB_KEY");
        let saved = parsed.default_location().expect("location");
        assert_eq!(saved.latitude, 51.5);
    }
}
