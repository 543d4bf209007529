//! Configuration: TOML file, environment and defaults.
//!
//! Lookup order for the file: explicit path, then
//! `<config_dir>/location-services/config.toml` if it exists, then built-in
//! defaults. `GOOGLE_MAPS_API_KEY` overrides the file's key.

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::location::TravelMode;

pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub google: GoogleMapsConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GoogleMapsConfig {
    pub api_key: String,
    pub geocode_url: String,
    pub reverse_geocode_url: String,
    pub directions_url: String,
    pub travel_mode: TravelMode,
    pub timeout_secs: u64,
}

impl Default for GoogleMapsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            geocode_url: default_geocode_url(),
            reverse_geocode_url: default_geocode_url(),
            directions_url: "https://maps.googleapis.com/maps/api/directions/json".to_string(),
            travel_mode: TravelMode::Driving,
            timeout_secs: 10,
        }
    }
}

fn default_geocode_url() -> String {
    "https://maps.googleapis.com/maps/api/geocode/json".to_string()
}

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
            port: 8080,
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location, then apply the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from_file(p)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(p) => Self::load_from_file(&p)?,
                None => Self::default(),
            },
        };
        config.apply_env(std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.google.timeout_secs > 0, "google.timeout_secs must be at least 1");
        Ok(())
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("location-services").join("config.toml"))
    }

    fn apply_env(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.google.api_key = key;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.google.api_key.is_empty());
        assert_eq!(config.google.travel_mode, TravelMode::Driving);
        assert_eq!(config.google.timeout_secs, 10);
        assert_eq!(config.google.geocode_url, config.google.reverse_geocode_url);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_full_file() {
        let file = write_config(
            r#"
            [google]
            api_key = "abc123"
            directions_url = "http://localhost:9000/directions"
            travel_mode = "walking"
            timeout_secs = 3

            [server]
            host = "0.0.0.0"
            port = 3000
            "#,
        );
        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.google.api_key, "abc123");
        assert_eq!(config.google.directions_url, "http://localhost:9000/directions");
        assert_eq!(config.google.travel_mode, TravelMode::Walking);
        assert_eq!(config.google.timeout_secs, 3);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config("[server]\nport = 9999\n");
        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.google.geocode_url.starts_with("https://maps.googleapis.com"));
    }

    #[test]
    fn test_invalid_file() {
        let file = write_config("[google\napi_key = ");
        assert!(Config::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_unknown_travel_mode_rejected() {
        let file = write_config("[google]\ntravel_mode = \"teleport\"\n");
        assert!(Config::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let file = write_config("[google]\ntimeout_secs = 0\n");
        let err = Config::load_from_file(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("timeout_secs"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::load(Some(missing.as_path())).is_err());
    }

    #[test]
    fn test_env_overrides_file_key() {
        let mut config = Config::default();
        config.google.api_key = "from-file".into();
        config.apply_env(Some("from-env".into()));
        assert_eq!(config.google.api_key, "from-env");
        config.apply_env(Some("  ".into()));
        assert_eq!(config.google.api_key, "from-env");
        config.apply_env(None);
        assert_eq!(config.google.api_key, "from-env");
    }
}
