use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Runtime configuration. Only the external collaborators are
/// configurable; the matching threshold and conflict window are fixed
/// design constants (see `constants`).
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub place_lookup: PlaceLookupConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlaceLookupConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for PlaceLookupConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "gig-reconciler/0.1".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Config {
    /// Loads `config.toml` from the working directory, falling back to
    /// defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("config.toml")).unwrap();
        assert_eq!(config.place_lookup.timeout_seconds, 10);
        assert!(config.place_lookup.base_url.contains("nominatim"));
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[place_lookup]\nbase_url = \"https://geocode.example\"\ntimeout_seconds = 3"
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.place_lookup.base_url, "https://geocode.example");
        assert_eq!(config.place_lookup.timeout_seconds, 3);
        // Unset keys keep their defaults.
        assert_eq!(config.place_lookup.user_agent, "gig-reconciler/0.1");
    }
}
