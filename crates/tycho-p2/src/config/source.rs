use std::env;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::{P2Error, Result};

/// Where a configuration value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Default,
    /// From the JSON configuration file
    File,
    /// From the named environment variable
    Environment(String),
    /// Set programmatically
    Command,
}

impl ConfigSource {
    pub fn as_str(&self) -> &str {
        match self {
            ConfigSource::Default => "default",
            ConfigSource::File => "file",
            ConfigSource::Environment(var) => var,
            ConfigSource::Command => "command",
        }
    }
}

/// Raw key/value configuration as read from a file
pub type RawConfig = IndexMap<String, serde_json::Value>;

/// Reads configuration files and `TYCHO_*` environment variables
#[derive(Debug)]
pub struct ConfigLoader {
    use_environment: bool,
}

impl ConfigLoader {
    pub fn new(use_environment: bool) -> Self {
        Self { use_environment }
    }

    pub fn load_config_file(&self, path: impl AsRef<Path>) -> Result<RawConfig> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(RawConfig::new());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| P2Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| P2Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Name of the variable for a key: `max-transfer-attempts` becomes
    /// `TYCHO_MAX_TRANSFER_ATTEMPTS`
    pub fn env_var_name(key: &str) -> String {
        format!("TYCHO_{}", key.replace('-', "_").to_uppercase())
    }

    pub fn get_env_config(&self, key: &str) -> Option<String> {
        if !self.use_environment {
            return None;
        }
        env::var(Self::env_var_name(key)).ok().filter(|s| !s.is_empty())
    }

    pub fn get_env_bool(&self, key: &str) -> Option<bool> {
        self.get_env_config(key)
            .map(|val| !matches!(val.to_lowercase().as_str(), "false" | "0" | ""))
    }

    pub fn get_env_u32(&self, key: &str) -> Option<u32> {
        self.get_env_config(key).and_then(|val| val.parse().ok())
    }

    /// Comma separated list
    pub fn get_env_list(&self, key: &str) -> Option<Vec<String>> {
        self.get_env_config(key).map(|val| {
            val.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_name() {
        assert_eq!(
            ConfigLoader::env_var_name("max-transfer-attempts"),
            "TYCHO_MAX_TRANSFER_ATTEMPTS"
        );
    }

    #[test]
    fn test_disabled_environment() {
        let loader = ConfigLoader::new(false);
        assert_eq!(loader.get_env_config("environments"), None);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let loader = ConfigLoader::new(false);
        assert!(loader.load_config_file("/nonexistent/tycho.json").unwrap().is_empty());
    }

    #[test]
    fn test_source_as_str() {
        assert_eq!(ConfigSource::Default.as_str(), "default");
        assert_eq!(
            ConfigSource::Environment("TYCHO_ENVIRONMENTS".to_string()).as_str(),
            "TYCHO_ENVIRONMENTS"
        );
    }
}
