use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::source::{ConfigLoader, ConfigSource, RawConfig};
use crate::artifact::{TransferPolicy, DEFAULT_MAX_ATTEMPTS};
use crate::error::{P2Error, Result};
use crate::metadata::namespace::{INSTALL_FEATURES, INSTALL_SOURCES};
use crate::metadata::SelectionContext;
use crate::repository::MetadataRepository;
use crate::target::{
    AllKnownEEsResolutionHints, ExecutionEnvironment, ExecutionEnvironmentResolutionHints,
    StandardEEResolutionHints, TargetEnvironment,
};

/// Which resolution strategy computes the per-environment closure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolverKind {
    /// One consistent selection computed by the SAT solver
    #[default]
    Projector,
    /// Every reachable unit, without choosing between alternatives
    Collector,
}

/// An external metadata repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryLocation {
    pub id: String,
    pub location: PathBuf,
}

/// Resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolverConfig {
    #[serde(default = "default_environments")]
    pub environments: Vec<TargetEnvironment>,

    #[serde(default = "default_execution_environment")]
    pub execution_environment: String,

    /// Keep the JRE units of repositories and offer every known profile
    #[serde(default)]
    pub all_known_execution_environments: bool,

    #[serde(default)]
    pub filter_properties: IndexMap<String, String>,

    #[serde(default)]
    pub include_sources: bool,

    #[serde(default)]
    pub resolver: ResolverKind,

    #[serde(default)]
    pub repositories: Vec<RepositoryLocation>,

    #[serde(default = "default_max_transfer_attempts")]
    pub max_transfer_attempts: u32,

    #[serde(default)]
    pub transfer_policy: TransferPolicy,

    #[serde(skip)]
    base_dir: Option<PathBuf>,

    #[serde(skip)]
    sources: HashMap<String, ConfigSource>,
}

fn default_environments() -> Vec<TargetEnvironment> {
    vec![running_environment()]
}

/// The environment of the running platform
pub fn running_environment() -> TargetEnvironment {
    let (os, ws) = match std::env::consts::OS {
        "macos" => ("macosx", "cocoa"),
        "windows" => ("win32", "win32"),
        "linux" => ("linux", "gtk"),
        other => (other, "gtk"),
    };
    TargetEnvironment::new(os, ws, std::env::consts::ARCH)
}

fn default_execution_environment() -> String {
    "JavaSE-17".to_string()
}

fn default_max_transfer_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            environments: default_environments(),
            execution_environment: default_execution_environment(),
            all_known_execution_environments: false,
            filter_properties: IndexMap::new(),
            include_sources: false,
            resolver: ResolverKind::default(),
            repositories: Vec::new(),
            max_transfer_attempts: default_max_transfer_attempts(),
            transfer_policy: TransferPolicy::default(),
            base_dir: None,
            sources: HashMap::new(),
        }
    }
}

const CONFIG_KEYS: [&str; 9] = [
    "environments",
    "execution-environment",
    "all-known-execution-environments",
    "filter-properties",
    "include-sources",
    "resolver",
    "repositories",
    "max-transfer-attempts",
    "transfer-policy",
];

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build configuration from defaults, an optional JSON file and the
    /// environment, later sources winning.
    ///
    /// Relative repository locations resolve against the file's directory.
    pub fn build(config_file: Option<&Path>, use_environment: bool) -> Result<Self> {
        let loader = ConfigLoader::new(use_environment);
        let mut config = Self::default();

        for key in CONFIG_KEYS {
            config.sources.insert(key.to_string(), ConfigSource::Default);
        }

        if let Some(file) = config_file {
            config.base_dir = file.parent().map(Path::to_path_buf);
            let raw = loader.load_config_file(file)?;
            config.merge_raw_config(raw, ConfigSource::File)?;
        }

        if use_environment {
            config.apply_env_overrides(&loader)?;
        }

        Ok(config)
    }

    pub fn get_source(&self, key: &str) -> Option<&ConfigSource> {
        self.sources.get(key)
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn set_base_dir(&mut self, base_dir: impl AsRef<Path>) {
        self.base_dir = Some(base_dir.as_ref().to_path_buf());
    }

    fn merge_raw_config(&mut self, raw: RawConfig, source: ConfigSource) -> Result<()> {
        for (key, value) in raw {
            self.merge_config_value(&key, value, source.clone())?;
        }
        Ok(())
    }

    fn merge_config_value(
        &mut self,
        key: &str,
        value: serde_json::Value,
        source: ConfigSource,
    ) -> Result<()> {
        match key {
            "environments" => self.environments = parse_value(key, value)?,
            "execution-environment" => self.execution_environment = parse_value(key, value)?,
            "all-known-execution-environments" => {
                self.all_known_execution_environments = parse_value(key, value)?
            }
            "filter-properties" => self.filter_properties = parse_value(key, value)?,
            "include-sources" => self.include_sources = parse_value(key, value)?,
            "resolver" => self.resolver = parse_value(key, value)?,
            "repositories" => self.repositories = parse_value(key, value)?,
            "max-transfer-attempts" => self.max_transfer_attempts = parse_value(key, value)?,
            "transfer-policy" => self.transfer_policy = parse_value(key, value)?,
            other => {
                log::warn!("Ignoring unknown configuration key {}", other);
                return Ok(());
            }
        }
        self.sources.insert(key.to_string(), source);
        Ok(())
    }

    fn apply_env_overrides(&mut self, loader: &ConfigLoader) -> Result<()> {
        let env_source = |key: &str| ConfigSource::Environment(ConfigLoader::env_var_name(key));

        if let Some(environments) = loader.get_env_list("environments") {
            self.environments = environments
                .iter()
                .map(|e| TargetEnvironment::parse(e))
                .collect::<Result<_>>()?;
            self.sources.insert("environments".to_string(), env_source("environments"));
        }

        if let Some(ee) = loader.get_env_config("execution-environment") {
            self.execution_environment = ee;
            self.sources.insert(
                "execution-environment".to_string(),
                env_source("execution-environment"),
            );
        }

        if let Some(include) = loader.get_env_bool("include-sources") {
            self.include_sources = include;
            self.sources.insert("include-sources".to_string(), env_source("include-sources"));
        }

        if let Some(attempts) = loader.get_env_u32("max-transfer-attempts") {
            self.max_transfer_attempts = attempts;
            self.sources.insert(
                "max-transfer-attempts".to_string(),
                env_source("max-transfer-attempts"),
            );
        }

        Ok(())
    }

    /// Hints for the configured execution environment
    pub fn ee_hints(&self) -> Result<Arc<dyn ExecutionEnvironmentResolutionHints>> {
        if self.all_known_execution_environments {
            return Ok(Arc::new(AllKnownEEsResolutionHints::new()));
        }
        let environment = ExecutionEnvironment::parse(&self.execution_environment)?;
        Ok(Arc::new(StandardEEResolutionHints::new(environment)))
    }

    /// Context filters are evaluated against when resolving for `environment`
    pub fn selection_context(&self, environment: &TargetEnvironment) -> SelectionContext {
        let mut context = environment.to_context();
        context.insert(INSTALL_FEATURES, "true");
        if self.include_sources {
            context.insert(INSTALL_SOURCES, "true");
        }
        let extra: SelectionContext = self.filter_properties.iter().collect();
        context.merge_missing(&extra);
        context
    }

    pub fn repository_path(&self, repository: &RepositoryLocation) -> PathBuf {
        match &self.base_dir {
            Some(base) if repository.location.is_relative() => base.join(&repository.location),
            _ => repository.location.clone(),
        }
    }

    pub fn load_repositories(&self) -> Result<Vec<MetadataRepository>> {
        self.repositories
            .iter()
            .map(|r| MetadataRepository::load(r.id.clone(), self.repository_path(r)))
            .collect()
    }
}

fn parse_value<T: DeserializeOwned>(key: &str, value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| P2Error::Config(format!("Invalid value for {}: {}", key, e)))
}
