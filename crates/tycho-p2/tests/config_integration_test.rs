/// Integration tests for configuration loading
///
/// Only one test touches `TYCHO_*` variables so the tests in this binary
/// never race on the process environment.
use std::fs;

use tempfile::TempDir;
use tycho_p2::config::{ConfigSource, ResolverConfig, ResolverKind};
use tycho_p2::repository::MetadataRepository;
use tycho_p2::target::{ReactorProject, TargetPlatformAssembler, TargetPlatformStage};
use tycho_p2::{InstallableUnit, P2Error, TargetEnvironment, Version};

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let file = dir.path().join("tycho.json");
    fs::write(&file, content).unwrap();
    file
}

#[test]
fn test_environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let file = write_config(
        &dir,
        r#"{
            "execution-environment": "JavaSE-11",
            "max-transfer-attempts": 5,
            "include-sources": false
        }"#,
    );

    std::env::set_var("TYCHO_MAX_TRANSFER_ATTEMPTS", "7");
    std::env::set_var("TYCHO_ENVIRONMENTS", "linux/gtk/aarch64, macosx/cocoa/aarch64");
    let config = ResolverConfig::build(Some(file.as_path()), true);
    std::env::remove_var("TYCHO_MAX_TRANSFER_ATTEMPTS");
    std::env::remove_var("TYCHO_ENVIRONMENTS");
    let config = config.unwrap();

    assert_eq!(config.execution_environment, "JavaSE-11");
    assert_eq!(config.get_source("execution-environment"), Some(&ConfigSource::File));

    assert_eq!(config.max_transfer_attempts, 7);
    assert_eq!(
        config.get_source("max-transfer-attempts"),
        Some(&ConfigSource::Environment("TYCHO_MAX_TRANSFER_ATTEMPTS".to_string()))
    );

    assert_eq!(
        config.environments,
        vec![
            TargetEnvironment::new("linux", "gtk", "aarch64"),
            TargetEnvironment::new("macosx", "cocoa", "aarch64"),
        ]
    );
    assert_eq!(config.get_source("resolver"), Some(&ConfigSource::Default));
}

#[test]
fn test_unknown_keys_are_ignored() {
    let dir = TempDir::new().unwrap();
    let file = write_config(&dir, r#"{"resolver": "collector", "colour": "blue"}"#);

    let config = ResolverConfig::build(Some(file.as_path()), false).unwrap();
    assert_eq!(config.resolver, ResolverKind::Collector);
    assert_eq!(config.get_source("colour"), None);
}

#[test]
fn test_malformed_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let file = write_config(&dir, "{ not json");

    let err = ResolverConfig::build(Some(file.as_path()), false).unwrap_err();
    assert!(err.to_string().contains("tycho.json"));
}

#[test]
fn test_configured_repositories_feed_the_target_platform() {
    let dir = TempDir::new().unwrap();
    let library = InstallableUnit::builder("org.example.lib", Version::new(2, 0, 0)).build();
    MetadataRepository::from_units("libs", vec![library])
        .save(dir.path().join("libs.json"))
        .unwrap();

    let file = write_config(
        &dir,
        r#"{
            "environments": ["linux/gtk/x86_64"],
            "repositories": [{"id": "libs", "location": "libs.json"}]
        }"#,
    );
    let config = ResolverConfig::build(Some(file.as_path()), false).unwrap();
    let repositories = config.load_repositories().unwrap();
    assert_eq!(repositories.len(), 1);

    let mut assembler = TargetPlatformAssembler::new(config).unwrap();
    for repository in repositories {
        assembler.add_repository(repository);
    }
    assembler.add_reactor_project(ReactorProject::new("org.example:app"));

    let platform = assembler.assemble(TargetPlatformStage::Preliminary).unwrap();
    assert!(platform.units().iter().any(|u| u.id() == "org.example.lib"));
}

#[test]
fn test_missing_repository_names_its_id() {
    let dir = TempDir::new().unwrap();
    let file = write_config(&dir, r#"{"repositories": [{"id": "gone", "location": "nowhere"}]}"#);

    let config = ResolverConfig::build(Some(file.as_path()), false).unwrap();
    let err = config.load_repositories().unwrap_err();
    assert!(err.to_string().contains("gone"));
}

#[test]
fn test_duplicate_reactor_units_cannot_be_configured_away() {
    let dir = TempDir::new().unwrap();
    let file = write_config(&dir, r#"{"fail-on-duplicate-units": false}"#);
    let config = ResolverConfig::build(Some(file.as_path()), false).unwrap();
    assert_eq!(config.get_source("fail-on-duplicate-units"), None);

    let unit = InstallableUnit::builder("x", Version::new(1, 0, 0)).build();
    let mut assembler = TargetPlatformAssembler::new(config).unwrap();
    assembler.add_reactor_project(ReactorProject::new("org.example:a").with_units(vec![unit.clone()]));
    assembler.add_reactor_project(ReactorProject::new("org.example:b").with_units(vec![unit]));

    let err = assembler.assemble(TargetPlatformStage::Preliminary).unwrap_err();
    assert!(matches!(err, P2Error::DuplicateReactorUnits(ref d) if d.len() == 1));
    assert!(err.to_string().contains("x 1.0.0"));
}
