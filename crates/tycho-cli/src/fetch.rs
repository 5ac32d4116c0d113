//! Fetch command - obtain an artifact from local artifact repositories.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use console::style;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use tycho_p2::artifact::{
    ArtifactRepository, CancellableMonitor, LocalArtifactRepository, RepositoryArtifactProvider,
};
use tycho_p2::{ArtifactKey, ResolverConfig, Version};

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Artifact as classifier,id,version (e.g. osgi.bundle,org.example,1.0.0)
    #[arg(value_name = "ARTIFACT")]
    pub artifact: String,

    /// Artifact repository directory, tried in the given order
    #[arg(short = 'r', long = "repository", value_name = "DIR", required = true, action = clap::ArgAction::Append)]
    pub repositories: Vec<PathBuf>,

    /// Where to write the artifact
    #[arg(short = 'o', long)]
    pub output: PathBuf,

    /// Configuration file (transfer attempts and policy)
    #[arg(short = 'c', long, default_value = "tycho.json")]
    pub config: PathBuf,
}

fn parse_key(text: &str) -> Result<ArtifactKey> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [classifier, id, version] => Ok(ArtifactKey::new(*classifier, *id, Version::parse(version)?)),
        _ => Err(anyhow!("Expected classifier,id,version but got '{}'", text)),
    }
}

pub fn execute(args: FetchArgs) -> Result<i32> {
    let key = parse_key(&args.artifact)?;
    let config = ResolverConfig::build(Some(args.config.as_path()), true)?;

    let repositories = args
        .repositories
        .iter()
        .map(|dir| {
            LocalArtifactRepository::open(dir)
                .map(|repo| Arc::new(repo) as Arc<dyn ArtifactRepository>)
                .with_context(|| format!("Failed to open artifact repository {}", dir.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let provider = RepositoryArtifactProvider::new(repositories)
        .with_policy(config.transfer_policy)
        .with_max_attempts(config.max_transfer_attempts);

    if !provider.contains(&key) {
        eprintln!("{} {} is in none of the repositories", style("Warning:").yellow(), key);
    }

    let monitor = CancellableMonitor::new();
    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    let mut sink = BufWriter::new(file);

    if let Err(e) = provider.get_artifact(&key, &mut sink, &monitor) {
        drop(sink);
        std::fs::remove_file(&args.output).ok();
        return Err(e.into());
    }
    sink.flush()?;

    println!(
        "{} {} ({} bytes) to {}",
        style("Fetched").green(),
        key,
        monitor.total_worked(),
        args.output.display()
    );
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tycho_p2::artifact::ArtifactDescriptor;

    #[test]
    fn test_parse_key() {
        let key = parse_key("osgi.bundle, org.example ,1.2.3").unwrap();
        assert_eq!(key, ArtifactKey::new("osgi.bundle", "org.example", Version::new(1, 2, 3)));
        assert!(parse_key("org.example,1.0.0").is_err());
    }

    #[test]
    fn test_fetch_from_local_repository() {
        let dir = tempfile::tempdir().unwrap();
        let repo_dir = dir.path().join("repo");
        let key = ArtifactKey::new("osgi.bundle", "org.example", Version::new(1, 0, 0));
        LocalArtifactRepository::open(&repo_dir)
            .unwrap()
            .add(ArtifactDescriptor::new(key), b"jar bytes")
            .unwrap();

        let output = dir.path().join("out.jar");
        let code = execute(FetchArgs {
            artifact: "osgi.bundle,org.example,1.0.0".to_string(),
            repositories: vec![repo_dir],
            output: output.clone(),
            config: dir.path().join("missing.json"),
        })
        .unwrap();

        assert_eq!(code, 0);
        assert_eq!(std::fs::read(output).unwrap(), b"jar bytes");
    }

    #[test]
    fn test_failed_fetch_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.jar");

        let result = execute(FetchArgs {
            artifact: "osgi.bundle,org.missing,1.0.0".to_string(),
            repositories: vec![dir.path().join("empty")],
            output: output.clone(),
            config: dir.path().join("missing.json"),
        });

        assert!(result.is_err());
        assert!(!output.exists());
    }
}
