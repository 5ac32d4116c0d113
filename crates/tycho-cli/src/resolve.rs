//! Resolve command - compute the target platform of a reactor project.

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use console::style;
use std::path::PathBuf;

use tycho_p2::config::ResolverKind;
use tycho_p2::target::{EnvironmentResults, TargetPlatformAssembler, TargetPlatformStage};
use tycho_p2::repository::MetadataRepository;
use tycho_p2::{InstallableUnit, ResolverConfig, TargetEnvironment};

use crate::reactor::ReactorFile;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Reactor description (JSON)
    #[arg(value_name = "REACTOR")]
    pub reactor: PathBuf,

    /// Project to resolve (groupId:artifactId); all projects when omitted
    #[arg(short = 'p', long)]
    pub project: Option<String>,

    /// Configuration file
    #[arg(short = 'c', long, default_value = "tycho.json")]
    pub config: PathBuf,

    /// Additional metadata repository (JSON listing or directory)
    #[arg(short = 'r', long = "repository", value_name = "PATH", action = clap::ArgAction::Append)]
    pub repositories: Vec<PathBuf>,

    /// Target environment os/ws/arch, replaces the configured ones
    #[arg(short = 'e', long = "environment", value_name = "OS/WS/ARCH", action = clap::ArgAction::Append)]
    pub environments: Vec<String>,

    /// Resolution strategy
    #[arg(long, value_enum)]
    pub resolver: Option<ResolverChoice>,

    /// Include pom dependencies (final target platform)
    #[arg(long)]
    pub final_stage: bool,

    /// Ignore TYCHO_* environment variables
    #[arg(long)]
    pub no_env: bool,

    /// Print the results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ResolverChoice {
    Projector,
    Collector,
}

impl From<ResolverChoice> for ResolverKind {
    fn from(choice: ResolverChoice) -> Self {
        match choice {
            ResolverChoice::Projector => ResolverKind::Projector,
            ResolverChoice::Collector => ResolverKind::Collector,
        }
    }
}

pub fn execute(args: ResolveArgs) -> Result<i32> {
    let mut config = ResolverConfig::build(Some(args.config.as_path()), !args.no_env)
        .context("Failed to load configuration")?;
    if !args.environments.is_empty() {
        config.environments = args
            .environments
            .iter()
            .map(|e| TargetEnvironment::parse(e))
            .collect::<tycho_p2::Result<_>>()?;
    }
    if let Some(resolver) = args.resolver {
        config.resolver = resolver.into();
    }

    let mut repositories = config.load_repositories()?;
    for (index, path) in args.repositories.iter().enumerate() {
        repositories.push(MetadataRepository::load(format!("cli-{}", index), path)?);
    }

    let projects = ReactorFile::load(&args.reactor)?.into_projects(config.include_sources)?;
    let ids: Vec<String> = match &args.project {
        Some(id) => {
            if !projects.iter().any(|p| p.id() == id) {
                bail!("Project {} is not part of {}", id, args.reactor.display());
            }
            vec![id.clone()]
        }
        None => projects.iter().map(|p| p.id().to_string()).collect(),
    };

    let stage = if args.final_stage {
        TargetPlatformStage::Final
    } else {
        TargetPlatformStage::Preliminary
    };

    let mut assembler = TargetPlatformAssembler::new(config)?;
    for repository in repositories {
        assembler.add_repository(repository);
    }
    for project in projects {
        assembler.add_reactor_project(project);
    }

    let mut failed = false;
    let mut report = serde_json::Map::new();
    for id in &ids {
        let results = assembler.resolve_project(id, stage)?;
        failed |= results.values().any(|r| r.is_err());
        if args.json {
            report.insert(id.clone(), results_to_json(&results));
        } else {
            print_results(id, &results);
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(if failed { 1 } else { 0 })
}

fn results_to_json(results: &EnvironmentResults) -> serde_json::Value {
    let entries = results
        .iter()
        .map(|(environment, result)| {
            let value = match result {
                Ok(resolution) => serde_json::to_value(resolution)
                    .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() })),
                Err(e) => serde_json::json!({ "error": e.to_string() }),
            };
            (environment.to_string(), value)
        })
        .collect();
    serde_json::Value::Object(entries)
}

fn print_results(project: &str, results: &EnvironmentResults) {
    println!("{} {}", style("Project").bold(), style(project).green());
    for (environment, result) in results {
        match result {
            Ok(resolution) => {
                println!(
                    "  {} {} units",
                    style(environment).cyan(),
                    resolution.units.len()
                );
                for unit in &resolution.units {
                    println!("    {}", describe(unit, resolution.non_reactor_units.contains(unit)));
                }
            }
            Err(e) => {
                println!("  {} {}", style(environment).cyan(), style("failed").red());
                for line in e.to_string().lines() {
                    println!("    {}", line);
                }
            }
        }
    }
}

fn describe(unit: &InstallableUnit, external: bool) -> String {
    if external {
        unit.to_string()
    } else {
        format!("{} {}", unit, style("(reactor)").dim())
    }
}
