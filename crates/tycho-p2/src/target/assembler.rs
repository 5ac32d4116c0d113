use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;

use crate::config::{ResolverConfig, ResolverKind};
use crate::error::{DuplicateUnit, P2Error, Result};
use crate::metadata::{InstallableUnit, Requirement, UnitKey};
use crate::repository::MetadataRepository;
use crate::resolver::{DependencyCollector, Projector};

use super::ee::ExecutionEnvironmentResolutionHints;
use super::environment::TargetEnvironment;
use super::platform::{TargetPlatform, TargetPlatformStage};
use super::reactor::ReactorProject;
use super::result::{ArtifactEntry, ResolutionResult};

/// Per-environment outcome of resolving one project
pub type EnvironmentResults = IndexMap<TargetEnvironment, Result<ResolutionResult>>;

/// Merges external repositories, reactor projects and pom dependencies
/// into a target platform and resolves projects against it
#[derive(Debug)]
pub struct TargetPlatformAssembler {
    config: ResolverConfig,
    ee_hints: Arc<dyn ExecutionEnvironmentResolutionHints>,
    repositories: Vec<MetadataRepository>,
    reactor: Vec<ReactorProject>,
    pom_dependencies: Vec<Arc<InstallableUnit>>,
}

impl TargetPlatformAssembler {
    pub fn new(config: ResolverConfig) -> Result<Self> {
        let ee_hints = config.ee_hints()?;
        Ok(Self {
            config,
            ee_hints,
            repositories: Vec::new(),
            reactor: Vec::new(),
            pom_dependencies: Vec::new(),
        })
    }

    pub fn with_ee_hints(mut self, hints: Arc<dyn ExecutionEnvironmentResolutionHints>) -> Self {
        self.ee_hints = hints;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn add_repository(&mut self, repository: MetadataRepository) -> &mut Self {
        self.repositories.push(repository);
        self
    }

    pub fn add_reactor_project(&mut self, project: ReactorProject) -> &mut Self {
        self.reactor.push(project);
        self
    }

    /// Units of pom dependencies, only part of the final stage
    pub fn add_pom_dependency_units(&mut self, units: Vec<Arc<InstallableUnit>>) -> &mut Self {
        self.pom_dependencies.extend(units);
        self
    }

    pub fn reactor_projects(&self) -> &[ReactorProject] {
        &self.reactor
    }

    pub fn reactor_project(&self, id: &str) -> Option<&ReactorProject> {
        self.reactor.iter().find(|p| p.id() == id)
    }

    /// Every unit published by more than one reactor project
    pub fn duplicate_reactor_units(&self) -> Vec<DuplicateUnit> {
        let mut publishers: IndexMap<UnitKey, Vec<String>> = IndexMap::new();
        for project in &self.reactor {
            for unit in project.seed_units() {
                let projects = publishers.entry(unit.key()).or_default();
                if !projects.iter().any(|p| p == project.id()) {
                    projects.push(project.id().to_string());
                }
            }
        }

        publishers
            .into_iter()
            .filter(|(_, projects)| projects.len() > 1)
            .map(|(key, projects)| DuplicateUnit { key, projects })
            .collect()
    }

    /// Build the target platform of a stage
    pub fn assemble(&self, stage: TargetPlatformStage) -> Result<TargetPlatform> {
        let duplicates = self.duplicate_reactor_units();
        if !duplicates.is_empty() {
            return Err(P2Error::DuplicateReactorUnits(duplicates));
        }

        let mut platform = TargetPlatform::new(stage);
        let mut excluded = 0;
        for repository in &self.repositories {
            for unit in repository.units() {
                if self.ee_hints.is_non_applicable_unit(unit) {
                    excluded += 1;
                    continue;
                }
                platform.add_external(Arc::clone(unit));
            }
        }
        if excluded > 0 {
            log::debug!("Excluded {} execution environment units from repositories", excluded);
        }

        for unit in self.ee_hints.additional_units() {
            platform.add_external(unit);
        }

        if stage == TargetPlatformStage::Final {
            for unit in &self.pom_dependencies {
                platform.add_external(Arc::clone(unit));
            }
        }

        for project in &self.reactor {
            for unit in project.seed_units() {
                platform.add_reactor(project.id(), Arc::clone(unit));
            }
        }

        log::info!("Assembled {:?} target platform with {} units", stage, platform.len());
        Ok(platform)
    }

    /// Resolve a reactor project once per configured environment.
    ///
    /// Fails as a whole only when the platform cannot be assembled; each
    /// environment carries its own result otherwise.
    pub fn resolve_project(
        &self,
        project_id: &str,
        stage: TargetPlatformStage,
    ) -> Result<EnvironmentResults> {
        let project = self
            .reactor_project(project_id)
            .ok_or_else(|| P2Error::Config(format!("Unknown reactor project {}", project_id)))?;
        let platform = self.assemble(stage)?;
        let universe = platform.units();
        let additional = self.ee_hints.additional_requirements();

        let mut results = EnvironmentResults::new();
        for environment in &self.config.environments {
            let start = Instant::now();
            let result = self.resolve_environment(&platform, &universe, &additional, project, environment);
            match &result {
                Ok(resolution) => log::info!(
                    "Resolved {} for {} with {} units in {:?}",
                    project_id,
                    environment,
                    resolution.units.len(),
                    start.elapsed()
                ),
                Err(e) => log::warn!("Resolution of {} failed for {}: {}", project_id, environment, e),
            }
            results.insert(environment.clone(), result);
        }
        Ok(results)
    }

    fn resolve_environment(
        &self,
        platform: &TargetPlatform,
        universe: &[Arc<InstallableUnit>],
        additional: &[Requirement],
        project: &ReactorProject,
        environment: &TargetEnvironment,
    ) -> Result<ResolutionResult> {
        let context = self.config.selection_context(environment);

        let units = match self.config.resolver {
            ResolverKind::Projector => Projector::new()
                .with_additional_requirements(additional.to_vec())
                .resolve(universe, project.resolve_units(), &context)?,
            ResolverKind::Collector => DependencyCollector::new()
                .with_context(Some(context))
                .resolve(project.resolve_units(), additional, universe)?,
        };

        let non_reactor_units = units
            .iter()
            .filter(|u| !platform.is_reactor_unit(&u.key()))
            .cloned()
            .collect();

        let artifacts = units
            .iter()
            .flat_map(|unit| {
                let location = platform
                    .reactor_project_of(&unit.key())
                    .and_then(|id| self.reactor_project(id))
                    .and_then(|p| p.artifacts().main())
                    .map(|p| p.to_path_buf());
                unit.artifacts().iter().map(move |key| ArtifactEntry {
                    key: key.clone(),
                    location: location.clone(),
                })
            })
            .collect();

        Ok(ResolutionResult {
            environment: environment.clone(),
            units,
            non_reactor_units,
            artifacts,
        })
    }
}
