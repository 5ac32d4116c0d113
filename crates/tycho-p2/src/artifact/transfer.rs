//! Fetching artifacts from repositories with bounded retries.
//!
//! Every candidate descriptor is tried in policy order. A corrupt artifact
//! moves the other formats ahead of further copies of the same format. A
//! transfer writes into a private buffer that reaches the caller's sink
//! only after the transfer succeeded and the checksum matched.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{P2Error, Result};
use crate::metadata::ArtifactKey;
use crate::status::Status;

use super::descriptor::{ArtifactDescriptor, ArtifactFormat};
use super::monitor::ProgressMonitor;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Result of one raw transfer attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Ok,
    /// Transient failure, the same descriptor may be tried again
    Retry(String),
    /// The content is damaged, another format may still work
    Corrupt(String),
    /// This descriptor cannot be obtained, no retry
    Fatal(String),
    NotFound,
}

/// Source of artifact bytes
pub trait ArtifactRepository: fmt::Debug + Send + Sync {
    fn id(&self) -> &str;

    /// Every stored representation of an artifact
    fn descriptors(&self, key: &ArtifactKey) -> Vec<ArtifactDescriptor>;

    /// Copy the raw bytes of one descriptor into `sink`
    fn transfer(
        &self,
        descriptor: &ArtifactDescriptor,
        sink: &mut dyn Write,
        monitor: &dyn ProgressMonitor,
    ) -> TransferOutcome;
}

/// Order in which the formats of an artifact are tried
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransferPolicy {
    #[default]
    CanonicalFirst,
    PackedFirst,
}

impl TransferPolicy {
    fn rank(&self, format: &ArtifactFormat) -> u8 {
        match (self, format) {
            (TransferPolicy::CanonicalFirst, ArtifactFormat::Canonical) => 0,
            (TransferPolicy::CanonicalFirst, ArtifactFormat::Packed) => 1,
            (TransferPolicy::PackedFirst, ArtifactFormat::Packed) => 0,
            (TransferPolicy::PackedFirst, ArtifactFormat::Canonical) => 1,
            (_, ArtifactFormat::Other(_)) => 2,
        }
    }

    /// Stable sort keeping repository order within one format
    pub fn order<T>(&self, candidates: &mut [(T, ArtifactDescriptor)]) {
        candidates.sort_by_key(|(_, descriptor)| self.rank(&descriptor.format));
    }
}

/// Stable partition putting every candidate of `format` last
fn defer_format<T>(candidates: &mut [(T, ArtifactDescriptor)], format: &ArtifactFormat) {
    candidates.sort_by_key(|(_, descriptor)| &descriptor.format == format);
}

/// Counts attempts on one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryTracker {
    max_attempts: u32,
    attempts: u32,
}

impl RetryTracker {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            attempts: 0,
        }
    }

    /// Register an attempt; false when the budget is used up
    pub fn try_attempt(&mut self) -> bool {
        if self.attempts >= self.max_attempts {
            return false;
        }
        self.attempts += 1;
        true
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}

/// Obtains artifacts from a list of repositories
#[derive(Debug, Clone)]
pub struct RepositoryArtifactProvider {
    repositories: Vec<Arc<dyn ArtifactRepository>>,
    policy: TransferPolicy,
    max_attempts: u32,
}

impl RepositoryArtifactProvider {
    pub fn new(repositories: Vec<Arc<dyn ArtifactRepository>>) -> Self {
        Self {
            repositories,
            policy: TransferPolicy::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_policy(mut self, policy: TransferPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn contains(&self, key: &ArtifactKey) -> bool {
        self.repositories.iter().any(|r| !r.descriptors(key).is_empty())
    }

    /// Write the artifact into `sink`.
    ///
    /// The sink only ever receives the bytes of one complete, verified
    /// transfer.
    pub fn get_artifact(
        &self,
        key: &ArtifactKey,
        sink: &mut dyn Write,
        monitor: &dyn ProgressMonitor,
    ) -> Result<()> {
        if monitor.is_canceled() {
            return Err(P2Error::Canceled);
        }

        let mut candidates: Vec<(&Arc<dyn ArtifactRepository>, ArtifactDescriptor)> = self
            .repositories
            .iter()
            .flat_map(|repo| repo.descriptors(key).into_iter().map(move |d| (repo, d)))
            .collect();
        self.policy.order(&mut candidates);

        let mut attempts: Vec<Status> = Vec::new();
        if candidates.is_empty() {
            attempts.push(Status::error(format!("No repository contains {}", key)));
        }

        let mut next = 0;
        while next < candidates.len() {
            let (repository, descriptor) = candidates[next].clone();
            next += 1;
            let mut tracker = RetryTracker::new(self.max_attempts);

            while tracker.try_attempt() {
                if monitor.is_canceled() {
                    return Err(P2Error::Canceled);
                }

                let mut buffer = Vec::new();
                let outcome = repository.transfer(&descriptor, &mut buffer, monitor);
                if monitor.is_canceled() {
                    log::debug!("Transfer of {} canceled", descriptor);
                    return Err(P2Error::Canceled);
                }

                let outcome = match outcome {
                    TransferOutcome::Ok if !descriptor.verify(&buffer) => {
                        TransferOutcome::Corrupt("checksum mismatch".to_string())
                    }
                    other => other,
                };

                match outcome {
                    TransferOutcome::Ok => {
                        sink.write_all(&buffer)?;
                        monitor.worked(buffer.len() as u64);
                        log::debug!("Obtained {} from {}", descriptor, repository.id());
                        return Ok(());
                    }
                    TransferOutcome::Retry(reason) => {
                        log::warn!(
                            "Attempt {} for {} from {} failed: {}",
                            tracker.attempts(),
                            descriptor,
                            repository.id(),
                            reason
                        );
                        attempts.push(Status::warning(format!(
                            "Attempt {} for {} from {} failed: {}",
                            tracker.attempts(),
                            descriptor,
                            repository.id(),
                            reason
                        )));
                    }
                    TransferOutcome::Corrupt(reason) => {
                        log::warn!("Artifact {} from {} is corrupt: {}", descriptor, repository.id(), reason);
                        attempts.push(Status::error(format!(
                            "Artifact {} from {} is corrupt: {}",
                            descriptor,
                            repository.id(),
                            reason
                        )));
                        defer_format(&mut candidates[next..], &descriptor.format);
                        break;
                    }
                    TransferOutcome::NotFound => {
                        attempts.push(Status::info(format!(
                            "Artifact {} not found in {}",
                            descriptor,
                            repository.id()
                        )));
                        break;
                    }
                    TransferOutcome::Fatal(reason) => {
                        log::warn!("Transfer of {} from {} failed: {}", descriptor, repository.id(), reason);
                        attempts.push(Status::error(format!(
                            "Transfer of {} from {} failed: {}",
                            descriptor,
                            repository.id(),
                            reason
                        )));
                        break;
                    }
                }
            }
        }

        Err(not_found(key, attempts))
    }
}

fn not_found(key: &ArtifactKey, attempts: Vec<Status>) -> P2Error {
    P2Error::ArtifactNotFound {
        key: key.clone(),
        status: Status::multi(format!("Could not obtain artifact {}", key), attempts),
    }
}
