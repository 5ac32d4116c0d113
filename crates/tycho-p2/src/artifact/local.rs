use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::error::Result;
use crate::metadata::ArtifactKey;

use super::descriptor::{ArtifactDescriptor, ArtifactFormat};
use super::monitor::ProgressMonitor;
use super::transfer::{ArtifactRepository, TransferOutcome};

pub const INDEX_FILE: &str = "artifacts.json";

/// Artifact store on the local disk.
///
/// Lookups go through a concurrent index; writes are serialized and the
/// index is persisted to `artifacts.json` after every batch.
#[derive(Debug)]
pub struct LocalArtifactRepository {
    id: String,
    root: PathBuf,
    index: DashMap<ArtifactKey, Vec<ArtifactDescriptor>>,
    write_lock: Mutex<()>,
}

impl LocalArtifactRepository {
    /// Open a repository, creating the directory when missing
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let index = DashMap::new();
        let index_file = root.join(INDEX_FILE);
        if index_file.exists() {
            let descriptors: Vec<ArtifactDescriptor> =
                serde_json::from_str(&fs::read_to_string(&index_file)?)?;
            for descriptor in descriptors {
                index
                    .entry(descriptor.key.clone())
                    .or_insert_with(Vec::new)
                    .push(descriptor);
            }
            log::debug!("Loaded {} artifacts from {}", index.len(), index_file.display());
        }

        Ok(Self {
            id: format!("file:{}", root.display()),
            root,
            index,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contains(&self, key: &ArtifactKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn keys(&self) -> Vec<ArtifactKey> {
        let mut keys: Vec<ArtifactKey> = self.index.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Where the bytes of a descriptor are stored
    pub fn location(&self, descriptor: &ArtifactDescriptor) -> PathBuf {
        let key = &descriptor.key;
        let suffix = match &descriptor.format {
            ArtifactFormat::Canonical => String::new(),
            ArtifactFormat::Packed => ".packed".to_string(),
            ArtifactFormat::Other(name) => format!(".{}", name),
        };
        self.root
            .join(&key.classifier)
            .join(format!("{}_{}{}.jar", key.id, key.version, suffix))
    }

    pub fn add(&self, descriptor: ArtifactDescriptor, content: &[u8]) -> Result<PathBuf> {
        let mut locations = self.add_all(vec![(descriptor, content.to_vec())])?;
        Ok(locations.remove(0))
    }

    /// Store several artifacts and persist the index once.
    ///
    /// The index is persisted even when a file operation fails, so it
    /// always lists exactly the artifacts stored before the failure.
    pub fn add_all(&self, artifacts: Vec<(ArtifactDescriptor, Vec<u8>)>) -> Result<Vec<PathBuf>> {
        let _guard = self.write_lock.lock();
        let mut locations = Vec::with_capacity(artifacts.len());

        let stored = artifacts
            .into_iter()
            .try_for_each(|(descriptor, content)| -> Result<()> {
                locations.push(self.store(descriptor, &content)?);
                Ok(())
            });
        let persisted = self.persist();

        stored?;
        persisted?;
        Ok(locations)
    }

    /// Remove artifacts and their files, persisting the index once
    pub fn remove_all(&self, keys: &[ArtifactKey]) -> Result<usize> {
        let _guard = self.write_lock.lock();
        let mut removed = 0;

        let deleted = keys.iter().try_for_each(|key| -> Result<()> {
            if self.delete(key)? {
                removed += 1;
            }
            Ok(())
        });
        let persisted = self.persist();

        deleted?;
        persisted?;
        Ok(removed)
    }

    /// Write one artifact, indexing it only once its file is complete
    fn store(&self, descriptor: ArtifactDescriptor, content: &[u8]) -> Result<PathBuf> {
        let descriptor = descriptor.with_content_of(content);
        let location = self.location(&descriptor);
        if let Some(parent) = location.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&location, content)?;

        let mut entry = self.index.entry(descriptor.key.clone()).or_default();
        entry.retain(|d| d.format != descriptor.format);
        entry.push(descriptor);
        Ok(location)
    }

    /// Delete the files of one artifact, then its index entry.
    ///
    /// Descriptors whose files could not be deleted stay indexed.
    fn delete(&self, key: &ArtifactKey) -> Result<bool> {
        let descriptors = match self.index.get(key) {
            Some(entry) => entry.value().clone(),
            None => return Ok(false),
        };

        for (position, descriptor) in descriptors.iter().enumerate() {
            let location = self.location(descriptor);
            if !location.exists() {
                continue;
            }
            if let Err(e) = fs::remove_file(&location) {
                self.index.insert(key.clone(), descriptors[position..].to_vec());
                return Err(e.into());
            }
        }

        self.index.remove(key);
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        let mut descriptors: Vec<ArtifactDescriptor> = self
            .index
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect();
        descriptors.sort_by(|a, b| a.key.cmp(&b.key));

        let index_file = self.root.join(INDEX_FILE);
        let temp_file = self.root.join(format!("{}.tmp", INDEX_FILE));
        fs::write(&temp_file, serde_json::to_string_pretty(&descriptors)?)?;
        fs::rename(&temp_file, &index_file)?;
        log::debug!("Persisted {} descriptors to {}", descriptors.len(), index_file.display());
        Ok(())
    }
}

impl ArtifactRepository for LocalArtifactRepository {
    fn id(&self) -> &str {
        &self.id
    }

    fn descriptors(&self, key: &ArtifactKey) -> Vec<ArtifactDescriptor> {
        self.index
            .get(key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    fn transfer(
        &self,
        descriptor: &ArtifactDescriptor,
        sink: &mut dyn Write,
        _monitor: &dyn ProgressMonitor,
    ) -> TransferOutcome {
        let location = self.location(descriptor);
        match fs::read(&location) {
            Ok(content) => match sink.write_all(&content) {
                Ok(()) => TransferOutcome::Ok,
                Err(e) => TransferOutcome::Fatal(e.to_string()),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => TransferOutcome::NotFound,
            Err(e) => TransferOutcome::Retry(e.to_string()),
        }
    }
}
