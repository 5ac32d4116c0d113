//! Artifact descriptors, repositories and transfer.

mod descriptor;
mod local;
mod monitor;
mod transfer;

pub use descriptor::{sha256_hex, ArtifactDescriptor, ArtifactFormat, PROP_SHA256, PROP_SIZE};
pub use local::{LocalArtifactRepository, INDEX_FILE};
pub use monitor::{CancellableMonitor, NullMonitor, ProgressMonitor};
pub use transfer::{
    ArtifactRepository, RepositoryArtifactProvider, RetryTracker, TransferOutcome, TransferPolicy,
    DEFAULT_MAX_ATTEMPTS,
};
