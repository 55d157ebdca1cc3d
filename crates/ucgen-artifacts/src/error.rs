//! Artifact generation errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while generating or writing platform artifacts.
///
/// Missing optional inputs (no board match, no overlay, no explicit address)
/// are never errors; only internal invariant breaches and write failures are.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("address space {prefix}/64 exhausted")]
    AddressSpaceExhausted { prefix: String },

    #[error("address allocator lock poisoned by a panicked generation pass")]
    AllocatorPoisoned,

    #[error("writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for artifact operations.
pub type Result<T> = std::result::Result<T, ArtifactError>;
