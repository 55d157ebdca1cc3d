//! Platform artifact generation engine.
//!
//! Turns a resolved project manifest into the text artifacts a downstream
//! native toolchain consumes: build descriptors, system-configuration files,
//! board overlays, entry-point stubs and launch scripts. Everything is
//! composed in memory; [`ArtifactSet::write_all`] performs the only I/O.
//!
//! - **Dispatch:** [`PlatformRegistry`] maps a platform to its [`GeneratorSet`]
//! - **Composition:** [`ConfigFragment`], [`ConfigComposer`], [`BoardQuirkTable`]
//!   and workspace overlays
//! - **Addresses:** [`AddressAllocator`] for federates on the 6LoWPAN transport
//! - **Orchestration:** [`PlatformDriver`] per deployment unit

pub mod alloc;
pub mod artifact;
pub mod board;
pub mod cmake;
pub mod compose;
pub mod config;
pub mod driver;
pub mod error;
pub mod generator;
pub mod kconfig;
pub mod launch;
pub mod main_gen;
pub mod make;
pub mod registry;
pub mod report;
pub mod workspace;

pub use alloc::{AddressAllocator, SharedAllocator, DEFAULT_PREFIX};
pub use artifact::{ArtifactSet, GeneratedArtifact};
pub use board::BoardQuirkTable;
pub use compose::{merge_with_workspace_overlay, ConfigComposer, Layer};
pub use config::{ConfigFragment, ConfigLine, ConfigValue};
pub use driver::{GenerationOutput, GenerationRequest, Numbering, PlatformDriver, UnitOutput};
pub use error::{ArtifactError, Result};
pub use generator::{ArtifactGenerator, SystemConfigLayout, UnitContext, UnitNetwork};
pub use registry::{BuildPlan, GeneratorSet, PlatformRegistry};
pub use report::GenerationReport;
pub use workspace::{FsWorkspace, MemoryWorkspace, NoWorkspace, WorkspaceProbe};
