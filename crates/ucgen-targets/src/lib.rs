//! Input model for the ucgen platform artifact generator.
//!
//! Everything in this crate is produced upstream of artifact generation and
//! is read-only afterwards:
//! - **Platform:** the closed set of platform kinds and `Auto` resolution
//! - **Options:** resolved target options with a per-option "set by user" flag
//! - **Federate:** federate descriptors, interface bindings and the deployment context
//! - **Manifest:** the `ucgen.toml` project manifest, its parsing and validation

pub mod error;
pub mod federate;
pub mod manifest;
pub mod options;
pub mod parse;
pub mod platform;

pub use error::{Result, TargetError};
pub use federate::{DeploymentContext, FederateDescriptor, NetInterfaceBinding, SizingHints};
pub use manifest::{FederationSettings, ProjectManifest, ProjectSection};
pub use options::{LogLevel, TargetOptions, Tracked, TransportKind};
pub use parse::{
    check_manifest, load_manifest_toml, manifest_to_toml, parse_manifest_toml, validate_manifest,
    ValidationIssue,
};
pub use platform::PlatformKind;
