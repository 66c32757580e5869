//! Domain layer — pure provisioning types, validation and parsing.
//!
//! This module has zero imports from `crate::infra`, `crate::application`,
//! `tokio`, `std::fs`, or `std::process`. All functions are synchronous and
//! take data in, returning data out.

pub mod cleanup;
pub mod command;
pub mod config;
pub mod context;
pub mod distro;
pub mod error;
pub mod fingerprint;
pub mod outcome;
pub mod step;
pub mod version;

pub use command::{Capture, CommandResult, CommandSpec};
pub use config::{CompanionConfig, ProvisionConfig, Repository, SigningKey};
pub use context::ProvisioningContext;
pub use error::{ArtifactKind, CommandError, ConfigError, ProvisionError};
pub use fingerprint::{VerificationRecord, fingerprint_matches};
pub use outcome::{RunOutcome, RunStatus};
pub use step::{FailurePolicy, ProvisioningStep, StepRecord, StepStatus};
