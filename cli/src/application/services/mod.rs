//! Application services — use-case orchestration.
//!
//! Each service module implements one part of the provisioning use-case by
//! composing domain logic with port trait calls. Services import only from
//! `crate::domain` and `crate::application::ports` — never from
//! `crate::infra`, `crate::cli`, or `crate::output`.

pub mod companion;
pub mod key_gate;
pub mod orchestrator;
pub mod pipeline;
pub mod plan;
pub mod post_install;
pub mod preflight;
