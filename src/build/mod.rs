//! Container build orchestration.
//!
//! - [`arch`] - Host architecture to add-on tag mapping
//! - [`orchestrator`] - Build inputs and the `docker build` invocation

pub mod arch;
pub mod orchestrator;

pub use arch::{map_arch, target_for_tag, ArchTarget, ARCH_TAGS};
pub use orchestrator::{build_addon, revision, run_build, BuildSpec};
