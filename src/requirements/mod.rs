//! Tool detection and installation.
//!
//! This module decides whether the tools the add-on workflow needs are
//! present, and installs the missing ones with a chain of fallback
//! strategies.
//!
//! # Modules
//!
//! - [`probe`] - Host profile and tool availability
//! - [`registry`] - The tool manifest and its install strategies
//! - [`installer`] - Installation with fallbacks
//! - [`download`] - Direct release downloads
//! - [`status`] - Per-tool results
//! - [`version`] - Version extraction and constraint checks

pub mod download;
pub mod installer;
pub mod probe;
pub mod registry;
pub mod status;
pub mod version;

pub use installer::{DependencyInstaller, Strategy};
pub use probe::{probe, probe_tool, CapabilityReport, ToolAvailability};
pub use registry::{Fallback, ToolRegistry, ToolSpec};
pub use status::{DependencyCheckResult, InstallReport, Resolution};
