//! Error types for installer operations.
//!
//! This module defines [`InstallerError`], the primary error type used
//! throughout the installer, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every error carries a [`Severity`] so the mode controller can decide
//!   whether to stop. Recoverable problems are normally reported as warnings
//!   and never reach the controller as errors.
//! - Every error names the [`Component`] it came from, which is what the
//!   user sees in front of the message.
//! - Use `anyhow::Error` (via `InstallerError::Other`) for unexpected errors.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The orchestrator component an error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// Mode controller and platform dispatch.
    Controller,
    /// Capability prober.
    Prober,
    /// Dependency installer.
    Installer,
    /// Host-config locator.
    Locator,
    /// Environment materializer.
    Materializer,
    /// Build orchestrator.
    Builder,
    /// Add-on manifest loading.
    Manifest,
}

impl Component {
    /// Display name used in user-facing messages.
    pub fn name(&self) -> &'static str {
        match self {
            Component::Controller => "controller",
            Component::Prober => "prober",
            Component::Installer => "dependency-installer",
            Component::Locator => "host-config-locator",
            Component::Materializer => "materializer",
            Component::Builder => "build-orchestrator",
            Component::Manifest => "manifest",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How an error affects the installation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Logged as a warning; the session continues.
    Recoverable,
    /// Stops the session immediately with a component-attributed message.
    Fatal,
    /// An external tool failed; its output is relayed without interpretation.
    Delegated,
}

impl Severity {
    /// Whether this severity stops the mode controller.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Severity::Recoverable)
    }
}

/// Core error type for installer operations.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// The host operating system has no installation support.
    #[error("Unsupported operating system: {os}")]
    UnsupportedOs { os: String },

    /// The host CPU architecture has no build target.
    #[error("Unsupported architecture '{arch}' (supported: aarch64, amd64, armhf, armv7, i386)")]
    UnsupportedArchitecture { arch: String },

    /// No Home Assistant configuration directory could be located.
    #[error("Home Assistant configuration directory not found: {message}")]
    HostConfigNotFound { message: String },

    /// A hard-required tool could not be installed by any strategy.
    #[error("Missing requirement '{requirement}': {message}")]
    RequirementMissing {
        requirement: String,
        message: String,
    },

    /// An installation strategy failed for a tool.
    #[error("Installing '{tool}' failed: {message}")]
    InstallFailed { tool: String, message: String },

    /// The container builder exited non-zero.
    #[error("Container build failed with exit code {code:?}:\n{output}")]
    BuildFailed { code: Option<i32>, output: String },

    /// A process could not be spawned or exited non-zero.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// A direct download failed.
    #[error("Download of {url} failed: {message}")]
    DownloadFailed { url: String, message: String },

    /// The add-on project directory cannot be resolved to an absolute path.
    #[error("Cannot use project directory {path}: {source}")]
    ProjectRootInvalid {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The add-on slug is not a single directory name.
    #[error("Add-on slug '{slug}' must be a single directory name")]
    InvalidSlug { slug: String },

    /// Failed to parse a manifest file.
    #[error("Failed to parse manifest at {path}: {message}")]
    ManifestParseError { path: PathBuf, message: String },

    /// A prompt could not be answered.
    #[error("Prompt '{key}' cannot be answered: {message}")]
    PromptUnavailable { key: String, message: String },

    /// Filesystem operation failed while materializing the environment.
    #[error("Cannot {action} {path}: {source}")]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InstallerError {
    /// Classify the error for the mode controller.
    pub fn severity(&self) -> Severity {
        match self {
            InstallerError::InstallFailed { .. } | InstallerError::DownloadFailed { .. } => {
                Severity::Recoverable
            }
            InstallerError::BuildFailed { .. } => Severity::Delegated,
            _ => Severity::Fatal,
        }
    }

    /// The component this error is attributed to by default.
    pub fn component(&self) -> Component {
        match self {
            InstallerError::UnsupportedOs { .. }
            | InstallerError::RequirementMissing { .. }
            | InstallerError::InstallFailed { .. }
            | InstallerError::DownloadFailed { .. } => Component::Installer,
            InstallerError::UnsupportedArchitecture { .. } | InstallerError::BuildFailed { .. } => {
                Component::Builder
            }
            InstallerError::HostConfigNotFound { .. }
            | InstallerError::PromptUnavailable { .. } => Component::Locator,
            InstallerError::ManifestParseError { .. } => Component::Manifest,
            InstallerError::Filesystem { .. } | InstallerError::InvalidSlug { .. } => {
                Component::Materializer
            }
            InstallerError::CommandFailed { .. }
            | InstallerError::ProjectRootInvalid { .. }
            | InstallerError::Io(_)
            | InstallerError::Other(_) => Component::Controller,
        }
    }

    /// Shorthand for a [`InstallerError::Filesystem`] error.
    pub fn fs(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InstallerError::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for installer operations.
pub type Result<T> = std::result::Result<T, InstallerError>;
