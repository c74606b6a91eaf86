//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::platform::OsFamily;
use crate::session::InstallMode;

/// Installer for the Komodo Periphery Home Assistant add-on.
#[derive(Debug, Parser)]
#[command(name = "periphery-installer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Set up the local development environment (default)
    #[arg(long, global = true, conflicts_with = "production")]
    pub dev: bool,

    /// Write production deployment files
    #[arg(long, global = true)]
    pub production: bool,

    /// Path to the add-on project (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Host platform implementation to use instead of the detected one
    #[arg(long, global = true, value_enum)]
    pub platform: Option<PlatformArg>,

    /// Never prompt; fail when input would be needed
    #[arg(long, global = true)]
    pub non_interactive: bool,

    /// Show verbose output, including builder output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Requested installation mode.
    pub fn mode(&self) -> InstallMode {
        if self.production {
            InstallMode::Production
        } else {
            InstallMode::Development
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the installer (default if no command specified)
    Install,

    /// Report the host profile and tool availability without changing anything
    Probe(ProbeArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Platform names accepted by `--platform`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
    Linux,
    Macos,
    Windows,
}

impl From<PlatformArg> for OsFamily {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Linux => OsFamily::Linux,
            PlatformArg::Macos => OsFamily::Macos,
            PlatformArg::Windows => OsFamily::Windows,
        }
    }
}

/// Arguments for the `probe` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ProbeArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
