//! Command-line interface for the installer.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, CompletionsArgs, PlatformArg, ProbeArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
