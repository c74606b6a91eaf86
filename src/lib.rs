//! periphery-installer - bootstrap a Komodo Periphery Home Assistant add-on.
//!
//! The installer makes sure the host has the tools the add-on needs, then
//! either wires the project into a local Home Assistant instance and builds
//! its image (development) or writes the files a CI pipeline needs to
//! publish it (production).
//!
//! # Modules
//!
//! - [`build`] - Architecture mapping and the image build
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Add-on and build manifests
//! - [`error`] - Error types and result aliases
//! - [`locator`] - Home Assistant config discovery
//! - [`materialize`] - Devcontainer, deployment, production files, git
//! - [`platform`] - Host platform abstraction and OS profiles
//! - [`requirements`] - Tool probing and dependency installation
//! - [`runner`] - The mode controller state machine
//! - [`session`] - Per-run installation state
//! - [`shell`] - Process execution
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//!
//! # Example
//!
//! ```
//! use periphery_installer::build::map_arch;
//!
//! let target = map_arch("x86_64").unwrap();
//! assert_eq!(target.tag, "amd64");
//! assert_eq!(target.platform, "linux/amd64");
//! ```

pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod locator;
pub mod materialize;
pub mod platform;
pub mod requirements;
pub mod runner;
pub mod session;
pub mod shell;
pub mod ui;

pub use error::{InstallerError, Result};
