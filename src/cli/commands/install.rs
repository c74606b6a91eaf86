//! Install command implementation.
//!
//! `periphery-installer install` (or no subcommand) runs the mode
//! controller against the selected host platform.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::platform::{select_platform, HostPlatform, OsFamily};
use crate::runner::{ModeController, Outcome, RunOptions, RunReport};
use crate::session::InstallMode;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The install command implementation.
pub struct InstallCommand {
    project_root: PathBuf,
    mode: InstallMode,
    platform: Option<OsFamily>,
}

impl InstallCommand {
    /// Create a new install command.
    pub fn new(project_root: &Path, mode: InstallMode, platform: Option<OsFamily>) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            mode,
            platform,
        }
    }

    pub fn mode(&self) -> InstallMode {
        self.mode
    }

    /// Run against an explicit platform.
    pub fn run_on(&self, platform: &dyn HostPlatform, ui: &mut dyn UserInterface) -> RunReport {
        let options = RunOptions {
            mode: self.mode,
            project_root: self.project_root.clone(),
        };
        ModeController::new(platform, options).run(ui)
    }
}

impl Command for InstallCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let platform = select_platform(self.platform);
        let report = self.run_on(platform.as_ref(), ui);

        match &report.outcome {
            Outcome::Done => Ok(CommandResult::success()),
            Outcome::Failed {
                component, message, ..
            } => {
                ui.error(&format!("[{}] {}", component, message));
                Ok(CommandResult::failure(report.exit_code()))
            }
        }
    }
}
