//! Probe command implementation.
//!
//! `periphery-installer probe` reports what the installer sees on the host
//! without installing or writing anything.

use crate::error::Result;
use crate::platform::{select_platform, HostPlatform, OsFamily};
use crate::requirements::{probe, CapabilityReport, ToolRegistry};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use crate::cli::args::ProbeArgs;

/// The probe command implementation.
pub struct ProbeCommand {
    args: ProbeArgs,
    platform: Option<OsFamily>,
}

impl ProbeCommand {
    /// Create a new probe command.
    pub fn new(args: ProbeArgs, platform: Option<OsFamily>) -> Self {
        Self { args, platform }
    }

    /// Probe an explicit platform.
    pub fn report(&self, platform: &dyn HostPlatform) -> CapabilityReport {
        probe(platform, &ToolRegistry::builtin())
    }
}

impl Command for ProbeCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let platform = select_platform(self.platform);
        let report = self.report(platform.as_ref());

        if self.args.json {
            let json = serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?;
            println!("{}", json);
            return Ok(CommandResult::success());
        }

        render(&report, ui);
        Ok(CommandResult::success())
    }
}

fn render(report: &CapabilityReport, ui: &mut dyn UserInterface) {
    let profile = &report.profile;
    ui.show_header("Host capabilities");
    ui.message(&format!("OS family:       {}", profile.family));
    ui.message(&format!("Architecture:    {}", profile.arch));
    ui.message(&format!(
        "Package manager: {}",
        profile
            .package_manager
            .map(|m| m.to_string())
            .unwrap_or_else(|| "none".to_string())
    ));

    for tool in &report.tools {
        if tool.available {
            ui.success(&format!(
                "{} {}",
                tool.name,
                tool.version.as_deref().unwrap_or("(version unknown)")
            ));
        } else {
            ui.warning(&format!("{} not found", tool.name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MockPlatform;
    use crate::ui::MockUI;

    #[test]
    fn renders_tools_and_profile() {
        let platform = MockPlatform::macos()
            .with_tool("brew", "Homebrew 4.2.0")
            .with_tool("git", "git version 2.39.3");
        let cmd = ProbeCommand::new(ProbeArgs::default(), None);
        let report = cmd.report(&platform);

        let mut ui = MockUI::new();
        render(&report, &mut ui);

        assert!(ui.has_message("macos"));
        assert!(ui.has_message("Architecture:"));
        assert!(ui.has_success("git 2.39.3"));
        assert!(ui.has_warning("docker not found"));
    }
}
