//! Dependency installation with fallback strategies.
//!
//! Each tool from the registry is checked against the capability report.
//! Missing or outdated tools go through an ordered list of strategies: the
//! host's package manager first, then the tool's fallback. A strategy only
//! counts as successful when the tool is found afterwards.

use std::collections::HashSet;
use std::path::PathBuf;

use super::download;
use super::probe::{probe_tool, CapabilityReport, ToolAvailability};
use super::registry::{download_url, Fallback, ToolRegistry, ToolSpec, DOCKER_CONVENIENCE_SCRIPT};
use super::status::{DependencyCheckResult, InstallReport, Resolution};
use super::version::satisfies;
use crate::error::{InstallerError, Result};
use crate::platform::{Elevation, HostPlatform, OsFamily, OsProfile, PackageManager};
use crate::session::InstallMode;
use crate::ui::UserInterface;

/// One way of getting a tool onto the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Install a package through a package manager.
    Package {
        manager: PackageManager,
        package: &'static str,
    },
    /// Download and run Docker's convenience script.
    ConvenienceScript { url: &'static str },
    /// Download a release binary.
    Download { url: String },
}

impl Strategy {
    /// Short human-readable description.
    pub fn describe(&self) -> String {
        match self {
            Strategy::Package { manager, .. } => manager.binary().to_string(),
            Strategy::ConvenienceScript { url } => format!("the convenience script at {}", url),
            Strategy::Download { .. } => "direct download".to_string(),
        }
    }
}

/// Installs missing tools for one session.
pub struct DependencyInstaller<'a> {
    platform: &'a dyn HostPlatform,
    profile: &'a OsProfile,
    elevation: Elevation,
    refreshed: HashSet<PackageManager>,
}

impl<'a> DependencyInstaller<'a> {
    /// Create an installer using the platform's privilege level.
    pub fn new(platform: &'a dyn HostPlatform, profile: &'a OsProfile) -> Self {
        Self {
            platform,
            profile,
            elevation: platform.elevation(),
            refreshed: HashSet::new(),
        }
    }

    /// Override the privilege level.
    pub fn with_elevation(mut self, elevation: Elevation) -> Self {
        self.elevation = elevation;
        self
    }

    /// Check and install every tool in the registry.
    ///
    /// Stops at the first unresolved hard-required tool with
    /// `can_proceed = false`.
    pub fn install_all(
        &mut self,
        registry: &ToolRegistry,
        capabilities: &CapabilityReport,
        mode: InstallMode,
        ui: &mut dyn UserInterface,
    ) -> InstallReport {
        self.report_prerequisites(ui);

        let mut report = InstallReport {
            results: Vec::with_capacity(registry.len()),
            can_proceed: true,
        };

        for spec in registry.iter() {
            let found = capabilities
                .tool(spec.name)
                .cloned()
                .unwrap_or_else(|| probe_tool(self.platform, spec));
            let result = self.resolve(spec, &found, ui);
            let blocked =
                result.resolution == Resolution::Unresolved && spec.is_hard_required(mode);
            report.results.push(result);

            if blocked {
                tracing::warn!("Hard requirement {} is unresolved", spec.name);
                report.can_proceed = false;
                break;
            }
        }

        report
    }

    /// Strategies to try for a tool, in order. Unusable ones are left out.
    pub fn strategies(&self, spec: &ToolSpec) -> Vec<Strategy> {
        let mut strategies = Vec::new();
        let primary = self.profile.package_manager;

        if let Some(manager) = primary {
            if let Some(strategy) = self.package_strategy(spec, manager) {
                strategies.push(strategy);
            }
        }

        match spec.fallback {
            Fallback::None => {}
            Fallback::AltPackageManager => {
                let alternate = PackageManager::candidates(self.profile.family)
                    .iter()
                    .copied()
                    .filter(|m| Some(*m) != primary)
                    .filter(|m| self.platform.which(m.binary()).is_some())
                    .find_map(|m| self.package_strategy(spec, m));
                strategies.extend(alternate);
            }
            Fallback::DockerInstaller => match self.profile.family {
                OsFamily::Linux if self.elevation.can_run_as_root() => {
                    strategies.push(Strategy::ConvenienceScript {
                        url: DOCKER_CONVENIENCE_SCRIPT,
                    });
                }
                OsFamily::Windows
                    if primary != Some(PackageManager::Choco)
                        && self.platform.which(PackageManager::Choco.binary()).is_some() =>
                {
                    strategies.extend(self.package_strategy(spec, PackageManager::Choco));
                }
                _ => {}
            },
            Fallback::Download => {
                let url = download_url(spec.name, self.profile.family, &self.profile.arch);
                let location = download::install_location(self.platform, self.elevation);
                if let (Some(url), Some(_)) = (url, location) {
                    strategies.push(Strategy::Download { url });
                }
            }
        }

        strategies
    }

    fn package_strategy(&self, spec: &ToolSpec, manager: PackageManager) -> Option<Strategy> {
        let package = spec.package_for(manager)?;
        if manager.needs_root() && !self.elevation.can_run_as_root() {
            tracing::debug!("Skipping {} for {}: needs root", manager, spec.name);
            return None;
        }
        Some(Strategy::Package { manager, package })
    }

    fn resolve(
        &mut self,
        spec: &ToolSpec,
        found: &ToolAvailability,
        ui: &mut dyn UserInterface,
    ) -> DependencyCheckResult {
        let required = spec.version_req();

        if found.available && satisfies(found.version.as_deref(), required.as_ref()) {
            return DependencyCheckResult {
                name: spec.name.to_string(),
                required,
                found_version: found.version.clone(),
                found_path: found.path.clone(),
                installed_by_this_run: false,
                resolution: Resolution::Satisfied,
            };
        }

        if found.available {
            ui.warning(&format!(
                "{} {} does not satisfy {}; trying to upgrade",
                spec.name,
                found.version.as_deref().unwrap_or("?"),
                spec.constraint.unwrap_or("*")
            ));
        }

        for strategy in self.strategies(spec) {
            let mut spinner =
                ui.start_spinner(&format!("Installing {} via {}", spec.name, strategy.describe()));

            if let Err(e) = self.attempt(spec, &strategy, ui) {
                spinner.finish_error(&format!("{} via {} failed", spec.name, strategy.describe()));
                tracing::warn!("{}", e);
                ui.warning(&e.to_string());
                continue;
            }

            let after = probe_tool(self.platform, spec);
            if after.available && satisfies(after.version.as_deref(), required.as_ref()) {
                spinner.finish_success(&format!("Installed {}", spec.name));
                self.platform.post_install(spec.name, self.elevation, ui);
                return DependencyCheckResult {
                    name: spec.name.to_string(),
                    required,
                    found_version: after.version,
                    found_path: after.path,
                    installed_by_this_run: true,
                    resolution: Resolution::Installed,
                };
            }

            spinner.finish_error(&format!("{} still not available", spec.name));
            ui.warning(&format!(
                "{} reported success but {} is still not available (may need shell restart)",
                strategy.describe(),
                spec.name
            ));
        }

        ui.warning(&format!("{} could not be installed", spec.name));
        ui.show_hint(spec.manual_hint(self.profile.family));

        DependencyCheckResult {
            name: spec.name.to_string(),
            required,
            found_version: found.version.clone(),
            found_path: found.path.clone(),
            installed_by_this_run: false,
            resolution: Resolution::Unresolved,
        }
    }

    fn attempt(
        &mut self,
        spec: &ToolSpec,
        strategy: &Strategy,
        ui: &mut dyn UserInterface,
    ) -> Result<()> {
        match strategy {
            Strategy::Package { manager, package } => {
                if self.refreshed.insert(*manager) {
                    let refreshed = self
                        .platform
                        .refresh_packages(*manager, self.elevation)
                        .map(|r| r.is_none_or(|r| r.success))
                        .unwrap_or(false);
                    if !refreshed {
                        ui.warning(&format!("Refreshing {} package lists failed", manager));
                    }
                }

                let result = self.platform.install_package(*manager, package, self.elevation)?;
                if result.success {
                    Ok(())
                } else {
                    let command = manager.install_argv(package).join(" ");
                    Err(install_failed(
                        spec,
                        &command,
                        result.exit_code,
                        &result.combined_output(),
                    ))
                }
            }
            Strategy::ConvenienceScript { url } => {
                let script = std::env::temp_dir().join("periphery-installer-get-docker.sh");
                self.platform.download(url, &script)?;
                let argv = vec!["sh".to_string(), script.display().to_string()];
                let result = self.platform.run_privileged(&argv, self.elevation);
                std::fs::remove_file(&script).ok();
                let result = result?;
                if result.success {
                    Ok(())
                } else {
                    Err(install_failed(
                        spec,
                        &argv.join(" "),
                        result.exit_code,
                        &result.combined_output(),
                    ))
                }
            }
            Strategy::Download { url } => {
                download::install_binary(self.platform, spec.binary, url, self.elevation, ui)
                    .map(|_: PathBuf| ())
            }
        }
    }

    fn report_prerequisites(&self, ui: &mut dyn UserInterface) {
        match (self.profile.family, self.profile.package_manager) {
            (OsFamily::Macos, None) => {
                ui.warning("Homebrew not found. Please install Homebrew first:");
                ui.show_hint("https://brew.sh/");
            }
            (OsFamily::Windows, None) => {
                ui.warning(
                    "Neither winget nor choco found; packages cannot be installed automatically",
                );
                ui.show_hint(
                    "winget: https://aka.ms/getwinget  Chocolatey: https://chocolatey.org/install",
                );
            }
            (OsFamily::Linux, None) => {
                ui.warning(
                    "No supported package manager found (apt-get, dnf, yum, pacman, zypper)",
                );
            }
            (_, Some(manager)) if manager.needs_root() && !self.elevation.can_run_as_root() => {
                ui.warning(&format!(
                    "{} needs root and sudo is unavailable; system packages cannot be installed",
                    manager
                ));
            }
            _ => {}
        }
    }
}

fn install_failed(
    spec: &ToolSpec,
    command: &str,
    code: Option<i32>,
    output: &str,
) -> InstallerError {
    let mut message = format!("`{}` exited with code {:?}", command, code);
    if let Some(last) = output.lines().rev().find(|l| !l.trim().is_empty()) {
        message.push_str(": ");
        message.push_str(last.trim());
    }
    InstallerError::InstallFailed {
        tool: spec.name.to_string(),
        message,
    }
}
