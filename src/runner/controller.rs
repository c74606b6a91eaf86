//! The mode controller state machine.
//!
//! ```text
//! INIT -> PROBE -> INSTALL_DEPS -> LOCATE_CONFIG -> MATERIALIZE -> BUILD -> DONE   (development)
//! INIT -> PROBE -> INSTALL_DEPS -> MATERIALIZE -> DONE                            (production)
//! ```
//!
//! Any fatal or delegated error moves the session to FAILED. Nothing is
//! rolled back; every phase is safe to run again.

use std::path::{Path, PathBuf};

use crate::build::build_addon;
use crate::config::{load_addon_manifest, resolve_project_root};
use crate::error::{Component, InstallerError, Result};
use crate::locator;
use crate::materialize::{materialize, next_steps};
use crate::platform::{HostPlatform, OsFamily};
use crate::requirements::{
    probe, CapabilityReport, DependencyInstaller, Resolution, ToolRegistry,
};
use crate::session::{InstallMode, InstallationSession, OutcomeLevel, Phase};
use crate::ui::{Prompt, UserInterface};

/// Prompt key for continuing with tools still missing.
pub const CONTINUE_PROMPT: &str = "continue_with_missing";

/// Options for one controller run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub mode: InstallMode,
    /// The add-on project directory.
    pub project_root: PathBuf,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Failed {
        phase: Phase,
        component: Component,
        message: String,
    },
}

/// The session plus its outcome.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub session: InstallationSession,
    pub outcome: Outcome,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Done
    }

    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Drives one installation session through its phases.
pub struct ModeController<'a> {
    platform: &'a dyn HostPlatform,
    registry: ToolRegistry,
    options: RunOptions,
}

impl<'a> ModeController<'a> {
    pub fn new(platform: &'a dyn HostPlatform, options: RunOptions) -> Self {
        Self {
            platform,
            registry: ToolRegistry::builtin(),
            options,
        }
    }

    /// Run every phase for the configured mode.
    pub fn run(&self, ui: &mut dyn UserInterface) -> RunReport {
        let mut session = InstallationSession::new(self.options.mode);
        let mut capabilities = None;

        ui.show_header("Komodo Periphery HA Add-on Installer");
        tracing::info!(
            "Starting {} setup in {} on {}",
            self.options.mode,
            self.options.project_root.display(),
            self.platform.name()
        );

        let root = match resolve_project_root(&self.options.project_root) {
            Ok(root) => root,
            Err(err) => return failed(session, Phase::Init, err),
        };

        loop {
            let phase = session.advance();
            if phase.is_terminal() {
                break;
            }

            let result = self.run_phase(phase, &root, &mut session, &mut capabilities, ui);
            let Err(err) = result else { continue };

            if !err.severity().is_fatal() {
                tracing::warn!("{}", err);
                ui.warning(&err.to_string());
                session.warn(err.to_string());
                continue;
            }

            return failed(session, phase, err);
        }

        next_steps(self.options.mode, ui);
        ui.success("Installation completed successfully!");
        tracing::info!("Finished in {:.1}s", session.elapsed().as_secs_f64());

        RunReport {
            session,
            outcome: Outcome::Done,
        }
    }

    fn run_phase(
        &self,
        phase: Phase,
        root: &Path,
        session: &mut InstallationSession,
        capabilities: &mut Option<CapabilityReport>,
        ui: &mut dyn UserInterface,
    ) -> Result<()> {
        match phase {
            Phase::Probe => {
                let report = probe(self.platform, &self.registry);
                let profile = &report.profile;
                let manager = profile
                    .package_manager
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "none".to_string());
                ui.message(&format!(
                    "Detected {} ({}), package manager: {}",
                    profile.family, profile.arch, manager
                ));
                session.info(format!("host {} {}", profile.family, profile.arch));
                session.profile = Some(profile.clone());
                *capabilities = Some(report);
            }
            Phase::InstallDeps => self.install_deps(session, capabilities.as_ref(), ui)?,
            Phase::LocateConfig => {
                ui.message("Looking for Home Assistant configuration directory...");
                let location = locator::locate(self.platform, ui)?;
                ui.success(&format!(
                    "Found Home Assistant config at: {} ({})",
                    location.path.display(),
                    location.method
                ));
                session.info(format!("host config {}", location.path.display()));
                session.host_config = Some(location);
            }
            Phase::Materialize => {
                let manifest = load_addon_manifest(root)?;
                let out = materialize(
                    self.platform,
                    root,
                    session.mode,
                    session.host_config.as_ref(),
                    &manifest.slug,
                    ui,
                )?;
                for file in &out.files {
                    session.info(format!("wrote {}", file.display()));
                }
                if let Some(deployment) = &out.deployment {
                    tracing::info!(
                        "Deployed to {} via {:?}",
                        deployment.target.display(),
                        deployment.strategy
                    );
                    session.info(format!("deployed to {}", deployment.target.display()));
                }
                session.deployment = out.deployment;
            }
            Phase::Build => {
                ui.message("Building add-on Docker image...");
                let spec = build_addon(self.platform, root, ui)?;
                session.info(format!("built {}", spec.image));
                session.build = Some(spec);
            }
            Phase::Init | Phase::Done | Phase::Failed => {}
        }
        Ok(())
    }

    fn install_deps(
        &self,
        session: &mut InstallationSession,
        capabilities: Option<&CapabilityReport>,
        ui: &mut dyn UserInterface,
    ) -> Result<()> {
        let profile = session.profile.clone().ok_or_else(|| {
            InstallerError::Other(anyhow::anyhow!("host profile missing before dependency install"))
        })?;

        if profile.family == OsFamily::Unknown {
            return Err(InstallerError::UnsupportedOs {
                os: std::env::consts::OS.to_string(),
            });
        }

        ui.message("Installing dependencies...");
        let capabilities = match capabilities {
            Some(c) => c.clone(),
            None => probe(self.platform, &self.registry),
        };

        let report = DependencyInstaller::new(self.platform, &profile).install_all(
            &self.registry,
            &capabilities,
            session.mode,
            ui,
        );

        for result in &report.results {
            match result.resolution {
                Resolution::Unresolved => session.warn(result.summary()),
                _ => session.info(result.summary()),
            }
        }
        session.results = report.results.clone();
        session.can_proceed = report.can_proceed;

        if !report.can_proceed {
            let requirement = report
                .unresolved()
                .last()
                .map(|s| s.to_string())
                .unwrap_or_default();
            return Err(InstallerError::RequirementMissing {
                requirement,
                message: "every install strategy failed".to_string(),
            });
        }

        let missing = report.unresolved();
        if missing.is_empty() {
            ui.success("All required tools are installed.");
        } else if profile.family == OsFamily::Windows && ui.is_interactive() {
            ui.warning(&format!("Missing required tools on Windows: {}", missing.join(", ")));
            let prompt = Prompt::confirm(CONTINUE_PROMPT, "Continue anyway?", false);
            let proceed = ui.prompt(&prompt)?.as_bool().unwrap_or(false);
            if !proceed {
                return Err(InstallerError::RequirementMissing {
                    requirement: missing.join(", "),
                    message: "declined to continue without it".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn failed(mut session: InstallationSession, phase: Phase, err: InstallerError) -> RunReport {
    let message = err.to_string();
    session.record(OutcomeLevel::Error, message.clone());
    session.fail();
    RunReport {
        session,
        outcome: Outcome::Failed {
            phase,
            component: err.component(),
            message,
        },
    }
}
