//! Installation modes and controller phases.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// What the installer is setting up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallMode {
    /// Local development: devcontainer, deployment into Home Assistant, local build.
    #[default]
    Development,
    /// Production artifacts: build manifest and CI pipeline.
    Production,
}

impl InstallMode {
    pub fn name(&self) -> &'static str {
        match self {
            InstallMode::Development => "development",
            InstallMode::Production => "production",
        }
    }
}

impl fmt::Display for InstallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InstallMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(InstallMode::Development),
            "production" | "prod" => Ok(InstallMode::Production),
            other => Err(format!("unknown install mode: {}", other)),
        }
    }
}

/// A state of the mode controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Init,
    Probe,
    InstallDeps,
    LocateConfig,
    Materialize,
    Build,
    Done,
    Failed,
}

impl Phase {
    /// The phase that follows this one on success.
    ///
    /// Production skips config discovery and the local build. `Done` and
    /// `Failed` are terminal and map to themselves.
    pub fn next(self, mode: InstallMode) -> Phase {
        match (self, mode) {
            (Phase::Init, _) => Phase::Probe,
            (Phase::Probe, _) => Phase::InstallDeps,
            (Phase::InstallDeps, InstallMode::Development) => Phase::LocateConfig,
            (Phase::InstallDeps, InstallMode::Production) => Phase::Materialize,
            (Phase::LocateConfig, _) => Phase::Materialize,
            (Phase::Materialize, InstallMode::Development) => Phase::Build,
            (Phase::Materialize, InstallMode::Production) => Phase::Done,
            (Phase::Build, _) => Phase::Done,
            (Phase::Done, _) => Phase::Done,
            (Phase::Failed, _) => Phase::Failed,
        }
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::Probe => "probe",
            Phase::InstallDeps => "install-deps",
            Phase::LocateConfig => "locate-config",
            Phase::Materialize => "materialize",
            Phase::Build => "build",
            Phase::Done => "done",
            Phase::Failed => "failed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
