//! Per-tool dependency results.

use semver::VersionReq;
use std::fmt;
use std::path::PathBuf;

/// How a required tool ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Already present and acceptable.
    Satisfied,
    /// Installed during this run.
    Installed,
    /// Still missing after every strategy.
    Unresolved,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Resolution::Satisfied => "satisfied",
            Resolution::Installed => "installed",
            Resolution::Unresolved => "unresolved",
        })
    }
}

/// The result of checking, and possibly installing, one tool.
#[derive(Debug, Clone)]
pub struct DependencyCheckResult {
    /// Tool name.
    pub name: String,
    /// Required version; `None` means any.
    pub required: Option<VersionReq>,
    /// Version found after the check.
    pub found_version: Option<String>,
    /// Where the tool was found.
    pub found_path: Option<PathBuf>,
    /// Whether this run installed it.
    pub installed_by_this_run: bool,
    /// Final state.
    pub resolution: Resolution,
}

impl DependencyCheckResult {
    /// Whether the tool is usable.
    pub fn is_available(&self) -> bool {
        !matches!(self.resolution, Resolution::Unresolved)
    }

    /// One-line summary for the outcome log.
    pub fn summary(&self) -> String {
        let version = self.found_version.as_deref().unwrap_or("unknown version");
        match self.resolution {
            Resolution::Satisfied => format!("{} {} already installed", self.name, version),
            Resolution::Installed => format!("{} {} installed", self.name, version),
            Resolution::Unresolved => match &self.required {
                Some(req) => format!("{} ({}) is not available", self.name, req),
                None => format!("{} is not available", self.name),
            },
        }
    }
}

/// Output of the dependency installer.
#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    /// One entry per checked tool, in check order.
    pub results: Vec<DependencyCheckResult>,
    /// False when a hard-required tool is unresolved.
    pub can_proceed: bool,
}

impl InstallReport {
    /// Result for a tool, if it was checked.
    pub fn result(&self, name: &str) -> Option<&DependencyCheckResult> {
        self.results.iter().find(|r| r.name == name)
    }

    /// Names of tools that remain unresolved.
    pub fn unresolved(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.resolution == Resolution::Unresolved)
            .map(|r| r.name.as_str())
            .collect()
    }
}
