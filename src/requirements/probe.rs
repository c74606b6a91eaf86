//! Capability probing.
//!
//! Reports the host profile and which tools are present. Probing never
//! fails: a missing tool or a version command that errors is simply
//! recorded as such.

use serde::Serialize;
use std::path::PathBuf;

use super::registry::{ToolRegistry, ToolSpec};
use super::version::extract_version;
use crate::platform::{HostPlatform, OsProfile};
use crate::shell::ProcessInvocation;

/// Availability of one tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolAvailability {
    pub name: String,
    pub available: bool,
    pub path: Option<PathBuf>,
    pub version: Option<String>,
}

/// Host profile plus tool availability.
#[derive(Debug, Clone, Serialize)]
pub struct CapabilityReport {
    pub profile: OsProfile,
    pub tools: Vec<ToolAvailability>,
}

impl CapabilityReport {
    /// Availability entry for a tool.
    pub fn tool(&self, name: &str) -> Option<&ToolAvailability> {
        self.tools.iter().find(|t| t.name == name)
    }
}

/// Probe the host and every tool in the registry.
pub fn probe(platform: &dyn HostPlatform, registry: &ToolRegistry) -> CapabilityReport {
    let profile = platform.detect_os();
    let tools = registry
        .iter()
        .map(|spec| probe_tool(platform, spec))
        .collect();

    CapabilityReport { profile, tools }
}

/// Probe a single tool.
pub fn probe_tool(platform: &dyn HostPlatform, spec: &ToolSpec) -> ToolAvailability {
    if let Some(path) = platform.which(spec.binary) {
        let version = version_of(platform, &[spec.binary, "--version"]);
        tracing::debug!("Found {} at {} ({:?})", spec.name, path.display(), version);
        return ToolAvailability {
            name: spec.name.to_string(),
            available: true,
            path: Some(path),
            version,
        };
    }

    if let Some(argv) = spec.alternate_probe {
        if let Some(path) = platform.which(argv[0]) {
            let output = platform
                .run_process(&ProcessInvocation::from_argv(argv))
                .ok()
                .filter(|r| r.success);
            if let Some(output) = output {
                tracing::debug!("Found {} via `{}`", spec.name, argv.join(" "));
                return ToolAvailability {
                    name: spec.name.to_string(),
                    available: true,
                    path: Some(path),
                    version: extract_version(&output.stdout),
                };
            }
        }
    }

    tracing::debug!("{} not found", spec.name);
    ToolAvailability {
        name: spec.name.to_string(),
        available: false,
        path: None,
        version: None,
    }
}

fn version_of(platform: &dyn HostPlatform, argv: &[&str]) -> Option<String> {
    let result = platform
        .run_process(&ProcessInvocation::from_argv(argv))
        .ok()?;
    if !result.success {
        return None;
    }
    extract_version(&result.stdout).or_else(|| extract_version(&result.stderr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MockPlatform, OsFamily, PackageManager};

    #[test]
    fn reports_profile_and_versions() {
        let platform = MockPlatform::linux()
            .with_tool("apt-get", "apt 2.6.1 (amd64)")
            .with_tool("git", "git version 2.43.0")
            .with_tool("docker", "Docker version 24.0.7, build afdd53b");

        let report = probe(&platform, &ToolRegistry::builtin());

        assert_eq!(report.profile.family, OsFamily::Linux);
        assert_eq!(report.profile.package_manager, Some(PackageManager::AptGet));
        assert_eq!(report.tool("git").unwrap().version.as_deref(), Some("2.43.0"));
        assert_eq!(report.tool("docker").unwrap().version.as_deref(), Some("24.0.7"));
        assert!(!report.tool("jq").unwrap().available);
    }

    #[test]
    fn first_package_manager_in_order_wins() {
        let platform = MockPlatform::linux()
            .with_tool("zypper", "zypper 1.14")
            .with_tool("dnf", "4.18.0");

        let report = probe(&platform, &ToolRegistry::builtin());
        assert_eq!(report.profile.package_manager, Some(PackageManager::Dnf));
    }

    #[test]
    fn compose_plugin_counts_as_compose() {
        let platform = MockPlatform::linux()
            .with_tool("docker", "Docker version 24.0.7")
            .respond("docker compose version", "Docker Compose version v2.24.5");

        let report = probe(&platform, &ToolRegistry::builtin());
        let compose = report.tool("docker-compose").unwrap();
        assert!(compose.available);
        assert_eq!(compose.version.as_deref(), Some("2.24.5"));
    }

    #[test]
    fn failing_compose_plugin_is_not_available() {
        let platform = MockPlatform::linux()
            .with_tool("docker", "Docker version 24.0.7")
            .fail_command("docker compose");

        let report = probe(&platform, &ToolRegistry::builtin());
        assert!(!report.tool("docker-compose").unwrap().available);
    }

    #[test]
    fn failing_version_command_still_reports_tool() {
        let platform = MockPlatform::linux()
            .with_tool("jq", "jq-1.6")
            .fail_command("jq --version");

        let report = probe(&platform, &ToolRegistry::builtin());
        let jq = report.tool("jq").unwrap();
        assert!(jq.available);
        assert!(jq.version.is_none());
    }

    #[test]
    fn report_serializes_to_json() {
        let platform = MockPlatform::macos();
        let report = probe(&platform, &ToolRegistry::builtin());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["profile"]["family"], "macos");
        assert_eq!(json["tools"].as_array().unwrap().len(), 4);
    }
}
