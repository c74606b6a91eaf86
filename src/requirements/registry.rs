//! Tool manifest.
//!
//! Defines which tools the add-on workflow needs, how to detect them, which
//! package provides them under each package manager, and what to try when
//! the package manager cannot help.

use semver::VersionReq;

use crate::platform::{OsFamily, PackageManager};
use crate::session::InstallMode;

/// What to try after the primary package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Nothing beyond the primary strategy.
    None,
    /// The other package manager of the family, when it is installed.
    AltPackageManager,
    /// Docker's convenience script on Linux; Chocolatey's Docker Desktop on Windows.
    DockerInstaller,
    /// Direct download of a pinned release binary.
    Download,
}

/// A required external tool.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    /// Name used in reports and messages.
    pub name: &'static str,
    /// Executable looked up on PATH.
    pub binary: &'static str,
    /// Command that counts as the tool being present when the binary is missing.
    pub alternate_probe: Option<&'static [&'static str]>,
    /// Minimum version constraint (semver syntax), if any.
    pub constraint: Option<&'static str>,
    /// Whether development mode cannot continue without it.
    pub required_for_development: bool,
    /// Package name per manager; a missing entry means the manager can't provide it.
    pub packages: &'static [(PackageManager, &'static str)],
    /// Secondary strategy.
    pub fallback: Fallback,
}

impl ToolSpec {
    /// Parsed version constraint.
    pub fn version_req(&self) -> Option<VersionReq> {
        self.constraint.and_then(|c| VersionReq::parse(c).ok())
    }

    /// Package name for `manager`.
    pub fn package_for(&self, manager: PackageManager) -> Option<&'static str> {
        self.packages
            .iter()
            .find(|(m, _)| *m == manager)
            .map(|(_, p)| *p)
    }

    /// Whether an unresolved tool stops the session in `mode`.
    pub fn is_hard_required(&self, mode: InstallMode) -> bool {
        self.required_for_development && mode == InstallMode::Development
    }

    /// Where to point the user when every strategy failed.
    pub fn manual_hint(&self, family: OsFamily) -> &'static str {
        match (self.name, family) {
            ("git", OsFamily::Windows) => {
                "Install Git for Windows: https://git-scm.com/download/win"
            }
            ("git", _) => "Install git: https://git-scm.com/downloads",
            ("docker", OsFamily::Macos) => {
                "Install Docker Desktop: https://docs.docker.com/desktop/install/mac-install/"
            }
            ("docker", OsFamily::Windows) => {
                "Install Docker Desktop: https://docs.docker.com/desktop/install/windows-install/"
            }
            ("docker", _) => "Install Docker Engine: https://docs.docker.com/engine/install/",
            ("docker-compose", _) => {
                "Install Docker Compose: https://docs.docker.com/compose/install/"
            }
            ("jq", _) => "Install jq: https://jqlang.github.io/jq/download/",
            _ => "Install it manually and re-run the installer",
        }
    }
}

/// Pinned Docker Compose release for direct downloads.
pub const COMPOSE_RELEASE: &str = "v2.27.0";

/// Pinned jq release for direct downloads.
pub const JQ_RELEASE: &str = "jq-1.7.1";

/// Docker's Linux convenience script.
pub const DOCKER_CONVENIENCE_SCRIPT: &str = "https://get.docker.com";

static BUILTIN_TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "git",
        binary: "git",
        alternate_probe: None,
        constraint: None,
        required_for_development: false,
        packages: &[
            (PackageManager::AptGet, "git"),
            (PackageManager::Dnf, "git"),
            (PackageManager::Yum, "git"),
            (PackageManager::Pacman, "git"),
            (PackageManager::Zypper, "git"),
            (PackageManager::Brew, "git"),
            (PackageManager::Winget, "Git.Git"),
            (PackageManager::Choco, "git"),
        ],
        fallback: Fallback::AltPackageManager,
    },
    ToolSpec {
        name: "docker",
        binary: "docker",
        alternate_probe: None,
        constraint: Some(">=20.10"),
        required_for_development: true,
        packages: &[
            (PackageManager::AptGet, "docker.io"),
            (PackageManager::Dnf, "docker"),
            (PackageManager::Yum, "docker"),
            (PackageManager::Pacman, "docker"),
            (PackageManager::Zypper, "docker"),
            (PackageManager::Brew, "docker"),
            (PackageManager::Winget, "Docker.DockerDesktop"),
            (PackageManager::Choco, "docker-desktop"),
        ],
        fallback: Fallback::DockerInstaller,
    },
    ToolSpec {
        name: "docker-compose",
        binary: "docker-compose",
        alternate_probe: Some(&["docker", "compose", "version"]),
        constraint: None,
        required_for_development: false,
        packages: &[
            (PackageManager::AptGet, "docker-compose"),
            (PackageManager::Dnf, "docker-compose"),
            (PackageManager::Yum, "docker-compose"),
            (PackageManager::Pacman, "docker-compose"),
            (PackageManager::Zypper, "docker-compose"),
            (PackageManager::Brew, "docker-compose"),
            (PackageManager::Choco, "docker-compose"),
        ],
        fallback: Fallback::Download,
    },
    ToolSpec {
        name: "jq",
        binary: "jq",
        alternate_probe: None,
        constraint: None,
        required_for_development: false,
        packages: &[
            (PackageManager::AptGet, "jq"),
            (PackageManager::Dnf, "jq"),
            (PackageManager::Yum, "jq"),
            (PackageManager::Pacman, "jq"),
            (PackageManager::Zypper, "jq"),
            (PackageManager::Brew, "jq"),
            (PackageManager::Winget, "jqlang.jq"),
            (PackageManager::Choco, "jq"),
        ],
        fallback: Fallback::Download,
    },
];

/// Ordered set of tools to check.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolSpec>,
}

impl ToolRegistry {
    /// The add-on toolchain: git, docker, docker-compose, jq.
    pub fn builtin() -> Self {
        Self {
            tools: BUILTIN_TOOLS.to_vec(),
        }
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Tools in check order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolSpec> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Release download URL for a tool on a host, when one is published.
pub fn download_url(tool: &str, family: OsFamily, arch: &str) -> Option<String> {
    match tool {
        "docker-compose" => {
            let os = match family {
                OsFamily::Linux => "linux",
                OsFamily::Macos => "darwin",
                OsFamily::Windows => "windows",
                OsFamily::Unknown => return None,
            };
            let cpu = match arch {
                "x86_64" | "amd64" | "x64" => "x86_64",
                "aarch64" | "arm64" => "aarch64",
                "armv7l" | "armv7" => "armv7",
                "armv6l" | "armhf" | "arm" => "armv6",
                _ => return None,
            };
            let ext = if family == OsFamily::Windows { ".exe" } else { "" };
            Some(format!(
                "https://github.com/docker/compose/releases/download/{}/docker-compose-{}-{}{}",
                COMPOSE_RELEASE, os, cpu, ext
            ))
        }
        "jq" => {
            let os = match family {
                OsFamily::Linux => "linux",
                OsFamily::Macos => "macos",
                OsFamily::Windows => "windows",
                OsFamily::Unknown => return None,
            };
            let cpu = match arch {
                "x86_64" | "amd64" | "x64" => "amd64",
                "aarch64" | "arm64" => "arm64",
                "armv7l" | "armv7" | "armv6l" | "armhf" | "arm" => "armhf",
                "i386" | "i486" | "i586" | "i686" | "x86" => "i386",
                _ => return None,
            };
            let ext = if family == OsFamily::Windows { ".exe" } else { "" };
            Some(format!(
                "https://github.com/jqlang/jq/releases/download/{}/jq-{}-{}{}",
                JQ_RELEASE, os, cpu, ext
            ))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_order_is_git_docker_compose_jq() {
        let names: Vec<_> = ToolRegistry::builtin().iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["git", "docker", "docker-compose", "jq"]);
    }

    #[test]
    fn docker_is_hard_required_only_in_development() {
        let registry = ToolRegistry::builtin();
        let docker = registry.get("docker").unwrap();
        assert!(docker.is_hard_required(InstallMode::Development));
        assert!(!docker.is_hard_required(InstallMode::Production));
        assert!(!registry
            .get("jq")
            .unwrap()
            .is_hard_required(InstallMode::Development));
    }

    #[test]
    fn docker_constraint_parses() {
        let registry = ToolRegistry::builtin();
        let req = registry.get("docker").unwrap().version_req().unwrap();
        assert!(req.matches(&semver::Version::new(24, 0, 7)));
        assert!(registry.get("git").unwrap().version_req().is_none());
    }

    #[test]
    fn apt_uses_docker_io_package() {
        let registry = ToolRegistry::builtin();
        let docker = registry.get("docker").unwrap();
        assert_eq!(docker.package_for(PackageManager::AptGet), Some("docker.io"));
        assert_eq!(
            registry
                .get("docker-compose")
                .unwrap()
                .package_for(PackageManager::Winget),
            None
        );
    }

    #[test]
    fn download_urls_are_pinned() {
        let url = download_url("jq", OsFamily::Linux, "x86_64").unwrap();
        assert_eq!(
            url,
            "https://github.com/jqlang/jq/releases/download/jq-1.7.1/jq-linux-amd64"
        );

        let url = download_url("docker-compose", OsFamily::Macos, "arm64").unwrap();
        assert!(url.ends_with("/v2.27.0/docker-compose-darwin-aarch64"));

        let url = download_url("jq", OsFamily::Windows, "x86_64").unwrap();
        assert!(url.ends_with("jq-windows-amd64.exe"));
    }

    #[test]
    fn download_url_is_none_for_unknown_combinations() {
        assert!(download_url("git", OsFamily::Linux, "x86_64").is_none());
        assert!(download_url("jq", OsFamily::Unknown, "x86_64").is_none());
        assert!(download_url("docker-compose", OsFamily::Linux, "riscv64").is_none());
    }

    #[test]
    fn hints_point_at_platform_downloads() {
        let registry = ToolRegistry::builtin();
        let docker = registry.get("docker").unwrap();
        assert!(docker.manual_hint(OsFamily::Macos).contains("mac-install"));
        assert!(registry
            .get("git")
            .unwrap()
            .manual_hint(OsFamily::Windows)
            .contains("git-scm.com/download/win"));
    }
}
