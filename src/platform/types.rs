//! Host description types shared by every platform implementation.

use serde::Serialize;
use std::fmt;

/// Operating system family of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Linux,
    Macos,
    Windows,
    Unknown,
}

impl OsFamily {
    /// Map a `std::env::consts::OS` value to a family.
    pub fn from_os_name(os: &str) -> Self {
        match os {
            "linux" => OsFamily::Linux,
            "macos" | "darwin" => OsFamily::Macos,
            "windows" => OsFamily::Windows,
            _ => OsFamily::Unknown,
        }
    }

    /// Family name as used on the command line and in reports.
    pub fn name(&self) -> &'static str {
        match self {
            OsFamily::Linux => "linux",
            OsFamily::Macos => "macos",
            OsFamily::Windows => "windows",
            OsFamily::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A system package manager the installer knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageManager {
    AptGet,
    Dnf,
    Yum,
    Pacman,
    Zypper,
    Brew,
    Winget,
    Choco,
}

const LINUX_MANAGERS: &[PackageManager] = &[
    PackageManager::AptGet,
    PackageManager::Dnf,
    PackageManager::Yum,
    PackageManager::Pacman,
    PackageManager::Zypper,
];
const MACOS_MANAGERS: &[PackageManager] = &[PackageManager::Brew];
const WINDOWS_MANAGERS: &[PackageManager] = &[PackageManager::Winget, PackageManager::Choco];

impl PackageManager {
    /// Managers probed for a family, in priority order.
    pub fn candidates(family: OsFamily) -> &'static [PackageManager] {
        match family {
            OsFamily::Linux => LINUX_MANAGERS,
            OsFamily::Macos => MACOS_MANAGERS,
            OsFamily::Windows => WINDOWS_MANAGERS,
            OsFamily::Unknown => &[],
        }
    }

    /// Executable name.
    pub fn binary(&self) -> &'static str {
        match self {
            PackageManager::AptGet => "apt-get",
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
            PackageManager::Pacman => "pacman",
            PackageManager::Zypper => "zypper",
            PackageManager::Brew => "brew",
            PackageManager::Winget => "winget",
            PackageManager::Choco => "choco",
        }
    }

    /// Whether installs through this manager need administrator rights.
    pub fn needs_root(&self) -> bool {
        !matches!(self, PackageManager::Brew | PackageManager::Winget)
    }

    /// Argv that installs `package` without prompting.
    pub fn install_argv(&self, package: &str) -> Vec<String> {
        let argv: Vec<&str> = match self {
            PackageManager::AptGet => vec!["apt-get", "install", "-y", package],
            PackageManager::Dnf => vec!["dnf", "install", "-y", package],
            PackageManager::Yum => vec!["yum", "install", "-y", package],
            PackageManager::Pacman => vec!["pacman", "-S", "--noconfirm", "--needed", package],
            PackageManager::Zypper => vec!["zypper", "--non-interactive", "install", package],
            PackageManager::Brew => vec!["brew", "install", package],
            PackageManager::Winget => vec![
                "winget",
                "install",
                "--id",
                package,
                "-e",
                "--accept-source-agreements",
                "--accept-package-agreements",
            ],
            PackageManager::Choco => vec!["choco", "install", package, "-y"],
        };
        argv.into_iter().map(String::from).collect()
    }

    /// Argv that refreshes package metadata, if the manager needs it.
    pub fn refresh_argv(&self) -> Option<Vec<String>> {
        let argv: &[&str] = match self {
            PackageManager::AptGet => &["apt-get", "update"],
            PackageManager::Pacman => &["pacman", "-Sy", "--noconfirm"],
            PackageManager::Zypper => &["zypper", "--non-interactive", "refresh"],
            _ => return None,
        };
        Some(argv.iter().map(|s| s.to_string()).collect())
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// Immutable snapshot of the host, computed once per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OsProfile {
    /// Operating system family.
    pub family: OsFamily,
    /// First available package manager for the family.
    pub package_manager: Option<PackageManager>,
    /// Host CPU architecture as reported by the platform.
    pub arch: String,
}

/// Privilege level available for system-wide installs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Elevation {
    /// Already running as root/administrator.
    Root,
    /// Not root, but `sudo` is available.
    Sudo,
    /// No way to gain privileges.
    Unprivileged,
}

impl Elevation {
    /// Whether commands needing root can be run at all.
    pub fn can_run_as_root(&self) -> bool {
        !matches!(self, Elevation::Unprivileged)
    }
}
