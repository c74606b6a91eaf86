//! Host platform capabilities.
//!
//! Everything the installer does to the host goes through [`HostPlatform`]:
//! probing the OS, locating tools, running processes, installing packages,
//! linking directories and downloading files. One implementation exists per
//! host family, plus [`GenericPlatform`] for hosts the installer cannot
//! provision and [`MockPlatform`] for tests.

pub mod generic;
pub mod linux;
pub mod macos;
pub mod mock;
pub mod types;
pub mod windows;

pub use generic::GenericPlatform;
pub use linux::LinuxPlatform;
pub use macos::MacOsPlatform;
pub use mock::MockPlatform;
pub use types::{Elevation, OsFamily, OsProfile, PackageManager};
pub use windows::WindowsPlatform;

use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::shell::{self, CommandResult, ProcessInvocation};
use crate::ui::UserInterface;

/// Capabilities the installer needs from the host.
///
/// Default method bodies talk to the real system; implementations override
/// the pieces that differ per family.
pub trait HostPlatform {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Operating system family this implementation targets.
    fn family(&self) -> OsFamily;

    /// Host CPU architecture.
    fn arch(&self) -> String {
        std::env::consts::ARCH.to_string()
    }

    /// Build the immutable host profile.
    fn detect_os(&self) -> OsProfile {
        let family = self.family();
        let package_manager = PackageManager::candidates(family)
            .iter()
            .copied()
            .find(|m| self.which(m.binary()).is_some());

        tracing::debug!(
            "Detected {} host, package manager: {:?}",
            family,
            package_manager
        );

        OsProfile {
            family,
            package_manager,
            arch: self.arch(),
        }
    }

    /// Look up an environment variable.
    fn env_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }

    /// Current user's home directory.
    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    /// Directory for user-level binary installs.
    fn user_bin_dir(&self) -> Option<PathBuf> {
        dirs::executable_dir().or_else(|| self.home_dir().map(|h| h.join(".local").join("bin")))
    }

    /// Directories searched for executables: PATH, then the user bin dir.
    fn search_path(&self) -> Vec<PathBuf> {
        let mut entries = shell::parse_system_path();
        if let Some(user_bin) = self.user_bin_dir() {
            if !entries.contains(&user_bin) {
                entries.push(user_bin);
            }
        }
        entries
    }

    /// Whether `dir` is listed on PATH.
    fn is_on_path(&self, dir: &Path) -> bool {
        shell::parse_system_path().iter().any(|p| p == dir)
    }

    /// Resolve a tool to its executable path.
    fn which(&self, tool: &str) -> Option<PathBuf> {
        shell::resolve_tool_path(tool, &self.search_path())
    }

    /// Run a process to completion.
    fn run_process(&self, invocation: &ProcessInvocation) -> Result<CommandResult> {
        shell::execute(invocation)
    }

    /// Privilege level available for system-wide changes.
    fn elevation(&self) -> Elevation {
        if shell::is_elevated() {
            Elevation::Root
        } else if self.which("sudo").is_some() {
            Elevation::Sudo
        } else {
            Elevation::Unprivileged
        }
    }

    /// Run `argv` with the privileges the elevation level allows.
    fn run_privileged(&self, argv: &[String], elevation: Elevation) -> Result<CommandResult> {
        let invocation = ProcessInvocation::from_argv(argv);
        let invocation = match elevation {
            Elevation::Sudo => invocation.wrapped_in("sudo"),
            Elevation::Root | Elevation::Unprivileged => invocation,
        };
        self.run_process(&invocation)
    }

    /// Install one package through a package manager.
    fn install_package(
        &self,
        manager: PackageManager,
        package: &str,
        elevation: Elevation,
    ) -> Result<CommandResult> {
        let elevation = if manager.needs_root() {
            elevation
        } else {
            Elevation::Unprivileged
        };
        self.run_privileged(&manager.install_argv(package), elevation)
    }

    /// Refresh a package manager's metadata.
    fn refresh_packages(
        &self,
        manager: PackageManager,
        elevation: Elevation,
    ) -> Result<Option<CommandResult>> {
        match manager.refresh_argv() {
            Some(argv) => self.run_privileged(&argv, elevation).map(Some),
            None => Ok(None),
        }
    }

    /// Create a directory link at `link` pointing to `source`.
    fn create_dir_link(&self, source: &Path, link: &Path) -> io::Result<()>;

    /// Download `url` to `dest`.
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        crate::requirements::download::fetch_to_file(url, dest)
    }

    /// Follow-up configuration after a tool was installed.
    fn post_install(&self, _tool: &str, _elevation: Elevation, _ui: &mut dyn UserInterface) {}
}

/// Create a directory symlink at `link` pointing to `source`.
pub fn symlink_dir(source: &Path, link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(source, link)
    }

    #[cfg(windows)]
    {
        std::os::windows::fs::symlink_dir(source, link)
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = (source, link);
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "directory links are not supported on this host",
        ))
    }
}

/// Pick the platform implementation.
///
/// An explicit request wins; otherwise the compile-time host OS decides.
pub fn select_platform(requested: Option<OsFamily>) -> Box<dyn HostPlatform> {
    let family = requested.unwrap_or_else(|| OsFamily::from_os_name(std::env::consts::OS));

    if family == OsFamily::Linux && linux::is_wsl() {
        tracing::info!("Running under Windows Subsystem for Linux");
    }

    let platform: Box<dyn HostPlatform> = match family {
        OsFamily::Linux => Box::new(LinuxPlatform),
        OsFamily::Macos => Box::new(MacOsPlatform),
        OsFamily::Windows => Box::new(WindowsPlatform),
        OsFamily::Unknown => Box::new(GenericPlatform),
    };

    tracing::debug!("Selected {} platform", platform.name());
    platform
}
