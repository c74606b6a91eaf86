//! Direct binary downloads.
//!
//! Used when no package manager can provide a tool. The install directory
//! depends on the privilege level: the system bin dir as root, the system
//! bin dir through `sudo install`, or the user's own bin dir.

use reqwest::blocking::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{InstallerError, Result};
use crate::platform::{Elevation, HostPlatform, OsFamily};
use crate::ui::UserInterface;

/// System-wide install directory on Unix hosts.
pub const SYSTEM_BIN_DIR: &str = "/usr/local/bin";

/// Fetch `url` into `dest`, marking the file executable on Unix.
pub fn fetch_to_file(url: &str, dest: &Path) -> Result<()> {
    fetch_with_timeout(url, dest, Duration::from_secs(120))
}

/// Fetch with an explicit timeout.
pub fn fetch_with_timeout(url: &str, dest: &Path, timeout: Duration) -> Result<()> {
    let failed = |message: String| InstallerError::DownloadFailed {
        url: url.to_string(),
        message,
    };

    let client = Client::builder()
        .user_agent(concat!("periphery-installer/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .map_err(|e| failed(e.to_string()))?;

    tracing::debug!("Downloading {} to {}", url, dest.display());
    let response = client.get(url).send().map_err(|e| failed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let bytes = response.bytes().map_err(|e| failed(e.to_string()))?;
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| InstallerError::fs("create", parent, e))?;
    }
    std::fs::write(dest, &bytes).map_err(|e| InstallerError::fs("write", dest, e))?;
    make_executable(dest)?;

    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| InstallerError::fs("chmod", path, e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Where a downloaded binary goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallLocation {
    /// Write directly into the system bin dir.
    System(PathBuf),
    /// Download to a temp file, then `sudo install` into the system bin dir.
    SystemViaSudo(PathBuf),
    /// Write into the user's bin dir.
    User(PathBuf),
}

impl InstallLocation {
    /// Final directory of the binary.
    pub fn dir(&self) -> &Path {
        match self {
            InstallLocation::System(d)
            | InstallLocation::SystemViaSudo(d)
            | InstallLocation::User(d) => d,
        }
    }
}

/// Choose the install location for a privilege level.
pub fn install_location(
    platform: &dyn HostPlatform,
    elevation: Elevation,
) -> Option<InstallLocation> {
    if platform.family() == OsFamily::Windows {
        return platform.user_bin_dir().map(InstallLocation::User);
    }
    match elevation {
        Elevation::Root => Some(InstallLocation::System(PathBuf::from(SYSTEM_BIN_DIR))),
        Elevation::Sudo => Some(InstallLocation::SystemViaSudo(PathBuf::from(SYSTEM_BIN_DIR))),
        Elevation::Unprivileged => platform.user_bin_dir().map(InstallLocation::User),
    }
}

/// Download a release binary for `tool` and install it.
///
/// Returns the installed path.
pub fn install_binary(
    platform: &dyn HostPlatform,
    tool: &str,
    url: &str,
    elevation: Elevation,
    ui: &mut dyn UserInterface,
) -> Result<PathBuf> {
    let location = install_location(platform, elevation).ok_or_else(|| {
        InstallerError::InstallFailed {
            tool: tool.to_string(),
            message: "no install directory available for downloads".to_string(),
        }
    })?;

    let file_name = if platform.family() == OsFamily::Windows {
        format!("{}.exe", tool)
    } else {
        tool.to_string()
    };
    let dest = location.dir().join(&file_name);

    match &location {
        InstallLocation::System(_) => platform.download(url, &dest)?,
        InstallLocation::User(dir) => {
            platform.download(url, &dest)?;
            if !platform.is_on_path(dir) {
                ui.warning(&format!(
                    "{} is not on PATH; add it so {} can be found",
                    dir.display(),
                    tool
                ));
            }
        }
        InstallLocation::SystemViaSudo(_) => {
            let staged = std::env::temp_dir().join(format!("periphery-installer-{}", file_name));
            platform.download(url, &staged)?;
            let argv = vec![
                "install".to_string(),
                "-m".to_string(),
                "0755".to_string(),
                staged.display().to_string(),
                dest.display().to_string(),
            ];
            let result = platform.run_privileged(&argv, Elevation::Sudo);
            std::fs::remove_file(&staged).ok();
            let result = result?;
            if !result.success {
                return Err(InstallerError::InstallFailed {
                    tool: tool.to_string(),
                    message: result.combined_output(),
                });
            }
        }
    }

    tracing::info!("Installed {} to {}", tool, dest.display());
    Ok(dest)
}
