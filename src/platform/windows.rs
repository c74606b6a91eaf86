//! Windows host support.

use std::io;
use std::path::{Path, PathBuf};

use super::{symlink_dir, Elevation, HostPlatform, OsFamily};
use crate::shell;

/// Windows hosts: winget first, Chocolatey as the alternative.
#[derive(Debug, Default)]
pub struct WindowsPlatform;

impl HostPlatform for WindowsPlatform {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn family(&self) -> OsFamily {
        OsFamily::Windows
    }

    fn user_bin_dir(&self) -> Option<PathBuf> {
        dirs::data_local_dir().map(|d| d.join("Programs").join("periphery-installer").join("bin"))
    }

    // No sudo on Windows; an elevated prompt is the only way to get admin rights.
    fn elevation(&self) -> Elevation {
        if shell::is_elevated() {
            Elevation::Root
        } else {
            Elevation::Unprivileged
        }
    }

    fn create_dir_link(&self, source: &Path, link: &Path) -> io::Result<()> {
        // Needs Developer Mode or an elevated prompt; callers fall back to copying.
        symlink_dir(source, link)
    }
}
