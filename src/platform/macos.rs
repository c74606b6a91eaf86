//! macOS host support. Homebrew is the only package manager.

use std::io;
use std::path::Path;

use super::{symlink_dir, HostPlatform, OsFamily};

#[derive(Debug, Default)]
pub struct MacOsPlatform;

impl HostPlatform for MacOsPlatform {
    fn name(&self) -> &'static str {
        "macos"
    }

    fn family(&self) -> OsFamily {
        OsFamily::Macos
    }

    fn create_dir_link(&self, source: &Path, link: &Path) -> io::Result<()> {
        symlink_dir(source, link)
    }
}
