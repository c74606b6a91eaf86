//! Fallback for hosts without provisioning support.
//!
//! The profile reports [`OsFamily::Unknown`], so the controller stops before
//! installing anything. Probing still works.

use std::io;
use std::path::Path;

use super::{symlink_dir, HostPlatform, OsFamily};

#[derive(Debug, Default)]
pub struct GenericPlatform;

impl HostPlatform for GenericPlatform {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn family(&self) -> OsFamily {
        OsFamily::Unknown
    }

    fn create_dir_link(&self, source: &Path, link: &Path) -> io::Result<()> {
        symlink_dir(source, link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_profile_has_no_package_manager() {
        let profile = GenericPlatform.detect_os();
        assert_eq!(profile.family, OsFamily::Unknown);
        assert!(profile.package_manager.is_none());
        assert!(!profile.arch.is_empty());
    }
}
