//! Host CPU to add-on architecture mapping.

use serde::Serialize;

use crate::error::{InstallerError, Result};

/// Every architecture tag an add-on can be built for.
pub const ARCH_TAGS: [&str; 5] = ["aarch64", "amd64", "armhf", "armv7", "i386"];

/// An architecture tag with its Docker platform string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArchTarget {
    pub tag: &'static str,
    pub platform: &'static str,
}

const TABLE: &[(&[&str], ArchTarget)] = &[
    (
        &["x86_64", "amd64", "x64"],
        ArchTarget { tag: "amd64", platform: "linux/amd64" },
    ),
    (
        &["aarch64", "arm64"],
        ArchTarget { tag: "aarch64", platform: "linux/arm64" },
    ),
    (
        &["armv7l", "armv7"],
        ArchTarget { tag: "armv7", platform: "linux/arm/v7" },
    ),
    (
        &["armv6l", "armhf", "arm"],
        ArchTarget { tag: "armhf", platform: "linux/arm/v6" },
    ),
    (
        &["i386", "i486", "i586", "i686", "x86"],
        ArchTarget { tag: "i386", platform: "linux/386" },
    ),
];

/// Map a host architecture name to its build target.
///
/// Matching is case-insensitive.
pub fn map_arch(host: &str) -> Result<ArchTarget> {
    let host = host.trim().to_lowercase();
    TABLE
        .iter()
        .find(|(names, _)| names.contains(&host.as_str()))
        .map(|(_, target)| *target)
        .ok_or(InstallerError::UnsupportedArchitecture { arch: host })
}

/// The build target for an architecture tag.
pub fn target_for_tag(tag: &str) -> Option<ArchTarget> {
    TABLE.iter().map(|(_, t)| *t).find(|t| t.tag == tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_has_a_target() {
        for tag in ARCH_TAGS {
            let target = target_for_tag(tag).unwrap();
            assert_eq!(map_arch(tag).unwrap(), target);
        }
    }

    #[test]
    fn host_aliases_map_to_tags() {
        assert_eq!(map_arch("x86_64").unwrap().tag, "amd64");
        assert_eq!(map_arch("arm64").unwrap().platform, "linux/arm64");
        assert_eq!(map_arch("armv7l").unwrap().tag, "armv7");
        assert_eq!(map_arch("armv6l").unwrap().tag, "armhf");
        assert_eq!(map_arch("i686").unwrap().platform, "linux/386");
        assert_eq!(map_arch("AMD64").unwrap().tag, "amd64");
    }

    #[test]
    fn unsupported_arch_is_an_error() {
        for host in ["riscv64", "s390x", "ppc64le", ""] {
            let err = map_arch(host).unwrap_err();
            assert!(matches!(err, InstallerError::UnsupportedArchitecture { .. }));
        }
    }
}
