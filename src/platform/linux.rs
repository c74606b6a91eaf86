//! Linux host support.

use std::io;
use std::path::Path;

use super::{symlink_dir, Elevation, HostPlatform, OsFamily};
use crate::ui::UserInterface;

/// Linux hosts: apt-get, dnf, yum, pacman or zypper.
#[derive(Debug, Default)]
pub struct LinuxPlatform;

impl HostPlatform for LinuxPlatform {
    fn name(&self) -> &'static str {
        "linux"
    }

    fn family(&self) -> OsFamily {
        OsFamily::Linux
    }

    fn create_dir_link(&self, source: &Path, link: &Path) -> io::Result<()> {
        symlink_dir(source, link)
    }

    fn post_install(&self, tool: &str, elevation: Elevation, ui: &mut dyn UserInterface) {
        if tool == "docker" {
            configure_docker_service(self, elevation, ui);
        }
    }
}

/// Whether this Linux kernel belongs to Windows Subsystem for Linux.
pub fn is_wsl() -> bool {
    std::fs::read_to_string("/proc/version")
        .map(|v| v.to_lowercase().contains("microsoft"))
        .unwrap_or(false)
}

/// Enable the docker service and add the current user to the docker group.
///
/// Every failure is reported as a warning.
pub fn configure_docker_service(
    platform: &dyn HostPlatform,
    elevation: Elevation,
    ui: &mut dyn UserInterface,
) {
    if !elevation.can_run_as_root() {
        ui.warning(
            "Could not configure Docker service without root access. Please configure it manually.",
        );
        return;
    }

    let user = platform
        .env_var("USER")
        .unwrap_or_else(|| "user".to_string());
    let steps: [&[&str]; 3] = [
        &["systemctl", "enable", "docker"],
        &["systemctl", "start", "docker"],
        &["usermod", "-aG", "docker", user.as_str()],
    ];

    for step in steps {
        let argv: Vec<String> = step.iter().map(|s| s.to_string()).collect();
        let ok = platform
            .run_privileged(&argv, elevation)
            .map(|r| r.success)
            .unwrap_or(false);
        if !ok {
            tracing::warn!("Docker service step failed: {}", argv.join(" "));
            ui.warning("Could not configure Docker service. Please configure manually.");
            return;
        }
    }

    ui.warning("You may need to log out and back in for Docker group changes to take effect.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MockPlatform;
    use crate::ui::MockUI;

    #[test]
    fn docker_service_is_enabled_and_user_added() {
        let platform = MockPlatform::linux().with_env("USER", "alice");
        let mut ui = MockUI::new();

        configure_docker_service(&platform, Elevation::Sudo, &mut ui);

        assert!(platform.ran("sudo systemctl enable docker"));
        assert!(platform.ran("sudo systemctl start docker"));
        assert!(platform.ran("sudo usermod -aG docker alice"));
        assert!(ui.has_warning("log out and back in"));
    }

    #[test]
    fn docker_service_failure_is_a_warning() {
        let platform = MockPlatform::linux().fail_command("systemctl start docker");
        let mut ui = MockUI::new();

        configure_docker_service(&platform, Elevation::Root, &mut ui);

        assert!(ui.has_warning("Could not configure Docker service"));
        assert!(!platform.ran("usermod"));
    }

    #[test]
    fn docker_service_is_skipped_without_privileges() {
        let platform = MockPlatform::linux();
        let mut ui = MockUI::new();

        configure_docker_service(&platform, Elevation::Unprivileged, &mut ui);

        assert!(platform.invocations().is_empty());
        assert!(ui.has_warning("configure it manually"));
    }

    #[test]
    fn name_and_family() {
        assert_eq!(LinuxPlatform.name(), "linux");
        assert_eq!(LinuxPlatform.family(), OsFamily::Linux);
    }
}
