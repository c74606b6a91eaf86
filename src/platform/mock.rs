//! In-memory host for tests.
//!
//! `MockPlatform` never touches the real package managers or network. Tools
//! are declared up front, commands succeed unless a rule says otherwise, and
//! every process invocation is recorded for assertions. Directory links are
//! real symlinks so deployments can be inspected on disk; downloads are only
//! written below the temp dir or the configured user bin dir.
//!
//! # Example
//!
//! ```
//! use periphery_installer::platform::{HostPlatform, MockPlatform, OsFamily};
//!
//! let platform = MockPlatform::linux()
//!     .with_tool("apt-get", "apt 2.6.1 (amd64)")
//!     .install_provides("apt-get install -y jq", "jq", "jq-1.6");
//!
//! let profile = platform.detect_os();
//! assert_eq!(profile.family, OsFamily::Linux);
//! assert!(platform.which("jq").is_none());
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{linux, symlink_dir, Elevation, HostPlatform, OsFamily};
use crate::error::{InstallerError, Result};
use crate::shell::{CommandResult, ProcessInvocation};
use crate::ui::UserInterface;

/// Programs treated as always installed on the mock host.
const SYSTEM_PROGRAMS: &[&str] = &["sh", "sudo", "install", "systemctl", "usermod"];

#[derive(Debug, Clone)]
struct CommandRule {
    prefix: String,
    exit_code: i32,
    stdout: String,
    stderr: String,
    provides: Option<(String, String)>,
}

/// Scriptable [`HostPlatform`] for tests.
#[derive(Debug)]
pub struct MockPlatform {
    family: OsFamily,
    arch: String,
    elevation: Elevation,
    home: Option<PathBuf>,
    user_bin: Option<PathBuf>,
    user_bin_on_path: bool,
    env: HashMap<String, String>,
    tools: RefCell<BTreeMap<String, String>>,
    rules: Vec<CommandRule>,
    link_fails: bool,
    download_fails: bool,
    invocations: RefCell<Vec<ProcessInvocation>>,
    downloads: RefCell<Vec<(String, PathBuf)>>,
    post_installs: RefCell<Vec<String>>,
}

impl MockPlatform {
    /// A mock host of the given family running on amd64 as root.
    pub fn new(family: OsFamily) -> Self {
        Self {
            family,
            arch: "x86_64".to_string(),
            elevation: Elevation::Root,
            home: None,
            user_bin: None,
            user_bin_on_path: true,
            env: HashMap::new(),
            tools: RefCell::new(BTreeMap::new()),
            rules: Vec::new(),
            link_fails: false,
            download_fails: false,
            invocations: RefCell::new(Vec::new()),
            downloads: RefCell::new(Vec::new()),
            post_installs: RefCell::new(Vec::new()),
        }
    }

    pub fn linux() -> Self {
        Self::new(OsFamily::Linux)
    }

    pub fn macos() -> Self {
        Self::new(OsFamily::Macos)
    }

    pub fn windows() -> Self {
        Self::new(OsFamily::Windows)
    }

    /// Set the reported CPU architecture.
    pub fn with_arch(mut self, arch: &str) -> Self {
        self.arch = arch.to_string();
        self
    }

    /// Set the privilege level.
    pub fn with_elevation(mut self, elevation: Elevation) -> Self {
        self.elevation = elevation;
        self
    }

    /// Set the home directory.
    pub fn with_home(mut self, home: &Path) -> Self {
        self.home = Some(home.to_path_buf());
        self
    }

    /// Set the user binary directory and whether it is on PATH.
    pub fn with_user_bin(mut self, dir: &Path, on_path: bool) -> Self {
        self.user_bin = Some(dir.to_path_buf());
        self.user_bin_on_path = on_path;
        self
    }

    /// Set an environment variable visible to the installer.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Declare a tool as installed; `tool --version` prints `version_output`.
    pub fn with_tool(self, name: &str, version_output: &str) -> Self {
        self.tools
            .borrow_mut()
            .insert(name.to_string(), version_output.to_string());
        self
    }

    /// Make commands starting with `prefix` exit 1.
    pub fn fail_command(mut self, prefix: &str) -> Self {
        self.rules.push(CommandRule {
            prefix: prefix.to_string(),
            exit_code: 1,
            stdout: String::new(),
            stderr: format!("mock failure: {}", prefix),
            provides: None,
        });
        self
    }

    /// Make commands starting with `prefix` exit 0 and print `stdout`.
    pub fn respond(mut self, prefix: &str, stdout: &str) -> Self {
        self.rules.push(CommandRule {
            prefix: prefix.to_string(),
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
            provides: None,
        });
        self
    }

    /// Make a successful command starting with `prefix` install `tool`.
    pub fn install_provides(mut self, prefix: &str, tool: &str, version_output: &str) -> Self {
        self.rules.push(CommandRule {
            prefix: prefix.to_string(),
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
            provides: Some((tool.to_string(), version_output.to_string())),
        });
        self
    }

    /// Make every directory link attempt fail.
    pub fn fail_links(mut self) -> Self {
        self.link_fails = true;
        self
    }

    /// Make every download fail.
    pub fn fail_downloads(mut self) -> Self {
        self.download_fails = true;
        self
    }

    /// Every process invocation, in order.
    pub fn invocations(&self) -> Vec<ProcessInvocation> {
        self.invocations.borrow().clone()
    }

    /// Whether any invocation's command line starts with `prefix`.
    pub fn ran(&self, prefix: &str) -> bool {
        self.count(prefix) > 0
    }

    /// Number of invocations whose command line starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.invocations
            .borrow()
            .iter()
            .filter(|i| i.display().starts_with(prefix))
            .count()
    }

    /// Every download as (url, destination).
    pub fn downloads(&self) -> Vec<(String, PathBuf)> {
        self.downloads.borrow().clone()
    }

    /// Tools passed to `post_install`.
    pub fn post_installs(&self) -> Vec<String> {
        self.post_installs.borrow().clone()
    }

    fn has_tool(&self, name: &str) -> bool {
        self.tools.borrow().contains_key(name)
    }
}

impl HostPlatform for MockPlatform {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn family(&self) -> OsFamily {
        self.family
    }

    fn arch(&self) -> String {
        self.arch.clone()
    }

    fn env_var(&self, key: &str) -> Option<String> {
        self.env.get(key).filter(|v| !v.is_empty()).cloned()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }

    fn user_bin_dir(&self) -> Option<PathBuf> {
        self.user_bin.clone()
    }

    fn is_on_path(&self, dir: &Path) -> bool {
        self.user_bin_on_path && self.user_bin.as_deref() == Some(dir)
    }

    fn which(&self, tool: &str) -> Option<PathBuf> {
        if self.has_tool(tool) {
            return Some(PathBuf::from("/mock/bin").join(tool));
        }
        self.user_bin
            .as_ref()
            .map(|dir| dir.join(tool))
            .filter(|p| p.is_file())
    }

    fn run_process(&self, invocation: &ProcessInvocation) -> Result<CommandResult> {
        self.invocations.borrow_mut().push(invocation.clone());

        let effective = if invocation.program == "sudo" && !invocation.args.is_empty() {
            ProcessInvocation::from_argv(&invocation.args)
        } else {
            invocation.clone()
        };
        let line = effective.display();
        let elapsed = Duration::from_millis(1);

        if let Some(rule) = self.rules.iter().find(|r| line.starts_with(&r.prefix)) {
            if rule.exit_code != 0 {
                return Ok(CommandResult::failure(
                    Some(rule.exit_code),
                    rule.stdout.clone(),
                    rule.stderr.clone(),
                    elapsed,
                ));
            }
            if let Some((tool, version)) = &rule.provides {
                self.tools
                    .borrow_mut()
                    .insert(tool.clone(), version.clone());
            }
            return Ok(CommandResult::success(
                rule.stdout.clone(),
                rule.stderr.clone(),
                elapsed,
            ));
        }

        let program = effective.program.as_str();
        let runnable = SYSTEM_PROGRAMS.contains(&program) || self.which(program).is_some();
        if !runnable {
            return Err(InstallerError::CommandFailed {
                command: invocation.display(),
                code: None,
            });
        }

        let stdout = if effective.args == ["--version"] {
            self.tools.borrow().get(program).cloned().unwrap_or_default()
        } else {
            String::new()
        };
        Ok(CommandResult::success(stdout, String::new(), elapsed))
    }

    fn elevation(&self) -> Elevation {
        self.elevation
    }

    fn create_dir_link(&self, source: &Path, link: &Path) -> io::Result<()> {
        if self.link_fails {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "mock: links are not permitted",
            ));
        }
        symlink_dir(source, link)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        self.downloads
            .borrow_mut()
            .push((url.to_string(), dest.to_path_buf()));

        if self.download_fails {
            return Err(InstallerError::DownloadFailed {
                url: url.to_string(),
                message: "mock: network unavailable".to_string(),
            });
        }

        // Only the temp dir and the user bin dir are written; anything else is just recorded.
        let sandboxed = dest.starts_with(std::env::temp_dir())
            || self.user_bin.as_deref().is_some_and(|dir| dest.starts_with(dir));
        if sandboxed {
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(dest, b"#!/bin/sh\necho mock\n")?;
        }
        Ok(())
    }

    fn post_install(&self, tool: &str, elevation: Elevation, ui: &mut dyn UserInterface) {
        self.post_installs.borrow_mut().push(tool.to_string());
        if self.family == OsFamily::Linux && tool == "docker" {
            linux::configure_docker_service(self, elevation, ui);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_tools_are_found_and_report_versions() {
        let platform = MockPlatform::linux().with_tool("git", "git version 2.43.0");

        assert_eq!(platform.which("git"), Some(PathBuf::from("/mock/bin/git")));
        let out = platform
            .run_process(&ProcessInvocation::from_argv(&["git", "--version"]))
            .unwrap();
        assert_eq!(out.stdout, "git version 2.43.0");
    }

    #[test]
    fn missing_program_cannot_be_spawned() {
        let platform = MockPlatform::linux();
        let err = platform
            .run_process(&ProcessInvocation::from_argv(&["jq", "--version"]))
            .unwrap_err();
        assert!(matches!(err, InstallerError::CommandFailed { code: None, .. }));
    }

    #[test]
    fn sudo_prefix_is_ignored_when_matching_rules() {
        let platform = MockPlatform::linux()
            .with_tool("apt-get", "apt 2.6.1")
            .fail_command("apt-get install");

        let out = platform
            .run_process(&ProcessInvocation::from_argv(&["sudo", "apt-get", "install", "-y", "jq"]))
            .unwrap();
        assert!(!out.success);
        assert!(platform.ran("sudo apt-get install"));
    }

    #[test]
    fn install_rule_adds_tool() {
        let platform = MockPlatform::macos()
            .with_tool("brew", "Homebrew 4.2.0")
            .install_provides("brew install jq", "jq", "jq-1.7.1");

        assert!(platform.which("jq").is_none());
        platform
            .run_process(&ProcessInvocation::from_argv(&["brew", "install", "jq"]))
            .unwrap();
        assert!(platform.which("jq").is_some());
    }

    #[test]
    fn downloads_write_real_files_into_user_bin() {
        let temp = tempfile::TempDir::new().unwrap();
        let platform = MockPlatform::linux().with_user_bin(temp.path(), true);

        platform
            .download("https://example.test/jq", &temp.path().join("jq"))
            .unwrap();

        assert_eq!(platform.which("jq"), Some(temp.path().join("jq")));
        assert_eq!(platform.downloads().len(), 1);
    }

    #[test]
    fn failing_links_report_permission_denied() {
        let temp = tempfile::TempDir::new().unwrap();
        let platform = MockPlatform::windows().fail_links();
        let err = platform
            .create_dir_link(temp.path(), &temp.path().join("link"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }
}
