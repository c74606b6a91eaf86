//! Library integration tests.
//!
//! End-to-end runs of the mode controller against a scripted host.

use std::fs;
use std::path::Path;

use periphery_installer::build::{map_arch, ARCH_TAGS};
use periphery_installer::error::Component;
use periphery_installer::locator::{self, DiscoveryMethod, CONFIG_PATH_ENV};
use periphery_installer::materialize::{deploy, DeployStrategy, PriorState, WORKFLOW_PATH};
use periphery_installer::platform::{MockPlatform, OsFamily};
use periphery_installer::runner::{ModeController, Outcome, RunOptions, RunReport};
use periphery_installer::session::{InstallMode, Phase};
use periphery_installer::ui::MockUI;
use periphery_installer::InstallerError;
use tempfile::TempDir;

fn equipped_linux() -> MockPlatform {
    MockPlatform::linux()
        .with_tool("apt-get", "apt 2.6.1 (amd64)")
        .with_tool("git", "git version 2.43.0")
        .with_tool("docker", "Docker version 24.0.7, build afdd53b")
        .with_tool("docker-compose", "Docker Compose version v2.24.5")
        .with_tool("jq", "jq-1.7.1")
}

fn host_config(root: &Path) -> std::path::PathBuf {
    let config = root.join("homeassistant");
    fs::create_dir_all(&config).unwrap();
    fs::write(config.join("configuration.yaml"), "homeassistant:\n").unwrap();
    config
}

fn run(
    platform: &MockPlatform,
    mode: InstallMode,
    project: &Path,
    ui: &mut MockUI,
) -> RunReport {
    let options = RunOptions {
        mode,
        project_root: project.to_path_buf(),
    };
    ModeController::new(platform, options).run(ui)
}

#[test]
fn error_types_are_public() {
    let err = InstallerError::UnsupportedArchitecture {
        arch: "sparc64".into(),
    };
    assert!(err.to_string().contains("sparc64"));
    assert_eq!(err.component(), Component::Builder);
}

#[test]
fn every_supported_host_maps_to_a_tag() {
    for host in ["x86_64", "amd64", "aarch64", "arm64", "armv7l", "armv6l", "i386", "i686"] {
        let target = map_arch(host).unwrap();
        assert!(ARCH_TAGS.contains(&target.tag), "{} -> {}", host, target.tag);
        assert!(target.platform.starts_with("linux/"));
    }
    assert!(map_arch("riscv64").is_err());
}

#[test]
fn development_run_deploys_and_builds() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("addon");
    fs::create_dir_all(&project).unwrap();
    let config = host_config(temp.path());

    let platform = equipped_linux().with_env(CONFIG_PATH_ENV, config.to_str().unwrap());
    let mut ui = MockUI::new();
    let report = run(&platform, InstallMode::Development, &project, &mut ui);

    assert!(report.is_success(), "{:?}", report.outcome);
    assert_eq!(report.session.phase, Phase::Done);

    let located = report.session.host_config.as_ref().unwrap();
    assert_eq!(located.method, DiscoveryMethod::EnvironmentOverride);

    let deployment = report.session.deployment.as_ref().unwrap();
    assert_eq!(deployment.strategy, DeployStrategy::Symlink);
    assert_eq!(deployment.target, config.join("addons/komodo_periphery"));
    assert!(fs::symlink_metadata(&deployment.target)
        .unwrap()
        .file_type()
        .is_symlink());

    assert!(project.join(".devcontainer/devcontainer.json").exists());
    assert!(project.join("DEVELOPMENT.md").exists());
    assert!(platform.ran("docker build --platform linux/amd64"));

    let build = report.session.build.as_ref().unwrap();
    assert_eq!(build.arch, "amd64");
    assert!(ui.has_success("Installation completed successfully!"));
}

#[test]
fn development_run_twice_replaces_link_without_backups() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("addon");
    fs::create_dir_all(&project).unwrap();
    let config = host_config(temp.path());

    for _ in 0..2 {
        let platform = equipped_linux().with_env(CONFIG_PATH_ENV, config.to_str().unwrap());
        let mut ui = MockUI::new();
        let report = run(&platform, InstallMode::Development, &project, &mut ui);
        assert!(report.is_success(), "{:?}", report.outcome);
    }

    let entries: Vec<_> = fs::read_dir(config.join("addons"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["komodo_periphery".to_string()]);
}

#[test]
fn production_run_writes_artifacts_only() {
    let temp = TempDir::new().unwrap();
    let platform = equipped_linux();
    let mut ui = MockUI::new();

    let report = run(&platform, InstallMode::Production, temp.path(), &mut ui);

    assert!(report.is_success(), "{:?}", report.outcome);
    assert!(temp.path().join("build.yaml").exists());
    assert!(temp.path().join(WORKFLOW_PATH).exists());
    assert!(!temp.path().join(".devcontainer").exists());
    assert!(report.session.deployment.is_none());
    assert!(!platform.ran("docker build"));
    assert!(ui.has_message("Update repository URL in build.yaml"));
}

#[test]
fn missing_tool_is_installed_through_package_manager() {
    let temp = TempDir::new().unwrap();
    let platform = MockPlatform::linux()
        .with_tool("apt-get", "apt 2.6.1 (amd64)")
        .with_tool("git", "git version 2.43.0")
        .with_tool("docker", "Docker version 24.0.7, build afdd53b")
        .with_tool("docker-compose", "Docker Compose version v2.24.5")
        .install_provides("apt-get install -y jq", "jq", "jq-1.7.1");
    let mut ui = MockUI::new();

    let report = run(&platform, InstallMode::Production, temp.path(), &mut ui);

    assert!(report.is_success(), "{:?}", report.outcome);
    assert!(platform.ran("apt-get install -y jq"));
    assert!(report.session.results.iter().any(|r| r.name == "jq"));
}

#[test]
fn unknown_os_stops_before_touching_the_project() {
    let temp = TempDir::new().unwrap();
    let platform = MockPlatform::new(OsFamily::Unknown);
    let mut ui = MockUI::new();

    let report = run(&platform, InstallMode::Development, temp.path(), &mut ui);

    assert!(matches!(
        report.outcome,
        Outcome::Failed { phase: Phase::InstallDeps, .. }
    ));
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn discovery_takes_first_candidate_with_marker() {
    let temp = TempDir::new().unwrap();
    let first = temp.path().join("first");
    let second = temp.path().join("second");
    let third = temp.path().join("third");
    fs::create_dir_all(&first).unwrap();
    fs::create_dir_all(&second).unwrap();
    fs::create_dir_all(third.join("configuration.yaml")).unwrap();
    let fourth = host_config(temp.path());

    let platform = MockPlatform::linux();
    let mut ui = MockUI::new();
    let found = locator::locate_in(
        &platform,
        &mut ui,
        &[first, second, third, fourth.clone()],
    )
    .unwrap();

    assert_eq!(found.path, fourth);
    assert_eq!(found.method, DiscoveryMethod::WellKnownPath);
    assert!(ui.prompts_shown().is_empty());
}

#[test]
fn discovery_fails_non_interactively_with_hint() {
    let temp = TempDir::new().unwrap();
    let platform = MockPlatform::linux();
    let mut ui = MockUI::new();

    let err = locator::locate_in(&platform, &mut ui, &[temp.path().join("nothing")]).unwrap_err();
    assert!(matches!(err, InstallerError::HostConfigNotFound { .. }));
    assert!(err.to_string().contains(CONFIG_PATH_ENV));
}

#[test]
fn foreign_directory_is_backed_up_before_deploy() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("addon");
    let addons = temp.path().join("addons");
    fs::create_dir_all(&project).unwrap();
    fs::create_dir_all(addons.join("komodo_periphery")).unwrap();
    fs::write(addons.join("komodo_periphery/keep.txt"), "mine").unwrap();

    let platform = MockPlatform::linux();
    let mut ui = MockUI::new();
    let deployed = deploy(&platform, &project, &addons, "komodo_periphery", &mut ui).unwrap();

    assert_eq!(deployed.prior_state, PriorState::Directory);
    let backup = deployed.backup.unwrap();
    assert_eq!(fs::read_to_string(backup.join("keep.txt")).unwrap(), "mine");
    assert!(ui.has_warning("backing up to"));
}

#[test]
fn failed_link_falls_back_to_copy() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("addon");
    let addons = temp.path().join("addons");
    fs::create_dir_all(&project).unwrap();
    fs::write(project.join("config.yaml"), "name: Komodo Periphery\n").unwrap();
    fs::write(project.join("setup.sh"), "#!/bin/sh\n").unwrap();

    let platform = MockPlatform::windows().fail_links();
    let mut ui = MockUI::new();
    let deployed = deploy(&platform, &project, &addons, "komodo_periphery", &mut ui).unwrap();

    assert_eq!(deployed.strategy, DeployStrategy::Copy);
    assert!(deployed.target.join("config.yaml").exists());
    assert!(!deployed.target.join("setup.sh").exists());
    assert!(ui.has_warning("copying files instead"));
}

#[test]
fn development_run_picks_third_candidate_on_windows() {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("home");
    let project = temp.path().join("addon");
    fs::create_dir_all(&project).unwrap();
    for dir in ["Documents/HomeAssistant", "Development/homeassistant"] {
        let config = home.join(dir);
        fs::create_dir_all(&config).unwrap();
        fs::write(config.join("configuration.yaml"), "homeassistant:\n").unwrap();
    }

    let platform = MockPlatform::windows()
        .with_home(&home)
        .with_tool("winget", "v1.7.10861")
        .with_tool("git", "git version 2.43.0.windows.1")
        .with_tool("docker", "Docker version 24.0.7, build afdd53b")
        .with_tool("docker-compose", "Docker Compose version v2.24.5")
        .with_tool("jq", "jq-1.7.1");
    let mut ui = MockUI::new();
    let report = run(&platform, InstallMode::Development, &project, &mut ui);

    assert!(report.is_success(), "{:?}", report.outcome);
    let located = report.session.host_config.as_ref().unwrap();
    assert_eq!(located.path, home.join("Documents/HomeAssistant"));
    assert_eq!(located.method, DiscoveryMethod::WellKnownPath);
    assert_eq!(
        report.session.deployment.as_ref().unwrap().strategy,
        DeployStrategy::Symlink
    );
    assert!(platform.ran("docker build --platform linux/amd64"));
}

#[test]
fn environment_override_beats_well_known_paths() {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("home");
    let well_known = home.join(".homeassistant");
    fs::create_dir_all(&well_known).unwrap();
    fs::write(well_known.join("configuration.yaml"), "").unwrap();
    let custom = host_config(temp.path());

    let platform = MockPlatform::linux()
        .with_home(&home)
        .with_env(CONFIG_PATH_ENV, custom.to_str().unwrap());
    let mut ui = MockUI::new();
    let found = locator::locate(&platform, &mut ui).unwrap();

    assert_eq!(found.path, custom);
    assert_eq!(found.method, DiscoveryMethod::EnvironmentOverride);
}

#[test]
fn unresolved_container_engine_aborts_before_build() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("addon");
    fs::create_dir_all(&project).unwrap();
    let config = host_config(temp.path());

    let platform = MockPlatform::linux()
        .with_tool("apt-get", "apt 2.6.1 (amd64)")
        .with_tool("git", "git version 2.43.0")
        .with_env(CONFIG_PATH_ENV, config.to_str().unwrap())
        .fail_command("apt-get install -y docker.io")
        .fail_downloads();
    let mut ui = MockUI::new();

    let report = run(&platform, InstallMode::Development, &project, &mut ui);

    assert!(platform.ran("apt-get install -y docker.io"));
    assert!(platform
        .downloads()
        .iter()
        .any(|(url, _)| url == "https://get.docker.com"));
    match &report.outcome {
        Outcome::Failed { phase, component, .. } => {
            assert_eq!(*phase, Phase::InstallDeps);
            assert_eq!(*component, Component::Installer);
        }
        Outcome::Done => panic!("expected failure"),
    }
    assert!(!report.session.can_proceed);
    assert!(!platform.ran("docker build"));
    assert!(!config.join("addons").exists());
}

#[test]
fn repeated_deploy_after_conflict_keeps_single_backup() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("addon");
    let addons = temp.path().join("addons");
    fs::create_dir_all(&project).unwrap();
    fs::create_dir_all(addons.join("komodo_periphery")).unwrap();

    let platform = MockPlatform::linux();
    let mut strategies = Vec::new();
    for _ in 0..2 {
        let mut ui = MockUI::new();
        let deployed = deploy(&platform, &project, &addons, "komodo_periphery", &mut ui).unwrap();
        strategies.push(deployed.strategy);
    }

    assert_eq!(strategies, vec![DeployStrategy::Symlink, DeployStrategy::Symlink]);
    let backups = fs::read_dir(&addons)
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .contains(".backup.")
        })
        .count();
    assert_eq!(backups, 1);
}
