//! Deployment of the add-on into Home Assistant's `addons/` directory.
//!
//! The project is linked into place when the host allows directory links
//! and copied otherwise. Whatever already sits at the target is dealt with
//! first: links are replaced, copies made by an earlier run of this
//! installer for the same project are replaced, and anything else is
//! renamed aside. Nothing at the target is ever deleted unless this
//! installer put it there.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{self, Path, PathBuf};

use crate::config::resolve_project_root;
use crate::error::{InstallerError, Result};
use crate::platform::HostPlatform;
use crate::ui::UserInterface;

/// Stamp written into copied deployments.
pub const DEPLOY_STAMP: &str = ".periphery-installer-deploy";

/// Directory names never copied into a deployment.
const EXCLUDED_NAMES: &[&str] = &[
    ".git",
    ".devcontainer",
    "target",
    "DEVELOPMENT.md",
    DEPLOY_STAMP,
];

/// File extensions never copied into a deployment.
const EXCLUDED_EXTENSIONS: &[&str] = &["py", "sh", "ps1"];

/// How the project ended up at the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployStrategy {
    Symlink,
    Copy,
}

/// What was at the target before this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorState {
    Absent,
    /// A real directory (or file).
    Directory,
    Symlink,
}

/// Result of a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentTarget {
    /// `<host-config>/addons/<slug>`.
    pub target: PathBuf,
    pub strategy: DeployStrategy,
    pub prior_state: PriorState,
    /// Where a pre-existing directory was moved.
    pub backup: Option<PathBuf>,
}

/// Contents of [`DEPLOY_STAMP`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployStamp {
    pub project_id: String,
    pub source: PathBuf,
    pub deployed_at: DateTime<Utc>,
}

/// Stable identifier for a project directory.
///
/// The first 8 bytes of the SHA-256 of the canonical path, hex encoded.
pub fn project_id(project_root: &Path) -> String {
    let path = project_root
        .canonicalize()
        .unwrap_or_else(|_| project_root.to_path_buf());
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}

/// Inspect the deployment target without following links.
pub fn prior_state(target: &Path) -> io::Result<PriorState> {
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.file_type().is_symlink() => Ok(PriorState::Symlink),
        Ok(_) => Ok(PriorState::Directory),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(PriorState::Absent),
        Err(e) => Err(e),
    }
}

/// Reject slugs that would not land directly inside `addons/`.
pub fn validate_slug(slug: &str) -> Result<()> {
    let mut components = Path::new(slug).components();
    match (components.next(), components.next()) {
        (Some(path::Component::Normal(_)), None) => Ok(()),
        _ => Err(InstallerError::InvalidSlug {
            slug: slug.to_string(),
        }),
    }
}

/// Deploy `project_root` to `addons_dir/slug`.
///
/// The link always points at the absolute project path.
pub fn deploy(
    platform: &dyn HostPlatform,
    project_root: &Path,
    addons_dir: &Path,
    slug: &str,
    ui: &mut dyn UserInterface,
) -> Result<DeploymentTarget> {
    validate_slug(slug)?;
    let project_root = &resolve_project_root(project_root)?;
    fs::create_dir_all(addons_dir).map_err(|e| InstallerError::fs("create", addons_dir, e))?;

    let target = addons_dir.join(slug);
    let id = project_id(project_root);
    let prior = prior_state(&target).map_err(|e| InstallerError::fs("inspect", &target, e))?;
    tracing::debug!("Deployment target {} is {:?}", target.display(), prior);

    let mut backup = None;
    match prior {
        PriorState::Absent => {}
        PriorState::Symlink => {
            remove_link(&target).map_err(|e| InstallerError::fs("remove link", &target, e))?;
        }
        PriorState::Directory => {
            if read_stamp(&target).is_some_and(|s| s.project_id == id) {
                tracing::debug!("Replacing previous copy at {}", target.display());
                fs::remove_dir_all(&target)
                    .map_err(|e| InstallerError::fs("replace", &target, e))?;
            } else {
                let path = backup_path(addons_dir, slug);
                ui.warning(&format!(
                    "Add-on directory exists, backing up to: {}",
                    path.display()
                ));
                fs::rename(&target, &path).map_err(|e| InstallerError::fs("rename", &target, e))?;
                backup = Some(path);
            }
        }
    }

    let strategy = match platform.create_dir_link(project_root, &target) {
        Ok(()) => {
            ui.success(&format!(
                "Created symlink: {} -> {}",
                target.display(),
                project_root.display()
            ));
            DeployStrategy::Symlink
        }
        Err(e) => {
            tracing::debug!("Directory link failed: {}", e);
            ui.warning("Cannot create symlink, copying files instead...");
            copy_project(project_root, &target)?;
            write_stamp(&target, &id, project_root)?;
            ui.success(&format!("Copied add-on files to: {}", target.display()));
            DeployStrategy::Copy
        }
    };

    Ok(DeploymentTarget {
        target,
        strategy,
        prior_state: prior,
        backup,
    })
}

/// `<slug>.backup.<timestamp>`, with a numeric suffix if that name is taken.
fn backup_path(addons_dir: &Path, slug: &str) -> PathBuf {
    let base = format!("{}.backup.{}", slug, Local::now().format("%Y%m%d_%H%M%S"));
    let mut path = addons_dir.join(&base);
    let mut n = 1;
    while fs::symlink_metadata(&path).is_ok() {
        path = addons_dir.join(format!("{}.{}", base, n));
        n += 1;
    }
    path
}

fn remove_link(link: &Path) -> io::Result<()> {
    // Directory links on Windows need remove_dir.
    fs::remove_file(link).or_else(|_| fs::remove_dir(link))
}

fn read_stamp(dir: &Path) -> Option<DeployStamp> {
    let content = fs::read_to_string(dir.join(DEPLOY_STAMP)).ok()?;
    serde_json::from_str(&content).ok()
}

fn write_stamp(dir: &Path, id: &str, source: &Path) -> Result<()> {
    let stamp = DeployStamp {
        project_id: id.to_string(),
        source: source.to_path_buf(),
        deployed_at: Utc::now(),
    };
    let path = dir.join(DEPLOY_STAMP);
    let json = serde_json::to_string_pretty(&stamp).map_err(anyhow::Error::from)?;
    fs::write(&path, json).map_err(|e| InstallerError::fs("write", &path, e))
}

/// Whether a project entry is left out of copied deployments.
pub fn is_excluded(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    if EXCLUDED_NAMES.contains(&name) {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| EXCLUDED_EXTENSIONS.contains(&ext))
}

fn copy_project(source: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).map_err(|e| InstallerError::fs("create", dest, e))?;

    let entries = fs::read_dir(source).map_err(|e| InstallerError::fs("read", source, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| InstallerError::fs("read", source, e))?;
        let path = entry.path();
        if is_excluded(&path) || path == dest {
            continue;
        }

        let to = dest.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| InstallerError::fs("inspect", &path, e))?;

        if file_type.is_dir() {
            copy_project(&path, &to)?;
        } else if file_type.is_file() || path.is_file() {
            fs::copy(&path, &to).map_err(|e| InstallerError::fs("copy", &path, e))?;
        } else {
            tracing::debug!("Skipping {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MockPlatform;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        project: PathBuf,
        addons: PathBuf,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("komodo-periphery-addon");
        fs::create_dir_all(project.join("rootfs/etc")).unwrap();
        fs::create_dir_all(project.join(".git")).unwrap();
        fs::write(project.join("config.yaml"), "slug: komodo_periphery\n").unwrap();
        fs::write(project.join("Dockerfile"), "FROM scratch\n").unwrap();
        fs::write(project.join("rootfs/etc/periphery.toml"), "port = 8120\n").unwrap();
        fs::write(project.join("install.sh"), "#!/bin/sh\n").unwrap();
        fs::write(project.join("DEVELOPMENT.md"), "# dev\n").unwrap();
        let addons = temp.path().join("config/addons");
        Fixture {
            _temp: temp,
            project,
            addons,
        }
    }

    fn backups(addons: &Path) -> usize {
        fs::read_dir(addons)
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .contains(".backup.")
            })
            .count()
    }

    #[test]
    fn absent_target_is_linked() {
        let fx = fixture();
        let platform = MockPlatform::linux();
        let mut ui = MockUI::new();

        let result =
            deploy(&platform, &fx.project, &fx.addons, "komodo_periphery", &mut ui).unwrap();

        assert_eq!(result.strategy, DeployStrategy::Symlink);
        assert_eq!(result.prior_state, PriorState::Absent);
        assert!(result.backup.is_none());
        assert!(result.target.join("config.yaml").exists());
    }

    #[test]
    fn existing_directory_is_renamed_not_deleted() {
        let fx = fixture();
        let target = fx.addons.join("komodo_periphery");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("user-notes.txt"), "keep me").unwrap();

        let platform = MockPlatform::linux();
        let mut ui = MockUI::new();
        let result =
            deploy(&platform, &fx.project, &fx.addons, "komodo_periphery", &mut ui).unwrap();

        let backup = result.backup.unwrap();
        assert_eq!(result.prior_state, PriorState::Directory);
        assert_eq!(fs::read_to_string(backup.join("user-notes.txt")).unwrap(), "keep me");
        assert!(backup
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("komodo_periphery.backup."));
        assert!(target.join("Dockerfile").exists());
        assert!(ui.has_warning("backing up to"));
    }

    #[test]
    fn second_run_replaces_link_without_backup() {
        let fx = fixture();
        let target = fx.addons.join("komodo_periphery");
        fs::create_dir_all(&target).unwrap();

        let platform = MockPlatform::linux();
        let mut ui = MockUI::new();
        let first =
            deploy(&platform, &fx.project, &fx.addons, "komodo_periphery", &mut ui).unwrap();
        let second =
            deploy(&platform, &fx.project, &fx.addons, "komodo_periphery", &mut ui).unwrap();

        assert_eq!(first.strategy, second.strategy);
        assert_eq!(second.prior_state, PriorState::Symlink);
        assert!(second.backup.is_none());
        assert_eq!(backups(&fx.addons), 1);
    }

    #[test]
    fn copy_fallback_applies_excludes_and_stamp() {
        let fx = fixture();
        let platform = MockPlatform::linux().fail_links();
        let mut ui = MockUI::new();

        let result =
            deploy(&platform, &fx.project, &fx.addons, "komodo_periphery", &mut ui).unwrap();
        let target = &result.target;

        assert_eq!(result.strategy, DeployStrategy::Copy);
        assert!(target.join("config.yaml").exists());
        assert!(target.join("rootfs/etc/periphery.toml").exists());
        assert!(!target.join(".git").exists());
        assert!(!target.join("install.sh").exists());
        assert!(!target.join("DEVELOPMENT.md").exists());
        assert!(target.join(DEPLOY_STAMP).exists());
        assert!(ui.has_warning("copying files instead"));
    }

    #[test]
    fn previous_copy_is_replaced_not_backed_up() {
        let fx = fixture();
        let platform = MockPlatform::linux().fail_links();
        let mut ui = MockUI::new();

        deploy(&platform, &fx.project, &fx.addons, "komodo_periphery", &mut ui).unwrap();
        fs::write(fx.project.join("Dockerfile"), "FROM alpine\n").unwrap();
        let second =
            deploy(&platform, &fx.project, &fx.addons, "komodo_periphery", &mut ui).unwrap();

        assert_eq!(second.prior_state, PriorState::Directory);
        assert!(second.backup.is_none());
        assert_eq!(backups(&fx.addons), 0);
        assert_eq!(
            fs::read_to_string(second.target.join("Dockerfile")).unwrap(),
            "FROM alpine\n"
        );
    }

    #[test]
    fn copy_from_another_project_is_backed_up() {
        let fx = fixture();
        let target = fx.addons.join("komodo_periphery");
        fs::create_dir_all(&target).unwrap();
        write_stamp(&target, "0000000000000000", Path::new("/elsewhere")).unwrap();

        let platform = MockPlatform::linux();
        let mut ui = MockUI::new();
        let result =
            deploy(&platform, &fx.project, &fx.addons, "komodo_periphery", &mut ui).unwrap();

        assert!(result.backup.is_some());
    }

    #[test]
    fn backup_names_do_not_collide() {
        let temp = TempDir::new().unwrap();
        let first = backup_path(temp.path(), "komodo_periphery");
        fs::create_dir_all(&first).unwrap();
        let second = backup_path(temp.path(), "komodo_periphery");
        assert_ne!(first, second);
    }

    #[cfg(unix)]
    #[test]
    fn relative_project_root_links_to_absolute_path() {
        let fx = fixture();
        let platform = MockPlatform::linux();
        let mut ui = MockUI::new();

        let cwd = std::env::current_dir().unwrap();
        let mut relative: PathBuf = cwd.components().skip(1).map(|_| "..").collect();
        relative.push(fx.project.strip_prefix("/").unwrap());
        assert!(relative.is_relative());

        let result = deploy(&platform, &relative, &fx.addons, "komodo_periphery", &mut ui).unwrap();

        let link = fs::read_link(&result.target).unwrap();
        assert!(link.is_absolute(), "{}", link.display());
        assert_eq!(link, fx.project.canonicalize().unwrap());
        assert!(result.target.join("config.yaml").exists());
    }

    #[test]
    fn slug_must_be_a_single_directory_name() {
        assert!(validate_slug("komodo_periphery").is_ok());
        for slug in ["", "..", "../custom_components", "/etc", "a/b", "."] {
            let err = validate_slug(slug).unwrap_err();
            assert!(matches!(err, InstallerError::InvalidSlug { .. }), "{slug}");
            assert_eq!(err.component(), crate::error::Component::Materializer);
        }
    }

    #[test]
    fn escaping_slug_touches_nothing() {
        let fx = fixture();
        let sibling = fx.addons.parent().unwrap().join("custom_components");
        fs::create_dir_all(&sibling).unwrap();
        fs::write(sibling.join("keep.txt"), "keep").unwrap();
        let platform = MockPlatform::linux();
        let mut ui = MockUI::new();

        let err = deploy(&platform, &fx.project, &fx.addons, "../custom_components", &mut ui)
            .unwrap_err();

        assert!(matches!(err, InstallerError::InvalidSlug { .. }));
        assert!(!fx.addons.exists());
        assert_eq!(fs::read_to_string(sibling.join("keep.txt")).unwrap(), "keep");
        assert_eq!(fs::read_dir(fx.addons.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn project_id_is_stable() {
        let temp = TempDir::new().unwrap();
        let a = project_id(temp.path());
        assert_eq!(a.len(), 16);
        assert_eq!(a, project_id(temp.path()));
    }

    #[test]
    fn excludes_match_names_and_extensions() {
        assert!(is_excluded(Path::new("/p/.git")));
        assert!(is_excluded(Path::new("/p/install.ps1")));
        assert!(is_excluded(Path::new("/p/scripts/setup.py")));
        assert!(!is_excluded(Path::new("/p/run.sh.tmpl")));
        assert!(!is_excluded(Path::new("/p/config.yaml")));
    }
}
