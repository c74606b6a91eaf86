//! Local environment materialization.
//!
//! Development mode writes the devcontainer descriptor and deploys the
//! project into Home Assistant's add-on directory. Production mode writes
//! the build manifest and CI workflow. Both modes then write the
//! development guide and initialize a git repository if there is none.
//!
//! - [`devcontainer`] - `.devcontainer/devcontainer.json`
//! - [`deploy`] - Link-or-copy deployment with backups
//! - [`production`] - `build.yaml` and the CI workflow
//! - [`scaffold`] - Documentation, git, next steps

pub mod deploy;
pub mod devcontainer;
pub mod production;
pub mod scaffold;

pub use deploy::{deploy, project_id, DeployStrategy, DeploymentTarget, PriorState, DEPLOY_STAMP};
pub use devcontainer::write_devcontainer;
pub use production::{write_production_artifacts, WORKFLOW_PATH};
pub use scaffold::{init_git, next_steps, write_development_doc};

use std::path::{Path, PathBuf};

use crate::error::{InstallerError, Result};
use crate::locator::HostConfigLocation;
use crate::platform::HostPlatform;
use crate::session::InstallMode;
use crate::ui::UserInterface;

/// What materialization produced.
#[derive(Debug, Clone, Default)]
pub struct Materialized {
    /// The add-on deployment, development only.
    pub deployment: Option<DeploymentTarget>,
    /// Files written into the project.
    pub files: Vec<PathBuf>,
    /// Whether a git repository was created.
    pub git_initialized: bool,
}

/// Produce the artifacts for `mode`.
///
/// Development mode requires the located host config.
pub fn materialize(
    platform: &dyn HostPlatform,
    project_root: &Path,
    mode: InstallMode,
    host_config: Option<&HostConfigLocation>,
    slug: &str,
    ui: &mut dyn UserInterface,
) -> Result<Materialized> {
    let mut out = Materialized::default();

    match mode {
        InstallMode::Development => {
            let host_config = host_config.ok_or_else(|| InstallerError::HostConfigNotFound {
                message: "development mode needs a Home Assistant config directory".to_string(),
            })?;

            ui.message("Setting up VS Code devcontainer...");
            out.files.push(write_devcontainer(project_root)?);

            ui.message("Setting up local development environment...");
            out.deployment = Some(deploy(
                platform,
                project_root,
                &host_config.addons_dir(),
                slug,
                ui,
            )?);
        }
        InstallMode::Production => {
            ui.message("Setting up production deployment...");
            out.files.extend(write_production_artifacts(project_root)?);
            ui.success("Production deployment files created.");
        }
    }

    out.files.push(write_development_doc(project_root)?);
    out.git_initialized = init_git(platform, project_root, ui);

    Ok(out)
}
