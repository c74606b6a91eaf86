//! Files shared by both modes: documentation, git repository, next steps.

use include_dir::{include_dir, Dir};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{InstallerError, Result};
use crate::platform::HostPlatform;
use crate::session::InstallMode;
use crate::shell::ProcessInvocation;
use crate::ui::UserInterface;

/// Embedded templates directory.
static TEMPLATES_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// Commit message for a freshly initialized repository.
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit: Komodo Periphery Home Assistant Add-on";

/// Contents of an embedded template.
pub fn template(name: &str) -> Result<&'static str> {
    TEMPLATES_DIR
        .get_file(name)
        .and_then(|f| f.contents_utf8())
        .ok_or_else(|| {
            InstallerError::Other(anyhow::anyhow!("embedded template {} is missing", name))
        })
}

/// Write a template to `dest`, creating parent directories.
pub fn write_template(name: &str, dest: &Path) -> Result<()> {
    let content = template(name)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| InstallerError::fs("create", parent, e))?;
    }
    fs::write(dest, content).map_err(|e| InstallerError::fs("write", dest, e))
}

/// Write `DEVELOPMENT.md`.
pub fn write_development_doc(project_root: &Path) -> Result<PathBuf> {
    let path = project_root.join("DEVELOPMENT.md");
    write_template("DEVELOPMENT.md", &path)?;
    Ok(path)
}

/// Initialize a git repository with an initial commit.
///
/// Does nothing when `.git` exists. Every failure is a warning. Returns
/// whether a repository was created.
pub fn init_git(
    platform: &dyn HostPlatform,
    project_root: &Path,
    ui: &mut dyn UserInterface,
) -> bool {
    if project_root.join(".git").exists() {
        tracing::debug!("{} is already a git repository", project_root.display());
        return false;
    }
    if platform.which("git").is_none() {
        ui.warning("git is not available; skipping repository initialization");
        return false;
    }

    if !run_git(platform, project_root, &["init"], ui) {
        return false;
    }

    let gitignore = project_root.join(".gitignore");
    if !gitignore.exists() {
        if let Err(e) = write_template("gitignore", &gitignore) {
            ui.warning(&e.to_string());
        }
    }

    if run_git(platform, project_root, &["add", "."], ui) {
        run_git(
            platform,
            project_root,
            &["commit", "-m", INITIAL_COMMIT_MESSAGE],
            ui,
        );
    }

    ui.success("Git repository initialized.");
    true
}

fn run_git(
    platform: &dyn HostPlatform,
    project_root: &Path,
    args: &[&str],
    ui: &mut dyn UserInterface,
) -> bool {
    let invocation = ProcessInvocation::new("git")
        .args(args.iter().copied())
        .cwd(project_root);
    match platform.run_process(&invocation) {
        Ok(result) if result.success => true,
        Ok(result) => {
            ui.warning(&format!(
                "`{}` failed: {}",
                invocation.display(),
                result.combined_output().trim()
            ));
            false
        }
        Err(e) => {
            ui.warning(&format!("`{}` failed: {}", invocation.display(), e));
            false
        }
    }
}

/// Print what to do after a successful run.
pub fn next_steps(mode: InstallMode, ui: &mut dyn UserInterface) {
    let steps: &[&str] = match mode {
        InstallMode::Development => &[
            "1. Open this project in Visual Studio Code",
            "2. Install the 'Dev Containers' extension",
            "3. Use Ctrl+Shift+P and select 'Dev Containers: Reopen in Container'",
            "4. Find the add-on in Home Assistant Supervisor -> Add-on Store -> Local add-ons",
        ],
        InstallMode::Production => &[
            "1. Update repository URL in build.yaml",
            "2. Create GitHub repository and push code",
            "3. GitHub Actions will build multi-architecture images",
            "4. Users can install from your repository",
        ],
    };

    ui.success(&format!(
        "{} setup complete!",
        match mode {
            InstallMode::Development => "Development",
            InstallMode::Production => "Production",
        }
    ));
    ui.message("Next steps:");
    for step in steps {
        ui.message(step);
    }
}
