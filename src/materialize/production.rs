//! Production artifacts: the build manifest and the CI workflow.

use std::path::{Path, PathBuf};

use super::scaffold::write_template;
use crate::config::{write_build_config, BuildConfig, BUILD_MANIFEST_FILE};
use crate::error::Result;

/// Location of the CI workflow inside the project.
pub const WORKFLOW_PATH: &str = ".github/workflows/builder.yaml";

/// Write `build.yaml` and the CI workflow, replacing existing files.
///
/// Returns the paths written.
pub fn write_production_artifacts(project_root: &Path) -> Result<Vec<PathBuf>> {
    write_build_config(project_root, &BuildConfig::production())?;

    let workflow = project_root.join(WORKFLOW_PATH);
    write_template("builder.yaml", &workflow)?;

    Ok(vec![project_root.join(BUILD_MANIFEST_FILE), workflow])
}
