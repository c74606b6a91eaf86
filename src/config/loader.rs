//! Add-on manifest loading.
//!
//! Both manifests are optional: a missing file yields the defaults so the
//! installer also works on a project that has not been scaffolded yet.

use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::schema::{AddonManifest, BuildConfig};
use crate::error::{InstallerError, Result};

/// Add-on manifest file name.
pub const ADDON_MANIFEST_FILE: &str = "config.yaml";

/// Build manifest file name.
pub const BUILD_MANIFEST_FILE: &str = "build.yaml";

/// Resolve the project directory to an absolute, canonical path.
///
/// # Errors
///
/// Returns `ProjectRootInvalid` if the path does not exist or is not a
/// directory.
pub fn resolve_project_root(path: &Path) -> Result<PathBuf> {
    let invalid = |source: io::Error| InstallerError::ProjectRootInvalid {
        path: path.to_path_buf(),
        source,
    };

    let resolved = path.canonicalize().map_err(invalid)?;
    if !resolved.is_dir() {
        return Err(invalid(io::Error::other("not a directory")));
    }
    Ok(resolved)
}

/// Load `config.yaml` from the project root.
///
/// # Errors
///
/// Returns `ManifestParseError` if the YAML is invalid.
pub fn load_addon_manifest(project_root: &Path) -> Result<AddonManifest> {
    load_or_default(&project_root.join(ADDON_MANIFEST_FILE))
}

/// Load `build.yaml` from the project root.
pub fn load_build_config(project_root: &Path) -> Result<BuildConfig> {
    load_or_default(&project_root.join(BUILD_MANIFEST_FILE))
}

/// Parse YAML content, naming `source_path` in errors.
pub fn parse_manifest<T: DeserializeOwned>(content: &str, source_path: &Path) -> Result<T> {
    serde_yaml::from_str(content).map_err(|e| InstallerError::ManifestParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("{} not found, using defaults", path.display());
            return Ok(T::default());
        }
        Err(e) => return Err(InstallerError::fs("read", path, e)),
    };

    // An empty file parses as YAML null.
    if content.trim().is_empty() {
        return Ok(T::default());
    }

    parse_manifest(&content, path)
}

/// Write `build.yaml`, replacing any existing file.
pub fn write_build_config(project_root: &Path, config: &BuildConfig) -> Result<()> {
    let path = project_root.join(BUILD_MANIFEST_FILE);
    let yaml = serde_yaml::to_string(config).map_err(|e| InstallerError::ManifestParseError {
        path: path.clone(),
        message: e.to_string(),
    })?;
    fs::write(&path, yaml).map_err(|e| InstallerError::fs("write", &path, e))
}
