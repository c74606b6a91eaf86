//! VS Code devcontainer descriptor.

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{InstallerError, Result};

/// The descriptor contents.
pub fn descriptor() -> Value {
    json!({
        "name": "Home Assistant Add-on Development",
        "image": "ghcr.io/home-assistant/devcontainer:addons",
        "workspaceFolder": "/workspaces/${localWorkspaceFolderBasename}",
        "mounts": [
            "source=/var/run/docker.sock,target=/var/run/docker.sock,type=bind"
        ],
        "features": {
            "ghcr.io/devcontainers/features/docker-in-docker:2": {},
            "ghcr.io/devcontainers/features/git:1": {}
        },
        "customizations": {
            "vscode": {
                "extensions": [
                    "ms-vscode.vscode-json",
                    "redhat.vscode-yaml",
                    "ms-vscode.vscode-docker",
                    "esbenp.prettier-vscode"
                ],
                "settings": {
                    "terminal.integrated.defaultProfile.linux": "bash",
                    "editor.formatOnSave": true
                }
            }
        },
        "postCreateCommand": "periphery-installer --dev --non-interactive",
        "remoteUser": "vscode"
    })
}

/// Write `.devcontainer/devcontainer.json`, replacing any existing file.
pub fn write_devcontainer(project_root: &Path) -> Result<PathBuf> {
    let dir = project_root.join(".devcontainer");
    fs::create_dir_all(&dir).map_err(|e| InstallerError::fs("create", &dir, e))?;

    let path = dir.join("devcontainer.json");
    let json = serde_json::to_string_pretty(&descriptor()).map_err(anyhow::Error::from)?;
    fs::write(&path, json + "\n").map_err(|e| InstallerError::fs("write", &path, e))?;

    tracing::debug!("Wrote {}", path.display());
    Ok(path)
}
