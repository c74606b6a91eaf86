//! Home Assistant configuration discovery.
//!
//! A directory is a Home Assistant config directory when it contains a
//! readable `configuration.yaml`. The override variable is tried first,
//! then a fixed list of well-known locations, then the user is asked.

use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{InstallerError, Result};
use crate::platform::{HostPlatform, OsFamily};
use crate::ui::{Prompt, UserInterface};

/// Marker file identifying a config directory.
pub const CONFIG_MARKER: &str = "configuration.yaml";

/// Environment variable holding an explicit config directory.
pub const CONFIG_PATH_ENV: &str = "HA_CONFIG_PATH";

/// Prompt key for the interactive fallback.
pub const CONFIG_PATH_PROMPT: &str = "ha_config_path";

/// How the config directory was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscoveryMethod {
    WellKnownPath,
    EnvironmentOverride,
    InteractivePrompt,
}

impl fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiscoveryMethod::WellKnownPath => "well-known path",
            DiscoveryMethod::EnvironmentOverride => "environment override",
            DiscoveryMethod::InteractivePrompt => "interactive prompt",
        })
    }
}

/// A validated Home Assistant config directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostConfigLocation {
    pub path: PathBuf,
    pub method: DiscoveryMethod,
}

impl HostConfigLocation {
    /// Directory holding local add-ons.
    pub fn addons_dir(&self) -> PathBuf {
        self.path.join("addons")
    }
}

/// Well-known config locations for a host family, in priority order.
///
/// Home-relative entries are left out when there is no home directory.
pub fn candidates(family: OsFamily, home: Option<&Path>) -> Vec<PathBuf> {
    let home_relative: [&[&str]; 4] = [
        &[".homeassistant"],
        &["homeassistant"],
        &["Documents", "HomeAssistant"],
        &["Development", "homeassistant"],
    ];
    let under_home =
        |parts: &[&str]| home.map(|h| parts.iter().fold(h.to_path_buf(), |p, s| p.join(s)));

    let mut paths = Vec::new();
    paths.extend(under_home(home_relative[0]));
    paths.extend(under_home(home_relative[1]));

    if family == OsFamily::Windows {
        paths.extend(under_home(home_relative[2]));
        paths.extend(under_home(home_relative[3]));
        paths.push(PathBuf::from("C:/homeassistant"));
        paths.push(PathBuf::from("C:/config"));
    } else {
        paths.push(PathBuf::from("/usr/share/hassio/homeassistant"));
        paths.push(PathBuf::from("/config"));
        paths.extend(under_home(home_relative[2]));
        paths.extend(under_home(home_relative[3]));
    }

    paths
}

/// Whether `dir` holds a readable marker file.
pub fn is_host_config(dir: &Path) -> bool {
    let marker = dir.join(CONFIG_MARKER);
    marker.is_file() && File::open(&marker).is_ok()
}

/// Find the config directory.
///
/// Fails with [`InstallerError::HostConfigNotFound`] when nothing validates
/// and the prompt cannot be answered or its answer is rejected.
pub fn locate(
    platform: &dyn HostPlatform,
    ui: &mut dyn UserInterface,
) -> Result<HostConfigLocation> {
    let home = platform.home_dir();
    locate_in(platform, ui, &candidates(platform.family(), home.as_deref()))
}

/// [`locate`] with an explicit candidate list.
pub fn locate_in(
    platform: &dyn HostPlatform,
    ui: &mut dyn UserInterface,
    candidates: &[PathBuf],
) -> Result<HostConfigLocation> {
    if let Some(value) = platform.env_var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(value);
        if is_host_config(&path) {
            tracing::debug!("Config directory from {}: {}", CONFIG_PATH_ENV, path.display());
            return Ok(HostConfigLocation {
                path,
                method: DiscoveryMethod::EnvironmentOverride,
            });
        }
        ui.warning(&format!(
            "{} is set to {} but it has no {}; ignoring it",
            CONFIG_PATH_ENV,
            path.display(),
            CONFIG_MARKER
        ));
    }

    for path in candidates {
        tracing::debug!("Checking {}", path.display());
        if is_host_config(path) {
            return Ok(HostConfigLocation {
                path: path.clone(),
                method: DiscoveryMethod::WellKnownPath,
            });
        }
    }

    ui.warning("Home Assistant configuration directory not found automatically.");
    let prompt = Prompt::input(
        CONFIG_PATH_PROMPT,
        "Path to your Home Assistant config directory",
    );
    let answer = ui.prompt(&prompt).map_err(|e| InstallerError::HostConfigNotFound {
        message: format!(
            "no candidate contains {} and the path cannot be asked for ({}); set {}",
            CONFIG_MARKER, e, CONFIG_PATH_ENV
        ),
    })?;

    let answer = answer.as_string();
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(InstallerError::HostConfigNotFound {
            message: "no path was entered".to_string(),
        });
    }

    let path = expand_home(answer, platform.home_dir().as_deref());
    if !is_host_config(&path) {
        return Err(InstallerError::HostConfigNotFound {
            message: format!("{} has no readable {}", path.display(), CONFIG_MARKER),
        });
    }

    Ok(HostConfigLocation {
        path,
        method: DiscoveryMethod::InteractivePrompt,
    })
}

fn expand_home(input: &str, home: Option<&Path>) -> PathBuf {
    match (input.strip_prefix("~/").or(input.strip_prefix("~\\")), home) {
        (Some(rest), Some(home)) => home.join(rest),
        _ if input == "~" => home.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(input)),
        _ => PathBuf::from(input),
    }
}
