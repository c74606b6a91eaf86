//! Local container build.
//!
//! The build itself is delegated to `docker build`. This module only
//! decides what to pass to it and relays the result.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::path::Path;

use super::arch::map_arch;
use crate::config::{
    load_addon_manifest, load_build_config, resolve_project_root, AddonManifest, BuildConfig,
};
use crate::error::{InstallerError, Result};
use crate::platform::HostPlatform;
use crate::shell::ProcessInvocation;
use crate::ui::UserInterface;

/// Inputs of one container build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildSpec {
    /// Architecture tag.
    pub arch: String,
    /// Docker platform string.
    pub platform: String,
    /// RFC 3339 UTC timestamp.
    pub build_date: String,
    /// Short git revision, or `unknown`.
    pub revision: String,
    /// Add-on version.
    pub version: String,
    /// Base image for the architecture.
    pub base_image: String,
    /// Image tag to produce.
    pub image: String,
}

impl BuildSpec {
    /// Derive the build inputs for the host.
    ///
    /// Fails with `UnsupportedArchitecture` before anything is run.
    pub fn derive(
        platform: &dyn HostPlatform,
        project_root: &Path,
        manifest: &AddonManifest,
        build_config: &BuildConfig,
    ) -> Result<Self> {
        let target = map_arch(&platform.arch())?;

        Ok(Self {
            arch: target.tag.to_string(),
            platform: target.platform.to_string(),
            build_date: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            revision: revision(platform, project_root),
            version: manifest.version.clone(),
            base_image: build_config.base_image(target.tag),
            image: manifest.image_for(target.tag),
        })
    }

    /// Full `docker build` argv.
    pub fn docker_argv(&self, project_root: &Path) -> Vec<String> {
        let mut argv: Vec<String> = ["docker", "build", "--platform", self.platform.as_str()]
            .iter()
            .map(|s| s.to_string())
            .collect();

        for (name, value) in [
            ("BUILD_FROM", &self.base_image),
            ("BUILD_DATE", &self.build_date),
            ("BUILD_REF", &self.revision),
            ("BUILD_VERSION", &self.version),
            ("BUILD_ARCH", &self.arch),
        ] {
            argv.push("--build-arg".to_string());
            argv.push(format!("{}={}", name, value));
        }

        argv.push("-t".to_string());
        argv.push(self.image.clone());
        argv.push(project_root.display().to_string());
        argv
    }
}

/// Short revision of HEAD, or `unknown` outside a git checkout.
pub fn revision(platform: &dyn HostPlatform, project_root: &Path) -> String {
    let invocation = ProcessInvocation::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .cwd(project_root);

    match platform.run_process(&invocation) {
        Ok(result) if result.success && !result.stdout.trim().is_empty() => {
            result.stdout.trim().to_string()
        }
        _ => {
            tracing::debug!("No git revision available for {}", project_root.display());
            "unknown".to_string()
        }
    }
}

/// Run the container build for a spec.
///
/// In verbose mode the builder's output goes straight to the terminal.
/// A nonzero exit becomes `BuildFailed` carrying the builder's output.
pub fn run_build(
    platform: &dyn HostPlatform,
    spec: &BuildSpec,
    project_root: &Path,
    ui: &mut dyn UserInterface,
) -> Result<()> {
    let inherit = ui.output_mode().shows_command_output();
    let invocation = ProcessInvocation::from_argv(&spec.docker_argv(project_root))
        .cwd(project_root)
        .inherit_output(inherit);
    let command = invocation.display();
    tracing::info!("Running {}", command);

    let mut spinner = if inherit {
        ui.message(&format!("Building {}", spec.image));
        None
    } else {
        Some(ui.start_spinner(&format!("Building {} for {}", spec.image, spec.arch)))
    };

    let result = platform.run_process(&invocation)?;

    if result.success {
        if let Some(spinner) = spinner.as_mut() {
            spinner.finish_success(&format!("Built {}", spec.image));
        }
        ui.success(&format!("Build completed: {}", spec.image));
        return Ok(());
    }

    if let Some(spinner) = spinner.as_mut() {
        spinner.finish_error("Container build failed");
    }
    let output = result.combined_output();
    ui.show_error_block(&command, &output);

    Err(InstallerError::BuildFailed {
        code: result.exit_code,
        output,
    })
}

/// Load the manifests, derive the `BuildSpec` and run the build.
///
/// The builder runs in the absolute project path, which is also the build
/// context.
pub fn build_addon(
    platform: &dyn HostPlatform,
    project_root: &Path,
    ui: &mut dyn UserInterface,
) -> Result<BuildSpec> {
    let project_root = &resolve_project_root(project_root)?;
    let manifest = load_addon_manifest(project_root)?;
    let build_config = load_build_config(project_root)?;
    let spec = BuildSpec::derive(platform, project_root, &manifest, &build_config)?;
    tracing::debug!("Build spec: {:?}", spec);

    run_build(platform, &spec, project_root, ui)?;
    Ok(spec)
}
