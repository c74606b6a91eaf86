//! Add-on manifest definitions.
//!
//! These structs map to the add-on's own `config.yaml` and `build.yaml`.
//! Only the fields the installer reads are modelled; everything else in
//! the files is ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ADDON_DISPLAY_NAME, ADDON_SLUG, REPO_NAME};
use crate::build::ARCH_TAGS;

/// Base image version used when `build.yaml` names none.
pub const BASE_IMAGE_VERSION: &str = "3.21";

/// The add-on manifest, `config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddonManifest {
    /// Display name.
    pub name: String,

    /// Add-on version; becomes `BUILD_VERSION`.
    pub version: String,

    /// Directory name under `addons/`.
    pub slug: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Image name template; `{arch}` is replaced by the architecture tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Supported architecture tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arch: Vec<String>,
}

impl Default for AddonManifest {
    fn default() -> Self {
        Self {
            name: ADDON_DISPLAY_NAME.to_string(),
            version: "dev".to_string(),
            slug: ADDON_SLUG.to_string(),
            description: None,
            image: None,
            arch: Vec::new(),
        }
    }
}

impl AddonManifest {
    /// Image tag for an architecture.
    pub fn image_for(&self, arch: &str) -> String {
        match &self.image {
            Some(template) => {
                let image = template.replace("{arch}", arch);
                let tagged = image.rsplit('/').next().is_some_and(|last| last.contains(':'));
                if tagged {
                    image
                } else {
                    format!("{}:{}", image, self.version)
                }
            }
            None => format!("local/{}-{}:latest", self.slug, arch),
        }
    }
}

/// The build manifest, `build.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Base image per architecture tag.
    pub build_from: BTreeMap<String, String>,

    /// OCI image labels.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Extra Docker build arguments.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, String>,

    /// Codenotary signer identity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codenotary: Option<String>,
}

impl BuildConfig {
    /// The manifest written for production builds.
    pub fn production() -> Self {
        let build_from = ARCH_TAGS
            .iter()
            .map(|tag| (tag.to_string(), default_base_image(tag)))
            .collect();

        let labels = [
            ("org.opencontainers.image.title", ADDON_DISPLAY_NAME.to_string()),
            (
                "org.opencontainers.image.description",
                "Komodo Periphery agent for Home Assistant OS monitoring".to_string(),
            ),
            (
                "org.opencontainers.image.source",
                format!("https://github.com/your-username/{}", REPO_NAME),
            ),
            ("org.opencontainers.image.licenses", "MIT".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let args = BTreeMap::from([("KOMODO_VERSION".to_string(), "latest".to_string())]);

        Self {
            build_from,
            labels,
            args,
            codenotary: Some("your-email@example.com".to_string()),
        }
    }

    /// Base image for an architecture tag.
    pub fn base_image(&self, arch: &str) -> String {
        self.build_from
            .get(arch)
            .cloned()
            .unwrap_or_else(|| default_base_image(arch))
    }
}

/// The Home Assistant base image for an architecture tag.
pub fn default_base_image(arch: &str) -> String {
    format!("ghcr.io/home-assistant/{}-base:{}", arch, BASE_IMAGE_VERSION)
}
