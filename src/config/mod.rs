//! Add-on identity and manifests.
//!
//! - Schema definitions in [`schema`]
//! - Loading and writing in [`loader`]
//!
//! # Example
//!
//! ```
//! use periphery_installer::config::load_addon_manifest;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("config.yaml"), "version: 1.19.1").unwrap();
//!
//! let manifest = load_addon_manifest(temp.path()).unwrap();
//! assert_eq!(manifest.version, "1.19.1");
//! assert_eq!(manifest.slug, "komodo_periphery");
//! ```

pub mod loader;
pub mod schema;

pub use loader::{
    load_addon_manifest, load_build_config, parse_manifest, resolve_project_root,
    write_build_config, ADDON_MANIFEST_FILE, BUILD_MANIFEST_FILE,
};
pub use schema::{default_base_image, AddonManifest, BuildConfig};

/// Add-on slug; also the deployment directory name.
pub const ADDON_SLUG: &str = "komodo_periphery";

/// Human-readable add-on name.
pub const ADDON_DISPLAY_NAME: &str = "Komodo Periphery";

/// Repository name used in generated metadata.
pub const REPO_NAME: &str = "komodo-periphery-addon";
