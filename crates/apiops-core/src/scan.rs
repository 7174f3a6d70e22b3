//! # Environment Directory Scanner
//!
//! Walks one environment directory and describes its product groups: which
//! files are service resources, which one is the upstream definition, and
//! which entries do not belong there at all.
//!
//! ```text
//! <gateway root>/
//! └── <environment>/
//!     ├── product-a/
//!     │   ├── checkout.yaml      # service resource
//!     │   ├── payments.yaml      # service resource
//!     │   └── upstreams.yaml     # upstream definitions
//!     └── product-b/
//!         └── ...
//! ```
//!
//! The scanner reads directory structure only — no file contents. Hidden
//! entries are skipped. Enumeration is sorted by name so repeated runs see
//! the same sequence; callers must still treat the order as unspecified.

use std::path::{Path, PathBuf};

use crate::error::GatewayError;

/// Filename of the per-product upstream-definition file.
pub const UPSTREAMS_FILENAME: &str = "upstreams.yaml";

/// One product group: a named subdirectory of an environment directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductGroup {
    /// Directory name of the product group.
    pub name: String,
    /// Absolute path of the product group directory.
    pub path: PathBuf,
    /// Service resource files (`*.yaml` except the upstream definition).
    pub service_files: Vec<PathBuf>,
    /// The upstream-definition file, when present.
    pub upstream_file: Option<PathBuf>,
    /// Entries that are neither service resources nor the upstream file.
    pub unknown_files: Vec<PathBuf>,
}

/// The resolved path of an environment directory.
pub fn environment_dir(gateway_root: &Path, env_name: &str) -> PathBuf {
    gateway_root.join(env_name)
}

/// Enumerate the product groups of one environment.
///
/// Fails with [`GatewayError::DirectoryNotFound`] when the environment
/// directory does not exist; every other finding is left to the validators.
pub fn scan_environment(
    gateway_root: &Path,
    env_name: &str,
) -> Result<Vec<ProductGroup>, GatewayError> {
    let env_dir = environment_dir(gateway_root, env_name);
    if !env_dir.is_dir() {
        return Err(GatewayError::DirectoryNotFound(env_dir));
    }

    let mut groups = Vec::new();
    for entry in read_dir_sorted(&env_dir)? {
        if !entry.is_dir() {
            continue;
        }
        let Some(name) = visible_name(&entry) else {
            continue;
        };
        groups.push(scan_product_group(name, &entry)?);
    }

    tracing::debug!(
        env = env_name,
        groups = groups.len(),
        "scanned environment directory"
    );
    Ok(groups)
}

fn scan_product_group(name: String, dir: &Path) -> Result<ProductGroup, GatewayError> {
    let mut group = ProductGroup {
        name,
        path: dir.to_path_buf(),
        service_files: Vec::new(),
        upstream_file: None,
        unknown_files: Vec::new(),
    };

    for entry in read_dir_sorted(dir)? {
        let Some(file_name) = visible_name(&entry) else {
            continue;
        };
        if entry.is_file() && file_name == UPSTREAMS_FILENAME {
            group.upstream_file = Some(entry);
        } else if entry.is_file() && file_name.ends_with(".yaml") {
            group.service_files.push(entry);
        } else {
            group.unknown_files.push(entry);
        }
    }

    Ok(group)
}

/// Directory entries sorted by name for platform-independent enumeration.
fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, GatewayError> {
    let entries = std::fs::read_dir(dir).map_err(|source| GatewayError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| GatewayError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

/// The entry's file name, unless it is hidden.
fn visible_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    if name.starts_with('.') {
        return None;
    }
    Some(name.to_string())
}
