//! The package manifest (`package.json`).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const MANIFEST_FILENAME: &str = "package.json";

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse '{path}': {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("'{path}' does not pin a libsass revision")]
  MissingRevision { path: PathBuf },
}

/// The subset of the package manifest the pipeline reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
  #[serde(skip)]
  pub path: PathBuf,
  pub name: Option<String>,
  pub version: Option<String>,
  /// Pinned revision of the native library sources.
  pub libsass: Option<String>,
}

impl PackageManifest {
  pub fn load(package_dir: &Path) -> Result<Self, ManifestError> {
    let path = package_dir.join(MANIFEST_FILENAME);
    let content = std::fs::read_to_string(&path).map_err(|source| ManifestError::Read {
      path: path.clone(),
      source,
    })?;

    let mut manifest: PackageManifest = serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
      path: path.clone(),
      source,
    })?;
    manifest.path = path;

    Ok(manifest)
  }

  pub fn libsass_revision(&self) -> Result<&str, ManifestError> {
    self
      .libsass
      .as_deref()
      .filter(|rev| !rev.is_empty())
      .ok_or_else(|| ManifestError::MissingRevision {
        path: self.path.clone(),
      })
  }
}
