//! Fetching the native library sources.
//!
//! Sources are cloned into `src/libsass` and checked out at the revision
//! pinned in the package manifest, unless the caller supplies the library
//! through the toolchain's own flags.

use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::{BuildConfig, ManifestError, PackageManifest};
use crate::consts::LIBSASS_SOURCE_DIR;
use crate::process::{self, ProcessError};

#[derive(Debug, Error)]
pub enum SourceError {
  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error("failed to clone libsass from '{url}': {source}")]
  Clone {
    url: String,
    #[source]
    source: ProcessError,
  },

  #[error("failed to check out libsass {rev}: {source}")]
  Checkout {
    rev: String,
    #[source]
    source: ProcessError,
  },
}

/// What the acquirer did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
  /// External sources were requested; nothing to fetch.
  External,
  /// The source directory already exists.
  Present(PathBuf),
  /// The sources were cloned and checked out.
  Fetched(PathBuf),
}

pub fn source_dir(config: &BuildConfig) -> PathBuf {
  config.package_dir.join(LIBSASS_SOURCE_DIR)
}

/// Ensure the library sources are available to the toolchain.
///
/// Idempotent: a clone happens only when the source directory is absent.
pub async fn acquire_sources(config: &BuildConfig) -> Result<SourceStatus, SourceError> {
  if config.external_sources() {
    debug!("using externally supplied libsass");
    return Ok(SourceStatus::External);
  }

  let dir = source_dir(config);
  match tokio::fs::metadata(&dir).await {
    Ok(_) => {
      debug!(path = %dir.display(), "libsass sources present");
      return Ok(SourceStatus::Present(dir));
    }
    Err(err) if err.kind() == ErrorKind::NotFound => {}
    Err(err) => {
      // Only absence triggers a clone; anything else is left to the toolchain.
      warn!(path = %dir.display(), error = %err, "cannot inspect libsass sources");
      return Ok(SourceStatus::Present(dir));
    }
  }

  let manifest = PackageManifest::load(&config.package_dir)?;
  let rev = manifest.libsass_revision()?.to_string();

  let url = &config.env.libsass_repo;
  info!(url = %url, path = %dir.display(), "cloning libsass");

  let mut clone = Command::new(&config.env.git);
  clone.arg("clone").arg(url).arg(&dir).current_dir(&config.package_dir);
  process::run(&mut clone).await.map_err(|source| SourceError::Clone {
    url: url.clone(),
    source,
  })?;

  info!(rev = %rev, "checking out libsass");

  let mut checkout = Command::new(&config.env.git);
  checkout.arg("checkout").arg(&rev).current_dir(&dir);
  process::run(&mut checkout)
    .await
    .map_err(|source| SourceError::Checkout { rev, source })?;

  Ok(SourceStatus::Fetched(dir))
}
