//! Moving the freshly built binary to its install path.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::binary::BinaryLocation;

#[derive(Debug, Error)]
pub enum RelocateError {
  #[error("build succeeded but target not found: {}", .path.display())]
  ArtifactMissing { path: PathBuf },

  #[error("failed to create '{}': {source}", .path.display())]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to move '{}' to '{}': {source}", .from.display(), .to.display())]
  Move {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Move the toolchain output to the install path and return the install path.
///
/// Must only run after the toolchain reported success.
pub async fn relocate(location: &BinaryLocation) -> Result<PathBuf, RelocateError> {
  let target = location.build_output();
  let install = location.install_path().to_path_buf();

  if let Some(parent) = install.parent() {
    ensure_dir(parent).await?;
  }

  if tokio::fs::metadata(&target).await.is_err() {
    return Err(RelocateError::ArtifactMissing { path: target });
  }

  debug!(from = %target.display(), to = %install.display(), "moving binary");
  move_file(&target, &install).await?;

  info!(path = %install.display(), "binary installed");
  Ok(install)
}

async fn ensure_dir(path: &Path) -> Result<(), RelocateError> {
  match tokio::fs::create_dir_all(path).await {
    Ok(()) => Ok(()),
    Err(err) if err.kind() == ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
    Err(source) => Err(RelocateError::CreateDir {
      path: path.to_path_buf(),
      source,
    }),
  }
}

/// Rename, falling back to copy and remove across filesystems.
async fn move_file(from: &Path, to: &Path) -> Result<(), RelocateError> {
  let err = match tokio::fs::rename(from, to).await {
    Ok(()) => return Ok(()),
    Err(err) => err,
  };

  let move_err = |source| RelocateError::Move {
    from: from.to_path_buf(),
    to: to.to_path_buf(),
    source,
  };

  if err.kind() != ErrorKind::CrossesDevices {
    return Err(move_err(err));
  }

  debug!("rename crosses filesystems, copying instead");
  tokio::fs::copy(from, to).await.map_err(move_err)?;
  tokio::fs::remove_file(from).await.map_err(move_err)?;
  Ok(())
}
