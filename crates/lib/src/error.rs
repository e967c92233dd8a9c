//! Errors that end a provisioning run.

use std::path::PathBuf;

use thiserror::Error;

use crate::relocate::RelocateError;
use crate::source::SourceError;
use crate::toolchain::ToolchainError;

/// A failure on the build path. None of these are retried.
#[derive(Debug, Error)]
pub enum ProvisionError {
  /// Clone or checkout of the library sources failed.
  #[error("{0}")]
  SourceAcquisitionFailed(#[from] SourceError),

  /// The toolchain could not be located or exited with 127.
  #[error("toolchain not found: {reason}")]
  ToolchainNotFound { reason: String },

  /// The toolchain exited with any other nonzero status.
  #[error("{0}")]
  ToolchainBuildFailed(ToolchainError),

  /// The toolchain succeeded but left no binary behind.
  #[error("build succeeded but target not found: {}", .path.display())]
  ArtifactMissing { path: PathBuf },

  /// Creating the install directory or moving the binary failed.
  #[error("{0}")]
  RelocationFailed(RelocateError),
}

impl From<ToolchainError> for ProvisionError {
  fn from(err: ToolchainError) -> Self {
    match err {
      ToolchainError::NotFound { reason } => ProvisionError::ToolchainNotFound { reason },
      other => ProvisionError::ToolchainBuildFailed(other),
    }
  }
}

impl From<RelocateError> for ProvisionError {
  fn from(err: RelocateError) -> Self {
    match err {
      RelocateError::ArtifactMissing { path } => ProvisionError::ArtifactMissing { path },
      other => ProvisionError::RelocationFailed(other),
    }
  }
}
