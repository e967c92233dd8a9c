//! The provisioning state machine.
//!
//! ```text
//! START -> CHECK_FORCE -> CHECK_EXISTS -> CHECK_VALID -> DONE
//!                     \             \              \
//!                      +-------------+--------------+-> BUILD
//! BUILD: ACQUIRE_SOURCE -> INVOKE_TOOLCHAIN -> RELOCATE -> DONE | FAIL
//! ```
//!
//! Stages run strictly one after another; each starts only after the
//! previous one succeeded.

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::binary::BinaryLocation;
use crate::config::BuildConfig;
use crate::error::ProvisionError;
use crate::relocate::relocate;
use crate::source::acquire_sources;
use crate::toolchain;
use crate::validate::{has_binary, probe_binary};

/// Why a build is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildReason {
  /// `--force` or the force override.
  Forced,
  /// Nothing at the install path.
  Missing,
  /// A binary exists but failed live validation.
  Invalid(String),
}

impl fmt::Display for BuildReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildReason::Forced => write!(f, "rebuild forced"),
      BuildReason::Missing => write!(f, "no binary installed"),
      BuildReason::Invalid(problem) => write!(f, "problem with the binary: {}", problem),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
  /// The installed binary works; nothing to do.
  Keep,
  Build(BuildReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
  AlreadyValid { path: PathBuf },
  Installed { path: PathBuf, reason: BuildReason },
}

/// CHECK_FORCE -> CHECK_EXISTS -> CHECK_VALID.
pub async fn decide(config: &BuildConfig, location: &BinaryLocation) -> Decision {
  if config.force_requested() {
    return Decision::Build(BuildReason::Forced);
  }

  let path = location.install_path();
  if !has_binary(path) {
    debug!(path = %path.display(), "no binary at install path");
    return Decision::Build(BuildReason::Missing);
  }

  info!(path = %path.display(), "binary exists, testing it");

  match probe_binary(config, path).await {
    Ok(()) => {
      info!("binary is fine");
      Decision::Keep
    }
    Err(err) => {
      info!(error = %err, "problem with the binary, manual build incoming");
      Decision::Build(BuildReason::Invalid(err.to_string()))
    }
  }
}

/// ACQUIRE_SOURCE -> INVOKE_TOOLCHAIN -> RELOCATE.
pub async fn build(config: &BuildConfig, location: &BinaryLocation) -> Result<PathBuf, ProvisionError> {
  let sources = acquire_sources(config).await?;
  debug!(?sources, "sources ready");

  let command = toolchain::resolve(config)?;
  toolchain::invoke(&command, &config.package_dir).await?;

  Ok(relocate(location).await?)
}

/// Make sure a working binary is installed, building it when needed.
pub async fn provision(config: &BuildConfig) -> Result<ProvisionOutcome, ProvisionError> {
  let location = BinaryLocation::resolve(config);

  let reason = match decide(config, &location).await {
    Decision::Keep => {
      return Ok(ProvisionOutcome::AlreadyValid {
        path: location.install_path().to_path_buf(),
      });
    }
    Decision::Build(reason) => reason,
  };

  info!(%reason, arch = %config.arch, platform = %config.platform, debug = config.debug, "building binary");

  let path = build(config, &location).await?;
  Ok(ProvisionOutcome::Installed { path, reason })
}
