//! Implementation of the default `sassbind` command.
//!
//! Tests the installed binary and builds a new one when it is missing,
//! broken, or a rebuild is forced.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use sassbind_lib::ProvisionOutcome;
use sassbind_lib::config::{BuildConfig, BuildEnv};

use crate::output::{format_duration, print_info, print_success};

/// Execute a provisioning run.
///
/// The environment is captured once here; nothing below reads it again.
pub fn cmd_provision(package_dir: Option<PathBuf>, args: Vec<String>) -> Result<()> {
  let package_dir = match package_dir {
    Some(dir) => dir,
    None => std::env::current_dir().context("Failed to determine current directory")?,
  };

  let config = BuildConfig::from_args(package_dir, args, BuildEnv::from_env());
  debug!(?config, "build configuration");

  let started = Instant::now();
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let outcome = rt.block_on(sassbind_lib::provision(&config))?;

  match outcome {
    ProvisionOutcome::AlreadyValid { path } => {
      print_info(&format!("\"{}\" exists and works", path.display()));
      print_success("Binary is fine; exiting.");
    }
    ProvisionOutcome::Installed { path, reason } => {
      print_info(&format!("Built because: {}", reason));
      print_success(&format!(
        "Installed in \"{}\" ({})",
        path.display(),
        format_duration(started.elapsed())
      ));
    }
  }

  Ok(())
}
