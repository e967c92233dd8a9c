//! Driving the native build toolchain.
//!
//! The toolchain runs with inherited standard streams so its progress is
//! visible as it happens. Only the exit status is interpreted.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::consts::{ALTERNATE_ENGINE, BUILD_PARAMS, EXIT_COMMAND_NOT_FOUND, TOOLCHAIN_BIN, TOOLCHAIN_BIN_DIR_SUFFIX};
use crate::process::describe_exit;

/// Bundled toolchain entry point, relative to a `node_modules` directory.
const BUNDLED_ENTRY: &str = "node-gyp/bin/node-gyp.js";

#[derive(Debug, Error)]
pub enum ToolchainError {
  #[error("toolchain not found: {reason}")]
  NotFound { reason: String },

  #[error("failed to start toolchain '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  #[error("build failed ({})", describe_exit(.code))]
  Failed { code: Option<i32> },
}

/// Resolved executable and arguments for one toolchain run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainCommand {
  pub program: PathBuf,
  pub args: Vec<String>,
}

impl fmt::Display for ToolchainCommand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program.display())?;
    for arg in &self.args {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

/// `rebuild --verbose`, one `--param=value` per build parameter, then the passthrough arguments.
pub fn build_args(config: &BuildConfig) -> Vec<String> {
  let mut args = vec!["rebuild".to_string(), "--verbose".to_string()];

  for name in BUILD_PARAMS {
    args.push(format!("--{}={}", name, config.env.build_param(name)));
  }

  args.extend(config.args.iter().cloned());
  args
}

/// Pick the executable that runs the toolchain.
///
/// Under the alternate script engine the bundled entry point is unusable, so
/// a toolchain shipped next to the runtime on `PATH` is preferred. Otherwise
/// the bundled entry point is run through the host runtime.
pub fn resolve(config: &BuildConfig) -> Result<ToolchainCommand, ToolchainError> {
  let mut args = build_args(config);

  if let Some(program) = engine_toolchain(config) {
    return Ok(ToolchainCommand { program, args });
  }

  let runtime = config.env.runtime.clone().ok_or_else(|| ToolchainError::NotFound {
    reason: "no host runtime to run the bundled toolchain".to_string(),
  })?;

  let entry = bundled_entry(&config.package_dir).ok_or_else(|| ToolchainError::NotFound {
    reason: format!("'{}' is not installed", BUNDLED_ENTRY),
  })?;

  args.insert(0, entry.to_string_lossy().into_owned());
  Ok(ToolchainCommand { program: runtime, args })
}

/// Toolchain on `PATH` for the alternate engine, if that engine is in use.
fn engine_toolchain(config: &BuildConfig) -> Option<PathBuf> {
  if config.env.js_engine.as_deref() != Some(ALTERNATE_ENGINE) {
    return None;
  }

  let runtime_dir = config.env.runtime.as_deref()?.parent()?;
  let path = config.env.path.as_ref()?;

  let dir = std::env::split_paths(path)
    .find(|entry| entry.starts_with(runtime_dir) && entry.ends_with(TOOLCHAIN_BIN_DIR_SUFFIX))?;

  debug!(dir = %dir.display(), "using toolchain bundled with the runtime");
  Some(which::which_in(TOOLCHAIN_BIN, Some(&dir), &config.package_dir).unwrap_or_else(|_| dir.join(TOOLCHAIN_BIN)))
}

/// Find the bundled entry point the way the runtime's module lookup would:
/// in `node_modules` of the package directory or any ancestor.
pub fn bundled_entry(package_dir: &Path) -> Option<PathBuf> {
  package_dir
    .ancestors()
    .map(|dir| dir.join("node_modules").join(BUNDLED_ENTRY))
    .find(|candidate| candidate.is_file())
}

/// Run the toolchain to completion in the package directory.
pub async fn invoke(command: &ToolchainCommand, package_dir: &Path) -> Result<(), ToolchainError> {
  info!(command = %command, "building");

  let status = Command::new(&command.program)
    .args(&command.args)
    .current_dir(package_dir)
    .stdin(Stdio::inherit())
    .stdout(Stdio::inherit())
    .stderr(Stdio::inherit())
    .status()
    .await
    .map_err(|source| {
      let program = command.program.display().to_string();
      if source.kind() == ErrorKind::NotFound {
        ToolchainError::NotFound {
          reason: format!("'{}' does not exist", program),
        }
      } else {
        ToolchainError::Spawn { program, source }
      }
    })?;

  debug!(code = ?status.code(), "toolchain exited");

  match status.code() {
    Some(0) => Ok(()),
    Some(EXIT_COMMAND_NOT_FOUND) => Err(ToolchainError::NotFound {
      reason: format!("'{}' exited with code {}", command.program.display(), EXIT_COMMAND_NOT_FOUND),
    }),
    code => Err(ToolchainError::Failed { code }),
  }
}
