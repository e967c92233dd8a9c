//! Hidden `--probe-library` mode.
//!
//! The provisioner re-runs its own executable with this flag so that loading
//! a possibly broken addon can only take down the child.

use std::path::Path;
use std::process::ExitCode;

use sassbind_lib::validate::probe_library;

/// Load the binary at `path` in-process. The diagnostic goes to stderr for the parent to capture.
pub fn cmd_probe_library(path: &Path) -> ExitCode {
  match probe_library(path) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("{}", err);
      ExitCode::FAILURE
    }
  }
}
