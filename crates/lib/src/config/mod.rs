//! Configuration for a single provisioning run.
//!
//! A [`BuildConfig`] is assembled once from the parsed flags and the
//! [`BuildEnv`] snapshot, then shared read-only by every stage.

mod args;
mod env;
mod manifest;

use std::path::PathBuf;

pub use args::{ParsedArgs, parse_args};
pub use env::{BuildEnv, ProbeKind};
pub use manifest::{MANIFEST_FILENAME, ManifestError, PackageManifest};

use crate::platform::{host_arch, host_platform};

#[derive(Debug, Clone)]
pub struct BuildConfig {
  /// Root of the package that owns the addon.
  pub package_dir: PathBuf,
  pub arch: String,
  pub platform: String,
  pub debug: bool,
  /// `-f`/`--force` was given.
  pub force: bool,
  /// `--libsass_ext` was given without `=no`.
  pub libsass_ext: bool,
  /// Arguments forwarded verbatim to the toolchain.
  pub args: Vec<String>,
  pub env: BuildEnv,
}

impl BuildConfig {
  pub fn new(package_dir: impl Into<PathBuf>, parsed: ParsedArgs, env: BuildEnv) -> Self {
    let package_dir = package_dir.into();
    let package_dir = dunce::canonicalize(&package_dir).unwrap_or(package_dir);

    Self {
      package_dir,
      arch: parsed.target_arch.unwrap_or_else(host_arch),
      platform: host_platform(),
      debug: parsed.debug,
      force: parsed.force,
      libsass_ext: parsed.libsass_ext,
      args: parsed.passthrough,
      env,
    }
  }

  /// Parse raw flags and build the configuration in one step.
  pub fn from_args<I, S>(package_dir: impl Into<PathBuf>, args: I, env: BuildEnv) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self::new(package_dir, parse_args(args), env)
  }

  /// Rebuild regardless of any existing binary.
  pub fn force_requested(&self) -> bool {
    self.force || self.env.force_build
  }

  /// The native library is supplied through the toolchain's own flags.
  pub fn external_sources(&self) -> bool {
    self.libsass_ext || self.env.libsass_ext
  }
}
