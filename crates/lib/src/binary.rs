//! Where the addon binary lives.
//!
//! [`BinaryLocation`] is the one derivation shared by the validator and the
//! relocator, so both agree on the install path and the build output path.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::config::BuildConfig;
use crate::consts::{
  BINARY_FILENAME, BUILD_DIR, DEBUG_VARIANT, DEFAULT_RELEASE_VARIANT, TOOLCHAIN_CONFIG_FILE, VENDOR_DIR,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryLocation {
  install_path: PathBuf,
  build_root: PathBuf,
  debug: bool,
}

impl BinaryLocation {
  pub fn resolve(config: &BuildConfig) -> Self {
    Self {
      install_path: install_path(config),
      build_root: config.package_dir.join(BUILD_DIR),
      debug: config.debug,
    }
  }

  /// Path the runtime loader expects the binary at.
  pub fn install_path(&self) -> &Path {
    &self.install_path
  }

  /// Variant directory the toolchain writes into.
  ///
  /// Read at call time: the release name comes from the configuration the
  /// toolchain generated during the build.
  pub fn variant_dir(&self) -> String {
    if self.debug {
      return DEBUG_VARIANT.to_string();
    }

    default_configuration(&self.build_root).unwrap_or_else(|| DEFAULT_RELEASE_VARIANT.to_string())
  }

  /// `<build-root>/<variant>/<binary>`
  pub fn build_output(&self) -> PathBuf {
    self.build_root.join(self.variant_dir()).join(BINARY_FILENAME)
  }
}

/// Directory name identifying the platform, architecture and runtime ABI.
pub fn binary_name(config: &BuildConfig) -> String {
  if let Some(name) = &config.env.binary_name {
    return name.clone();
  }

  match &config.env.module_version {
    Some(abi) => format!("{}-{}-{}", config.platform, config.arch, abi),
    None => format!("{}-{}", config.platform, config.arch),
  }
}

pub fn install_path(config: &BuildConfig) -> PathBuf {
  match &config.env.binary_path {
    Some(path) => config.package_dir.join(path),
    None => config
      .package_dir
      .join(VENDOR_DIR)
      .join(binary_name(config))
      .join(BINARY_FILENAME),
  }
}

/// `target_defaults.default_configuration` from the toolchain's generated config.
///
/// The file is JSON preceded by `#` comment lines.
fn default_configuration(build_root: &Path) -> Option<String> {
  let path = build_root.join(TOOLCHAIN_CONFIG_FILE);
  let content = std::fs::read_to_string(&path).ok()?;

  let json: String = content
    .lines()
    .filter(|line| !line.trim_start().starts_with('#'))
    .collect::<Vec<_>>()
    .join("\n");

  let value: Value = match serde_json::from_str(&json) {
    Ok(value) => value,
    Err(err) => {
      debug!(path = %path.display(), error = %err, "unreadable toolchain config");
      return None;
    }
  };

  value
    .pointer("/target_defaults/default_configuration")
    .and_then(Value::as_str)
    .filter(|name| !name.is_empty())
    .map(str::to_string)
}
