//! Snapshot of the process environment taken once at startup.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::consts::{self, BUILD_PARAMS, LIBSASS_REPO_URL};

/// How an existing binary is exercised before it is trusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProbeKind {
  /// Load the package through the host runtime and render a stylesheet.
  #[default]
  Runtime,
  /// Load the binary in a child process and compile a stylesheet through its C entry points.
  Library,
}

impl FromStr for ProbeKind {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "runtime" => Ok(Self::Runtime),
      "library" => Ok(Self::Library),
      other => Err(format!("unknown probe '{}', expected 'runtime' or 'library'", other)),
    }
  }
}

/// Every environment input the pipeline consumes.
///
/// Components never read the environment themselves; they receive this
/// through [`BuildConfig`](super::BuildConfig).
#[derive(Debug, Clone)]
pub struct BuildEnv {
  /// `SASS_FORCE_BUILD` is set to a non-empty value.
  pub force_build: bool,
  /// `LIBSASS_EXT` is set to a non-empty value.
  pub libsass_ext: bool,
  /// Values of the uppercased [`BUILD_PARAMS`] variables that were set.
  pub build_params: BTreeMap<String, String>,
  pub binary_name: Option<String>,
  pub binary_path: Option<PathBuf>,
  /// Host runtime executable used for the bundled toolchain and the runtime probe.
  pub runtime: Option<PathBuf>,
  /// Script engine of the host runtime, when it is not the default one.
  pub js_engine: Option<String>,
  /// Source-control executable.
  pub git: PathBuf,
  pub libsass_repo: String,
  pub probe: ProbeKind,
  /// Runtime ABI version, appended to the default binary name when known.
  pub module_version: Option<String>,
  /// Raw `PATH`, used to look for an engine-compatible toolchain.
  pub path: Option<OsString>,
}

impl Default for BuildEnv {
  fn default() -> Self {
    Self {
      force_build: false,
      libsass_ext: false,
      build_params: BTreeMap::new(),
      binary_name: None,
      binary_path: None,
      runtime: None,
      js_engine: None,
      git: PathBuf::from("git"),
      libsass_repo: LIBSASS_REPO_URL.to_string(),
      probe: ProbeKind::default(),
      module_version: None,
      path: None,
    }
  }
}

impl BuildEnv {
  /// Capture the current process environment.
  pub fn from_env() -> Self {
    let build_params = BUILD_PARAMS
      .iter()
      .filter_map(|name| var(&name.to_uppercase()).map(|value| (name.to_string(), value)))
      .collect();

    let probe = match var(consts::env::PROBE) {
      Some(raw) => raw.parse().unwrap_or_else(|err: String| {
        warn!(error = %err, "ignoring {}", consts::env::PROBE);
        ProbeKind::default()
      }),
      None => ProbeKind::default(),
    };

    let env = Self {
      force_build: is_set(consts::env::FORCE_BUILD),
      libsass_ext: is_set(consts::env::LIBSASS_EXT),
      build_params,
      binary_name: non_empty(consts::env::BINARY_NAME),
      binary_path: non_empty(consts::env::BINARY_PATH).map(PathBuf::from),
      runtime: detect_runtime(),
      js_engine: non_empty(consts::env::JS_ENGINE),
      git: non_empty(consts::env::GIT)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("git")),
      libsass_repo: non_empty(consts::env::LIBSASS_REPO).unwrap_or_else(|| LIBSASS_REPO_URL.to_string()),
      probe,
      module_version: non_empty(consts::env::MODULE_VERSION),
      path: std::env::var_os(consts::env::PATH),
    };

    debug!(?env, "captured build environment");
    env
  }

  /// Value for a build parameter, empty when its variable is unset.
  pub fn build_param(&self, name: &str) -> &str {
    self.build_params.get(name).map(String::as_str).unwrap_or("")
  }
}

fn var(name: &str) -> Option<String> {
  std::env::var(name).ok()
}

fn non_empty(name: &str) -> Option<String> {
  var(name).filter(|v| !v.is_empty())
}

/// Truthiness of an override variable: set and non-empty.
fn is_set(name: &str) -> bool {
  non_empty(name).is_some()
}

fn detect_runtime() -> Option<PathBuf> {
  non_empty(consts::env::RUNTIME)
    .or_else(|| non_empty(consts::env::NPM_NODE_EXECPATH))
    .map(PathBuf::from)
    .or_else(|| which::which("node").ok())
}
