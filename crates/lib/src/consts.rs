//! Fixed names, paths and environment variables shared across the pipeline.

/// Build parameters forwarded to the toolchain as `--name=value`.
///
/// Each value comes from the environment variable named by the uppercased
/// parameter name.
pub const BUILD_PARAMS: [&str; 4] = ["libsass_ext", "libsass_cflags", "libsass_ldflags", "libsass_library"];

/// File name of the compiled addon, both in the build tree and at the install path.
pub const BINARY_FILENAME: &str = "binding.node";

/// Package-relative directory holding the toolchain's build tree.
pub const BUILD_DIR: &str = "build";

/// Package-relative directory holding prebuilt binaries.
pub const VENDOR_DIR: &str = "vendor";

/// Package-relative checkout location of the native library sources.
pub const LIBSASS_SOURCE_DIR: &str = "src/libsass";

pub const LIBSASS_REPO_URL: &str = "https://github.com/sass/libsass.git";

pub const DEBUG_VARIANT: &str = "Debug";
pub const DEFAULT_RELEASE_VARIANT: &str = "Release";

/// Toolchain configuration file written by the configure step, relative to the build root.
pub const TOOLCHAIN_CONFIG_FILE: &str = "config.gypi";

/// Toolchain executable name when it is looked up on `PATH`.
pub const TOOLCHAIN_BIN: &str = "node-gyp";

/// Suffix of the `PATH` entry that ships a toolchain compatible with alternate engines.
pub const TOOLCHAIN_BIN_DIR_SUFFIX: &str = "node-gyp-bin";

/// Script engine whose runtime cannot run the bundled toolchain entry point.
pub const ALTERNATE_ENGINE: &str = "chakracore";

/// Exit status a shell reports when the command itself was not found.
pub const EXIT_COMMAND_NOT_FOUND: i32 = 127;

/// Known-good stylesheet used to exercise an existing binary.
pub const PROBE_INPUT: &str = "s { a: ss }";

/// Hidden flag that makes the `sassbind` binary run only the in-process library probe.
pub const PROBE_LIBRARY_FLAG: &str = "--probe-library";

pub mod env {
  pub const FORCE_BUILD: &str = "SASS_FORCE_BUILD";
  pub const LIBSASS_EXT: &str = "LIBSASS_EXT";
  pub const BINARY_NAME: &str = "SASS_BINARY_NAME";
  pub const BINARY_PATH: &str = "SASS_BINARY_PATH";
  pub const RUNTIME: &str = "SASSBIND_RUNTIME";
  pub const NPM_NODE_EXECPATH: &str = "npm_node_execpath";
  pub const JS_ENGINE: &str = "SASSBIND_JS_ENGINE";
  pub const GIT: &str = "SASSBIND_GIT";
  pub const LIBSASS_REPO: &str = "SASSBIND_LIBSASS_REPO";
  pub const PROBE: &str = "SASSBIND_PROBE";
  pub const MODULE_VERSION: &str = "NODE_MODULE_VERSION";
  pub const PATH: &str = "PATH";
}
