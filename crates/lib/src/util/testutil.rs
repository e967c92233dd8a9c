//! Test utilities for sassbind-lib.
//!
//! Fake external tools (source control, host runtime, toolchain entry point)
//! are small `/bin/sh` scripts written into a temporary package directory.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::{BuildConfig, BuildEnv};

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Write an executable `/bin/sh` script.
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path.to_path_buf()
}

/// Fake source-control tool: logs each invocation and creates the clone target.
pub const FAKE_GIT: &str = r#"echo "$@" >> "$(dirname "$0")/git.log"
case "$1" in
  clone) mkdir -p "$3" ;;
esac"#;

/// Fake host runtime.
///
/// With `-e` it acts as the validation probe and succeeds only when
/// `probe-ok` exists in the working directory. Otherwise it runs its first
/// argument as a shell script, standing in for the bundled toolchain entry.
pub const FAKE_RUNTIME: &str = r#"if [ "$1" = "-e" ]; then
  if [ -f probe-ok ]; then exit 0; fi
  echo "Error: Module did not self-register" >&2
  exit 1
fi
exec /bin/sh "$@""#;

/// Fake toolchain entry: records its arguments and writes a release build.
pub const FAKE_TOOLCHAIN_OK: &str = r#"echo "$@" > toolchain-args.txt
mkdir -p build/Release
echo fresh-binary > build/Release/binding.node"#;

/// A package directory populated with fake tools.
pub struct PackageFixture {
  pub temp: TempDir,
}

impl PackageFixture {
  /// Package with a manifest, a fake git and a fake runtime.
  #[cfg(unix)]
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    std::fs::write(
      temp.path().join("package.json"),
      r#"{ "name": "node-sass", "version": "4.14.1", "libsass": "3.5.5" }"#,
    )
    .unwrap();
    write_script(&temp.path().join("tools/git"), FAKE_GIT);
    write_script(&temp.path().join("tools/node"), FAKE_RUNTIME);
    Self { temp }
  }

  pub fn path(&self) -> &Path {
    self.temp.path()
  }

  /// Replace the bundled toolchain entry point with the given script body.
  #[cfg(unix)]
  pub fn toolchain(&self, body: &str) -> &Self {
    write_script(&self.path().join("node_modules/node-gyp/bin/node-gyp.js"), body);
    self
  }

  pub fn write(&self, relative: &str, content: &str) -> &Self {
    let path = self.path().join(relative);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
    self
  }

  pub fn read(&self, relative: &str) -> String {
    std::fs::read_to_string(self.path().join(relative)).unwrap_or_default()
  }

  pub fn exists(&self, relative: &str) -> bool {
    self.path().join(relative).exists()
  }

  /// Environment wired to the fixture's fake tools, with no overrides set.
  pub fn env(&self) -> BuildEnv {
    BuildEnv {
      runtime: Some(self.path().join("tools/node")),
      git: self.path().join("tools/git"),
      libsass_repo: "https://example.invalid/libsass.git".to_string(),
      binary_path: Some(PathBuf::from("vendor/test/binding.node")),
      ..BuildEnv::default()
    }
  }

  pub fn config(&self, args: &[&str]) -> BuildConfig {
    self.config_with(args, self.env())
  }

  pub fn config_with(&self, args: &[&str], env: BuildEnv) -> BuildConfig {
    BuildConfig::from_args(self.path(), args.iter().copied(), env)
  }

  /// Lines logged by the fake git.
  pub fn git_calls(&self) -> Vec<String> {
    self.read("tools/git.log").lines().map(str::to_string).collect()
  }
}
