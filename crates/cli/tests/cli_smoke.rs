//! CLI smoke tests for sassbind.
//!
//! Each test builds a throwaway package directory with fake external tools
//! (`/bin/sh` scripts standing in for the runtime, the toolchain entry point
//! and git) and checks the exit status and diagnostics of a full run.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

const INSTALLED: &str = "vendor/test/binding.node";

const FAKE_RUNTIME: &str = r#"if [ "$1" = "-e" ]; then
  if [ -f probe-ok ]; then exit 0; fi
  echo "Error: Module did not self-register" >&2
  exit 1
fi
exec /bin/sh "$@""#;

const FAKE_GIT: &str = r#"echo "$@" >> "$(dirname "$0")/git.log"
case "$1" in
  clone) mkdir -p "$3" ;;
esac"#;

const TOOLCHAIN_OK: &str = r#"echo "$@" > toolchain-args.txt
mkdir -p build/Release
echo fresh-binary > build/Release/binding.node"#;

fn write_script(path: &Path, body: &str) {
  std::fs::create_dir_all(path.parent().unwrap()).unwrap();
  std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Throwaway package with a manifest, fake runtime and fake git.
struct Package {
  temp: TempDir,
}

impl Package {
  fn new() -> Self {
    let temp = TempDir::new().unwrap();
    std::fs::write(
      temp.path().join("package.json"),
      r#"{ "name": "node-sass", "libsass": "3.5.5" }"#,
    )
    .unwrap();
    write_script(&temp.path().join("tools/node"), FAKE_RUNTIME);
    write_script(&temp.path().join("tools/git"), FAKE_GIT);
    Self { temp }
  }

  fn path(&self) -> &Path {
    self.temp.path()
  }

  fn toolchain(&self, body: &str) -> &Self {
    write_script(&self.path().join("node_modules/node-gyp/bin/node-gyp.js"), body);
    self
  }

  fn write(&self, relative: &str, content: &str) -> &Self {
    let path = self.path().join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
    self
  }

  fn read(&self, relative: &str) -> String {
    std::fs::read_to_string(self.path().join(relative)).unwrap_or_default()
  }

  fn file(&self, relative: &str) -> PathBuf {
    self.path().join(relative)
  }

  fn git_calls(&self) -> usize {
    self.read("tools/git.log").lines().count()
  }

  /// The sassbind binary, run inside the package with no overrides set.
  fn cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("sassbind");
    cmd.current_dir(self.path());
    for var in [
      "SASS_FORCE_BUILD",
      "LIBSASS_EXT",
      "LIBSASS_CFLAGS",
      "LIBSASS_LDFLAGS",
      "LIBSASS_LIBRARY",
      "SASS_BINARY_NAME",
      "SASSBIND_JS_ENGINE",
      "SASSBIND_PROBE",
      "NODE_MODULE_VERSION",
      "RUST_LOG",
    ] {
      cmd.env_remove(var);
    }
    cmd.env("SASSBIND_RUNTIME", self.file("tools/node"));
    cmd.env("SASSBIND_GIT", self.file("tools/git"));
    cmd.env("SASSBIND_LIBSASS_REPO", "https://example.invalid/libsass.git");
    cmd.env("SASS_BINARY_PATH", INSTALLED);
    cmd
  }
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  cargo_bin_cmd!("sassbind")
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  cargo_bin_cmd!("sassbind")
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("sassbind"));
}

// =============================================================================
// Existing binary
// =============================================================================

#[test]
#[serial]
fn valid_binary_exits_zero_without_building() {
  let package = Package::new();
  package.write(INSTALLED, "prebuilt").write("probe-ok", "");
  package.toolchain(TOOLCHAIN_OK);

  package
    .cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("Binary is fine; exiting."));

  assert_eq!(package.read(INSTALLED), "prebuilt");
  assert!(!package.file("toolchain-args.txt").exists());
}

#[test]
#[serial]
fn broken_binary_is_rebuilt() {
  let package = Package::new();
  package.write(INSTALLED, "corrupt").write("src/libsass/Makefile", "");
  package.toolchain(TOOLCHAIN_OK);

  package
    .cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("Installed in"));

  assert_eq!(package.read(INSTALLED).trim(), "fresh-binary");
}

#[test]
#[serial]
fn force_flag_rebuilds_and_is_not_passed_to_toolchain() {
  let package = Package::new();
  package
    .write(INSTALLED, "prebuilt")
    .write("probe-ok", "")
    .write("src/libsass/Makefile", "");
  package.toolchain(TOOLCHAIN_OK);

  package.cmd().arg("-f").arg("--jobs=2").assert().success();

  assert_eq!(package.read(INSTALLED).trim(), "fresh-binary");
  let args = package.read("toolchain-args.txt");
  assert!(args.trim().ends_with("--libsass_library= --jobs=2"));
  assert!(!args.contains("-f"));
}

#[test]
#[serial]
fn force_environment_override_rebuilds() {
  let package = Package::new();
  package
    .write(INSTALLED, "prebuilt")
    .write("probe-ok", "")
    .write("src/libsass/Makefile", "");
  package.toolchain(TOOLCHAIN_OK);

  package.cmd().env("SASS_FORCE_BUILD", "true").assert().success();

  assert_eq!(package.read(INSTALLED).trim(), "fresh-binary");
}

// =============================================================================
// Build path
// =============================================================================

#[test]
#[serial]
fn missing_binary_builds_with_environment_parameters() {
  let package = Package::new();
  package.write("src/libsass/Makefile", "");
  package.toolchain(TOOLCHAIN_OK);

  package
    .cmd()
    .env("LIBSASS_CFLAGS", "-O2")
    .assert()
    .success();

  assert_eq!(
    package.read("toolchain-args.txt").trim(),
    "rebuild --verbose --libsass_ext= --libsass_cflags=-O2 --libsass_ldflags= --libsass_library="
  );
  assert_eq!(package.git_calls(), 0);
}

#[test]
#[serial]
fn absent_sources_are_cloned_once() {
  let package = Package::new();
  package.toolchain(TOOLCHAIN_OK);

  package.cmd().assert().success();
  assert_eq!(package.git_calls(), 2);

  package.cmd().arg("--force").assert().success();
  assert_eq!(package.git_calls(), 2);
}

#[test]
#[serial]
fn clone_failure_exits_nonzero() {
  let package = Package::new();
  write_script(
    &package.file("tools/git"),
    r#"echo "fatal: could not resolve host" >&2
exit 128"#,
  );
  package.toolchain(TOOLCHAIN_OK);

  package
    .cmd()
    .assert()
    .failure()
    .stderr(predicate::str::contains("could not resolve host"));

  assert!(!package.file("toolchain-args.txt").exists());
}

#[test]
#[serial]
fn toolchain_exit_127_reports_not_found() {
  let package = Package::new();
  package.toolchain("exit 127");

  package
    .cmd()
    .arg("--libsass_ext")
    .assert()
    .failure()
    .stderr(predicate::str::contains("toolchain not found"));
}

#[test]
#[serial]
fn toolchain_failure_reports_build_failed() {
  let package = Package::new();
  package.toolchain("exit 1");

  package
    .cmd()
    .env("LIBSASS_EXT", "auto")
    .assert()
    .failure()
    .stderr(predicate::str::contains("build failed").and(predicate::str::contains("not found").not()));
}

#[test]
#[serial]
fn missing_output_reports_target_not_found() {
  let package = Package::new();
  package.toolchain("exit 0");

  package
    .cmd()
    .arg("--libsass_ext")
    .assert()
    .failure()
    .stderr(predicate::str::contains("build succeeded but target not found"));

  assert!(!package.file(INSTALLED).exists());
}

#[test]
#[serial]
fn missing_toolchain_entry_reports_not_found() {
  let package = Package::new();

  package
    .cmd()
    .arg("--libsass_ext")
    .assert()
    .failure()
    .stderr(predicate::str::contains("toolchain not found"));
}

#[test]
#[serial]
fn package_dir_flag_selects_package() {
  let package = Package::new();
  package.write("src/libsass/Makefile", "");
  package.toolchain(TOOLCHAIN_OK);
  let elsewhere = TempDir::new().unwrap();

  package
    .cmd()
    .current_dir(elsewhere.path())
    .arg("--package-dir")
    .arg(package.path())
    .assert()
    .success();

  assert_eq!(package.read(INSTALLED).trim(), "fresh-binary");
}

// =============================================================================
// Library check
// =============================================================================

#[test]
fn probe_library_flag_rejects_garbage() {
  let package = Package::new();
  package.write("binding.node", "not a shared library");

  cargo_bin_cmd!("sassbind")
    .arg("--probe-library")
    .arg(package.file("binding.node"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to load"));
}

/// Constructor of a real addon: registration needs a symbol only the host runtime exports.
#[cfg(target_os = "linux")]
const ADDON_REGISTERING_WITH_RUNTIME: &str = r#"
extern void node_module_register(void *module);

__attribute__((constructor)) static void register_addon(void) {
  node_module_register(0);
}
"#;

#[test]
#[serial]
#[cfg(target_os = "linux")]
fn library_check_rebuilds_addon_that_aborts_on_load() {
  let package = Package::new();
  package.write("addon.c", ADDON_REGISTERING_WITH_RUNTIME);
  std::fs::create_dir_all(package.file("vendor/test")).unwrap();

  let compiled = std::process::Command::new("cc")
    .args(["-shared", "-fPIC", "-o"])
    .arg(package.file(INSTALLED))
    .arg(package.file("addon.c"))
    .status();
  match compiled {
    Ok(status) if status.success() => {}
    _ => {
      eprintln!("skipping: no working C compiler");
      return;
    }
  }

  package.write("src/libsass/Makefile", "");
  package.toolchain(TOOLCHAIN_OK);

  package
    .cmd()
    .env("SASSBIND_PROBE", "library")
    .assert()
    .success()
    .stdout(predicate::str::contains("Built because: problem with the binary"));

  assert_eq!(package.read(INSTALLED).trim(), "fresh-binary");
}
