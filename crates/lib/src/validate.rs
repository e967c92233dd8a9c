//! Checking whether an existing binary can be trusted.
//!
//! Presence is a plain filesystem check. Validity is only established by
//! loading the binary and rendering a known-good stylesheet through it.

use std::ffi::{CString, c_char, c_int, c_void};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::config::{BuildConfig, ProbeKind};
use crate::consts::{PROBE_INPUT, PROBE_LIBRARY_FLAG};
use crate::process::{self, ProcessError};

#[derive(Debug, Error)]
pub enum ProbeError {
  #[error("no host runtime available to load the binary")]
  RuntimeUnavailable,

  #[error("loading the binary through the runtime failed: {0}")]
  Runtime(#[from] ProcessError),

  #[error("cannot locate the probe helper executable: {0}")]
  HelperUnavailable(#[source] std::io::Error),

  /// The isolated library probe exited nonzero, was killed, or never started.
  #[error("loading the binary in a child process failed: {0}")]
  Library(#[source] ProcessError),

  #[error("failed to load '{}': {message}", .path.display())]
  Load { path: PathBuf, message: String },

  #[error("binary does not export '{symbol}': {message}")]
  MissingSymbol { symbol: &'static str, message: String },

  #[error("test compilation failed with status {status}")]
  CompileFailed { status: i32 },

  #[error("test compilation could not allocate a context")]
  NullContext,
}

/// Whether a file exists at `path`. Says nothing about whether it works.
pub fn has_binary(path: &Path) -> bool {
  path.exists()
}

/// Exercise the binary at `path` with the configured probe.
pub async fn probe_binary(config: &BuildConfig, path: &Path) -> Result<(), ProbeError> {
  debug!(path = %path.display(), probe = ?config.env.probe, "testing binary");

  match config.env.probe {
    ProbeKind::Runtime => probe_runtime(config).await,
    ProbeKind::Library => {
      let helper = std::env::current_exe().map_err(ProbeError::HelperUnavailable)?;
      probe_library_isolated(&helper, path).await
    }
  }
}

/// Run [`probe_library`] in a child process: `helper --probe-library <path>`.
///
/// Loading an addon runs its constructors, which may abort the whole process
/// (an unresolved runtime symbol, a crash). In a child that surfaces as a
/// nonzero exit instead of taking the caller down. `helper` must handle
/// [`PROBE_LIBRARY_FLAG`] by calling [`probe_library`]; the `sassbind`
/// binary does.
pub async fn probe_library_isolated(helper: &Path, path: &Path) -> Result<(), ProbeError> {
  let mut command = Command::new(helper);
  command.arg(PROBE_LIBRARY_FLAG).arg(path);

  process::run(&mut command).await.map_err(ProbeError::Library)
}

/// Inline script that loads the package and renders [`PROBE_INPUT`] synchronously.
pub fn runtime_probe_script(package_dir: &Path) -> String {
  // JSON string literals are valid script string literals.
  let package = serde_json::Value::String(package_dir.to_string_lossy().into_owned());
  let input = serde_json::Value::String(PROBE_INPUT.to_string());
  format!("require({}).renderSync({{ data: {} }});", package, input)
}

async fn probe_runtime(config: &BuildConfig) -> Result<(), ProbeError> {
  let runtime = config.env.runtime.as_ref().ok_or(ProbeError::RuntimeUnavailable)?;

  let mut command = Command::new(runtime);
  command
    .arg("-e")
    .arg(runtime_probe_script(&config.package_dir))
    .current_dir(&config.package_dir);

  process::run(&mut command).await?;
  Ok(())
}

type CopyCString = unsafe extern "C" fn(*const c_char) -> *mut c_char;
type MakeDataContext = unsafe extern "C" fn(*mut c_char) -> *mut c_void;
type CompileDataContext = unsafe extern "C" fn(*mut c_void) -> c_int;
type DeleteDataContext = unsafe extern "C" fn(*mut c_void);

/// Load the binary in-process and compile [`PROBE_INPUT`] through its C entry points.
///
/// Only call this from a process that can afford to die; see [`probe_library_isolated`].
pub fn probe_library(path: &Path) -> Result<(), ProbeError> {
  // SAFETY: loading runs the library's initializers; the file is the addon
  // this pipeline is responsible for and is about to be rebuilt if it misbehaves.
  let library = unsafe { libloading::Library::new(path) }.map_err(|err| ProbeError::Load {
    path: path.to_path_buf(),
    message: err.to_string(),
  })?;

  // SAFETY: signatures match the exported C API of the library.
  unsafe {
    let copy = symbol::<CopyCString>(&library, "sass_copy_c_string")?;
    let make = symbol::<MakeDataContext>(&library, "sass_make_data_context")?;
    let compile = symbol::<CompileDataContext>(&library, "sass_compile_data_context")?;
    let delete = symbol::<DeleteDataContext>(&library, "sass_delete_data_context")?;

    let input = CString::new(PROBE_INPUT).map_err(|err| ProbeError::Load {
      path: path.to_path_buf(),
      message: err.to_string(),
    })?;

    // The context takes ownership of the copied source and frees it on delete.
    let source = copy(input.as_ptr());
    let context = make(source);
    if context.is_null() {
      return Err(ProbeError::NullContext);
    }

    let status = compile(context);
    delete(context);

    if status != 0 {
      return Err(ProbeError::CompileFailed { status });
    }
  }

  Ok(())
}

unsafe fn symbol<T: Copy>(library: &libloading::Library, name: &'static str) -> Result<T, ProbeError> {
  // SAFETY: the caller guarantees `T` is the correct function pointer type.
  unsafe { library.get::<T>(name.as_bytes()) }
    .map(|sym| *sym)
    .map_err(|err| ProbeError::MissingSymbol {
      symbol: name,
      message: err.to_string(),
    })
}
