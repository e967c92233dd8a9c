//! Process runner for source-control and probe subprocesses.
//!
//! Every captured external invocation goes through [`run`]: standard output is
//! discarded, standard error is accumulated (bounded to the tail that matters
//! for a diagnostic) and the exit code alone decides success.

use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

/// Upper bound on retained stderr. Older bytes are dropped first.
pub const MAX_STDERR_BYTES: usize = 64 * 1024;

/// Errors from running an external command.
#[derive(Debug, Error)]
pub enum ProcessError {
  /// The command could not be started.
  #[error("failed to start '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// Waiting on the process or reading its error stream failed.
  #[error("failed while running '{program}': {source}")]
  Wait {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The command exited with a nonzero status.
  #[error("'{program}' exited with {}: {stderr}", describe_exit(.code))]
  Failed {
    program: String,
    code: Option<i32>,
    stderr: String,
  },
}

/// Human-readable exit status; `None` means the process was killed by a signal.
pub(crate) fn describe_exit(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {}", code),
    None => "terminated by signal".to_string(),
  }
}

impl ProcessError {
  /// Captured stderr of a failed command, if any.
  pub fn stderr(&self) -> Option<&str> {
    match self {
      ProcessError::Failed { stderr, .. } => Some(stderr),
      _ => None,
    }
  }
}

/// Outcome of a finished subprocess.
///
/// An empty `stderr` does not imply success; only `status` does.
#[derive(Debug)]
pub struct ProcessOutcome {
  pub program: String,
  pub status: ExitStatus,
  pub stderr: String,
}

impl ProcessOutcome {
  pub fn success(&self) -> bool {
    self.status.success()
  }

  /// Reduce to `Ok(())` on exit code zero, or a [`ProcessError::Failed`] carrying stderr.
  pub fn into_result(self) -> Result<(), ProcessError> {
    if self.status.success() {
      return Ok(());
    }

    Err(ProcessError::Failed {
      program: self.program,
      code: self.status.code(),
      stderr: self.stderr.trim_end().to_string(),
    })
  }
}

/// Name of the program a command will run, for diagnostics.
pub fn program_name(command: &Command) -> String {
  command.as_std().get_program().to_string_lossy().into_owned()
}

/// Run a command to completion, accumulating its error stream.
pub async fn run_captured(command: &mut Command) -> Result<ProcessOutcome, ProcessError> {
  let program = program_name(command);

  command.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::piped());

  debug!(program = %program, "spawning process");

  let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
    program: program.clone(),
    source,
  })?;

  let mut stderr = Vec::new();
  if let Some(mut pipe) = child.stderr.take() {
    let mut chunk = [0u8; 8192];
    loop {
      let read = pipe.read(&mut chunk).await.map_err(|source| ProcessError::Wait {
        program: program.clone(),
        source,
      })?;
      if read == 0 {
        break;
      }
      push_bounded(&mut stderr, &chunk[..read], MAX_STDERR_BYTES);
    }
  }

  let status = child.wait().await.map_err(|source| ProcessError::Wait {
    program: program.clone(),
    source,
  })?;

  let stderr = String::from_utf8_lossy(&stderr).into_owned();
  if !stderr.is_empty() {
    debug!(program = %program, stderr = %stderr, "process stderr");
  }
  debug!(program = %program, code = ?status.code(), "process exited");

  Ok(ProcessOutcome { program, status, stderr })
}

/// Run a command and classify its result by exit code.
pub async fn run(command: &mut Command) -> Result<(), ProcessError> {
  run_captured(command).await?.into_result()
}

/// Append `data` to `buf`, keeping only the last `limit` bytes.
fn push_bounded(buf: &mut Vec<u8>, data: &[u8], limit: usize) {
  buf.extend_from_slice(data);
  if buf.len() > limit {
    let excess = buf.len() - limit;
    buf.drain(..excess);
  }
}
