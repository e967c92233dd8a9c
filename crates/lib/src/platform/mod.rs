pub mod arch;
pub mod os;

use arch::Arch;
use os::Os;

/// Architecture of the running host, or the raw Rust identifier when it has no addon name
pub fn host_arch() -> String {
  Arch::current()
    .map(|a| a.to_string())
    .unwrap_or_else(|| std::env::consts::ARCH.to_string())
}

/// Operating system of the running host, or the raw Rust identifier when it has no addon name
pub fn host_platform() -> String {
  Os::current()
    .map(|o| o.to_string())
    .unwrap_or_else(|| std::env::consts::OS.to_string())
}
