mod probe;
mod provision;

pub use probe::cmd_probe_library;
pub use provision::cmd_provision;
