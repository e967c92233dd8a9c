mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::output::print_error;

/// sassbind - install a working native Sass binding, building it when needed
#[derive(Parser)]
#[command(name = "sassbind")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Package directory containing package.json (default: current directory)
  #[arg(long, value_name = "DIR")]
  package_dir: Option<PathBuf>,

  /// Enable debug logging
  #[arg(short, long)]
  verbose: bool,

  /// Load PATH in this process and compile a test stylesheet, then exit
  #[arg(long, value_name = "PATH", hide = true)]
  probe_library: Option<PathBuf>,

  /// Build flags (-f/--force, -d/--debug, --target_arch=, --libsass_ext[=no]);
  /// everything except --force is also passed to the toolchain
  #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
  args: Vec<String>,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  if let Some(path) = cli.probe_library {
    return cmd::cmd_probe_library(&path);
  }

  let default_filter = if cli.verbose {
    "sassbind_lib=debug,sassbind=debug,warn"
  } else {
    "sassbind_lib=info,sassbind=info,warn"
  };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
    .with_target(false)
    .without_time()
    .init();

  match cmd::cmd_provision(cli.package_dir, cli.args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&err.to_string());
      ExitCode::FAILURE
    }
  }
}
