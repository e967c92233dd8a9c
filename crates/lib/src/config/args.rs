//! Flag parsing for a provisioning run.
//!
//! Only `-f`/`--force` is consumed. Every other argument, including the
//! recognized `--target_arch`, `--debug` and `--libsass_ext` flags, is kept in
//! order and handed to the toolchain.

/// Flags recognized on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
  pub force: bool,
  pub debug: bool,
  pub libsass_ext: bool,
  pub target_arch: Option<String>,
  pub passthrough: Vec<String>,
}

pub fn parse_args<I, S>(args: I) -> ParsedArgs
where
  I: IntoIterator<Item = S>,
  S: Into<String>,
{
  let mut parsed = ParsedArgs::default();

  for arg in args {
    let arg = arg.into();

    if arg == "-f" || arg == "--force" {
      parsed.force = true;
      continue;
    }

    if let Some(rest) = arg.strip_prefix("--target_arch") {
      let value = flag_value(rest);
      if !value.is_empty() {
        parsed.target_arch = Some(value.to_string());
      }
    } else if arg == "-d" || arg == "--debug" {
      parsed.debug = true;
    } else if let Some(rest) = arg.strip_prefix("--libsass_ext") {
      parsed.libsass_ext = flag_value(rest) != "no";
    }

    parsed.passthrough.push(arg);
  }

  parsed
}

/// Text after the separator character that follows a flag name (`--name=value`).
fn flag_value(rest: &str) -> &str {
  let mut chars = rest.chars();
  chars.next();
  chars.as_str()
}
