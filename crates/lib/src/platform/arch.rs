use std::fmt;

/// CPU architectures in the addon naming scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
  X64,
  Ia32,
  Arm64,
  Arm,
}

impl Arch {
  /// Detect the current CPU architecture at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::ARCH {
      "x86_64" => Some(Self::X64),
      "x86" => Some(Self::Ia32),
      "aarch64" => Some(Self::Arm64),
      "arm" => Some(Self::Arm),
      _ => None,
    }
  }

  /// Returns the identifier used in binary names (e.g. "x64")
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X64 => "x64",
      Self::Ia32 => "ia32",
      Self::Arm64 => "arm64",
      Self::Arm => "arm",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
